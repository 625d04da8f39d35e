//! Catalog service: adding books to the library

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, NewBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Add a book to the catalog.
    ///
    /// A borrower supplied at creation time goes through the same invariant
    /// checks as a borrow: the user must exist and must not already hold a
    /// book, and the (rented, user_id) pair must be consistent.
    pub async fn add_book(&self, book: NewBook) -> AppResult<Book> {
        if book.name.trim().is_empty() || book.cover_image.is_empty() {
            return Err(AppError::Validation(
                "Book name and image are required.".to_string(),
            ));
        }

        match (book.rented, book.user_id) {
            (false, None) => self.repository.books.create(&book).await,
            (true, Some(user_id)) => {
                let user = self.repository.users.get_by_id(user_id).await?;

                if self.repository.books.get_by_borrower(user.id).await?.is_some() {
                    return Err(AppError::Conflict(
                        "You can only borrow one book at a time.".to_string(),
                    ));
                }

                self.repository.lending.create_borrowed(&book, user.id).await
            }
            (true, None) => Err(AppError::Validation(
                "A rented book must reference its borrower.".to_string(),
            )),
            (false, Some(_)) => Err(AppError::Validation(
                "A borrower can only be set on a rented book.".to_string(),
            )),
        }
    }
}
