//! Lending service: borrow and return workflow
//!
//! Resolves the User and Book records involved in a transition and delegates
//! the two-record state change to the lending repository, which performs it
//! atomically. The checks here give precise errors on the common paths; the
//! repository's conditional updates stay authoritative under concurrency.

use crate::{
    error::{AppError, AppResult},
    models::{book::Book, user::User},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Borrow a book by name for the user identified by email.
    ///
    /// A user may hold at most one book at a time, and a book may be held by
    /// at most one user.
    pub async fn borrow_book(&self, book_name: &str, email: &str) -> AppResult<(Book, User)> {
        if book_name.trim().is_empty() || email.trim().is_empty() {
            return Err(AppError::Validation(
                "Book Name and Email are required.".to_string(),
            ));
        }

        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        if self.repository.books.get_by_borrower(user.id).await?.is_some() {
            return Err(AppError::Conflict(
                "You can only borrow one book at a time.".to_string(),
            ));
        }

        let book = self
            .repository
            .books
            .get_by_name(book_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;

        if book.rented {
            return Err(AppError::Conflict("This book is already rented.".to_string()));
        }

        let book = self.repository.lending.borrow(book.id, user.id).await?;

        tracing::info!(book_id = book.id, user_id = user.id, "book borrowed");

        Ok((book, user))
    }

    /// Return a book identified by name, on behalf of the user identified by
    /// email.
    pub async fn return_book(&self, book_name: &str, email: &str) -> AppResult<(Book, User)> {
        if book_name.trim().is_empty() || email.trim().is_empty() {
            return Err(AppError::Validation(
                "Book Name and Email are required.".to_string(),
            ));
        }

        let user = self
            .repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

        let book = self
            .repository
            .books
            .get_by_name(book_name)
            .await?
            .ok_or_else(|| AppError::NotFound("Book not found.".to_string()))?;

        let book = self.release(book, &user).await?;

        Ok((book, user))
    }

    /// Return a book by opaque identifiers. Thin adapter over the same
    /// release path as [`return_book`].
    pub async fn return_book_by_id(&self, book_id: i32, user_id: i32) -> AppResult<(Book, User)> {
        let user = self.repository.users.get_by_id(user_id).await?;
        let book = self.repository.books.get_by_id(book_id).await?;

        let book = self.release(book, &user).await?;

        Ok((book, user))
    }

    async fn release(&self, book: Book, user: &User) -> AppResult<Book> {
        if book.user_id != Some(user.id) {
            return Err(AppError::Forbidden(
                "You cannot return a book you haven't borrowed.".to_string(),
            ));
        }

        let book = self.repository.lending.release(book.id, user.id).await?;

        tracing::info!(book_id = book.id, user_id = user.id, "book returned");

        Ok(book)
    }
}
