//! Lending repository: the two-record borrow/return transitions
//!
//! Borrow and return each touch a Book row and a User row. Both writes run
//! inside one transaction, and the first write of each pair is a conditional
//! update whose zero-rows-affected outcome is the state conflict. Two
//! concurrent borrows of the same book therefore serialize on the Book row:
//! exactly one claim succeeds, the loser maps to a conflict error and the
//! transaction rollback leaves no partial state behind.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, NewBook},
};

#[derive(Clone)]
pub struct LendingRepository {
    pool: Pool<Postgres>,
}

impl LendingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Atomically claim a book for a user and mirror the borrow on the user row.
    ///
    /// Fails with `Conflict` if the book is already rented or the user already
    /// holds a book, whichever is observed first at commit time.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET rented = TRUE, user_id = $2
            WHERE id = $1 AND rented = FALSE
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Conflict("This book is already rented.".to_string()))?;

        let user_rows = sqlx::query(
            r#"
            UPDATE users
            SET borrowed_book_id = $1
            WHERE id = $2 AND borrowed_book_id IS NULL
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if user_rows == 0 {
            // Rolls back the book claim above.
            return Err(AppError::Conflict(
                "You can only borrow one book at a time.".to_string(),
            ));
        }

        tx.commit().await?;

        Ok(book)
    }

    /// Atomically release a book held by a user and clear the user-side mirror.
    ///
    /// Fails with `Forbidden` if the book is not currently held by this user.
    pub async fn release(&self, book_id: i32, user_id: i32) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET rented = FALSE, user_id = NULL
            WHERE id = $1 AND user_id = $2
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden("You cannot return a book you haven't borrowed.".to_string())
        })?;

        sqlx::query("UPDATE users SET borrowed_book_id = NULL WHERE id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(book)
    }

    /// Create a book that starts out rented, mirroring the borrow on the user
    /// row under the same one-book-per-user condition as `borrow`.
    pub async fn create_borrowed(&self, book: &NewBook, user_id: i32) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (name, cover_image, rented, user_id)
            VALUES ($1, $2, TRUE, $3)
            RETURNING *
            "#,
        )
        .bind(&book.name)
        .bind(&book.cover_image)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let user_rows = sqlx::query(
            r#"
            UPDATE users
            SET borrowed_book_id = $1
            WHERE id = $2 AND borrowed_book_id IS NULL
            "#,
        )
        .bind(created.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if user_rows == 0 {
            return Err(AppError::Conflict(
                "You can only borrow one book at a time.".to_string(),
            ));
        }

        tx.commit().await?;

        Ok(created)
    }
}
