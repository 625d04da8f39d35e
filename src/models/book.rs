//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Full book model from database.
///
/// `rented` is true exactly when `user_id` is set; the pair is kept
/// consistent by the lending repository and backed by a check constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i32,
    pub name: String,
    pub cover_image: String,
    pub rented: bool,
    /// Borrower reference, if currently rented
    pub user_id: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Book wire representation (camelCase, as exposed by the API)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: i32,
    pub name: String,
    pub cover_image: String,
    pub rented: bool,
    pub user_id: Option<i32>,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        BookResponse {
            id: book.id,
            name: book.name.clone(),
            cover_image: book.cover_image.clone(),
            rented: book.rented,
            user_id: book.user_id,
        }
    }
}

/// Short book representation embedded in borrow/return responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub name: String,
    pub rented: bool,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        BookSummary {
            name: book.name.clone(),
            rented: book.rented,
        }
    }
}

/// Fields for a new catalog entry
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub cover_image: String,
    pub rented: bool,
    pub user_id: Option<i32>,
}
