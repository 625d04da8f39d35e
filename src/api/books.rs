//! Book catalog and lending endpoints

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookResponse, BookSummary, NewBook},
        user::UserSummary,
    },
};

/// Borrow request
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowBookRequest {
    /// Name of the book to borrow
    pub book_name: String,
    /// Email of the borrowing user
    pub email: String,
}

/// Return request (name-based)
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnBookRequest {
    pub book_name: String,
    pub email: String,
}

/// Return request (id-based)
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReturnBookByIdRequest {
    pub user_id: i32,
}

/// Borrow/return response with the affected pair
#[derive(Serialize, ToSchema)]
pub struct LendingResponse {
    pub message: String,
    pub book: BookSummary,
    pub user: UserSummary,
}

/// Return response for the id-based adapter, carrying the full record
#[derive(Serialize, ToSchema)]
pub struct ReturnBookByIdResponse {
    pub message: String,
    pub book: BookResponse,
}

/// Add book response
#[derive(Serialize, ToSchema)]
pub struct AddBookResponse {
    pub message: String,
    pub book: BookResponse,
}

/// Borrow a book
#[utoipa::path(
    post,
    path = "/books/borrow",
    tag = "books",
    request_body = BorrowBookRequest,
    responses(
        (status = 200, description = "Book borrowed", body = LendingResponse),
        (status = 400, description = "Missing field, book already rented, or user already borrowing"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    Json(request): Json<BorrowBookRequest>,
) -> AppResult<Json<LendingResponse>> {
    let (book, user) = state
        .services
        .lending
        .borrow_book(&request.book_name, &request.email)
        .await?;

    Ok(Json(LendingResponse {
        message: "Book borrowed successfully.".to_string(),
        book: BookSummary::from(&book),
        user: UserSummary::from(&user),
    }))
}

/// Return a book by name
#[utoipa::path(
    post,
    path = "/books/return",
    tag = "books",
    request_body = ReturnBookRequest,
    responses(
        (status = 200, description = "Book returned", body = LendingResponse),
        (status = 400, description = "Missing field or book not borrowed by this user"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Json(request): Json<ReturnBookRequest>,
) -> AppResult<Json<LendingResponse>> {
    let (book, user) = state
        .services
        .lending
        .return_book(&request.book_name, &request.email)
        .await?;

    Ok(Json(LendingResponse {
        message: "Book returned successfully.".to_string(),
        book: BookSummary::from(&book),
        user: UserSummary::from(&user),
    }))
}

/// Return a book by ID
#[utoipa::path(
    post,
    path = "/books/{id}/return",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = ReturnBookByIdRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnBookByIdResponse),
        (status = 400, description = "Book not borrowed by this user"),
        (status = 404, description = "User or book not found")
    )
)]
pub async fn return_book_by_id(
    State(state): State<crate::AppState>,
    Path(book_id): Path<i32>,
    Json(request): Json<ReturnBookByIdRequest>,
) -> AppResult<Json<ReturnBookByIdResponse>> {
    let (book, _user) = state
        .services
        .lending
        .return_book_by_id(book_id, request.user_id)
        .await?;

    Ok(Json(ReturnBookByIdResponse {
        message: "Book returned successfully.".to_string(),
        book: BookResponse::from(&book),
    }))
}

/// Add a book to the catalog
///
/// Multipart form with a `name` field and a `coverImage` file; `rented` and
/// `userId` are optional and must be consistent with each other.
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    responses(
        (status = 201, description = "Book added", body = AddBookResponse),
        (status = 400, description = "Missing name or image, or inconsistent borrower fields")
    )
)]
pub async fn add_book(
    State(state): State<crate::AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<AddBookResponse>)> {
    let mut name: Option<String> = None;
    let mut rented = false;
    let mut user_id: Option<i32> = None;
    let mut cover: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        match field.name().unwrap_or_default() {
            "name" => {
                name = Some(read_text(field).await?);
            }
            "rented" => {
                let value = read_text(field).await?;
                rented = matches!(value.as_str(), "true" | "1" | "on");
            }
            "userId" => {
                let value = read_text(field).await?;
                if !value.is_empty() {
                    user_id = Some(value.parse().map_err(|_| {
                        AppError::Validation("userId must be an integer.".to_string())
                    })?);
                }
            }
            "coverImage" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                cover = Some((filename, content_type, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let name = name.unwrap_or_default();
    let (filename, content_type, bytes) = cover.ok_or_else(|| {
        AppError::Validation("Book name and image are required.".to_string())
    })?;

    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Book name and image are required.".to_string(),
        ));
    }

    let cover_image = state
        .services
        .covers
        .save(&filename, content_type.as_deref(), &bytes)
        .await?;

    let book = state
        .services
        .catalog
        .add_book(NewBook {
            name,
            cover_image,
            rented,
            user_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AddBookResponse {
            message: "Book added successfully".to_string(),
            book: BookResponse::from(&book),
        }),
    ))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))
}
