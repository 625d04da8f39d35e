//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Libris API",
        version = "1.0.0",
        description = "Book Lending Service REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::signup,
        auth::login,
        auth::me,
        // Books
        books::add_book,
        books::borrow_book,
        books::return_book,
        books::return_book_by_id,
    ),
    components(
        schemas(
            // Auth
            auth::SignupResponse,
            auth::LoginResponse,
            crate::models::user::SignupRequest,
            crate::models::user::LoginRequest,
            crate::models::user::User,
            crate::models::user::UserSummary,
            // Books
            books::BorrowBookRequest,
            books::ReturnBookRequest,
            books::ReturnBookByIdRequest,
            books::LendingResponse,
            books::ReturnBookByIdResponse,
            books::AddBookResponse,
            crate::models::book::BookResponse,
            crate::models::book::BookSummary,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog and lending")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
