//! API integration tests
//!
//! Run against a live server with: cargo test -- --ignored

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

const BASE_URL: &str = "http://localhost:3000/api/v1";

// Smallest valid PNG, enough for the cover-image store.
const PNG_BYTES: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Unique suffix so tests can be re-run against the same database
fn unique() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos()
}

/// Sign up a fresh user and return their email
async fn signup_user(client: &Client) -> String {
    let email = format!("reader-{}@example.com", unique());
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "name": "Test Reader",
            "email": email,
            "password": "hunter2"
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), 201);
    email
}

/// Add a fresh book and return (id, name)
async fn add_book(client: &Client) -> (i64, String) {
    let name = format!("Book {}", unique());
    let form = Form::new().text("name", name.clone()).part(
        "coverImage",
        Part::bytes(PNG_BYTES.to_vec())
            .file_name("cover.png")
            .mime_str("image/png")
            .expect("Invalid mime type"),
    );

    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send add-book request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["book"]["id"].as_i64().expect("No book ID");
    assert_eq!(body["book"]["rented"], false);
    assert!(body["book"]["coverImage"].is_string());

    (id, name)
}

async fn borrow(client: &Client, book_name: &str, email: &str) -> reqwest::Response {
    client
        .post(format!("{}/books/borrow", BASE_URL))
        .json(&json!({ "bookName": book_name, "email": email }))
        .send()
        .await
        .expect("Failed to send borrow request")
}

async fn return_by_name(client: &Client, book_name: &str, email: &str) -> reqwest::Response {
    client
        .post(format!("{}/books/return", BASE_URL))
        .json(&json!({ "bookName": book_name, "email": email }))
        .send()
        .await
        .expect("Failed to send return request")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_signup_and_login() {
    let client = Client::new();
    let email = signup_user(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "hunter2" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());

    // The token works against the profile endpoint
    let token = body["token"].as_str().unwrap();
    let response = client
        .get(format!("{}/auth/me", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["email"], email);
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let email = signup_user(&client).await;

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_signup_duplicate_email() {
    let client = Client::new();
    let email = signup_user(&client).await;

    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "name": "Someone Else",
            "email": email,
            "password": "hunter2"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Email is already in use.");
}

#[tokio::test]
#[ignore]
async fn test_add_book_requires_image() {
    let client = Client::new();

    let form = Form::new().text("name", format!("Book {}", unique()));
    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Book name and image are required.");
}

#[tokio::test]
#[ignore]
async fn test_add_book_rejects_borrower_without_rented() {
    let client = Client::new();

    let form = Form::new()
        .text("name", format!("Book {}", unique()))
        .text("userId", "1")
        .part(
            "coverImage",
            Part::bytes(PNG_BYTES.to_vec())
                .file_name("cover.png")
                .mime_str("image/png")
                .expect("Invalid mime type"),
        );

    let response = client
        .post(format!("{}/books", BASE_URL))
        .multipart(form)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_borrow_happy_path() {
    let client = Client::new();
    let email = signup_user(&client).await;
    let (_, book_name) = add_book(&client).await;

    let response = borrow(&client, &book_name, &email).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book borrowed successfully.");
    assert_eq!(body["book"]["name"], book_name);
    assert_eq!(body["book"]["rented"], true);
    assert_eq!(body["user"]["email"], email);
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_book_is_404() {
    let client = Client::new();
    let email = signup_user(&client).await;

    let response = borrow(&client, &format!("No Such Book {}", unique()), &email).await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Book not found.");
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_user_is_404() {
    let client = Client::new();
    let (_, book_name) = add_book(&client).await;

    let response = borrow(&client, &book_name, "nobody@example.com").await;
    assert_eq!(response.status(), 404);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "User not found.");
}

#[tokio::test]
#[ignore]
async fn test_borrow_already_rented_book_fails() {
    let client = Client::new();
    let first = signup_user(&client).await;
    let second = signup_user(&client).await;
    let (_, book_name) = add_book(&client).await;

    let response = borrow(&client, &book_name, &first).await;
    assert_eq!(response.status(), 200);

    let response = borrow(&client, &book_name, &second).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "This book is already rented.");
}

#[tokio::test]
#[ignore]
async fn test_borrow_second_book_fails() {
    let client = Client::new();
    let email = signup_user(&client).await;
    let (_, first_book) = add_book(&client).await;
    let (_, second_book) = add_book(&client).await;

    let response = borrow(&client, &first_book, &email).await;
    assert_eq!(response.status(), 200);

    let response = borrow(&client, &second_book, &email).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "You can only borrow one book at a time.");
}

#[tokio::test]
#[ignore]
async fn test_return_by_non_borrower_fails() {
    let client = Client::new();
    let borrower = signup_user(&client).await;
    let other = signup_user(&client).await;
    let (_, book_name) = add_book(&client).await;

    let response = borrow(&client, &book_name, &borrower).await;
    assert_eq!(response.status(), 200);

    let response = return_by_name(&client, &book_name, &other).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "You cannot return a book you haven't borrowed.");

    // The borrow itself is untouched: the real borrower can still return.
    let response = return_by_name(&client, &book_name, &borrower).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_borrow_return_round_trip() {
    let client = Client::new();
    let email = signup_user(&client).await;
    let (_, book_name) = add_book(&client).await;

    let response = borrow(&client, &book_name, &email).await;
    assert_eq!(response.status(), 200);

    let response = return_by_name(&client, &book_name, &email).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Book returned successfully.");
    assert_eq!(body["book"]["rented"], false);

    // The pair is restored to its pre-borrow state: borrowing again works.
    let response = borrow(&client, &book_name, &email).await;
    assert_eq!(response.status(), 200);

    let response = return_by_name(&client, &book_name, &email).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
#[ignore]
async fn test_return_by_id() {
    let client = Client::new();
    let email = signup_user(&client).await;
    let (book_id, book_name) = add_book(&client).await;

    let response = borrow(&client, &book_name, &email).await;
    assert_eq!(response.status(), 200);

    // Resolve the user id through the profile endpoint
    let login: Value = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "hunter2" }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .header(
            "Authorization",
            format!("Bearer {}", login["token"].as_str().unwrap()),
        )
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let user_id = me["id"].as_i64().expect("No user ID");

    let response = client
        .post(format!("{}/books/{}/return", BASE_URL, book_id))
        .json(&json!({ "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["book"]["rented"], false);
    assert!(body["book"]["userId"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_concurrent_borrows_only_one_wins() {
    let client = Client::new();
    let first = signup_user(&client).await;
    let second = signup_user(&client).await;
    let (_, book_name) = add_book(&client).await;

    let (a, b) = tokio::join!(
        borrow(&client, &book_name, &first),
        borrow(&client, &book_name, &second)
    );

    let statuses = [a.status().as_u16(), b.status().as_u16()];
    let successes = statuses.iter().filter(|s| **s == 200).count();
    let conflicts = statuses.iter().filter(|s| **s == 400).count();

    assert_eq!(successes, 1, "exactly one borrow should succeed: {:?}", statuses);
    assert_eq!(conflicts, 1, "the other should conflict: {:?}", statuses);
}
