//! API integration tests
//!
//! Need a running server with the bootstrap superuser admin/admin.

use chrono::{Duration, Local, NaiveDate};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

fn unique_isbn() -> String {
    format!("{:013}", Uuid::new_v4().as_u128() % 10_000_000_000_000)
}

async fn login(client: &Client, username: &str, password: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to get an admin token
async fn admin_token(client: &Client) -> String {
    login(client, "admin", "admin").await
}

/// Create a user with the given permissions; returns its id and token
async fn create_user(client: &Client, admin: &str, permissions: &[&str]) -> (i64, String) {
    let username = unique("user");
    let password = "1X<ISRUkw+tuK";

    let response = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({
            "username": username,
            "password": password,
            "permissions": permissions
        }))
        .send()
        .await
        .expect("Failed to create user");
    assert_eq!(response.status(), StatusCode::CREATED);

    let user: Value = response.json().await.expect("Failed to parse user");
    let id = user["id"].as_i64().expect("No user id");
    (id, login(client, &username, password).await)
}

/// Create a user with the given permissions and return its token
async fn user_token(client: &Client, admin: &str, permissions: &[&str]) -> String {
    create_user(client, admin, permissions).await.1
}

async fn current_user_id(client: &Client, token: &str) -> i64 {
    let me: Value = client
        .get(format!("{}/auth/me", BASE_URL))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to get current user")
        .json()
        .await
        .expect("Failed to parse current user");
    me["id"].as_i64().expect("No user id")
}

/// Create a book with one author, genre and language; returns the book id
async fn create_book(client: &Client, admin: &str) -> i64 {
    let author: Value = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({"first_name": "John", "last_name": unique("Smith")}))
        .send()
        .await
        .expect("Failed to create author")
        .json()
        .await
        .expect("Failed to parse author");

    let genre: Value = client
        .post(format!("{}/genres", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({"name": unique("Fantasy")}))
        .send()
        .await
        .expect("Failed to create genre")
        .json()
        .await
        .expect("Failed to parse genre");

    let language: Value = client
        .post(format!("{}/languages", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({"name": unique("English")}))
        .send()
        .await
        .expect("Failed to create language")
        .json()
        .await
        .expect("Failed to parse language");

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(admin)
        .json(&json!({
            "title": "Book Title",
            "summary": "My book summary",
            "isbn": unique_isbn(),
            "author_id": author["id"],
            "genre_ids": [genre["id"]],
            "language_id": language["id"]
        }))
        .send()
        .await
        .expect("Failed to create book");
    assert_eq!(response.status(), StatusCode::CREATED);

    let book: Value = response.json().await.expect("Failed to parse book");
    book["id"].as_i64().expect("No book id")
}

/// Create a copy lent to `borrower_id`, due in `due_in_days`; returns the instance id
async fn lend_copy(
    client: &Client,
    admin: &str,
    book_id: i64,
    borrower_id: i64,
    due_in_days: i64,
) -> String {
    let response = client
        .post(format!("{}/books/{}/instances", BASE_URL, book_id))
        .bearer_auth(admin)
        .json(&json!({
            "imprint": "Unlikely Imprint, 2016",
            "status": "on_loan",
            "due_back": today() + Duration::days(due_in_days),
            "borrower_id": borrower_id
        }))
        .send()
        .await
        .expect("Failed to create instance");
    assert_eq!(response.status(), StatusCode::CREATED);

    let instance: Value = response.json().await.expect("Failed to parse instance");
    instance["id"].as_str().expect("No instance id").to_string()
}

/// Create a copy lent to the admin, due in five days; returns the instance id
async fn create_loaned_instance(client: &Client, admin: &str, book_id: i64) -> String {
    let admin_id = current_user_id(client, admin).await;
    lend_copy(client, admin, book_id, admin_id, 5).await
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
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_summary_counts_visits() {
    let client = Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client");

    let first: Value = client
        .get(format!("{}/catalog/summary", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(first["num_visits"], 0);

    let second: Value = client
        .get(format!("{}/catalog/summary?title_contains=war", BASE_URL))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(second["num_visits"], 1);
    assert!(second["num_books_matching"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_renewal_requires_login() {
    let client = Client::new();

    let response = client
        .get(format!("{}/instances/{}/renew", BASE_URL, Uuid::new_v4()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_renewal_forbidden_without_permission() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let instance_id = create_loaned_instance(&client, &admin, book_id).await;
    let token = user_token(&client, &admin, &[]).await;

    let response = client
        .get(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_renewal_form_proposes_three_weeks() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let instance_id = create_loaned_instance(&client, &admin, book_id).await;
    let token = user_token(&client, &admin, &["can_mark_returned"]).await;

    let response = client
        .get(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let expected = (today() + Duration::weeks(3)).to_string();
    assert_eq!(body["form"]["renewal_date"], expected.as_str());
    assert_eq!(body["book_instance"]["id"], instance_id.as_str());
}

#[tokio::test]
#[ignore]
async fn test_renewal_unknown_instance() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let token = user_token(&client, &admin, &["can_mark_returned"]).await;

    let response = client
        .get(format!("{}/instances/{}/renew", BASE_URL, Uuid::new_v4()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_renew_sets_due_back() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let instance_id = create_loaned_instance(&client, &admin, book_id).await;
    let token = user_token(&client, &admin, &["can_mark_returned"]).await;
    let renewal = today() + Duration::weeks(2);

    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .bearer_auth(&token)
        .json(&json!({"renewal_date": renewal}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["due_back"], renewal.to_string().as_str());
}

#[tokio::test]
#[ignore]
async fn test_renew_rejects_past_and_far_dates() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let instance_id = create_loaned_instance(&client, &admin, book_id).await;
    let token = user_token(&client, &admin, &["can_mark_returned"]).await;

    let cases = [
        (today() - Duration::weeks(1), "Invalid date \u{2014} renewal in past"),
        (
            today() + Duration::weeks(5),
            "Invalid date \u{2014} renewal more than 4 weeks ahead",
        ),
    ];

    for (date, message) in cases {
        let response = client
            .post(format!("{}/instances/{}/renew", BASE_URL, instance_id))
            .bearer_auth(&token)
            .json(&json!({"renewal_date": date}))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["fields"]["renewal_date"][0], message);
    }
}

#[tokio::test]
#[ignore]
async fn test_all_borrowed_lists_loans() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let instance_id = create_loaned_instance(&client, &admin, book_id).await;

    let response = client
        .get(format!("{}/borrowed?per_page=100", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let items = body["items"].as_array().expect("No items");
    assert!(items.iter().all(|i| i["status"] == "on_loan"));
    assert!(body["total"].as_i64().unwrap_or(0) >= 1);

    // Return it and it leaves the list
    let response = client
        .post(format!("{}/instances/{}/return", BASE_URL, instance_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "available");
    assert!(body["borrower_id"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_author_create_permissions() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .get(format!("{}/authors/new", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let reader = user_token(&client, &admin, &[]).await;
    let response = client
        .get(format!("{}/authors/new", BASE_URL))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let editor = user_token(&client, &admin, &["add_author"]).await;
    let response = client
        .get(format!("{}/authors/new", BASE_URL))
        .bearer_auth(&editor)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["date_of_death"], "2023-11-11");
}

#[tokio::test]
#[ignore]
async fn test_author_create_redirects_to_detail() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let editor = user_token(&client, &admin, &["add_author"]).await;

    let response = client
        .post(format!("{}/authors", BASE_URL))
        .bearer_auth(&editor)
        .json(&json!({
            "first_name": "Jane",
            "last_name": unique("Doe"),
            "date_of_birth": "1950-01-01"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let location = response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .expect("No Location header");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(location, format!("/api/v1/authors/{}", body["id"]));
}

#[tokio::test]
#[ignore]
async fn test_create_book_rejects_duplicate_isbn() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let isbn = unique_isbn();

    let payload = json!({
        "title": "Duplicate",
        "summary": "Twice",
        "isbn": isbn
    });

    let first = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&admin)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&admin)
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore]
async fn test_renew_rejects_malformed_date() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let instance_id = create_loaned_instance(&client, &admin, book_id).await;
    let librarian = user_token(&client, &admin, &["can_mark_returned"]).await;
    let reader = user_token(&client, &admin, &[]).await;

    let bad_body = json!({"renewal_date": "not-a-date"});

    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .bearer_auth(&reader)
        .json(&bad_body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, Uuid::new_v4()))
        .bearer_auth(&librarian)
        .json(&bad_body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .post(format!("{}/instances/{}/renew", BASE_URL, instance_id))
        .bearer_auth(&librarian)
        .json(&bad_body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["fields"]["renewal_date"][0], "Enter a valid date.");
}

#[tokio::test]
#[ignore]
async fn test_my_borrowed_lists_only_own_loans_by_due_date() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let (first_id, first_token) = create_user(&client, &admin, &[]).await;
    let (second_id, _) = create_user(&client, &admin, &[]).await;

    let later = lend_copy(&client, &admin, book_id, first_id, 10).await;
    let sooner = lend_copy(&client, &admin, book_id, first_id, 3).await;
    lend_copy(&client, &admin, book_id, second_id, 1).await;

    let response = client
        .get(format!("{}/borrowed/mine", BASE_URL))
        .bearer_auth(&first_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["total"], 2);
    let ids: Vec<&str> = body["items"]
        .as_array()
        .expect("No items")
        .iter()
        .map(|i| i["id"].as_str().expect("No instance id"))
        .collect();
    assert_eq!(ids, vec![sooner.as_str(), later.as_str()]);
    assert!(body["items"]
        .as_array()
        .expect("No items")
        .iter()
        .all(|i| i["borrower_id"] == first_id));
}

#[tokio::test]
#[ignore]
async fn test_all_borrowed_requires_librarian() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let reader = user_token(&client, &admin, &[]).await;

    let response = client
        .get(format!("{}/borrowed", BASE_URL))
        .bearer_auth(&reader)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_delete_book_with_copies_is_protected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    create_loaned_instance(&client, &admin, book_id).await;

    let response = client
        .delete(format!("{}/books/{}", BASE_URL, book_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .get(format!("{}/books/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_book_rejects_unknown_references() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let missing = i32::MAX;

    let references = [
        json!({"author_id": missing}),
        json!({"genre_ids": [missing]}),
        json!({"language_id": missing}),
    ];

    for reference in references {
        let mut payload = json!({
            "title": "Dangling",
            "summary": "Points nowhere",
            "isbn": unique_isbn()
        });
        if let (Some(target), Some(extra)) = (payload.as_object_mut(), reference.as_object()) {
            target.extend(extra.clone());
        }

        let response = client
            .post(format!("{}/books", BASE_URL))
            .bearer_auth(&admin)
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "create {}", reference);

        let response = client
            .put(format!("{}/books/{}", BASE_URL, book_id))
            .bearer_auth(&admin)
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "update {}", reference);
    }
}

#[tokio::test]
#[ignore]
async fn test_delete_user_with_loan_is_protected() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let book_id = create_book(&client, &admin).await;
    let (user_id, _) = create_user(&client, &admin, &[]).await;
    let instance_id = lend_copy(&client, &admin, book_id, user_id, 7).await;

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = client
        .get(format!("{}/instances/{}", BASE_URL, instance_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["borrower_id"], user_id);

    let response = client
        .post(format!("{}/instances/{}/return", BASE_URL, instance_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .delete(format!("{}/users/{}", BASE_URL, user_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
#[ignore]
async fn test_update_unknown_instance_is_not_found() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let response = client
        .put(format!("{}/instances/{}", BASE_URL, Uuid::new_v4()))
        .bearer_auth(&admin)
        .json(&json!({"borrower_id": i32::MAX}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
