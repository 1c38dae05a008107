//! API integration tests
//!
//! These run against a live backend. Start one locally and run with:
//! `cargo test -- --ignored`

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:5555/api";

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

/// Helper to get a client holding an authenticated session cookie
async fn login(client: &Client) {
    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "username": "reader",
            "password": "reader"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    assert!(response.status().is_success(), "seed user 'reader' must exist");
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_session_check_anonymous() {
    let client = client();

    let response = client
        .get(format!("{}/user_session", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_login_and_session_check() {
    let client = client();
    login(&client).await;

    let response = client
        .get(format!("{}/user_session", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["username"], "reader");
    assert!(body["libraries"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = client();

    let response = client
        .post(format!("{}/login", BASE_URL))
        .json(&json!({
            "username": "reader",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_list_books() {
    let client = client();
    login(&client).await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_rename_and_delete_library() {
    let client = client();
    login(&client).await;

    // Create
    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&json!({ "name": "Integration Shelf", "private": false }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    let library_id = body["id"].as_i64().expect("No library ID");

    // Rename
    let response = client
        .patch(format!("{}/libraries/{}", BASE_URL, library_id))
        .json(&json!({ "name": "Integration Shelf Renamed" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["name"], "Integration Shelf Renamed");

    // Delete
    let response = client
        .delete(format!("{}/libraries/{}", BASE_URL, library_id))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_create_library_rejects_duplicate_name() {
    let client = client();
    login(&client).await;

    let payload = json!({ "name": "Duplicate Shelf", "private": false });

    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    let library_id = body["id"].as_i64().expect("No library ID");

    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    // Cleanup
    let _ = client
        .delete(format!("{}/libraries/{}", BASE_URL, library_id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_mutation() {
    let client = client();

    let response = client
        .post(format!("{}/libraries", BASE_URL))
        .json(&json!({ "name": "No Session Shelf", "private": false }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_logout_invalidates_session() {
    let client = client();
    login(&client).await;

    let response = client
        .delete(format!("{}/logout", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/user_session", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);
}
