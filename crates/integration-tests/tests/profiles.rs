//! Username availability and profile claim through the JSON API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use threewords_integration_tests::TestApp;

#[tokio::test]
async fn test_availability_on_empty_store() {
    let app = TestApp::new();

    let response = app.get("/api/check-username/newuser").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "available": true, "message": "Username is available!" })
    );
}

#[tokio::test]
async fn test_availability_reports_invalid_candidates() {
    let app = TestApp::new();

    let short = app.get("/api/check-username/ab").await.json();
    assert_eq!(short["available"], false);
    assert_eq!(short["message"], "Username must be at least 3 characters");

    let charset = app.get("/api/check-username/bad.name").await.json();
    assert_eq!(charset["available"], false);
    assert_eq!(
        charset["message"],
        "Only letters, numbers, underscores and dashes are allowed"
    );
}

#[tokio::test]
async fn test_claim_is_case_insensitive() {
    let app = TestApp::new();

    let profile = app.claim("abc").await;
    assert_eq!(profile["username"], "abc");

    let check = app.get("/api/check-username/ABC").await.json();
    assert_eq!(check["available"], false);
    assert_eq!(check["message"], "Username is already taken");

    let second = app
        .post_json("/api/profiles", &json!({ "username": "ABC" }))
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert_eq!(second.body, "Username is already taken");
}

#[tokio::test]
async fn test_claim_keeps_typed_display_name() {
    let app = TestApp::new();

    let profile = app.claim("Alice").await;
    assert_eq!(profile["username"], "alice");
    assert_eq!(profile["displayName"], "Alice");
    assert_eq!(
        profile["avatarUrl"],
        "https://api.dicebear.com/7.x/avataaars/svg?seed=Alice"
    );
    assert!(profile["createdAt"].is_string());

    let fetched = app.get("/api/users/ALICE").await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json()["id"], profile["id"]);
}

#[tokio::test]
async fn test_concurrent_claims_have_one_winner() {
    let app = TestApp::new();
    let body = json!({ "username": "racer" });

    let (first, second) = tokio::join!(
        app.post_json("/api/profiles", &body),
        app.post_json("/api/profiles", &body),
    );

    let mut statuses = [first.status, second.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::BAD_REQUEST]);
    assert_eq!(app.store.profile_count(), 1);
}

#[tokio::test]
async fn test_claim_rejects_invalid_username() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/profiles", &json!({ "username": "a".repeat(31) }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "Username must be less than 30 characters");
}

#[tokio::test]
async fn test_null_username_is_bad_request() {
    let app = TestApp::new();

    let response = app
        .post_json("/api/profiles", &json!({ "username": null }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, "Invalid request body");
    assert_eq!(app.store.profile_count(), 0);
}

#[tokio::test]
async fn test_unknown_profile_is_not_found() {
    let app = TestApp::new();

    let response = app.get("/api/users/ghost").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, "Profile not found");
}
