//! HTTP tests for the admin provisioning routes.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::TestApp;
use stash::types::Permission;

#[tokio::test]
async fn test_provision_and_share_end_to_end() {
    let app = TestApp::new();
    let admin = Some(app.admin_token.as_str());

    let resp = app
        .post(
            "/api/v1/admin/users",
            admin,
            json!({"name": "Alice", "email": "Alice@Example.com"}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["data"]["email"], "alice@example.com");
    let alice_id = resp.body["data"]["id"].as_i64().unwrap();

    let resp = app
        .post(
            "/api/v1/admin/users",
            admin,
            json!({"name": "Bob", "email": "bob@example.com"}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);

    let resp = app
        .post(
            &format!("/api/v1/admin/users/{alice_id}/tokens"),
            admin,
            json!({"expires_in_seconds": 3600}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let alice_token = resp.body["data"]["token"].as_str().unwrap().to_string();
    assert!(alice_token.starts_with("stash_"));
    assert!(resp.body["data"]["metadata"]["expires_at"].is_string());

    let resp = app
        .post(
            "/api/v1/admin/files",
            admin,
            json!({"name": "budget.xlsx", "owner_id": alice_id, "size_bytes": 4096}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let file_id = resp.body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(resp.body["data"]["created_by"], alice_id);

    let resp = app
        .share(
            &alice_token,
            &file_id,
            json!({"email": "bob@example.com", "permission_id": Permission::VIEW}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);

    let resp = app.get("/api/v1/files", Some(&alice_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::new();
    app.create_user("Alice", "alice@example.com");

    let resp = app
        .post(
            "/api/v1/admin/users",
            Some(&app.admin_token),
            json!({"name": "Other", "email": "ALICE@example.com"}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.body["success"], false);
}

#[tokio::test]
async fn test_invalid_user_input_rejected() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/api/v1/admin/users",
            Some(&app.admin_token),
            json!({"name": "Alice", "email": "nope"}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_for_unknown_owner_is_404() {
    let app = TestApp::new();

    let resp = app
        .post(
            "/api/v1/admin/files",
            Some(&app.admin_token),
            json!({"name": "orphan.txt", "owner_id": 4242}),
        )
        .await;

    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_token_cannot_use_admin_routes() {
    let app = TestApp::new();
    let (_, token) = app.user_with_token("Alice", "alice@example.com");

    let resp = app.get("/api/v1/admin/users", Some(&token)).await;

    assert_eq!(resp.status, StatusCode::FORBIDDEN);
    assert_eq!(resp.body["message"], "Admin access required");
}

#[tokio::test]
async fn test_deactivated_user_token_rejected() {
    let app = TestApp::new();
    let (user, token) = app.user_with_token("Alice", "alice@example.com");

    let resp = app
        .request(
            Method::PATCH,
            &format!("/api/v1/admin/users/{}", user.id),
            Some(&app.admin_token),
            Some(json!({"active": false})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["active"], false);

    let resp = app.get("/api/v1/files", Some(&token)).await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_paginates() {
    let app = TestApp::new();
    for i in 0..3 {
        app.create_user(&format!("User {i}"), &format!("user{i}@example.com"));
    }

    let resp = app
        .get("/api/v1/admin/users", Some(&app.admin_token))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["data"]["items"].as_array().unwrap().len(), 3);
    assert_eq!(resp.body["data"]["has_more"], false);
}

#[tokio::test]
async fn test_cannot_delete_current_admin_token() {
    let app = TestApp::new();

    let resp = app.get("/api/v1/admin/tokens", Some(&app.admin_token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let admin_id = resp.body["data"][0]["id"].as_str().unwrap().to_string();

    let resp = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/tokens/{admin_id}"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_admin_bodies_use_envelope() {
    let app = TestApp::new();
    let admin = Some(app.admin_token.as_str());
    let user = app.create_user("Alice", "alice@example.com");

    let cases = [
        ("/api/v1/admin/users".to_string(), "{\"name\":"),
        ("/api/v1/admin/users".to_string(), "{\"name\": 7, \"email\": []}"),
        (format!("/api/v1/admin/users/{}/tokens", user.id), "not json"),
        ("/api/v1/admin/files".to_string(), "{\"name\": \"a.txt\"}"),
    ];

    for (uri, body) in cases {
        let resp = app.post_raw(&uri, admin, body).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri} {body}");
        assert_eq!(resp.body["success"], false);
        let message = resp.body["message"].as_str().unwrap();
        assert!(!message.contains("EOF"), "parser detail leaked: {message}");
    }

    let resp = app
        .request(
            Method::PATCH,
            &format!("/api/v1/admin/users/{}", user.id),
            admin,
            Some(json!({"active": "no"})),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
}
