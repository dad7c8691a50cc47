//! Login, token enforcement, role checks and the audit trail behind
//! failed logins.

mod common;

use common::{TestApp, ADMIN_PASSWORD, ADMIN_USERNAME};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn login_returns_a_bearer_token_and_hides_the_password_hash() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD})),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["token_type"], json!("Bearer"));
    assert!(data["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(data["user"]["username"], json!(ADMIN_USERNAME));
    assert!(data["user"].get("password_hash").is_none());

    // The fresh token works against a protected route.
    let token = data["access_token"].as_str().unwrap();
    let (status, body) = app
        .request(Method::GET, "/api/v1/auth/me", None, Some(token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], json!(ADMIN_USERNAME));
}

#[tokio::test]
async fn failed_login_is_vague_to_the_caller_but_audited() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"username": ADMIN_USERNAME, "password": "not-it"})),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Unauthorized"));
    // The error must not leak whether the username exists.
    assert!(!body["message"].as_str().unwrap().contains(ADMIN_USERNAME));

    let (status, body) = app
        .request_as_admin(Method::GET, "/api/v1/users/logs", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let failures: Vec<_> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["action"] == json!("LOGIN_FAILED"))
        .cloned()
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0]["level"], json!("warning"));
    assert_eq!(failures[0]["username"], json!(ADMIN_USERNAME));
}

#[tokio::test]
async fn successful_login_leaves_no_failure_entry() {
    let app = TestApp::new().await;

    app.request(
        Method::POST,
        "/api/v1/auth/login",
        Some(json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD})),
        None,
    )
    .await;

    let (_, body) = app
        .request_as_admin(Method::GET, "/api/v1/users/logs", None)
        .await;
    let failures = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["action"] == json!("LOGIN_FAILED"))
        .count();
    assert_eq!(failures, 0);
}

#[tokio::test]
async fn protected_routes_reject_missing_and_malformed_tokens() {
    let app = TestApp::new().await;

    let (status, _) = app.request(Method::GET, "/api/v1/orders", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/v1/orders", None, Some("not.a.jwt"))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_only_surfaces_reject_regular_users() {
    let app = TestApp::new().await;
    let (_, token) = app.seed_user("clerk", "user").await;

    let (status, _) = app
        .request(Method::GET, "/api/v1/users/logs", None, Some(&token))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(json!({
                "username": "intruder",
                "email": "intruder@example.com",
                "password": "longenough",
                "full_name": "In Truder"
            })),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/v1/settings/default_currency",
            Some(json!({"value": "USD"})),
            Some(&token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_probe_needs_no_token() {
    let app = TestApp::new().await;

    let (status, body) = app.request(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], json!("healthy"));
}

#[tokio::test]
async fn deactivated_accounts_cannot_log_in() {
    let app = TestApp::new().await;
    let (user, _) = app.seed_user("leaver", "user").await;
    app.request_as_admin(
        Method::PUT,
        &format!("/api/v1/users/{}", user.id),
        Some(json!({"is_active": false})),
    )
    .await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            Some(json!({"username": "leaver", "password": "a-perfectly-fine-password"})),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admins_can_delete_users_but_not_other_admins() {
    let app = TestApp::new().await;
    let (temp, _) = app.seed_user("temp-hire", "user").await;
    let (boss, _) = app.seed_user("second-admin", "admin").await;

    let (status, _) = app
        .request_as_admin(Method::DELETE, &format!("/api/v1/users/{}", temp.id), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request_as_admin(Method::GET, &format!("/api/v1/users/{}", temp.id), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request_as_admin(Method::DELETE, &format!("/api/v1/users/{}", boss.id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("cannot be deleted"));
}

#[tokio::test]
async fn user_deletion_is_admin_only() {
    let app = TestApp::new().await;
    let (temp, _) = app.seed_user("temp-hire", "user").await;
    let (_, regular_token) = app.seed_user("regular", "user").await;

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/v1/users/{}", temp.id),
            None,
            Some(&regular_token),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
