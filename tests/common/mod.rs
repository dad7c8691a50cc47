#![allow(dead_code)]

//! Shared harness for the HTTP integration tests: a fully wired router
//! over a throwaway SQLite database, plus request helpers.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::Router;
use http::{header, Method, Request, StatusCode};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;

use fusionflow_api as api;

use api::auth::CurrentUser;
use api::entities::user;
use api::AppState;

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

const TEST_JWT_SECRET: &str =
    "k2J9x!mQ7pL4vR8tW3nB6yC1zF5hD0gS_k2J9x!mQ7pL4vR8tW3nB6yC1zF5hD0gS";

/// A booted application with a seeded admin account. Each instance
/// owns its own database file, so tests never observe each other.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub admin: user::Model,
    admin_token: String,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: tempfile::TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = db_dir.path().join("fusionflow-test.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let config = api::config::AppConfig::new(
            db_url.clone(),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );

        let db = api::db::establish_connection(&db_url)
            .await
            .expect("sqlite connection");
        api::db::run_migrations(&db).await.expect("migrations");
        let db = Arc::new(db);

        let (event_sender, event_task) = api::events::spawn_event_logger(64);
        let state = AppState::new(db, config, event_sender);

        let password_hash = state
            .services
            .auth
            .hash_password(ADMIN_PASSWORD)
            .expect("password hash");
        let admin = user::ActiveModel {
            username: Set(ADMIN_USERNAME.to_string()),
            email: Set("root@example.com".to_string()),
            password_hash: Set(password_hash),
            full_name: Set("Root Admin".to_string()),
            role: Set("admin".to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*state.db)
        .await
        .expect("seed admin");

        let admin_token = state
            .services
            .auth
            .issue_token(&admin)
            .expect("admin token")
            .access_token;

        let router = api::build_router(state.clone());
        Self {
            router,
            state,
            admin,
            admin_token,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    /// The admin identity the way handlers see it, for driving services
    /// directly when a test needs fixtures without HTTP round-trips.
    pub fn admin_actor(&self) -> CurrentUser {
        CurrentUser {
            user_id: self.admin.id,
            username: self.admin.username.clone(),
            full_name: self.admin.full_name.clone(),
            role: self.admin.role.clone(),
        }
    }

    /// Inserts an active account with the given role and returns it
    /// together with a valid bearer token for it.
    pub async fn seed_user(&self, username: &str, role: &str) -> (user::Model, String) {
        let password_hash = self
            .state
            .services
            .auth
            .hash_password("a-perfectly-fine-password")
            .expect("password hash");
        let model = user::ActiveModel {
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set(password_hash),
            full_name: Set(format!("Test {username}")),
            role: Set(role.to_string()),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&*self.state.db)
        .await
        .expect("seed user");
        let token = self
            .state
            .services
            .auth
            .issue_token(&model)
            .expect("token")
            .access_token;
        (model, token)
    }

    /// Sends one request through the router and returns the status and
    /// parsed JSON body (`Value::Null` for empty bodies).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }

    /// Authenticated request as the seeded admin.
    pub async fn request_as_admin(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let token = self.admin_token.clone();
        self.request(method, uri, body, Some(&token)).await
    }
}
