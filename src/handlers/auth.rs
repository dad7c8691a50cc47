use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{AccessToken, CurrentUser};
use crate::entities::user;
use crate::handlers::common::client_info;
use crate::services::audit::AuditEntry;
use crate::services::users::LoginRequest;
use crate::{ApiResponse, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: AccessToken,
    #[schema(value_type = Object)]
    pub user: user::Model,
}

/// Exchange credentials for a bearer token. Failures are audited and
/// deliberately vague.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let client = client_info(&headers);
    let (user, token) = state.services.users.login(request, client).await?;
    Ok(Json(ApiResponse::success(LoginResponse { token, user })))
}

/// Tokens are stateless, so logout only leaves an audit trail entry;
/// the token stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses((status = 200, description = "Logout recorded")),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    current_user: CurrentUser,
    headers: HeaderMap,
) -> ApiResult<()> {
    let client = client_info(&headers);
    state
        .services
        .audit
        .record(AuditEntry {
            user_id: Some(current_user.user_id),
            username: Some(current_user.username.clone()),
            user_role: Some(current_user.role.clone()),
            action: "LOGOUT".to_string(),
            description: Some(format!("{} logged out", current_user.username)),
            ip_address: client.ip_address,
            user_agent: client.user_agent,
            ..Default::default()
        })
        .await;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses((status = 200, description = "The authenticated account")),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me(State(state): State<AppState>, current_user: CurrentUser) -> ApiResult<user::Model> {
    let user = state.services.users.get_user(current_user.user_id).await?;
    Ok(Json(ApiResponse::success(user)))
}
