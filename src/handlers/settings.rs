use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::auth::CurrentUser;
use crate::entities::system_setting;
use crate::services::settings::UpsertSettingRequest;
use crate::{ApiResponse, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_settings))
        .route("/:key", get(get_setting).put(upsert_setting))
}

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses((status = 200, description = "All settings, ordered by key")),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn list_settings(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> ApiResult<Vec<system_setting::Model>> {
    let settings = state.services.settings.list().await?;
    Ok(Json(ApiResponse::success(settings)))
}

#[utoipa::path(
    get,
    path = "/api/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "The setting"),
        (status = 404, description = "No setting with that key")
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn get_setting(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(key): Path<String>,
) -> ApiResult<system_setting::Model> {
    let setting = state.services.settings.get(&key).await?;
    Ok(Json(ApiResponse::success(setting)))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpsertSettingRequest,
    responses(
        (status = 200, description = "Setting created or overwritten"),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearer_auth" = [])),
    tag = "settings"
)]
pub async fn upsert_setting(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(key): Path<String>,
    Json(request): Json<UpsertSettingRequest>,
) -> ApiResult<system_setting::Model> {
    let setting = state
        .services
        .settings
        .upsert(&key, request, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(setting)))
}
