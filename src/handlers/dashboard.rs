use axum::{extract::State, routing::get, Json, Router};

use crate::auth::CurrentUser;
use crate::services::dashboard::DashboardStats;
use crate::{ApiResponse, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    responses((status = 200, description = "Landing-page counters and recent activity", body = DashboardStats)),
    security(("bearer_auth" = [])),
    tag = "dashboard"
)]
pub async fn stats(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> ApiResult<DashboardStats> {
    let stats = state.services.dashboard.stats(&current_user).await?;
    Ok(Json(ApiResponse::success(stats)))
}
