use axum::{
    extract::{Path, State},
    routing::put,
    Json, Router,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::customs_entry;
use crate::services::customs::UpdateCustomsEntryRequest;
use crate::{ApiResponse, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/:id", put(update_customs_entry))
}

/// Reaching `Cleared` stamps `cleared_date` once; later updates leave
/// the original stamp.
#[utoipa::path(
    put,
    path = "/api/v1/customs/{id}",
    params(("id" = Uuid, Path, description = "Customs entry id")),
    request_body = UpdateCustomsEntryRequest,
    responses(
        (status = 200, description = "Customs entry updated"),
        (status = 400, description = "Unknown customs status"),
        (status = 404, description = "Customs entry not found")
    ),
    security(("bearer_auth" = [])),
    tag = "customs"
)]
pub async fn update_customs_entry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomsEntryRequest>,
) -> ApiResult<customs_entry::Model> {
    let entry = state.services.customs.update_entry(id, request).await?;
    Ok(Json(ApiResponse::success(entry)))
}
