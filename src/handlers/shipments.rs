use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::{customs_entry, shipment, shipment_status_history};
use crate::handlers::common::{paginated, PaginationParams};
use crate::models::UpdateSource;
use crate::services::customs::CreateCustomsEntryRequest;
use crate::services::shipments::{
    CreateShipmentRequest, UpdateShipmentRequest, UpdateShipmentStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_shipment).get(list_shipments))
        .route("/:id", get(get_shipment).put(update_shipment))
        .route("/:id/update-status", post(update_shipment_status))
        .route("/:id/history", get(get_shipment_history))
        .route("/track/:tracking_number", get(track_shipment))
        .route(
            "/:id/customs",
            get(list_shipment_customs).post(create_customs_entry),
        )
}

#[derive(Debug, Deserialize)]
pub struct ShipmentListFilter {
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ShipmentWithHistory {
    #[schema(value_type = Object)]
    pub shipment: shipment::Model,
    #[schema(value_type = Vec<Object>)]
    pub history: Vec<shipment_status_history::Model>,
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 200, description = "Shipment created with its label history row"),
        (status = 400, description = "Invalid payload or unknown order"),
        (status = 409, description = "Tracking number already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CreateShipmentRequest>,
) -> ApiResult<shipment::Model> {
    let shipment = state
        .services
        .shipments
        .create_shipment(request, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(shipment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments",
    params(PaginationParams),
    responses((status = 200, description = "Paginated shipments")),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ShipmentListFilter>,
) -> ApiResult<PaginatedResponse<shipment::Model>> {
    let (shipments, total) = state
        .services
        .shipments
        .list_shipments(filter.status, pagination.page(), pagination.per_page())
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        shipments,
        total,
        &pagination,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}",
    params(("id" = Uuid, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "The shipment"),
        (status = 404, description = "Shipment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<shipment::Model> {
    let shipment = state.services.shipments.get_shipment(id).await?;
    Ok(Json(ApiResponse::success(shipment)))
}

#[utoipa::path(
    put,
    path = "/api/v1/shipments/{id}",
    params(("id" = Uuid, Path, description = "Shipment id")),
    request_body = UpdateShipmentRequest,
    responses(
        (status = 200, description = "Shipment updated"),
        (status = 404, description = "Shipment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn update_shipment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateShipmentRequest>,
) -> ApiResult<shipment::Model> {
    let shipment = state.services.shipments.update_shipment(id, request).await?;
    Ok(Json(ApiResponse::success(shipment)))
}

/// Appends a history row and mirrors the new status onto the shipment
/// in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/update-status",
    params(("id" = Uuid, Path, description = "Shipment id")),
    request_body = UpdateShipmentStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Shipment not found"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn update_shipment_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateShipmentStatusRequest>,
) -> ApiResult<shipment::Model> {
    let shipment = state
        .services
        .shipments
        .update_status(id, request, UpdateSource::Manual, &current_user)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        shipment,
        "Status updated successfully".to_string(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}/history",
    params(("id" = Uuid, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Shipment and its history, oldest first", body = ShipmentWithHistory),
        (status = 404, description = "Shipment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn get_shipment_history(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ShipmentWithHistory> {
    let (shipment, history) = state.services.shipments.get_with_history(id).await?;
    Ok(Json(ApiResponse::success(ShipmentWithHistory {
        shipment,
        history,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/track/{tracking_number}",
    params(("tracking_number" = String, Path, description = "Carrier tracking number")),
    responses(
        (status = 200, description = "The shipment"),
        (status = 404, description = "No shipment with that tracking number")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn track_shipment(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(tracking_number): Path<String>,
) -> ApiResult<shipment::Model> {
    let shipment = state
        .services
        .shipments
        .find_by_tracking_number(&tracking_number)
        .await?;
    Ok(Json(ApiResponse::success(shipment)))
}

#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}/customs",
    params(("id" = Uuid, Path, description = "Shipment id")),
    responses(
        (status = 200, description = "Customs entries for the shipment"),
        (status = 404, description = "Shipment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn list_shipment_customs(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<customs_entry::Model>> {
    let entries = state.services.customs.list_for_shipment(id).await?;
    Ok(Json(ApiResponse::success(entries)))
}

#[utoipa::path(
    post,
    path = "/api/v1/shipments/{id}/customs",
    params(("id" = Uuid, Path, description = "Shipment id")),
    request_body = CreateCustomsEntryRequest,
    responses(
        (status = 200, description = "Customs entry created"),
        (status = 404, description = "Shipment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "shipments"
)]
pub async fn create_customs_entry(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateCustomsEntryRequest>,
) -> ApiResult<customs_entry::Model> {
    let entry = state.services.customs.create_entry(id, request).await?;
    Ok(Json(ApiResponse::success(entry)))
}
