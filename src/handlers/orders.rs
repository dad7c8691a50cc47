use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::{cost_breakdown, order, shipment};
use crate::handlers::common::{paginated, PaginationParams};
use crate::services::costs::AddCostLineRequest;
use crate::services::orders::{
    CreateOrderRequest, OrderFilter, UpdateOrderRequest, UpdateOrderStatusRequest,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route(
            "/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/:id/status", post(update_order_status))
        .route("/:id/shipments", get(list_order_shipments))
        .route("/:id/costs", get(list_order_costs).post(add_order_cost))
}

#[derive(Serialize, ToSchema)]
pub struct CostBreakdownSummary {
    #[schema(value_type = Vec<Object>)]
    pub lines: Vec<cost_breakdown::Model>,
    pub total: Decimal,
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created"),
        (status = 400, description = "Invalid order payload")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<order::Model> {
    let order = state
        .services
        .orders
        .create_order(request, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(PaginationParams),
    responses((status = 200, description = "Paginated orders")),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    let (orders, total) = state
        .services
        .orders
        .list_orders(filter, pagination.page(), pagination.per_page())
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        orders,
        total,
        &pagination,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<order::Model> {
    let order = state.services.orders.get_order(id).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> ApiResult<order::Model> {
    let order = state.services.orders.update_order(id, request).await?;
    Ok(Json(ApiResponse::success(order)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.orders.delete_order(id).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Status changes run through the transition rules; a rejected
/// transition comes back as 409.
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/status",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> ApiResult<order::Model> {
    let order = state
        .services
        .orders
        .update_status(id, &request.status, &current_user)
        .await?;
    Ok(Json(ApiResponse::success_with_message(
        order,
        "Status updated successfully".to_string(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/shipments",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Shipments for the order"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_order_shipments(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<shipment::Model>> {
    let shipments = state.services.orders.shipments_for_order(id).await?;
    Ok(Json(ApiResponse::success(shipments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}/costs",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Cost lines and their total", body = CostBreakdownSummary),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn list_order_costs(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<CostBreakdownSummary> {
    let (lines, total) = state.services.costs.list_for_order(id).await?;
    Ok(Json(ApiResponse::success(CostBreakdownSummary {
        lines,
        total,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/costs",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = AddCostLineRequest,
    responses(
        (status = 200, description = "Cost line added"),
        (status = 400, description = "Invalid cost line"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = [])),
    tag = "orders"
)]
pub async fn add_order_cost(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AddCostLineRequest>,
) -> ApiResult<cost_breakdown::Model> {
    let line = state.services.costs.add_line(id, request).await?;
    Ok(Json(ApiResponse::success(line)))
}
