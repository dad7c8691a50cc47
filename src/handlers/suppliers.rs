use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::{supplier, supplier_performance};
use crate::handlers::common::{paginated, PaginationParams};
use crate::services::suppliers::{
    CreateSupplierRequest, RecordPerformanceRequest, UpdateSupplierRequest,
};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_supplier).get(list_suppliers))
        .route(
            "/:id",
            get(get_supplier)
                .put(update_supplier)
                .delete(delete_supplier),
        )
        .route(
            "/:id/performance",
            get(list_performance).post(record_performance),
        )
}

#[derive(Debug, Deserialize)]
pub struct SupplierListFilter {
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/suppliers",
    request_body = CreateSupplierRequest,
    responses(
        (status = 200, description = "Supplier created"),
        (status = 409, description = "Supplier code already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<CreateSupplierRequest>,
) -> ApiResult<supplier::Model> {
    let supplier = state.services.suppliers.create_supplier(request).await?;
    Ok(Json(ApiResponse::success(supplier)))
}

#[utoipa::path(
    get,
    path = "/api/v1/suppliers",
    params(PaginationParams),
    responses((status = 200, description = "Paginated suppliers")),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<SupplierListFilter>,
) -> ApiResult<PaginatedResponse<supplier::Model>> {
    let (suppliers, total) = state
        .services
        .suppliers
        .list_suppliers(filter.status, pagination.page(), pagination.per_page())
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        suppliers,
        total,
        &pagination,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "The supplier"),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<supplier::Model> {
    let supplier = state.services.suppliers.get_supplier(id).await?;
    Ok(Json(ApiResponse::success(supplier)))
}

#[utoipa::path(
    put,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = UpdateSupplierRequest,
    responses(
        (status = 200, description = "Supplier updated"),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSupplierRequest>,
) -> ApiResult<supplier::Model> {
    let supplier = state
        .services
        .suppliers
        .update_supplier(id, request)
        .await?;
    Ok(Json(ApiResponse::success(supplier)))
}

/// Deletion is blocked while orders still reference the supplier.
#[utoipa::path(
    delete,
    path = "/api/v1/suppliers/{id}",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier deleted"),
        (status = 404, description = "Supplier not found"),
        (status = 409, description = "Orders still reference this supplier")
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.suppliers.delete_supplier(id).await?;
    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/api/v1/suppliers/{id}/performance",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Performance rows, newest period first"),
        (status = 404, description = "Supplier not found")
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn list_performance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<supplier_performance::Model>> {
    let rows = state.services.suppliers.list_performance(id).await?;
    Ok(Json(ApiResponse::success(rows)))
}

/// Recording a period re-derives the supplier's overall rating from
/// every stored score.
#[utoipa::path(
    post,
    path = "/api/v1/suppliers/{id}/performance",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = RecordPerformanceRequest,
    responses(
        (status = 200, description = "Performance recorded"),
        (status = 404, description = "Supplier not found"),
        (status = 409, description = "Period already recorded")
    ),
    security(("bearer_auth" = [])),
    tag = "suppliers"
)]
pub async fn record_performance(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordPerformanceRequest>,
) -> ApiResult<supplier_performance::Model> {
    let row = state
        .services
        .suppliers
        .record_performance(id, request)
        .await?;
    Ok(Json(ApiResponse::success(row)))
}
