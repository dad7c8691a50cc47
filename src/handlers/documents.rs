use axum::{
    extract::{Path, Query, State},
    routing::{delete, post},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::document;
use crate::services::documents::{DocumentFilter, RegisterDocumentRequest};
use crate::{ApiResponse, ApiResult, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_document).get(list_documents))
        .route("/:id", delete(delete_document))
}

#[utoipa::path(
    post,
    path = "/api/v1/documents",
    request_body = RegisterDocumentRequest,
    responses(
        (status = 200, description = "Document metadata registered"),
        (status = 400, description = "No owner supplied"),
        (status = 404, description = "An owner id does not exist")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn register_document(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<RegisterDocumentRequest>,
) -> ApiResult<document::Model> {
    let document = state
        .services
        .documents
        .register(request, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(document)))
}

#[utoipa::path(
    get,
    path = "/api/v1/documents",
    responses((status = 200, description = "Documents, newest first, optionally filtered by owner")),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn list_documents(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<DocumentFilter>,
) -> ApiResult<Vec<document::Model>> {
    let documents = state.services.documents.list(filter).await?;
    Ok(Json(ApiResponse::success(documents)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document deleted"),
        (status = 404, description = "Document not found")
    ),
    security(("bearer_auth" = [])),
    tag = "documents"
)]
pub async fn delete_document(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.documents.delete(id).await?;
    Ok(Json(ApiResponse::success(())))
}
