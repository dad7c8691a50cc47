use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::{order, project};
use crate::handlers::common::{paginated, PaginationParams};
use crate::services::orders::OrderFilter;
use crate::services::projects::{CreateProjectRequest, UpdateProjectRequest};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_project).get(list_projects))
        .route(
            "/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/:id/orders", get(list_project_orders))
}

#[derive(Debug, Deserialize)]
pub struct ProjectListFilter {
    pub status: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created"),
        (status = 409, description = "Project code already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Json(request): Json<CreateProjectRequest>,
) -> ApiResult<project::Model> {
    let project = state.services.projects.create_project(request).await?;
    Ok(Json(ApiResponse::success(project)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(PaginationParams),
    responses((status = 200, description = "Paginated projects")),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_projects(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ProjectListFilter>,
) -> ApiResult<PaginatedResponse<project::Model>> {
    let (projects, total) = state
        .services
        .projects
        .list_projects(filter.status, pagination.page(), pagination.per_page())
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        projects,
        total,
        &pagination,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "The project"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<project::Model> {
    let project = state.services.projects.get_project(id).await?;
    Ok(Json(ApiResponse::success(project)))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/{id}/orders",
    params(("id" = Uuid, Path, description = "Project id"), PaginationParams),
    responses(
        (status = 200, description = "Paginated orders belonging to the project"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn list_project_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<order::Model>> {
    state.services.projects.get_project(id).await?;
    let (orders, total) = state
        .services
        .orders
        .list_orders(
            OrderFilter {
                status: None,
                project_id: Some(id),
                supplier_id: None,
            },
            pagination.page(),
            pagination.per_page(),
        )
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        orders,
        total,
        &pagination,
    ))))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_project(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProjectRequest>,
) -> ApiResult<project::Model> {
    let project = state.services.projects.update_project(id, request).await?;
    Ok(Json(ApiResponse::success(project)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}",
    params(("id" = Uuid, Path, description = "Project id")),
    responses(
        (status = 200, description = "Project deleted"),
        (status = 404, description = "Project not found")
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn delete_project(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.projects.delete_project(id).await?;
    Ok(Json(ApiResponse::success(())))
}
