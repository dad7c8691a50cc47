use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::entities::{audit_log, notification, user};
use crate::errors::ServiceError;
use crate::handlers::common::{paginated, PaginationParams};
use crate::services::assignments::{AssignmentOutcome, AssignmentTargets, UserAssignments};
use crate::services::users::{ChangePasswordRequest, CreateUserRequest, UpdateUserRequest};
use crate::{ApiResponse, ApiResult, AppState, PaginatedResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route(
            "/notifications/unread",
            get(list_unread_notifications).post(mark_notifications_read),
        )
        .route("/notifications", get(list_notifications))
        .route("/assignments", get(my_assignments))
        .route("/logs", get(list_audit_logs))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/change-password", post(change_password))
        .route("/:id/assign", post(assign_user))
}

/// Wire shape kept from the original UI contract: flat list under
/// `unread`, dates rendered `dd/mm/yyyy HH:MM`.
#[derive(Serialize, ToSchema)]
pub struct UnreadNotification {
    pub id: Uuid,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub created_at: String,
}

#[derive(Serialize, ToSchema)]
pub struct UnreadNotificationsResponse {
    pub unread: Vec<UnreadNotification>,
}

impl From<notification::Model> for UnreadNotification {
    fn from(model: notification::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            message: model.message,
            action_url: model.action_url,
            created_at: model.created_at.format("%d/%m/%Y %H:%M").to_string(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 409, description = "Username or email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<user::Model> {
    let user = state
        .services
        .users
        .create_user(request, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PaginationParams),
    responses((status = 200, description = "Paginated users")),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<user::Model>> {
    let (users, total) = state
        .services
        .users
        .list_users(pagination.page(), pagination.per_page())
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        users,
        total,
        &pagination,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "The user"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<user::Model> {
    let user = state.services.users.get_user(id).await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated"),
        (status = 403, description = "Not permitted for this account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<user::Model> {
    let user = state
        .services
        .users
        .update_user(id, request, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/change-password",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Current password does not match"),
        (status = 403, description = "Not permitted for this account")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    state
        .services
        .users
        .change_password(id, request, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(())))
}

/// Removal is blocked for administrator accounts; deactivate those via
/// `PUT /users/{id}` instead.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Administrator accounts cannot be deleted"),
        (status = 403, description = "Caller is not an administrator"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.services.users.delete_user(id, &current_user).await?;
    Ok(Json(ApiResponse::success(())))
}

/// Assigns the user to any combination of project, order and shipment,
/// notifying them once per target. All-or-nothing: one bad id fails the
/// whole call.
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/assign",
    params(("id" = Uuid, Path, description = "User id to assign")),
    request_body = AssignmentTargets,
    responses(
        (status = 200, description = "Assignment summary", body = AssignmentOutcome),
        (status = 404, description = "User or a target not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn assign_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(targets): Json<AssignmentTargets>,
) -> ApiResult<AssignmentOutcome> {
    let outcome = state
        .services
        .assignments
        .assign_user(id, targets, &current_user)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/assignments",
    responses((status = 200, description = "Projects, orders and shipments assigned to the caller", body = UserAssignments)),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn my_assignments(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> ApiResult<UserAssignments> {
    let assignments = state
        .services
        .assignments
        .assignments_for(current_user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(assignments)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/notifications/unread",
    responses((status = 200, description = "Unread notifications, newest first", body = UnreadNotificationsResponse)),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_unread_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<UnreadNotificationsResponse>, ServiceError> {
    let unread = state
        .services
        .notifications
        .list_unread(current_user.user_id)
        .await?;
    Ok(Json(UnreadNotificationsResponse {
        unread: unread.into_iter().map(UnreadNotification::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/notifications/unread",
    responses((status = 204, description = "All notifications marked read")),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn mark_notifications_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<StatusCode, ServiceError> {
    state
        .services
        .notifications
        .mark_all_read(current_user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/users/notifications",
    params(PaginationParams),
    responses((status = 200, description = "All notifications for the caller, paginated")),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<notification::Model>> {
    let (notifications, total) = state
        .services
        .notifications
        .list_for_user(
            current_user.user_id,
            pagination.page(),
            pagination.per_page(),
        )
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        notifications,
        total,
        &pagination,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/logs",
    params(PaginationParams),
    responses(
        (status = 200, description = "Audit log, newest first"),
        (status = 403, description = "Caller is not an administrator")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<audit_log::Model>> {
    current_user.require_admin()?;
    let (entries, total) = state
        .services
        .audit
        .list(pagination.page(), pagination.per_page())
        .await?;
    Ok(Json(ApiResponse::success(paginated(
        entries,
        total,
        &pagination,
    ))))
}
