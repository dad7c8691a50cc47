use crate::{
    auth::{AccessToken, AuthService, CurrentUser},
    db::DbPool,
    entities::user::{self, ActiveModel as UserActiveModel, Entity as UserEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::audit::{AuditEntry, AuditLevel, AuditService},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

const VALID_ROLES: [&str; 3] = ["admin", "manager", "user"];

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,
    #[validate(email(message = "Email must be valid"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    /// `admin`, `manager` or `user`. Defaults to `user`.
    pub role: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Full name must not be empty"))]
    pub full_name: Option<String>,
    /// Admin only.
    pub role: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    /// Admin only.
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct ChangePasswordRequest {
    /// Required when changing your own password; ignored for admins
    /// acting on another account.
    pub current_password: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request metadata recorded with security-relevant audit rows.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Account management and credential verification. Failed logins land
/// in the audit trail; the audit write can never turn a login rejection
/// into a different error.
#[derive(Clone)]
pub struct UserService {
    db_pool: Arc<DbPool>,
    auth: Arc<AuthService>,
    audit: AuditService,
    event_sender: EventSender,
}

impl UserService {
    pub fn new(
        db_pool: Arc<DbPool>,
        auth: Arc<AuthService>,
        audit: AuditService,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db_pool,
            auth,
            audit,
            event_sender,
        }
    }

    fn check_role(role: &str) -> Result<(), ServiceError> {
        if VALID_ROLES.contains(&role) {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(format!(
                "role must be one of: {}",
                VALID_ROLES.join(", ")
            )))
        }
    }

    /// Creates an account. Admin only.
    #[instrument(skip(self, request, actor), fields(actor = %actor.username))]
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        actor: &CurrentUser,
    ) -> Result<user::Model, ServiceError> {
        actor.require_admin()?;
        request.validate()?;
        let role = request.role.unwrap_or_else(|| "user".to_string());
        Self::check_role(&role)?;

        let db = &*self.db_pool;
        let taken = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(request.username.clone()))
                    .add(user::Column::Email.eq(request.email.clone())),
            )
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if taken > 0 {
            return Err(ServiceError::Conflict(
                "username or email is already in use".into(),
            ));
        }

        let password_hash = self.auth.hash_password(&request.password)?;
        let model = UserActiveModel {
            username: Set(request.username),
            email: Set(request.email),
            password_hash: Set(password_hash),
            full_name: Set(request.full_name),
            role: Set(role),
            department: Set(request.department),
            phone: Set(request.phone),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to insert user");
            ServiceError::DatabaseError(e)
        })?;

        info!(user_id = %model.id, username = %model.username, "user created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        let db = &*self.db_pool;
        UserEntity::find_by_id(user_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<user::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let paginator = UserEntity::find()
            .order_by_asc(user::Column::Username)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let users = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((users, total))
    }

    /// Profile updates for self or, with admin rights, anyone. Role and
    /// active-flag changes require admin regardless of target.
    #[instrument(skip(self, request, actor), fields(actor = %actor.username))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        request: UpdateUserRequest,
        actor: &CurrentUser,
    ) -> Result<user::Model, ServiceError> {
        actor.require_self_or_admin(user_id)?;
        request.validate()?;
        if request.role.is_some() || request.is_active.is_some() {
            actor.require_admin()?;
        }
        if let Some(role) = &request.role {
            Self::check_role(role)?;
        }

        let db = &*self.db_pool;
        let existing = self.get_user(user_id).await?;
        let mut active: UserActiveModel = existing.into();
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(full_name) = request.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(role) = request.role {
            active.role = Set(role);
        }
        if let Some(department) = request.department {
            active.department = Set(Some(department));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, user_id = %user_id, "failed to update user");
            ServiceError::DatabaseError(e)
        })?;
        info!(user_id = %user_id, "user updated");
        Ok(updated)
    }

    /// Removes an account. Admin only, and administrator accounts are
    /// off limits; those get deactivated through `update_user` instead.
    #[instrument(skip(self, actor), fields(actor = %actor.username))]
    pub async fn delete_user(
        &self,
        user_id: Uuid,
        actor: &CurrentUser,
    ) -> Result<(), ServiceError> {
        actor.require_admin()?;
        let existing = self.get_user(user_id).await?;
        if existing.role == "admin" {
            return Err(ServiceError::InvalidOperation(
                "administrator accounts cannot be deleted".into(),
            ));
        }

        let db = &*self.db_pool;
        UserEntity::delete_by_id(user_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(user_id = %user_id, username = %existing.username, "user deleted");
        Ok(())
    }

    /// Changes a password. Users must present their current password;
    /// admins acting on another account do not.
    #[instrument(skip(self, request, actor), fields(actor = %actor.username))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
        actor: &CurrentUser,
    ) -> Result<(), ServiceError> {
        actor.require_self_or_admin(user_id)?;
        request.validate()?;

        let existing = self.get_user(user_id).await?;
        if actor.user_id == user_id {
            let current = request.current_password.as_deref().ok_or_else(|| {
                ServiceError::ValidationError("current_password is required".into())
            })?;
            if !self.auth.verify_password(current, &existing.password_hash)? {
                return Err(ServiceError::AuthError(
                    "current password is incorrect".into(),
                ));
            }
        }

        let db = &*self.db_pool;
        let mut active: UserActiveModel = existing.into();
        active.password_hash = Set(self.auth.hash_password(&request.new_password)?);
        active.update(db).await.map_err(ServiceError::DatabaseError)?;
        info!(user_id = %user_id, "password changed");
        Ok(())
    }

    /// Verifies credentials and issues an access token. Every rejection
    /// takes the same path: a `LOGIN_FAILED` audit row (best effort) and
    /// a deliberately vague `AuthError`, so a caller cannot probe which
    /// usernames exist.
    #[instrument(skip(self, request, client), fields(username = %request.username))]
    pub async fn login(
        &self,
        request: LoginRequest,
        client: ClientInfo,
    ) -> Result<(user::Model, AccessToken), ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let found = UserEntity::find()
            .filter(user::Column::Username.eq(request.username.clone()))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let Some(stored) = found else {
            self.audit_login_failure(None, &request.username, "unknown username", &client)
                .await;
            return Err(ServiceError::AuthError("invalid credentials".into()));
        };
        if !stored.is_active {
            self.audit_login_failure(
                Some(&stored),
                &request.username,
                "account is deactivated",
                &client,
            )
            .await;
            return Err(ServiceError::AuthError("invalid credentials".into()));
        }
        if !self
            .auth
            .verify_password(&request.password, &stored.password_hash)?
        {
            self.audit_login_failure(Some(&stored), &request.username, "wrong password", &client)
                .await;
            return Err(ServiceError::AuthError("invalid credentials".into()));
        }

        let mut active: UserActiveModel = stored.clone().into();
        active.last_login = Set(Some(Utc::now()));
        let updated = active.update(db).await.map_err(ServiceError::DatabaseError)?;

        let token = self.auth.issue_token(&updated)?;
        info!(user_id = %updated.id, username = %updated.username, "login succeeded");
        self.event_sender.emit(Event::UserLoggedIn(updated.id));
        Ok((updated, token))
    }

    async fn audit_login_failure(
        &self,
        stored: Option<&user::Model>,
        username: &str,
        reason: &str,
        client: &ClientInfo,
    ) {
        warn!(username = %username, reason, "login failed");
        self.audit
            .record(AuditEntry {
                user_id: stored.map(|u| u.id),
                username: Some(username.to_string()),
                user_role: stored.map(|u| u.role.clone()),
                action: "LOGIN_FAILED".to_string(),
                entity_type: Some("User".to_string()),
                entity_id: stored.map(|u| u.id.to_string()),
                description: Some(format!("Failed login for '{username}': {reason}")),
                ip_address: client.ip_address.clone(),
                user_agent: client.user_agent.clone(),
                level: AuditLevel::Warning,
            })
            .await;
    }
}
