use crate::{
    db::DbPool,
    entities::audit_log::{self, Entity as AuditLogEntity},
    errors::ServiceError,
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QueryOrder, Set};
use std::sync::Arc;
use strum::Display;
use tracing::{error, instrument};
use uuid::Uuid;

/// Severity of an audit entry, stored as its lowercase label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AuditLevel {
    #[default]
    Info,
    Warning,
    Error,
}

/// One security-relevant occurrence. Identity fields are snapshots of
/// the acting user, not references.
#[derive(Debug, Clone, Default)]
pub struct AuditEntry {
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub user_role: Option<String>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub description: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub level: AuditLevel,
}

/// Writes and reads the immutable audit trail.
#[derive(Clone)]
pub struct AuditService {
    db_pool: Arc<DbPool>,
}

impl AuditService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Inserts one audit row. Infallible from the caller's point of
    /// view: an audit failure is logged and swallowed so it can never
    /// mask or abort the action being audited.
    #[instrument(skip(self, entry), fields(action = %entry.action))]
    pub async fn record(&self, entry: AuditEntry) {
        let db = &*self.db_pool;
        let row = audit_log::ActiveModel {
            user_id: Set(entry.user_id),
            username: Set(entry.username),
            user_role: Set(entry.user_role),
            action: Set(entry.action.clone()),
            entity_type: Set(entry.entity_type),
            entity_id: Set(entry.entity_id),
            description: Set(entry.description),
            ip_address: Set(entry.ip_address),
            user_agent: Set(entry.user_agent),
            level: Set(entry.level.to_string()),
            ..Default::default()
        };
        if let Err(e) = row.insert(db).await {
            error!(error = %e, action = %entry.action, "failed to write audit log entry");
        }
    }

    /// Lists audit entries, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<audit_log::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let paginator = AuditLogEntity::find()
            .order_by_desc(audit_log::Column::Timestamp)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let entries = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((entries, total))
    }
}
