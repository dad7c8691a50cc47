use crate::{
    auth::CurrentUser,
    db::DbPool,
    entities::system_setting::{self, ActiveModel as SettingActiveModel, Entity as SettingEntity},
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpsertSettingRequest {
    pub value: String,
    pub description: Option<String>,
}

/// Key-value system settings. Writes are admin-gated at the service
/// boundary so every route that reaches this code path is covered.
#[derive(Clone)]
pub struct SettingsService {
    db_pool: Arc<DbPool>,
}

impl SettingsService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<system_setting::Model, ServiceError> {
        let db = &*self.db_pool;
        SettingEntity::find()
            .filter(system_setting::Column::Key.eq(key))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("No setting named '{key}'")))
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<system_setting::Model>, ServiceError> {
        let db = &*self.db_pool;
        SettingEntity::find()
            .order_by_asc(system_setting::Column::Key)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Creates or overwrites a setting, stamping who changed it.
    #[instrument(skip(self, request, actor), fields(actor = %actor.username))]
    pub async fn upsert(
        &self,
        key: &str,
        request: UpsertSettingRequest,
        actor: &CurrentUser,
    ) -> Result<system_setting::Model, ServiceError> {
        actor.require_admin()?;
        if key.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "setting key must not be empty".into(),
            ));
        }

        let db = &*self.db_pool;
        let existing = SettingEntity::find()
            .filter(system_setting::Column::Key.eq(key))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        let updated = match existing {
            Some(model) => {
                let mut active: SettingActiveModel = model.into();
                active.value = Set(request.value);
                if let Some(description) = request.description {
                    active.description = Set(Some(description));
                }
                active.updated_by = Set(Some(actor.username.clone()));
                active.updated_at = Set(Utc::now());
                active.update(db).await.map_err(ServiceError::DatabaseError)?
            }
            None => {
                SettingActiveModel {
                    key: Set(key.to_string()),
                    value: Set(request.value),
                    description: Set(request.description),
                    updated_by: Set(Some(actor.username.clone())),
                    ..Default::default()
                }
                .insert(db)
                .await
                .map_err(ServiceError::DatabaseError)?
            }
        };

        info!(key = %key, "setting upserted");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;
    use uuid::Uuid;

    async fn setup() -> SettingsService {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        SettingsService::new(Arc::new(db))
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            username: "root".into(),
            full_name: "Root Admin".into(),
            role: "admin".into(),
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_overwrites() {
        let service = setup().await;
        let admin = admin();

        let created = service
            .upsert(
                "default_incoterm",
                UpsertSettingRequest {
                    value: "CIF".into(),
                    description: Some("Applied to new orders".into()),
                },
                &admin,
            )
            .await
            .unwrap();
        assert_eq!(created.value, "CIF");
        assert_eq!(created.updated_by.as_deref(), Some("root"));

        let overwritten = service
            .upsert(
                "default_incoterm",
                UpsertSettingRequest {
                    value: "FOB".into(),
                    description: None,
                },
                &admin,
            )
            .await
            .unwrap();
        assert_eq!(overwritten.id, created.id);
        assert_eq!(overwritten.value, "FOB");
        assert_eq!(
            overwritten.description.as_deref(),
            Some("Applied to new orders")
        );

        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn writes_are_admin_only() {
        let service = setup().await;
        let user = CurrentUser {
            role: "manager".into(),
            ..admin()
        };
        let err = service
            .upsert(
                "k",
                UpsertSettingRequest {
                    value: "v".into(),
                    description: None,
                },
                &user,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_key_is_not_found() {
        let service = setup().await;
        let err = service.get("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
