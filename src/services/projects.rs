use crate::{
    db::DbPool,
    entities::project::{self, ActiveModel as ProjectActiveModel, Entity as ProjectEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    pub description: Option<String>,
    /// Defaults to `Active`.
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<Decimal>,
    pub currency: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget: Option<Decimal>,
    pub currency: Option<String>,
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct ProjectService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    default_currency: String,
}

impl ProjectService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, default_currency: String) -> Self {
        Self {
            db_pool,
            event_sender,
            default_currency,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_project(
        &self,
        request: CreateProjectRequest,
    ) -> Result<project::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let taken = ProjectEntity::find()
            .filter(project::Column::Code.eq(request.code.clone()))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "project code '{}' is already in use",
                request.code
            )));
        }

        let model = ProjectActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            description: Set(request.description),
            status: Set(request.status.unwrap_or_else(|| "Active".to_string())),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            budget: Set(request.budget),
            currency: Set(request
                .currency
                .unwrap_or_else(|| self.default_currency.clone())),
            location: Set(request.location),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to insert project");
            ServiceError::DatabaseError(e)
        })?;

        info!(project_id = %model.id, code = %model.code, "project created");
        self.event_sender.emit(Event::ProjectCreated(model.id));
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_project(&self, project_id: Uuid) -> Result<project::Model, ServiceError> {
        let db = &*self.db_pool;
        ProjectEntity::find_by_id(project_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list_projects(
        &self,
        status: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<project::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut query = ProjectEntity::find();
        if let Some(status) = status {
            query = query.filter(project::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_desc(project::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let projects = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((projects, total))
    }

    #[instrument(skip(self, request))]
    pub async fn update_project(
        &self,
        project_id: Uuid,
        request: UpdateProjectRequest,
    ) -> Result<project::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.get_project(project_id).await?;

        let mut active: ProjectActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(date) = request.start_date {
            active.start_date = Set(Some(date));
        }
        if let Some(date) = request.end_date {
            active.end_date = Set(Some(date));
        }
        if let Some(budget) = request.budget {
            active.budget = Set(Some(budget));
        }
        if let Some(currency) = request.currency {
            active.currency = Set(currency);
        }
        if let Some(location) = request.location {
            active.location = Set(Some(location));
        }

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, project_id = %project_id, "failed to update project");
            ServiceError::DatabaseError(e)
        })?;
        info!(project_id = %project_id, "project updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_project(&self, project_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = ProjectEntity::delete_by_id(project_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Project not found".to_string()));
        }
        info!(project_id = %project_id, "project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> ProjectService {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        let (sender, _handle) = crate::events::spawn_event_logger(16);
        ProjectService::new(Arc::new(db), sender, "QAR".to_string())
    }

    fn request(code: &str) -> CreateProjectRequest {
        CreateProjectRequest {
            name: "Metro Extension".into(),
            code: code.into(),
            description: None,
            status: None,
            start_date: None,
            end_date: None,
            budget: None,
            currency: None,
            location: Some("Doha".into()),
        }
    }

    #[tokio::test]
    async fn create_defaults_and_duplicate_code_conflicts() {
        let service = setup().await;
        let created = service.create_project(request("PRJ-100")).await.unwrap();
        assert_eq!(created.status, "Active");
        assert_eq!(created.currency, "QAR");

        let err = service.create_project(request("PRJ-100")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let service = setup().await;
        service.create_project(request("PRJ-101")).await.unwrap();
        let held = service
            .create_project(CreateProjectRequest {
                status: Some("On Hold".into()),
                ..request("PRJ-102")
            })
            .await
            .unwrap();

        let (all, total) = service.list_projects(None, 1, 20).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(all.len(), 2);

        let (on_hold, total) = service
            .list_projects(Some("On Hold".into()), 1, 20)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(on_hold[0].id, held.id);
    }

    #[tokio::test]
    async fn delete_missing_project_is_not_found() {
        let service = setup().await;
        let err = service.delete_project(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
