use crate::{
    auth::CurrentUser,
    db::DbPool,
    entities::document::{self, ActiveModel as DocumentActiveModel, Entity as DocumentEntity},
    entities::{order, project, shipment},
    errors::ServiceError,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RegisterDocumentRequest {
    pub project_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub shipment_id: Option<Uuid>,
    #[validate(length(min = 1, message = "Document type is required"))]
    pub doc_type: String,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "File name is required"))]
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Filter for document listings; owners are combinable.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentFilter {
    pub project_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub shipment_id: Option<Uuid>,
}

/// Document metadata registry. Only metadata lives here; blob storage
/// is out of scope.
#[derive(Clone)]
pub struct DocumentService {
    db_pool: Arc<DbPool>,
}

impl DocumentService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Registers a metadata row against at least one owner, verifying
    /// each supplied owner exists.
    #[instrument(skip(self, request, actor), fields(actor = %actor.username))]
    pub async fn register(
        &self,
        request: RegisterDocumentRequest,
        actor: &CurrentUser,
    ) -> Result<document::Model, ServiceError> {
        request.validate()?;
        if request.project_id.is_none()
            && request.order_id.is_none()
            && request.shipment_id.is_none()
        {
            return Err(ServiceError::ValidationError(
                "a document needs at least one of project_id, order_id or shipment_id".into(),
            ));
        }

        let db = &*self.db_pool;
        if let Some(id) = request.project_id {
            project::Entity::find_by_id(id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;
        }
        if let Some(id) = request.order_id {
            order::Entity::find_by_id(id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        }
        if let Some(id) = request.shipment_id {
            shipment::Entity::find_by_id(id)
                .one(db)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Shipment not found".to_string()))?;
        }

        let model = DocumentActiveModel {
            project_id: Set(request.project_id),
            order_id: Set(request.order_id),
            shipment_id: Set(request.shipment_id),
            doc_type: Set(request.doc_type),
            title: Set(request.title),
            file_name: Set(request.file_name),
            content_type: Set(request.content_type),
            uploaded_by: Set(Some(actor.full_name.clone())),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(document_id = %model.id, title = %model.title, "document registered");
        Ok(model)
    }

    /// Lists documents, newest first, optionally narrowed by owner.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: DocumentFilter,
    ) -> Result<Vec<document::Model>, ServiceError> {
        let db = &*self.db_pool;
        let mut query = DocumentEntity::find();
        if let Some(id) = filter.project_id {
            query = query.filter(document::Column::ProjectId.eq(id));
        }
        if let Some(id) = filter.order_id {
            query = query.filter(document::Column::OrderId.eq(id));
        }
        if let Some(id) = filter.shipment_id {
            query = query.filter(document::Column::ShipmentId.eq(id));
        }
        query
            .order_by_desc(document::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, document_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = DocumentEntity::delete_by_id(document_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Document not found".to_string()));
        }
        info!(document_id = %document_id, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> (DocumentService, Uuid) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        let db = Arc::new(db);
        let project = project::ActiveModel {
            name: Set("Depot".into()),
            code: Set("PRJ-DOC".into()),
            status: Set("Active".into()),
            currency: Set("QAR".into()),
            ..Default::default()
        }
        .insert(&*db)
        .await
        .unwrap();
        (DocumentService::new(db), project.id)
    }

    fn actor() -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            username: "clerk".into(),
            full_name: "Records Clerk".into(),
            role: "user".into(),
        }
    }

    #[tokio::test]
    async fn register_requires_an_owner_and_stamps_uploader() {
        let (service, project_id) = setup().await;
        let actor = actor();

        let err = service
            .register(
                RegisterDocumentRequest {
                    project_id: None,
                    order_id: None,
                    shipment_id: None,
                    doc_type: "Invoice".into(),
                    title: "Orphan".into(),
                    file_name: "orphan.pdf".into(),
                    content_type: None,
                },
                &actor,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));

        let doc = service
            .register(
                RegisterDocumentRequest {
                    project_id: Some(project_id),
                    order_id: None,
                    shipment_id: None,
                    doc_type: "Contract".into(),
                    title: "Master agreement".into(),
                    file_name: "agreement.pdf".into(),
                    content_type: Some("application/pdf".into()),
                },
                &actor,
            )
            .await
            .unwrap();
        assert_eq!(doc.uploaded_by.as_deref(), Some("Records Clerk"));

        let listed = service
            .list(DocumentFilter {
                project_id: Some(project_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);

        service.delete(doc.id).await.unwrap();
        let err = service.delete(doc.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let (service, _project_id) = setup().await;
        let err = service
            .register(
                RegisterDocumentRequest {
                    project_id: None,
                    order_id: Some(Uuid::new_v4()),
                    shipment_id: None,
                    doc_type: "Invoice".into(),
                    title: "x".into(),
                    file_name: "x.pdf".into(),
                    content_type: None,
                },
                &actor(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
