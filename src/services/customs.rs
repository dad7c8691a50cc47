use crate::{
    db::DbPool,
    entities::customs_entry::{self, ActiveModel as CustomsActiveModel, Entity as CustomsEntity},
    entities::shipment::Entity as ShipmentEntity,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

const CUSTOMS_STATUSES: [&str; 5] = ["Pending", "Submitted", "Under Review", "Cleared", "Held"];

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCustomsEntryRequest {
    pub entry_number: Option<String>,
    pub broker: Option<String>,
    /// Defaults to `Pending`.
    pub status: Option<String>,
    pub submitted_date: Option<DateTime<Utc>>,
    pub duty_amount: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCustomsEntryRequest {
    pub entry_number: Option<String>,
    pub broker: Option<String>,
    pub status: Option<String>,
    pub submitted_date: Option<DateTime<Utc>>,
    pub duty_amount: Option<Decimal>,
    pub notes: Option<String>,
}

/// Customs clearance entries per shipment. Reaching `Cleared` stamps
/// `cleared_date` once; repeats leave the original stamp.
#[derive(Clone)]
pub struct CustomsService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CustomsService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    fn check_status(status: &str) -> Result<(), ServiceError> {
        if CUSTOMS_STATUSES.contains(&status) {
            Ok(())
        } else {
            Err(ServiceError::ValidationError(format!(
                "customs status must be one of: {}",
                CUSTOMS_STATUSES.join(", ")
            )))
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_entry(
        &self,
        shipment_id: Uuid,
        request: CreateCustomsEntryRequest,
    ) -> Result<customs_entry::Model, ServiceError> {
        let db = &*self.db_pool;
        ShipmentEntity::find_by_id(shipment_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Shipment not found".to_string()))?;

        let status = request.status.unwrap_or_else(|| "Pending".to_string());
        Self::check_status(&status)?;

        let cleared_date = (status == "Cleared").then(Utc::now);
        let model = CustomsActiveModel {
            shipment_id: Set(shipment_id),
            entry_number: Set(request.entry_number),
            status: Set(status),
            broker: Set(request.broker),
            submitted_date: Set(request.submitted_date),
            cleared_date: Set(cleared_date),
            duty_amount: Set(request.duty_amount),
            notes: Set(request.notes),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, shipment_id = %shipment_id, "failed to insert customs entry");
            ServiceError::DatabaseError(e)
        })?;

        info!(customs_entry_id = %model.id, shipment_id = %shipment_id, "customs entry created");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_entry(
        &self,
        entry_id: Uuid,
        request: UpdateCustomsEntryRequest,
    ) -> Result<customs_entry::Model, ServiceError> {
        let db = &*self.db_pool;
        let existing = CustomsEntity::find_by_id(entry_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Customs entry not found".to_string()))?;

        let newly_cleared = match &request.status {
            Some(status) => {
                Self::check_status(status)?;
                status == "Cleared" && existing.cleared_date.is_none()
            }
            None => false,
        };
        let shipment_id = existing.shipment_id;

        let mut active: CustomsActiveModel = existing.into();
        if let Some(value) = request.entry_number {
            active.entry_number = Set(Some(value));
        }
        if let Some(value) = request.broker {
            active.broker = Set(Some(value));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(value) = request.submitted_date {
            active.submitted_date = Set(Some(value));
        }
        if let Some(value) = request.duty_amount {
            active.duty_amount = Set(Some(value));
        }
        if let Some(value) = request.notes {
            active.notes = Set(Some(value));
        }
        if newly_cleared {
            active.cleared_date = Set(Some(Utc::now()));
        }

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, customs_entry_id = %entry_id, "failed to update customs entry");
            ServiceError::DatabaseError(e)
        })?;

        info!(customs_entry_id = %entry_id, status = %updated.status, "customs entry updated");
        if newly_cleared {
            self.event_sender.emit(Event::CustomsCleared {
                customs_entry_id: entry_id,
                shipment_id,
            });
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn list_for_shipment(
        &self,
        shipment_id: Uuid,
    ) -> Result<Vec<customs_entry::Model>, ServiceError> {
        let db = &*self.db_pool;
        ShipmentEntity::find_by_id(shipment_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Shipment not found".to_string()))?;
        CustomsEntity::find()
            .filter(customs_entry::Column::ShipmentId.eq(shipment_id))
            .order_by_asc(customs_entry::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{order, shipment};
    use rust_decimal_macros::dec;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> (CustomsService, Uuid) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        let db = Arc::new(db);

        let order = order::ActiveModel {
            order_number: Set("ORD-000001".into()),
            description: Set("Pumps".into()),
            quantity: Set(dec!(2)),
            unit_price: Set(dec!(900)),
            total_amount: Set(dec!(1800)),
            currency: Set("QAR".into()),
            order_date: Set(Utc::now().date_naive()),
            status: Set("Shipped".into()),
            priority: Set("Normal".into()),
            ..Default::default()
        }
        .insert(&*db)
        .await
        .unwrap();
        let shipment = shipment::ActiveModel {
            order_id: Set(order.id),
            tracking_number: Set("TRK-CUST".into()),
            current_status: Set("Customs Delay".into()),
            ..Default::default()
        }
        .insert(&*db)
        .await
        .unwrap();

        let (sender, _handle) = crate::events::spawn_event_logger(16);
        (CustomsService::new(db, sender), shipment.id)
    }

    #[tokio::test]
    async fn cleared_date_is_stamped_once() {
        let (service, shipment_id) = setup().await;
        let entry = service
            .create_entry(
                shipment_id,
                CreateCustomsEntryRequest {
                    entry_number: Some("QC-7781".into()),
                    broker: Some("Al Jazeera Clearing".into()),
                    status: None,
                    submitted_date: None,
                    duty_amount: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(entry.status, "Pending");
        assert!(entry.cleared_date.is_none());

        let cleared = service
            .update_entry(
                entry.id,
                UpdateCustomsEntryRequest {
                    entry_number: None,
                    broker: None,
                    status: Some("Cleared".into()),
                    submitted_date: None,
                    duty_amount: Some(dec!(340.00)),
                    notes: None,
                },
            )
            .await
            .unwrap();
        let stamp = cleared.cleared_date.expect("cleared stamp");

        let again = service
            .update_entry(
                entry.id,
                UpdateCustomsEntryRequest {
                    entry_number: None,
                    broker: None,
                    status: Some("Cleared".into()),
                    submitted_date: None,
                    duty_amount: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(again.cleared_date, Some(stamp));
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let (service, shipment_id) = setup().await;
        let err = service
            .create_entry(
                shipment_id,
                CreateCustomsEntryRequest {
                    entry_number: None,
                    broker: None,
                    status: Some("Vanished".into()),
                    submitted_date: None,
                    duty_amount: None,
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn listing_requires_an_existing_shipment() {
        let (service, shipment_id) = setup().await;
        assert!(service.list_for_shipment(shipment_id).await.unwrap().is_empty());
        let err = service.list_for_shipment(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
