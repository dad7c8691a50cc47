use crate::{
    auth::CurrentUser,
    db::DbPool,
    entities::order::Entity as OrderEntity,
    entities::shipment::{self, ActiveModel as ShipmentActiveModel, Entity as ShipmentEntity},
    entities::shipment_status_history::{
        self, ActiveModel as HistoryActiveModel, Entity as HistoryEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    models::{validate_shipment_transition, ShipmentStatus, UpdateSource},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateShipmentRequest {
    pub order_id: Uuid,
    #[validate(length(min = 1, message = "Tracking number is required"))]
    pub tracking_number: String,
    pub carrier: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub weight_kg: Option<Decimal>,
    pub pieces: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateShipmentRequest {
    pub carrier: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub weight_kg: Option<Decimal>,
    pub pieces: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateShipmentStatusRequest {
    pub status: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Shipment lifecycle. Every status write goes through
/// [`Self::update_status`], which appends to the history log in the same
/// transaction so the shipment's `current_status` and its newest history
/// row can never be observed out of step.
#[derive(Clone)]
pub struct ShipmentService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ShipmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a shipment in `Label Created` and seeds the history log
    /// with a `System` row, both in one transaction.
    #[instrument(skip(self, request, actor), fields(actor = %actor.username))]
    pub async fn create_shipment(
        &self,
        request: CreateShipmentRequest,
        actor: &CurrentUser,
    ) -> Result<shipment::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        OrderEntity::find_by_id(request.order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::ValidationError("order_id references an unknown order".into())
            })?;

        let tracking_taken = ShipmentEntity::find()
            .filter(shipment::Column::TrackingNumber.eq(request.tracking_number.clone()))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if tracking_taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "tracking number '{}' is already in use",
                request.tracking_number
            )));
        }

        let model = ShipmentActiveModel {
            order_id: Set(request.order_id),
            tracking_number: Set(request.tracking_number.clone()),
            carrier: Set(request.carrier),
            current_status: Set(ShipmentStatus::LabelCreated.to_string()),
            current_location: Set(request.origin.clone()),
            estimated_delivery_date: Set(request.estimated_delivery_date),
            origin: Set(request.origin),
            destination: Set(request.destination),
            weight_kg: Set(request.weight_kg),
            pieces: Set(request.pieces),
            notes: Set(request.notes),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to insert shipment");
            ServiceError::DatabaseError(e)
        })?;

        self.append_history(
            &txn,
            model.id,
            ShipmentStatus::LabelCreated,
            model.current_location.clone(),
            Some("Shipment created and label generated".to_string()),
            UpdateSource::System,
            &actor.full_name,
        )
        .await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(shipment_id = %model.id, tracking_number = %model.tracking_number, "shipment created");
        self.event_sender.emit(Event::ShipmentCreated {
            shipment_id: model.id,
            order_id: model.order_id,
            tracking_number: model.tracking_number.clone(),
        });
        Ok(model)
    }

    async fn append_history<C: ConnectionTrait>(
        &self,
        conn: &C,
        shipment_id: Uuid,
        status: ShipmentStatus,
        location: Option<String>,
        description: Option<String>,
        source: UpdateSource,
        updated_by: &str,
    ) -> Result<shipment_status_history::Model, ServiceError> {
        HistoryActiveModel {
            shipment_id: Set(shipment_id),
            status: Set(status.to_string()),
            location: Set(location),
            timestamp: Set(Utc::now()),
            description: Set(description),
            update_source: Set(source.to_string()),
            updated_by: Set(Some(updated_by.to_string())),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| {
            error!(error = %e, shipment_id = %shipment_id, "failed to insert status history");
            ServiceError::DatabaseError(e)
        })
    }

    /// Records a status change: checks the transition, mirrors the new
    /// status and location onto the shipment, stamps the delivery time
    /// the first time the shipment reaches `Delivered`, and appends the
    /// history row. All in one unit of work.
    ///
    /// Re-asserting a terminal status is allowed and still appends a
    /// history row, so carrier retries remain visible in the trail.
    #[instrument(
        skip(self, request, actor),
        fields(shipment_id = %shipment_id, new_status = %request.status, actor = %actor.username)
    )]
    pub async fn update_status(
        &self,
        shipment_id: Uuid,
        request: UpdateShipmentStatusRequest,
        source: UpdateSource,
        actor: &CurrentUser,
    ) -> Result<shipment::Model, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let existing = ShipmentEntity::find_by_id(shipment_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                warn!(shipment_id = %shipment_id, "shipment not found for status update");
                ServiceError::NotFound("Shipment not found".to_string())
            })?;

        let target = validate_shipment_transition(&existing.current_status, &request.status)?;
        let old_status = existing.current_status.clone();
        let now = Utc::now();
        let already_delivered = existing.actual_delivery_date.is_some();

        let mut active: ShipmentActiveModel = existing.into();
        active.current_status = Set(target.to_string());
        if let Some(location) = request.location.clone() {
            active.current_location = Set(Some(location));
        }
        active.last_status_update = Set(now);
        if target == ShipmentStatus::Delivered && !already_delivered {
            active.actual_delivery_date = Set(Some(now));
        }
        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, shipment_id = %shipment_id, "failed to update shipment status");
            ServiceError::DatabaseError(e)
        })?;

        self.append_history(
            &txn,
            shipment_id,
            target,
            request.location,
            request.description,
            source,
            &actor.full_name,
        )
        .await?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            shipment_id = %shipment_id,
            old_status = %old_status,
            new_status = %updated.current_status,
            source = %source,
            "shipment status changed"
        );
        self.event_sender.emit(Event::ShipmentStatusChanged {
            shipment_id,
            old_status,
            new_status: updated.current_status.clone(),
            source: source.to_string(),
        });
        if target == ShipmentStatus::Delivered && !already_delivered {
            self.event_sender.emit(Event::ShipmentDelivered {
                shipment_id,
                delivered_at: now,
            });
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn get_shipment(&self, shipment_id: Uuid) -> Result<shipment::Model, ServiceError> {
        let db = &*self.db_pool;
        ShipmentEntity::find_by_id(shipment_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Shipment not found".to_string()))
    }

    /// The shipment and its full trail, oldest history row first.
    #[instrument(skip(self))]
    pub async fn get_with_history(
        &self,
        shipment_id: Uuid,
    ) -> Result<(shipment::Model, Vec<shipment_status_history::Model>), ServiceError> {
        let db = &*self.db_pool;
        let shipment = self.get_shipment(shipment_id).await?;
        let history = HistoryEntity::find()
            .filter(shipment_status_history::Column::ShipmentId.eq(shipment_id))
            .order_by_asc(shipment_status_history::Column::Timestamp)
            .order_by_asc(shipment_status_history::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((shipment, history))
    }

    #[instrument(skip(self))]
    pub async fn find_by_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<shipment::Model, ServiceError> {
        let db = &*self.db_pool;
        ShipmentEntity::find()
            .filter(shipment::Column::TrackingNumber.eq(tracking_number))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No shipment with tracking number '{tracking_number}'"
                ))
            })
    }

    /// Paginated listing, newest first, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_shipments(
        &self,
        status: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<shipment::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut query = ShipmentEntity::find();
        if let Some(status) = status {
            query = query.filter(shipment::Column::CurrentStatus.eq(status));
        }
        let paginator = query
            .order_by_desc(shipment::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let shipments = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((shipments, total))
    }

    /// Updates carrier and routing fields. Status is off limits here;
    /// that goes through [`Self::update_status`].
    #[instrument(skip(self, request))]
    pub async fn update_shipment(
        &self,
        shipment_id: Uuid,
        request: UpdateShipmentRequest,
    ) -> Result<shipment::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.get_shipment(shipment_id).await?;

        let mut active: ShipmentActiveModel = existing.into();
        if let Some(carrier) = request.carrier {
            active.carrier = Set(Some(carrier));
        }
        if let Some(origin) = request.origin {
            active.origin = Set(Some(origin));
        }
        if let Some(destination) = request.destination {
            active.destination = Set(Some(destination));
        }
        if let Some(date) = request.estimated_delivery_date {
            active.estimated_delivery_date = Set(Some(date));
        }
        if let Some(weight) = request.weight_kg {
            active.weight_kg = Set(Some(weight));
        }
        if let Some(pieces) = request.pieces {
            active.pieces = Set(Some(pieces));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, shipment_id = %shipment_id, "failed to update shipment");
            ServiceError::DatabaseError(e)
        })?;
        info!(shipment_id = %shipment_id, "shipment updated");
        Ok(updated)
    }
}
