use crate::{
    auth::CurrentUser,
    db::DbPool,
    entities::order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity},
    entities::shipment::{self, Entity as ShipmentEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    models::{validate_order_transition, OrderStatus},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Defaults to the configured currency.
    #[validate(length(min = 3, max = 3, message = "Currency must be 3 characters"))]
    pub currency: Option<String>,
    pub project_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub po_number: Option<String>,
    pub rfq_number: Option<String>,
    /// Defaults to today.
    pub order_date: Option<NaiveDate>,
    pub requested_delivery_date: Option<NaiveDate>,
    pub promised_delivery_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub shipping_method: Option<String>,
    pub incoterm: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderRequest {
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    #[validate(length(min = 3, max = 3, message = "Currency must be 3 characters"))]
    pub currency: Option<String>,
    pub project_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub po_number: Option<String>,
    pub rfq_number: Option<String>,
    pub requested_delivery_date: Option<NaiveDate>,
    pub promised_delivery_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub shipping_method: Option<String>,
    pub incoterm: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

/// Optional list filters, all combinable.
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub project_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Purchase order lifecycle: creation with a generated order number,
/// field updates, and status changes that keep the previous status and
/// the change audit columns in step.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    default_currency: String,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, default_currency: String) -> Self {
        Self {
            db_pool,
            event_sender,
            default_currency,
        }
    }

    /// Creates an order in `Draft` with a generated `ORD-{seq}` number
    /// and `total_amount = quantity * unit_price`.
    #[instrument(skip(self, request, actor), fields(actor = %actor.username))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        actor: &CurrentUser,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity must be positive".into(),
            ));
        }
        if request.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "unit_price must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        if let Some(project_id) = request.project_id {
            let exists = crate::entities::project::Entity::find_by_id(project_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if exists.is_none() {
                return Err(ServiceError::ValidationError(
                    "project_id references an unknown project".into(),
                ));
            }
        }
        if let Some(supplier_id) = request.supplier_id {
            let exists = crate::entities::supplier::Entity::find_by_id(supplier_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if exists.is_none() {
                return Err(ServiceError::ValidationError(
                    "supplier_id references an unknown supplier".into(),
                ));
            }
        }

        let order_number = self.next_order_number(&txn).await?;
        let total_amount = request.quantity * request.unit_price;

        let model = OrderActiveModel {
            order_number: Set(order_number.clone()),
            po_number: Set(request.po_number),
            rfq_number: Set(request.rfq_number),
            project_id: Set(request.project_id),
            supplier_id: Set(request.supplier_id),
            created_by_id: Set(Some(actor.user_id)),
            description: Set(request.description),
            quantity: Set(request.quantity),
            unit_price: Set(request.unit_price),
            total_amount: Set(total_amount),
            currency: Set(request
                .currency
                .unwrap_or_else(|| self.default_currency.clone())),
            order_date: Set(request
                .order_date
                .unwrap_or_else(|| Utc::now().date_naive())),
            requested_delivery_date: Set(request.requested_delivery_date),
            promised_delivery_date: Set(request.promised_delivery_date),
            status: Set(OrderStatus::Draft.to_string()),
            priority: Set(request.priority.unwrap_or_else(|| "Normal".to_string())),
            shipping_method: Set(request.shipping_method),
            incoterm: Set(request.incoterm),
            notes: Set(request.notes),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, order_number = %order_number, "failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(order_id = %model.id, order_number = %model.order_number, "order created");
        self.event_sender.emit(Event::OrderCreated {
            order_id: model.id,
            order_number: model.order_number.clone(),
        });
        Ok(model)
    }

    /// Next free `ORD-{seq:06}` number. Starts at row count + 1 and
    /// probes upward past numbers freed by deletes.
    async fn next_order_number<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
    ) -> Result<String, ServiceError> {
        let count = OrderEntity::find()
            .count(conn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let mut seq = count + 1;
        loop {
            let candidate = format!("ORD-{seq:06}");
            let taken = OrderEntity::find()
                .filter(order::Column::OrderNumber.eq(candidate.clone()))
                .count(conn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            if taken == 0 {
                return Ok(candidate);
            }
            seq += 1;
        }
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))
    }

    /// Paginated listing, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<order::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut query = OrderEntity::find();
        if let Some(status) = &filter.status {
            query = query.filter(order::Column::Status.eq(status.clone()));
        }
        if let Some(project_id) = filter.project_id {
            query = query.filter(order::Column::ProjectId.eq(project_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(order::Column::SupplierId.eq(supplier_id));
        }
        let paginator = query
            .order_by_desc(order::Column::CreatedAt)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((orders, total))
    }

    /// Updates mutable order fields. Status is not touched here; that
    /// goes through [`Self::update_status`].
    #[instrument(skip(self, request))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
    ) -> Result<order::Model, ServiceError> {
        request.validate()?;
        if matches!(request.quantity, Some(q) if q <= Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "quantity must be positive".into(),
            ));
        }
        if matches!(request.unit_price, Some(p) if p < Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "unit_price must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let existing = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let quantity = request.quantity.unwrap_or(existing.quantity);
        let unit_price = request.unit_price.unwrap_or(existing.unit_price);

        let mut active: OrderActiveModel = existing.into();
        if let Some(description) = request.description {
            active.description = Set(description);
        }
        if let Some(q) = request.quantity {
            active.quantity = Set(q);
        }
        if let Some(p) = request.unit_price {
            active.unit_price = Set(p);
        }
        active.total_amount = Set(quantity * unit_price);
        if let Some(currency) = request.currency {
            active.currency = Set(currency);
        }
        if let Some(project_id) = request.project_id {
            active.project_id = Set(Some(project_id));
        }
        if let Some(supplier_id) = request.supplier_id {
            active.supplier_id = Set(Some(supplier_id));
        }
        if let Some(po_number) = request.po_number {
            active.po_number = Set(Some(po_number));
        }
        if let Some(rfq_number) = request.rfq_number {
            active.rfq_number = Set(Some(rfq_number));
        }
        if let Some(date) = request.requested_delivery_date {
            active.requested_delivery_date = Set(Some(date));
        }
        if let Some(date) = request.promised_delivery_date {
            active.promised_delivery_date = Set(Some(date));
        }
        if let Some(priority) = request.priority {
            active.priority = Set(priority);
        }
        if let Some(method) = request.shipping_method {
            active.shipping_method = Set(Some(method));
        }
        if let Some(incoterm) = request.incoterm {
            active.incoterm = Set(Some(incoterm));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to update order");
            ServiceError::DatabaseError(e)
        })?;
        info!(order_id = %order_id, "order updated");
        Ok(updated)
    }

    /// Applies a status change: checks the transition, preserves the
    /// outgoing status, stamps the change columns, and marks the
    /// delivery time the first time the order reaches `Delivered`.
    #[instrument(skip(self, actor), fields(order_id = %order_id, new_status = %new_status, actor = %actor.username))]
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: &str,
        actor: &CurrentUser,
    ) -> Result<order::Model, ServiceError> {
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let existing = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                warn!(order_id = %order_id, "order not found for status update");
                ServiceError::NotFound("Order not found".to_string())
            })?;

        let target = validate_order_transition(&existing.status, new_status)?;
        let old_status = existing.status.clone();
        let now = Utc::now();
        let already_delivered = existing.actual_delivery_date.is_some();

        let mut active: OrderActiveModel = existing.into();
        active.previous_status = Set(Some(old_status.clone()));
        active.status = Set(target.to_string());
        active.status_changed_at = Set(Some(now));
        active.status_changed_by = Set(Some(actor.full_name.clone()));
        if target == OrderStatus::Delivered && !already_delivered {
            active.actual_delivery_date = Set(Some(now));
        }

        let updated = active.update(&txn).await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "failed to update order status");
            ServiceError::DatabaseError(e)
        })?;
        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %updated.status,
            "order status changed"
        );
        self.event_sender.emit(Event::OrderStatusChanged {
            order_id,
            old_status,
            new_status: updated.status.clone(),
            changed_by: actor.full_name.clone(),
        });
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, order_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = OrderEntity::delete_by_id(order_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Order not found".to_string()));
        }
        info!(order_id = %order_id, "order deleted");
        self.event_sender.emit(Event::OrderDeleted(order_id));
        Ok(())
    }

    /// Shipments booked against an order, oldest first.
    #[instrument(skip(self))]
    pub async fn shipments_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Vec<shipment::Model>, ServiceError> {
        let db = &*self.db_pool;
        self.get_order(order_id).await?;
        ShipmentEntity::find()
            .filter(shipment::Column::OrderId.eq(order_id))
            .order_by_asc(shipment::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::Database;
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> (OrderService, Arc<DbPool>) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        let db = Arc::new(db);
        let (sender, _handle) = crate::events::spawn_event_logger(16);
        let service = OrderService::new(db.clone(), sender, "QAR".to_string());
        (service, db)
    }

    fn actor() -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            username: "pm".into(),
            full_name: "Project Manager".into(),
            role: "manager".into(),
        }
    }

    fn minimal_request() -> CreateOrderRequest {
        CreateOrderRequest {
            description: "Rebar, 12mm".into(),
            quantity: dec!(40),
            unit_price: dec!(125.50),
            currency: None,
            project_id: None,
            supplier_id: None,
            po_number: None,
            rfq_number: None,
            order_date: None,
            requested_delivery_date: None,
            promised_delivery_date: None,
            priority: None,
            shipping_method: None,
            incoterm: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_generates_sequential_numbers_and_totals() {
        let (service, _db) = setup().await;
        let actor = actor();

        let first = service.create_order(minimal_request(), &actor).await.unwrap();
        assert_eq!(first.order_number, "ORD-000001");
        assert_eq!(first.status, "Draft");
        assert_eq!(first.total_amount, dec!(5020.00));
        assert_eq!(first.currency, "QAR");
        assert_eq!(first.created_by_id, Some(actor.user_id));

        let second = service.create_order(minimal_request(), &actor).await.unwrap();
        assert_eq!(second.order_number, "ORD-000002");
    }

    #[tokio::test]
    async fn order_number_probe_skips_taken_numbers() {
        let (service, _db) = setup().await;
        let actor = actor();

        let first = service.create_order(minimal_request(), &actor).await.unwrap();
        let second = service.create_order(minimal_request(), &actor).await.unwrap();
        service.delete_order(first.id).await.unwrap();

        // One row left, so the probe starts at 2, which is taken.
        let third = service.create_order(minimal_request(), &actor).await.unwrap();
        assert_ne!(third.order_number, second.order_number);
        assert_eq!(third.order_number, "ORD-000003");
    }

    #[tokio::test]
    async fn status_change_preserves_previous_and_stamps_delivery_once() {
        let (service, _db) = setup().await;
        let actor = actor();
        let order = service.create_order(minimal_request(), &actor).await.unwrap();

        let approved = service
            .update_status(order.id, "Approved", &actor)
            .await
            .unwrap();
        assert_eq!(approved.status, "Approved");
        assert_eq!(approved.previous_status.as_deref(), Some("Draft"));
        assert_eq!(approved.status_changed_by.as_deref(), Some("Project Manager"));
        assert!(approved.actual_delivery_date.is_none());

        let delivered = service
            .update_status(order.id, "Delivered", &actor)
            .await
            .unwrap();
        let first_delivery = delivered.actual_delivery_date.expect("delivery stamp");

        // Delivered is not terminal for orders; Invoiced follows it and
        // must not move the delivery stamp.
        let invoiced = service
            .update_status(order.id, "Invoiced", &actor)
            .await
            .unwrap();
        assert_eq!(invoiced.actual_delivery_date, Some(first_delivery));

        let redelivered = service
            .update_status(order.id, "Delivered", &actor)
            .await
            .unwrap();
        assert_eq!(redelivered.actual_delivery_date, Some(first_delivery));
    }

    #[tokio::test]
    async fn terminal_order_rejects_further_changes() {
        let (service, _db) = setup().await;
        let actor = actor();
        let order = service.create_order(minimal_request(), &actor).await.unwrap();
        service
            .update_status(order.id, "Cancelled", &actor)
            .await
            .unwrap();

        let err = service
            .update_status(order.id, "Approved", &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatusTransition(_)));

        // Re-asserting the terminal status stays legal.
        service
            .update_status(order.id, "Cancelled", &actor)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn unknown_status_and_empty_status_map_to_the_right_errors() {
        let (service, _db) = setup().await;
        let actor = actor();
        let order = service.create_order(minimal_request(), &actor).await.unwrap();

        let err = service
            .update_status(order.id, "Warp Speed", &actor)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatusTransition(_)));

        let err = service.update_status(order.id, "", &actor).await.unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn update_recomputes_total() {
        let (service, _db) = setup().await;
        let actor = actor();
        let order = service.create_order(minimal_request(), &actor).await.unwrap();

        let updated = service
            .update_order(
                order.id,
                UpdateOrderRequest {
                    description: None,
                    quantity: Some(dec!(10)),
                    unit_price: None,
                    currency: None,
                    project_id: None,
                    supplier_id: None,
                    po_number: None,
                    rfq_number: None,
                    requested_delivery_date: None,
                    promised_delivery_date: None,
                    priority: None,
                    shipping_method: None,
                    incoterm: None,
                    notes: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.total_amount, dec!(1255.00));
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let (service, _db) = setup().await;
        let err = service.get_order(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        let err = service.delete_order(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
