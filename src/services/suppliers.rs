use crate::{
    db::DbPool,
    entities::order::{self, Entity as OrderEntity},
    entities::supplier::{self, ActiveModel as SupplierActiveModel, Entity as SupplierEntity},
    entities::supplier_performance::{
        self, ActiveModel as PerformanceActiveModel, Entity as PerformanceEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    pub contact_person: Option<String>,
    #[validate(email(message = "Contact email must be valid"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    /// Defaults to `Active`.
    pub status: Option<String>,
    pub payment_terms: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    #[validate(email(message = "Contact email must be valid"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub payment_terms: Option<String>,
}

/// Monthly scorecard submission. Scores are 0-5; the delivery rate is a
/// percentage.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct RecordPerformanceRequest {
    /// `YYYY-MM`.
    #[validate(length(min = 7, max = 7, message = "Period must be formatted YYYY-MM"))]
    pub period: String,
    pub on_time_delivery_rate: Option<Decimal>,
    pub quality_score: Option<Decimal>,
    pub responsiveness_score: Option<Decimal>,
    pub overall_score: Option<Decimal>,
    pub notes: Option<String>,
}

/// Supplier master data and the monthly performance scorecards hanging
/// off it. Recording a scorecard refreshes the supplier's rolling
/// `rating` in the same transaction.
#[derive(Clone)]
pub struct SupplierService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl SupplierService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request))]
    pub async fn create_supplier(
        &self,
        request: CreateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let taken = SupplierEntity::find()
            .filter(supplier::Column::Code.eq(request.code.clone()))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if taken > 0 {
            return Err(ServiceError::Conflict(format!(
                "supplier code '{}' is already in use",
                request.code
            )));
        }

        let model = SupplierActiveModel {
            name: Set(request.name),
            code: Set(request.code),
            contact_person: Set(request.contact_person),
            contact_email: Set(request.contact_email),
            contact_phone: Set(request.contact_phone),
            address: Set(request.address),
            country: Set(request.country),
            category: Set(request.category),
            status: Set(request.status.unwrap_or_else(|| "Active".to_string())),
            payment_terms: Set(request.payment_terms),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to insert supplier");
            ServiceError::DatabaseError(e)
        })?;

        info!(supplier_id = %model.id, code = %model.code, "supplier created");
        self.event_sender.emit(Event::SupplierCreated(model.id));
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn get_supplier(&self, supplier_id: Uuid) -> Result<supplier::Model, ServiceError> {
        let db = &*self.db_pool;
        SupplierEntity::find_by_id(supplier_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn list_suppliers(
        &self,
        status: Option<String>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<supplier::Model>, u64), ServiceError> {
        let db = &*self.db_pool;
        let mut query = SupplierEntity::find();
        if let Some(status) = status {
            query = query.filter(supplier::Column::Status.eq(status));
        }
        let paginator = query
            .order_by_asc(supplier::Column::Name)
            .paginate(db, per_page);
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::DatabaseError)?;
        let suppliers = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok((suppliers, total))
    }

    #[instrument(skip(self, request))]
    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        request: UpdateSupplierRequest,
    ) -> Result<supplier::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let existing = self.get_supplier(supplier_id).await?;

        let mut active: SupplierActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(value) = request.contact_person {
            active.contact_person = Set(Some(value));
        }
        if let Some(value) = request.contact_email {
            active.contact_email = Set(Some(value));
        }
        if let Some(value) = request.contact_phone {
            active.contact_phone = Set(Some(value));
        }
        if let Some(value) = request.address {
            active.address = Set(Some(value));
        }
        if let Some(value) = request.country {
            active.country = Set(Some(value));
        }
        if let Some(value) = request.category {
            active.category = Set(Some(value));
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(value) = request.payment_terms {
            active.payment_terms = Set(Some(value));
        }

        let updated = active.update(db).await.map_err(|e| {
            error!(error = %e, supplier_id = %supplier_id, "failed to update supplier");
            ServiceError::DatabaseError(e)
        })?;
        info!(supplier_id = %supplier_id, "supplier updated");
        Ok(updated)
    }

    /// Deletes a supplier unless orders still reference it.
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, supplier_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        self.get_supplier(supplier_id).await?;

        let referencing_orders = OrderEntity::find()
            .filter(order::Column::SupplierId.eq(supplier_id))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if referencing_orders > 0 {
            return Err(ServiceError::Conflict(format!(
                "supplier has {referencing_orders} order(s) and cannot be deleted"
            )));
        }

        SupplierEntity::delete_by_id(supplier_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(supplier_id = %supplier_id, "supplier deleted");
        Ok(())
    }

    /// Records one scorecard row for a period and refreshes the
    /// supplier's rolling rating (mean of all `overall_score`s).
    #[instrument(skip(self, request), fields(period = %request.period))]
    pub async fn record_performance(
        &self,
        supplier_id: Uuid,
        request: RecordPerformanceRequest,
    ) -> Result<supplier_performance::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let supplier = SupplierEntity::find_by_id(supplier_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Supplier not found".to_string()))?;

        let duplicate = PerformanceEntity::find()
            .filter(supplier_performance::Column::SupplierId.eq(supplier_id))
            .filter(supplier_performance::Column::Period.eq(request.period.clone()))
            .count(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "a scorecard for period {} already exists",
                request.period
            )));
        }

        let model = PerformanceActiveModel {
            supplier_id: Set(supplier_id),
            period: Set(request.period),
            on_time_delivery_rate: Set(request.on_time_delivery_rate),
            quality_score: Set(request.quality_score),
            responsiveness_score: Set(request.responsiveness_score),
            overall_score: Set(request.overall_score),
            notes: Set(request.notes),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(ServiceError::DatabaseError)?;

        let scored: Vec<Decimal> = PerformanceEntity::find()
            .filter(supplier_performance::Column::SupplierId.eq(supplier_id))
            .all(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .into_iter()
            .filter_map(|row| row.overall_score)
            .collect();
        if !scored.is_empty() {
            let mean = scored.iter().sum::<Decimal>() / Decimal::from(scored.len() as u64);
            let mut active: SupplierActiveModel = supplier.into();
            active.rating = Set(Some(mean.round_dp(2)));
            active
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;
        info!(supplier_id = %supplier_id, period = %model.period, "supplier performance recorded");
        Ok(model)
    }

    /// Scorecards for a supplier, most recent period first.
    #[instrument(skip(self))]
    pub async fn list_performance(
        &self,
        supplier_id: Uuid,
    ) -> Result<Vec<supplier_performance::Model>, ServiceError> {
        let db = &*self.db_pool;
        self.get_supplier(supplier_id).await?;
        PerformanceEntity::find()
            .filter(supplier_performance::Column::SupplierId.eq(supplier_id))
            .order_by_desc(supplier_performance::Column::Period)
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

    async fn setup() -> (SupplierService, Arc<DbPool>) {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        let db = Arc::new(db);
        let (sender, _handle) = crate::events::spawn_event_logger(16);
        (SupplierService::new(db.clone(), sender), db)
    }

    fn request(code: &str) -> CreateSupplierRequest {
        CreateSupplierRequest {
            name: "Gulf Steel Trading".into(),
            code: code.into(),
            contact_person: None,
            contact_email: Some("sales@gulfsteel.example".into()),
            contact_phone: None,
            address: None,
            country: Some("QA".into()),
            category: Some("Steel".into()),
            status: None,
            payment_terms: Some("Net 30".into()),
        }
    }

    fn scorecard(period: &str, overall: Decimal) -> RecordPerformanceRequest {
        RecordPerformanceRequest {
            period: period.into(),
            on_time_delivery_rate: Some(dec!(92.5)),
            quality_score: Some(dec!(4.0)),
            responsiveness_score: Some(dec!(3.5)),
            overall_score: Some(overall),
            notes: None,
        }
    }

    #[tokio::test]
    async fn duplicate_code_conflicts() {
        let (service, _db) = setup().await;
        service.create_supplier(request("SUP-01")).await.unwrap();
        let err = service.create_supplier(request("SUP-01")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn scorecards_update_rolling_rating_and_reject_duplicate_period() {
        let (service, _db) = setup().await;
        let supplier = service.create_supplier(request("SUP-02")).await.unwrap();
        assert!(supplier.rating.is_none());

        service
            .record_performance(supplier.id, scorecard("2024-01", dec!(4.0)))
            .await
            .unwrap();
        service
            .record_performance(supplier.id, scorecard("2024-02", dec!(3.0)))
            .await
            .unwrap();

        let refreshed = service.get_supplier(supplier.id).await.unwrap();
        assert_eq!(refreshed.rating, Some(dec!(3.50)));

        let err = service
            .record_performance(supplier.id, scorecard("2024-02", dec!(5.0)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let rows = service.list_performance(supplier.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "2024-02");
    }

    #[tokio::test]
    async fn delete_blocked_while_orders_reference_supplier() {
        let (service, db) = setup().await;
        let supplier = service.create_supplier(request("SUP-03")).await.unwrap();

        order::ActiveModel {
            order_number: Set("ORD-000001".into()),
            supplier_id: Set(Some(supplier.id)),
            description: Set("Angle brackets".into()),
            quantity: Set(dec!(5)),
            unit_price: Set(dec!(10)),
            total_amount: Set(dec!(50)),
            currency: Set("QAR".into()),
            order_date: Set(chrono::Utc::now().date_naive()),
            status: Set("Draft".into()),
            priority: Set("Normal".into()),
            ..Default::default()
        }
        .insert(&*db)
        .await
        .unwrap();

        let err = service.delete_supplier(supplier.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }
}
