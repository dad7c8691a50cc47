use crate::{
    auth::CurrentUser,
    db::DbPool,
    entities::{
        notification, order, project, shipment, shipment_status_history, supplier,
    },
    errors::ServiceError,
    models::{OrderStatus, ShipmentStatus},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

const RECENT_ACTIVITY_LIMIT: u64 = 10;

/// Landing-page counters plus the latest shipment movements.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub active_projects: u64,
    pub total_orders: u64,
    pub open_orders: u64,
    pub orders_in_transit: u64,
    pub total_shipments: u64,
    pub shipments_in_transit: u64,
    pub shipments_delivered: u64,
    pub active_suppliers: u64,
    pub unread_notifications: u64,
    #[schema(value_type = Vec<Object>)]
    pub recent_activity: Vec<shipment_status_history::Model>,
}

#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Counts are computed per request; at this system's scale a
    /// handful of indexed counts beats maintaining materialized tallies.
    #[instrument(skip(self, viewer), fields(viewer = %viewer.username))]
    pub async fn stats(&self, viewer: &CurrentUser) -> Result<DashboardStats, ServiceError> {
        let db = &*self.db_pool;

        let active_projects = project::Entity::find()
            .filter(project::Column::Status.eq("Active"))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let total_orders = order::Entity::find()
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let open_orders = order::Entity::find()
            .filter(
                order::Column::Status.is_not_in([
                    OrderStatus::Closed.to_string(),
                    OrderStatus::Cancelled.to_string(),
                ]),
            )
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders_in_transit = order::Entity::find()
            .filter(order::Column::Status.is_in([
                OrderStatus::Shipped.to_string(),
                OrderStatus::InTransit.to_string(),
                OrderStatus::Customs.to_string(),
                OrderStatus::OutForDelivery.to_string(),
            ]))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let total_shipments = shipment::Entity::find()
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let shipments_in_transit = shipment::Entity::find()
            .filter(shipment::Column::CurrentStatus.is_in([
                ShipmentStatus::PickedUp.to_string(),
                ShipmentStatus::InTransit.to_string(),
                ShipmentStatus::OutForDelivery.to_string(),
                ShipmentStatus::CustomsDelay.to_string(),
            ]))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let shipments_delivered = shipment::Entity::find()
            .filter(shipment::Column::CurrentStatus.eq(ShipmentStatus::Delivered.to_string()))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let active_suppliers = supplier::Entity::find()
            .filter(supplier::Column::Status.eq("Active"))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let unread_notifications = notification::Entity::find()
            .filter(notification::Column::UserId.eq(viewer.user_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let recent_activity = shipment_status_history::Entity::find()
            .order_by_desc(shipment_status_history::Column::Timestamp)
            .limit(RECENT_ACTIVITY_LIMIT)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(DashboardStats {
            active_projects,
            total_orders,
            open_orders,
            orders_in_transit,
            total_shipments,
            shipments_in_transit,
            shipments_delivered,
            active_suppliers,
            unread_notifications,
            recent_activity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sea_orm::{ActiveModelTrait, Database, Set};
    use sea_orm_migration::MigratorTrait;
    use uuid::Uuid;

    #[tokio::test]
    async fn stats_bucket_orders_and_shipments_by_status() {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("sqlite connection");
        migrations::Migrator::up(&db, None)
            .await
            .expect("migrations");
        let db = Arc::new(db);
        let service = DashboardService::new(db.clone());
        let viewer = CurrentUser {
            user_id: Uuid::new_v4(),
            username: "pm".into(),
            full_name: "PM".into(),
            role: "manager".into(),
        };

        for (number, status) in [
            ("ORD-000001", "Draft"),
            ("ORD-000002", "In Transit"),
            ("ORD-000003", "Closed"),
        ] {
            order::ActiveModel {
                order_number: Set(number.into()),
                description: Set("x".into()),
                quantity: Set(dec!(1)),
                unit_price: Set(dec!(1)),
                total_amount: Set(dec!(1)),
                currency: Set("QAR".into()),
                order_date: Set(chrono::Utc::now().date_naive()),
                status: Set(status.into()),
                priority: Set("Normal".into()),
                ..Default::default()
            }
            .insert(&*db)
            .await
            .unwrap();
        }

        let stats = service.stats(&viewer).await.unwrap();
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.open_orders, 2);
        assert_eq!(stats.orders_in_transit, 1);
        assert_eq!(stats.total_shipments, 0);
        assert_eq!(stats.unread_notifications, 0);
        assert!(stats.recent_activity.is_empty());
    }
}
