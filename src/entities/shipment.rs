use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Shipment tied to an order. `current_status` mirrors the newest row in
/// `shipment_status_history`; both are written in the same transaction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    #[sea_orm(unique)]
    pub tracking_number: String,
    pub carrier: Option<String>,
    pub current_status: String,
    pub current_location: Option<String>,
    pub estimated_delivery_date: Option<NaiveDate>,
    pub actual_delivery_date: Option<DateTime<Utc>>,
    pub last_status_update: DateTime<Utc>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub pieces: Option<i32>,
    pub assigned_user_id: Option<Uuid>,
    pub assigned_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    #[sea_orm(has_many = "super::shipment_status_history::Entity")]
    StatusHistory,
    #[sea_orm(has_many = "super::customs_entry::Entity")]
    CustomsEntry,
    #[sea_orm(has_many = "super::document::Entity")]
    Document,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::shipment_status_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusHistory.def()
    }
}

impl Related<super::customs_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CustomsEntry.def()
    }
}

impl Related<super::document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Document.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();
        if insert {
            if self.id.is_not_set() {
                self.id = Set(Uuid::new_v4());
            }
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.last_status_update.is_not_set() {
                self.last_status_update = Set(now);
            }
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
