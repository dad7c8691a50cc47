use crate::{
    db::DbPool,
    entities::cost_breakdown::{self, ActiveModel as CostActiveModel, Entity as CostEntity},
    entities::order::Entity as OrderEntity,
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

const COST_TYPES: [&str; 6] = [
    "Goods",
    "Freight",
    "Customs",
    "Insurance",
    "Handling",
    "Other",
];

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AddCostLineRequest {
    pub cost_type: String,
    pub description: Option<String>,
    pub amount: Decimal,
    /// Defaults to the order's currency.
    pub currency: Option<String>,
}

/// Cost breakdown lines per order.
#[derive(Clone)]
pub struct CostService {
    db_pool: Arc<DbPool>,
}

impl CostService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(cost_type = %request.cost_type))]
    pub async fn add_line(
        &self,
        order_id: Uuid,
        request: AddCostLineRequest,
    ) -> Result<cost_breakdown::Model, ServiceError> {
        if !COST_TYPES.contains(&request.cost_type.as_str()) {
            return Err(ServiceError::ValidationError(format!(
                "cost_type must be one of: {}",
                COST_TYPES.join(", ")
            )));
        }
        if request.amount < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "amount must not be negative".into(),
            ));
        }

        let db = &*self.db_pool;
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let model = CostActiveModel {
            order_id: Set(order_id),
            cost_type: Set(request.cost_type),
            description: Set(request.description),
            amount: Set(request.amount),
            currency: Set(request.currency.unwrap_or(order.currency)),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(ServiceError::DatabaseError)?;

        info!(order_id = %order_id, cost_line_id = %model.id, "cost line added");
        Ok(model)
    }

    /// Lines for an order, oldest first, plus their total.
    #[instrument(skip(self))]
    pub async fn list_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<(Vec<cost_breakdown::Model>, Decimal), ServiceError> {
        let db = &*self.db_pool;
        OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        let lines = CostEntity::find()
            .filter(cost_breakdown::Column::OrderId.eq(order_id))
            .order_by_asc(cost_breakdown::Column::CreatedAt)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let total = lines.iter().map(|line| line.amount).sum();
        Ok((lines, total))
    }

    #[instrument(skip(self))]
    pub async fn delete_line(&self, line_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = CostEntity::delete_by_id(line_id)
            .exec(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Cost line not found".to_string()));
        }
        info!(cost_line_id = %line_id, "cost line deleted");
        Ok(())
    }
}
