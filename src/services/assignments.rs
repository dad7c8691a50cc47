use crate::{
    auth::CurrentUser,
    db::DbPool,
    entities::notification::ActiveModel as NotificationActiveModel,
    entities::order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity},
    entities::project::{self, ActiveModel as ProjectActiveModel, Entity as ProjectEntity},
    entities::shipment::{self, ActiveModel as ShipmentActiveModel, Entity as ShipmentEntity},
    entities::user::Entity as UserEntity,
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

/// Targets of one assignment call. All optional; an empty set is a
/// no-op, not an error.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct AssignmentTargets {
    pub project_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
    pub shipment_id: Option<Uuid>,
}

impl AssignmentTargets {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none() && self.order_id.is_none() && self.shipment_id.is_none()
    }
}

/// What one call to [`AssignmentService::assign_user`] did. `assigned`
/// holds a human-readable label per target, in project/order/shipment
/// order.
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentOutcome {
    pub user_id: Uuid,
    pub assigned: Vec<String>,
}

impl AssignmentOutcome {
    pub fn nothing_assigned(user_id: Uuid) -> Self {
        Self {
            user_id,
            assigned: Vec::new(),
        }
    }
}

/// Everything currently assigned to one user, grouped by target kind.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserAssignments {
    #[schema(value_type = Vec<Object>)]
    pub projects: Vec<project::Model>,
    #[schema(value_type = Vec<Object>)]
    pub orders: Vec<order::Model>,
    #[schema(value_type = Vec<Object>)]
    pub shipments: Vec<shipment::Model>,
}

/// Binds a user to projects, orders and shipments and notifies them.
///
/// The assignment stamps and their notifications are written in a
/// single transaction. Any target id that does not resolve fails the
/// whole call; nothing persists.
#[derive(Clone)]
pub struct AssignmentService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl AssignmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(
        skip(self, targets, actor),
        fields(user_id = %user_id, actor = %actor.username)
    )]
    pub async fn assign_user(
        &self,
        user_id: Uuid,
        targets: AssignmentTargets,
        actor: &CurrentUser,
    ) -> Result<AssignmentOutcome, ServiceError> {
        if targets.is_empty() {
            return Ok(AssignmentOutcome::nothing_assigned(user_id));
        }

        let db = &*self.db_pool;
        let txn = db.begin().await.map_err(ServiceError::DatabaseError)?;

        let assignee = UserEntity::find_by_id(user_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let mut assigned = Vec::new();

        if let Some(project_id) = targets.project_id {
            let project = ProjectEntity::find_by_id(project_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Project not found".to_string()))?;
            let name = project.name.clone();
            let mut active: ProjectActiveModel = project.into();
            active.assigned_user_id = Set(Some(user_id));
            active.assigned_by = Set(Some(actor.full_name.clone()));
            active
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            self.notify(
                &txn,
                user_id,
                Some(project_id),
                "Assigned to Project",
                format!(
                    "You have been assigned to project \"{}\" by {}.",
                    name, actor.full_name
                ),
                format!("/projects/{project_id}"),
                "View Project",
            )
            .await?;
            assigned.push(format!("project \"{name}\""));
        }

        if let Some(order_id) = targets.order_id {
            let order = OrderEntity::find_by_id(order_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
            let number = order.order_number.clone();
            let mut active: OrderActiveModel = order.into();
            active.assigned_user_id = Set(Some(user_id));
            active.assigned_by = Set(Some(actor.full_name.clone()));
            active
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            self.notify(
                &txn,
                user_id,
                None,
                "Assigned to Order",
                format!(
                    "You have been assigned to order \"{}\" by {}.",
                    number, actor.full_name
                ),
                format!("/orders/{order_id}"),
                "View Order",
            )
            .await?;
            assigned.push(format!("order \"{number}\""));
        }

        if let Some(shipment_id) = targets.shipment_id {
            let shipment = ShipmentEntity::find_by_id(shipment_id)
                .one(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?
                .ok_or_else(|| ServiceError::NotFound("Shipment not found".to_string()))?;
            let tracking = shipment.tracking_number.clone();
            let mut active: ShipmentActiveModel = shipment.into();
            active.assigned_user_id = Set(Some(user_id));
            active.assigned_by = Set(Some(actor.full_name.clone()));
            active
                .update(&txn)
                .await
                .map_err(ServiceError::DatabaseError)?;
            self.notify(
                &txn,
                user_id,
                None,
                "Assigned to Shipment",
                format!(
                    "You have been assigned to shipment \"{}\" by {}.",
                    tracking, actor.full_name
                ),
                format!("/shipments/{shipment_id}"),
                "View Shipment",
            )
            .await?;
            assigned.push(format!("shipment \"{tracking}\""));
        }

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            user_id = %user_id,
            username = %assignee.username,
            targets = ?assigned,
            "user assigned"
        );
        self.event_sender.emit(Event::UserAssigned {
            user_id,
            assigned_by: actor.full_name.clone(),
            project_id: targets.project_id,
            order_id: targets.order_id,
            shipment_id: targets.shipment_id,
        });
        Ok(AssignmentOutcome { user_id, assigned })
    }

    /// Lists what is assigned to `user_id` right now. Backs the
    /// caller's own overview, so there is no admin check.
    #[instrument(skip(self))]
    pub async fn assignments_for(&self, user_id: Uuid) -> Result<UserAssignments, ServiceError> {
        let db = &*self.db_pool;
        let projects = ProjectEntity::find()
            .filter(project::Column::AssignedUserId.eq(user_id))
            .order_by_asc(project::Column::Name)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let orders = OrderEntity::find()
            .filter(order::Column::AssignedUserId.eq(user_id))
            .order_by_asc(order::Column::OrderNumber)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        let shipments = ShipmentEntity::find()
            .filter(shipment::Column::AssignedUserId.eq(user_id))
            .order_by_asc(shipment::Column::TrackingNumber)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;
        Ok(UserAssignments {
            projects,
            orders,
            shipments,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn notify(
        &self,
        txn: &DatabaseTransaction,
        user_id: Uuid,
        project_id: Option<Uuid>,
        title: &str,
        message: String,
        action_url: String,
        action_button_text: &str,
    ) -> Result<(), ServiceError> {
        NotificationActiveModel {
            user_id: Set(user_id),
            project_id: Set(project_id),
            notification_type: Set("Assignment".to_string()),
            title: Set(title.to_string()),
            message: Set(message),
            action_url: Set(Some(action_url)),
            action_button_text: Set(Some(action_button_text.to_string())),
            is_read: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(ServiceError::DatabaseError)?;
        Ok(())
    }
}
