//! In-process domain events.
//!
//! Services push an [`Event`] onto an mpsc channel after their database
//! work has committed; [`process_events`] runs as a background task and
//! writes each one to the structured log. Event delivery is best effort:
//! a full or closed channel never fails the request that produced the
//! event.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Everything of interest that happens to the domain model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated {
        order_id: Uuid,
        order_number: String,
    },
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
        changed_by: String,
    },
    OrderDeleted(Uuid),
    ShipmentCreated {
        shipment_id: Uuid,
        order_id: Uuid,
        tracking_number: String,
    },
    ShipmentStatusChanged {
        shipment_id: Uuid,
        old_status: String,
        new_status: String,
        source: String,
    },
    ShipmentDelivered {
        shipment_id: Uuid,
        delivered_at: DateTime<Utc>,
    },
    UserAssigned {
        user_id: Uuid,
        assigned_by: String,
        project_id: Option<Uuid>,
        order_id: Option<Uuid>,
        shipment_id: Option<Uuid>,
    },
    ProjectCreated(Uuid),
    SupplierCreated(Uuid),
    CustomsCleared {
        customs_entry_id: Uuid,
        shipment_id: Uuid,
    },
    UserLoggedIn(Uuid),
}

/// Cloneable handle the services use to emit events.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Emits an event without blocking the caller. Dropped events are
    /// logged and otherwise ignored.
    pub fn emit(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            warn!(error = %e, "event channel full or closed, event dropped");
        }
    }
}

/// Creates the event channel and its logging consumer. The returned
/// sender goes into `AppState`; the join handle is kept so shutdown can
/// await the consumer draining.
pub fn spawn_event_logger(capacity: usize) -> (EventSender, tokio::task::JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity);
    let handle = tokio::spawn(process_events(rx));
    (EventSender::new(tx), handle)
}

/// Consumes events until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("event consumer started");
    while let Some(event) = rx.recv().await {
        match &event {
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
                changed_by,
            } => {
                info!(
                    %order_id,
                    old_status,
                    new_status,
                    changed_by,
                    "order status changed"
                );
            }
            Event::ShipmentStatusChanged {
                shipment_id,
                old_status,
                new_status,
                source,
            } => {
                info!(
                    %shipment_id,
                    old_status,
                    new_status,
                    source,
                    "shipment status changed"
                );
            }
            Event::UserAssigned {
                user_id,
                assigned_by,
                ..
            } => {
                info!(%user_id, assigned_by, "user assigned");
            }
            other => {
                info!(event = ?other, "domain event");
            }
        }
    }
    info!("event consumer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emit_is_non_blocking_and_consumer_receives() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);
        sender.emit(Event::OrderDeleted(Uuid::new_v4()));
        let received = rx.recv().await;
        assert!(matches!(received, Some(Event::OrderDeleted(_))));
    }

    #[tokio::test]
    async fn full_channel_drops_event_without_error() {
        let (tx, _rx) = mpsc::channel(1);
        let sender = EventSender::new(tx);
        sender.emit(Event::ProjectCreated(Uuid::new_v4()));
        // Second emit hits a full channel; it must not panic or block.
        sender.emit(Event::ProjectCreated(Uuid::new_v4()));
    }
}
