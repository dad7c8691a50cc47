pub mod status;

pub use status::{
    validate_order_transition, validate_shipment_transition, OrderStatus, ShipmentStatus,
    UpdateSource,
};
