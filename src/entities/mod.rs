//! SeaORM entities for the FusionFlow data model.
//!
//! Every table keyed by a UUID v4 primary key assigned in
//! `ActiveModelBehavior::before_save` so callers never have to
//! allocate ids themselves.

pub mod audit_log;
pub mod cost_breakdown;
pub mod customs_entry;
pub mod document;
pub mod notification;
pub mod order;
pub mod project;
pub mod shipment;
pub mod shipment_status_history;
pub mod supplier;
pub mod supplier_performance;
pub mod system_setting;
pub mod user;
