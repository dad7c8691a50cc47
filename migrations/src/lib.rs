pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_projects_table;
mod m20240101_000003_create_suppliers_table;
mod m20240101_000004_create_orders_table;
mod m20240101_000005_create_shipments_table;
mod m20240101_000006_create_shipment_status_history_table;
mod m20240101_000007_create_documents_table;
mod m20240101_000008_create_notifications_table;
mod m20240101_000009_create_audit_logs_table;
mod m20240101_000010_create_supplier_performance_table;
mod m20240101_000011_create_customs_entries_table;
mod m20240101_000012_create_cost_breakdowns_table;
mod m20240101_000013_create_system_settings_table;
mod m20240315_000014_add_tracking_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_projects_table::Migration),
            Box::new(m20240101_000003_create_suppliers_table::Migration),
            Box::new(m20240101_000004_create_orders_table::Migration),
            Box::new(m20240101_000005_create_shipments_table::Migration),
            Box::new(m20240101_000006_create_shipment_status_history_table::Migration),
            Box::new(m20240101_000007_create_documents_table::Migration),
            Box::new(m20240101_000008_create_notifications_table::Migration),
            Box::new(m20240101_000009_create_audit_logs_table::Migration),
            Box::new(m20240101_000010_create_supplier_performance_table::Migration),
            Box::new(m20240101_000011_create_customs_entries_table::Migration),
            Box::new(m20240101_000012_create_cost_breakdowns_table::Migration),
            Box::new(m20240101_000013_create_system_settings_table::Migration),
            Box::new(m20240315_000014_add_tracking_indexes::Migration),
        ]
    }
}
