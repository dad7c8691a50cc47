use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Orders: status dashboards and per-project / per-supplier listings
        manager
            .create_index(
                Index::create()
                    .name("idx_orders_status")
                    .table(Orders::Table)
                    .col(Orders::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_project")
                    .table(Orders::Table)
                    .col(Orders::ProjectId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_supplier")
                    .table(Orders::Table)
                    .col(Orders::SupplierId)
                    .to_owned(),
            )
            .await?;

        // Shipments: per-order lookups and status filters
        manager
            .create_index(
                Index::create()
                    .name("idx_shipments_order")
                    .table(Shipments::Table)
                    .col(Shipments::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_shipments_status")
                    .table(Shipments::Table)
                    .col(Shipments::CurrentStatus)
                    .to_owned(),
            )
            .await?;

        // History timeline reads are always (shipment_id, timestamp)
        manager
            .create_index(
                Index::create()
                    .name("idx_shipment_history_shipment_ts")
                    .table(ShipmentStatusHistory::Table)
                    .col(ShipmentStatusHistory::ShipmentId)
                    .col(ShipmentStatusHistory::Timestamp)
                    .to_owned(),
            )
            .await?;

        // Unread-notification badge query
        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .col(Notifications::IsRead)
                    .to_owned(),
            )
            .await?;

        // Audit log is listed newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_audit_logs_timestamp")
                    .table(AuditLogs::Table)
                    .col((AuditLogs::Timestamp, IndexOrder::Desc))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_orders_status").table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_project").table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_orders_supplier").table(Orders::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_shipments_order").table(Shipments::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_shipments_status").table(Shipments::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_shipment_history_shipment_ts")
                    .table(ShipmentStatusHistory::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_notifications_user_read")
                    .table(Notifications::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_audit_logs_timestamp")
                    .table(AuditLogs::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Status,
    ProjectId,
    SupplierId,
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    OrderId,
    CurrentStatus,
}

#[derive(DeriveIden)]
enum ShipmentStatusHistory {
    Table,
    ShipmentId,
    Timestamp,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    UserId,
    IsRead,
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Timestamp,
}
