use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShipmentStatusHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShipmentStatusHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShipmentStatusHistory::ShipmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShipmentStatusHistory::Status)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShipmentStatusHistory::Location).string_len(255))
                    .col(
                        ColumnDef::new(ShipmentStatusHistory::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShipmentStatusHistory::Description).text())
                    .col(
                        ColumnDef::new(ShipmentStatusHistory::UpdateSource)
                            .string_len(20)
                            .not_null()
                            .default("Manual"),
                    )
                    .col(ColumnDef::new(ShipmentStatusHistory::UpdatedBy).string_len(255))
                    .col(
                        ColumnDef::new(ShipmentStatusHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipment_status_history_shipment")
                            .from(
                                ShipmentStatusHistory::Table,
                                ShipmentStatusHistory::ShipmentId,
                            )
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ShipmentStatusHistory::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum ShipmentStatusHistory {
    Table,
    Id,
    ShipmentId,
    Status,
    Location,
    Timestamp,
    Description,
    UpdateSource,
    UpdatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    Id,
}
