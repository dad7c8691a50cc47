use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Shipments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Shipments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Shipments::OrderId).uuid().not_null())
                    .col(
                        ColumnDef::new(Shipments::TrackingNumber)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Shipments::Carrier).string_len(100))
                    .col(
                        ColumnDef::new(Shipments::CurrentStatus)
                            .string_len(50)
                            .not_null()
                            .default("Label Created"),
                    )
                    .col(ColumnDef::new(Shipments::CurrentLocation).string_len(255))
                    .col(ColumnDef::new(Shipments::EstimatedDeliveryDate).date())
                    .col(ColumnDef::new(Shipments::ActualDeliveryDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Shipments::LastStatusUpdate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Shipments::Origin).string_len(255))
                    .col(ColumnDef::new(Shipments::Destination).string_len(255))
                    .col(ColumnDef::new(Shipments::WeightKg).decimal_len(10, 2))
                    .col(ColumnDef::new(Shipments::Pieces).integer())
                    .col(ColumnDef::new(Shipments::AssignedUserId).uuid())
                    .col(ColumnDef::new(Shipments::AssignedBy).string_len(255))
                    .col(ColumnDef::new(Shipments::Notes).text())
                    .col(
                        ColumnDef::new(Shipments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Shipments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_order")
                            .from(Shipments::Table, Shipments::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shipments_assigned_user")
                            .from(Shipments::Table, Shipments::AssignedUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Shipments::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    Id,
    OrderId,
    TrackingNumber,
    Carrier,
    CurrentStatus,
    CurrentLocation,
    EstimatedDeliveryDate,
    ActualDeliveryDate,
    LastStatusUpdate,
    Origin,
    Destination,
    WeightKg,
    Pieces,
    AssignedUserId,
    AssignedBy,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
