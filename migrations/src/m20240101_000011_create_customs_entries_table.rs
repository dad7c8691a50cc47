use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomsEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomsEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CustomsEntries::ShipmentId).uuid().not_null())
                    .col(ColumnDef::new(CustomsEntries::EntryNumber).string_len(100))
                    .col(
                        ColumnDef::new(CustomsEntries::Status)
                            .string_len(50)
                            .not_null()
                            .default("Pending"),
                    )
                    .col(ColumnDef::new(CustomsEntries::Broker).string_len(255))
                    .col(ColumnDef::new(CustomsEntries::SubmittedDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(CustomsEntries::ClearedDate).timestamp_with_time_zone())
                    .col(ColumnDef::new(CustomsEntries::DutyAmount).decimal_len(14, 2))
                    .col(ColumnDef::new(CustomsEntries::Notes).text())
                    .col(
                        ColumnDef::new(CustomsEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomsEntries::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customs_entries_shipment")
                            .from(CustomsEntries::Table, CustomsEntries::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomsEntries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CustomsEntries {
    Table,
    Id,
    ShipmentId,
    EntryNumber,
    Status,
    Broker,
    SubmittedDate,
    ClearedDate,
    DutyAmount,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    Id,
}
