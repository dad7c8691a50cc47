use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Suppliers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Suppliers::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Suppliers::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Suppliers::Code)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Suppliers::ContactPerson).string_len(255))
                    .col(ColumnDef::new(Suppliers::ContactEmail).string_len(255))
                    .col(ColumnDef::new(Suppliers::ContactPhone).string_len(50))
                    .col(ColumnDef::new(Suppliers::Address).text())
                    .col(ColumnDef::new(Suppliers::Country).string_len(100))
                    .col(ColumnDef::new(Suppliers::Category).string_len(100))
                    .col(
                        ColumnDef::new(Suppliers::Status)
                            .string_len(50)
                            .not_null()
                            .default("Active"),
                    )
                    .col(ColumnDef::new(Suppliers::Rating).decimal_len(3, 1))
                    .col(ColumnDef::new(Suppliers::PaymentTerms).string_len(100))
                    .col(
                        ColumnDef::new(Suppliers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Suppliers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Suppliers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Suppliers {
    Table,
    Id,
    Name,
    Code,
    ContactPerson,
    ContactEmail,
    ContactPhone,
    Address,
    Country,
    Category,
    Status,
    Rating,
    PaymentTerms,
    CreatedAt,
    UpdatedAt,
}
