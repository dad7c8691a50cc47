use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Orders::OrderNumber)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Orders::PoNumber).string_len(100))
                    .col(ColumnDef::new(Orders::RfqNumber).string_len(100))
                    .col(ColumnDef::new(Orders::ProjectId).uuid())
                    .col(ColumnDef::new(Orders::SupplierId).uuid())
                    .col(ColumnDef::new(Orders::CreatedById).uuid())
                    .col(ColumnDef::new(Orders::Description).text().not_null())
                    .col(
                        ColumnDef::new(Orders::Quantity)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Orders::UnitPrice)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::TotalAmount)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Orders::Currency)
                            .string_len(3)
                            .not_null()
                            .default("QAR"),
                    )
                    .col(ColumnDef::new(Orders::OrderDate).date().not_null())
                    .col(ColumnDef::new(Orders::RequestedDeliveryDate).date())
                    .col(ColumnDef::new(Orders::PromisedDeliveryDate).date())
                    .col(ColumnDef::new(Orders::ActualDeliveryDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string_len(50)
                            .not_null()
                            .default("Draft"),
                    )
                    .col(ColumnDef::new(Orders::PreviousStatus).string_len(50))
                    .col(ColumnDef::new(Orders::StatusChangedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Orders::StatusChangedBy).string_len(255))
                    .col(
                        ColumnDef::new(Orders::Priority)
                            .string_len(20)
                            .not_null()
                            .default("Normal"),
                    )
                    .col(ColumnDef::new(Orders::AssignedUserId).uuid())
                    .col(ColumnDef::new(Orders::AssignedBy).string_len(255))
                    .col(ColumnDef::new(Orders::ShippingMethod).string_len(100))
                    .col(ColumnDef::new(Orders::Incoterm).string_len(20))
                    .col(ColumnDef::new(Orders::Notes).text())
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_project")
                            .from(Orders::Table, Orders::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_supplier")
                            .from(Orders::Table, Orders::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_created_by")
                            .from(Orders::Table, Orders::CreatedById)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_assigned_user")
                            .from(Orders::Table, Orders::AssignedUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
    OrderNumber,
    PoNumber,
    RfqNumber,
    ProjectId,
    SupplierId,
    CreatedById,
    Description,
    Quantity,
    UnitPrice,
    TotalAmount,
    Currency,
    OrderDate,
    RequestedDeliveryDate,
    PromisedDeliveryDate,
    ActualDeliveryDate,
    Status,
    PreviousStatus,
    StatusChangedAt,
    StatusChangedBy,
    Priority,
    AssignedUserId,
    AssignedBy,
    ShippingMethod,
    Incoterm,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Suppliers {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
