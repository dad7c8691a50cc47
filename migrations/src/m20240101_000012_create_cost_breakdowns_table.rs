use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CostBreakdowns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CostBreakdowns::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CostBreakdowns::OrderId).uuid().not_null())
                    .col(
                        ColumnDef::new(CostBreakdowns::CostType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CostBreakdowns::Description).string_len(255))
                    .col(
                        ColumnDef::new(CostBreakdowns::Amount)
                            .decimal_len(14, 2)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CostBreakdowns::Currency)
                            .string_len(3)
                            .not_null()
                            .default("QAR"),
                    )
                    .col(
                        ColumnDef::new(CostBreakdowns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cost_breakdowns_order")
                            .from(CostBreakdowns::Table, CostBreakdowns::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CostBreakdowns::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CostBreakdowns {
    Table,
    Id,
    OrderId,
    CostType,
    Description,
    Amount,
    Currency,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}
