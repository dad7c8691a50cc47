use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupplierPerformance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SupplierPerformance::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SupplierPerformance::SupplierId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SupplierPerformance::Period)
                            .string_len(7)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SupplierPerformance::OnTimeDeliveryRate).decimal_len(5, 2))
                    .col(ColumnDef::new(SupplierPerformance::QualityScore).decimal_len(5, 2))
                    .col(ColumnDef::new(SupplierPerformance::ResponsivenessScore).decimal_len(5, 2))
                    .col(ColumnDef::new(SupplierPerformance::OverallScore).decimal_len(5, 2))
                    .col(ColumnDef::new(SupplierPerformance::Notes).text())
                    .col(
                        ColumnDef::new(SupplierPerformance::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_supplier_performance_supplier")
                            .from(SupplierPerformance::Table, SupplierPerformance::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_supplier_performance_supplier_period")
                    .table(SupplierPerformance::Table)
                    .col(SupplierPerformance::SupplierId)
                    .col(SupplierPerformance::Period)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SupplierPerformance::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SupplierPerformance {
    Table,
    Id,
    SupplierId,
    Period,
    OnTimeDeliveryRate,
    QualityScore,
    ResponsivenessScore,
    OverallScore,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Suppliers {
    Table,
    Id,
}
