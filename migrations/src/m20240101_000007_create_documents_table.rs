use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Documents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Documents::ProjectId).uuid())
                    .col(ColumnDef::new(Documents::OrderId).uuid())
                    .col(ColumnDef::new(Documents::ShipmentId).uuid())
                    .col(ColumnDef::new(Documents::DocType).string_len(50).not_null())
                    .col(ColumnDef::new(Documents::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Documents::FileName).string_len(255).not_null())
                    .col(ColumnDef::new(Documents::ContentType).string_len(100))
                    .col(ColumnDef::new(Documents::UploadedBy).string_len(255))
                    .col(
                        ColumnDef::new(Documents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_project")
                            .from(Documents::Table, Documents::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_order")
                            .from(Documents::Table, Documents::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_documents_shipment")
                            .from(Documents::Table, Documents::ShipmentId)
                            .to(Shipments::Table, Shipments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    Id,
    ProjectId,
    OrderId,
    ShipmentId,
    DocType,
    Title,
    FileName,
    ContentType,
    UploadedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Orders {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Shipments {
    Table,
    Id,
}
