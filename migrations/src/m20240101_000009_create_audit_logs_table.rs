use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // user_id is a snapshot, deliberately without a foreign key: audit rows
        // must survive deletion of the user they describe.
        manager
            .create_table(
                Table::create()
                    .table(AuditLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AuditLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AuditLogs::UserId).uuid())
                    .col(ColumnDef::new(AuditLogs::Username).string_len(80))
                    .col(ColumnDef::new(AuditLogs::UserRole).string_len(20))
                    .col(ColumnDef::new(AuditLogs::Action).string_len(100).not_null())
                    .col(ColumnDef::new(AuditLogs::EntityType).string_len(50))
                    .col(ColumnDef::new(AuditLogs::EntityId).string_len(100))
                    .col(ColumnDef::new(AuditLogs::Description).text())
                    .col(ColumnDef::new(AuditLogs::IpAddress).string_len(64))
                    .col(ColumnDef::new(AuditLogs::UserAgent).string_len(500))
                    .col(
                        ColumnDef::new(AuditLogs::Level)
                            .string_len(20)
                            .not_null()
                            .default("info"),
                    )
                    .col(
                        ColumnDef::new(AuditLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AuditLogs {
    Table,
    Id,
    UserId,
    Username,
    UserRole,
    Action,
    EntityType,
    EntityId,
    Description,
    IpAddress,
    UserAgent,
    Level,
    Timestamp,
}
