use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpAttempts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpAttempts::SessionId).uuid().not_null())
                    .col(ColumnDef::new(OtpAttempts::TokenId).uuid())
                    .col(ColumnDef::new(OtpAttempts::UserId).uuid())
                    .col(ColumnDef::new(OtpAttempts::Outcome).string().not_null())
                    .col(ColumnDef::new(OtpAttempts::IpAddress).string())
                    .col(ColumnDef::new(OtpAttempts::UserAgent).string())
                    .col(
                        ColumnDef::new(OtpAttempts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpAttempts::Table, OtpAttempts::SessionId)
                            .to(OtpSessions::Table, OtpSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpAttempts::Table)
                    .col(OtpAttempts::SessionId)
                    .name("idx_otp_attempts_session_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpAttempts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpAttempts {
    Table,
    Id,
    SessionId,
    TokenId,
    UserId,
    Outcome,
    IpAddress,
    UserAgent,
    CreatedAt,
}

#[derive(Iden)]
enum OtpSessions {
    Table,
    Id,
}
