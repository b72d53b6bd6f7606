use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpTokens::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpTokens::SessionId).uuid().not_null())
                    .col(ColumnDef::new(OtpTokens::CodeHash).string().not_null())
                    .col(ColumnDef::new(OtpTokens::CodeLength).integer().not_null())
                    .col(
                        ColumnDef::new(OtpTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpTokens::ConsumedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OtpTokens::Table, OtpTokens::SessionId)
                            .to(OtpSessions::Table, OtpSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpTokens::Table)
                    .col(OtpTokens::SessionId)
                    .name("idx_otp_tokens_session_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpTokens {
    Table,
    Id,
    SessionId,
    CodeHash,
    CodeLength,
    ExpiresAt,
    ConsumedAt,
    CreatedAt,
}

#[derive(Iden)]
enum OtpSessions {
    Table,
    Id,
}
