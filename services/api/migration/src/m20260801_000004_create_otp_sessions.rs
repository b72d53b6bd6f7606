use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OtpSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OtpSessions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OtpSessions::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(OtpSessions::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpSessions::Email).string().not_null())
                    .col(ColumnDef::new(OtpSessions::Purpose).string().not_null())
                    .col(
                        ColumnDef::new(OtpSessions::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(OtpSessions::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OtpSessions::AttemptCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpSessions::MaxAttempts)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpSessions::LockUntil).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpSessions::ResendCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(OtpSessions::LastSentAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(OtpSessions::LastAttemptAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(OtpSessions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(OtpSessions::Table)
                    .col(OtpSessions::Email)
                    .col(OtpSessions::Purpose)
                    .name("idx_otp_sessions_email_purpose")
                    .to_owned(),
            )
            .await?;

        // The application enforces at-most-one active session per
        // (email, purpose) by mark-inactive-then-create; this partial unique
        // index closes the race window between concurrent replacements.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX uniq_otp_sessions_active_email_purpose \
                 ON otp_sessions (email, purpose) WHERE active",
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OtpSessions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum OtpSessions {
    Table,
    Id,
    UserId,
    OrganizationId,
    Email,
    Purpose,
    Active,
    ExpiresAt,
    AttemptCount,
    MaxAttempts,
    LockUntil,
    ResendCount,
    LastSentAt,
    LastAttemptAt,
    CreatedAt,
}
