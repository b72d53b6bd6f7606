use sea_orm::entity::prelude::*;

/// One issued OTP code, child of exactly one otp_session. Stores the SHA-256
/// hex digest of the numeric code, never the code itself.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub code_hash: String,
    pub code_length: i32,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub consumed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::otp_sessions::Entity",
        from = "Column::SessionId",
        to = "super::otp_sessions::Column::Id"
    )]
    OtpSession,
}

impl Related<super::otp_sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpSession.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
