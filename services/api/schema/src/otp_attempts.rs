use sea_orm::entity::prelude::*;

/// Append-only audit record of one OTP verification attempt.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_attempts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub session_id: Uuid,
    pub token_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub outcome: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
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
