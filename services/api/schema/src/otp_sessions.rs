use sea_orm::entity::prelude::*;

/// Time-boxed container for one verification attempt cycle, keyed by
/// `(email, purpose)`. At most one row per key has `active = true`; old rows
/// are marked inactive on replacement and kept for audit.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub purpose: String,
    pub active: bool,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub attempt_count: i32,
    pub max_attempts: i32,
    pub lock_until: Option<chrono::DateTime<chrono::Utc>>,
    pub resend_count: i32,
    pub last_sent_at: chrono::DateTime<chrono::Utc>,
    pub last_attempt_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::otp_tokens::Entity")]
    OtpTokens,
}

impl Related<super::otp_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
