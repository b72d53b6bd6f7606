use sea_orm::entity::prelude::*;

/// Immutable audit record of a security-relevant transition. Written in the
/// same transaction as the mutation it describes; consumed by external
/// monitoring, never read back by the service.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub action: String,
    pub user_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub detail: Json,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
