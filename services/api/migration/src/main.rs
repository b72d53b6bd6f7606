use sea_orm_migration::prelude::*;

mod m20260801_000001_create_organizations;
mod m20260801_000002_create_users;
mod m20260801_000003_create_sessions;
mod m20260801_000004_create_otp_sessions;
mod m20260801_000005_create_otp_tokens;
mod m20260801_000006_create_otp_attempts;
mod m20260801_000007_create_rbac;
mod m20260801_000008_seed_roles;
mod m20260801_000009_create_audit_logs;
mod m20260801_000010_create_clients;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_organizations::Migration),
            Box::new(m20260801_000002_create_users::Migration),
            Box::new(m20260801_000003_create_sessions::Migration),
            Box::new(m20260801_000004_create_otp_sessions::Migration),
            Box::new(m20260801_000005_create_otp_tokens::Migration),
            Box::new(m20260801_000006_create_otp_attempts::Migration),
            Box::new(m20260801_000007_create_rbac::Migration),
            Box::new(m20260801_000008_seed_roles::Migration),
            Box::new(m20260801_000009_create_audit_logs::Migration),
            Box::new(m20260801_000010_create_clients::Migration),
        ]
    }
}

#[tokio::main]
async fn main() {
    cli::run_cli(Migrator).await;
}
