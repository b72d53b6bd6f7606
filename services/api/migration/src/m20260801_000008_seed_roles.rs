use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Seed the system roles. Registration assigns OWNER to the first user of
/// every organization; a missing OWNER row is a deployment defect the
/// registration flow treats as fatal.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = chrono::Utc::now();

        let owner_role = Uuid::new_v4();
        let member_role = Uuid::new_v4();
        let perm_all = Uuid::new_v4();
        let perm_clients_read = Uuid::new_v4();
        let perm_clients_create = Uuid::new_v4();

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Roles::Table)
                    .columns([Roles::Id, Roles::Name, Roles::Description, Roles::CreatedAt])
                    .values_panic([
                        owner_role.into(),
                        "OWNER".into(),
                        "Full access to the organization".into(),
                        now.into(),
                    ])
                    .values_panic([
                        member_role.into(),
                        "MEMBER".into(),
                        "Access to own records".into(),
                        now.into(),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(Permissions::Table)
                    .columns([Permissions::Id, Permissions::Name, Permissions::CreatedAt])
                    .values_panic([perm_all.into(), "*:*".into(), now.into()])
                    .values_panic([perm_clients_read.into(), "clients:read".into(), now.into()])
                    .values_panic([
                        perm_clients_create.into(),
                        "clients:create".into(),
                        now.into(),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .exec_stmt(
                Query::insert()
                    .into_table(RolePermissions::Table)
                    .columns([RolePermissions::RoleId, RolePermissions::PermissionId])
                    .values_panic([owner_role.into(), perm_all.into()])
                    .values_panic([member_role.into(), perm_clients_read.into()])
                    .values_panic([member_role.into(), perm_clients_create.into()])
                    .to_owned(),
            )
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Roles::Table)
                    .and_where(Expr::col(Roles::Name).is_in(["OWNER", "MEMBER"]))
                    .to_owned(),
            )
            .await?;
        manager
            .exec_stmt(
                Query::delete()
                    .from_table(Permissions::Table)
                    .and_where(
                        Expr::col(Permissions::Name).is_in([
                            "*:*",
                            "clients:read",
                            "clients:create",
                        ]),
                    )
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
}

#[derive(Iden)]
enum Permissions {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum RolePermissions {
    Table,
    RoleId,
    PermissionId,
}
