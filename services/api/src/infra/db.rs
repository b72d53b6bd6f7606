use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use clientele_api_schema::{
    audit_logs, clients, organizations, otp_attempts, otp_sessions, otp_tokens, permissions,
    role_permissions, roles, sessions, user_roles, users,
};

use crate::domain::repository::{
    AuditLogRepository, ClientRepository, NewRegistration, OrganizationRepository, OtpRepository,
    PasswordResetCompletion, SessionRepository, UserRepository,
};
use crate::domain::types::{
    AuditEntry, AuthOrgFlags, AuthUserFlags, Client, OtpAttemptRecord, OtpPurpose, OtpSession,
    OtpToken, Organization, Session, SessionForAuth, User, UserForLogin,
};
use crate::error::ApiError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_for_login(&self, email: &str) -> Result<Option<UserForLogin>, ApiError> {
        let Some((user, organization)) = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .find_also_related(organizations::Entity)
            .one(&self.db)
            .await
            .context("find user for login")?
        else {
            return Ok(None);
        };
        let organization = organization
            .ok_or_else(|| anyhow::anyhow!("user {} references no organization", user.id))?;
        let permissions = self.load_permissions(user.id).await?;
        Ok(Some(UserForLogin {
            user: user_from_model(user),
            organization: organization_from_model(organization),
            permissions,
        }))
    }

    async fn load_permissions(&self, user_id: Uuid) -> Result<Vec<String>, ApiError> {
        let role_ids: Vec<Uuid> = user_roles::Entity::find()
            .filter(user_roles::Column::UserId.eq(user_id))
            .all(&self.db)
            .await
            .context("load user roles")?
            .into_iter()
            .map(|m| m.role_id)
            .collect();
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let permission_ids: Vec<Uuid> = role_permissions::Entity::find()
            .filter(role_permissions::Column::RoleId.is_in(role_ids))
            .all(&self.db)
            .await
            .context("load role permissions")?
            .into_iter()
            .map(|m| m.permission_id)
            .collect();
        if permission_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = permissions::Entity::find()
            .filter(permissions::Column::Id.is_in(permission_ids))
            .all(&self.db)
            .await
            .context("load permissions")?
            .into_iter()
            .map(|m| m.name)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn find_role_id(&self, name: &str) -> Result<Option<Uuid>, ApiError> {
        let model = roles::Entity::find()
            .filter(roles::Column::Name.eq(name))
            .one(&self.db)
            .await
            .context("find role by name")?;
        Ok(model.map(|m| m.id))
    }

    async fn create_registration(&self, reg: &NewRegistration) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let reg = reg.clone();
                Box::pin(async move {
                    insert_organization(txn, &reg.organization).await?;
                    insert_user(txn, &reg.user).await?;
                    user_roles::ActiveModel {
                        user_id: Set(reg.user.id),
                        role_id: Set(reg.owner_role_id),
                    }
                    .insert(txn)
                    .await?;
                    insert_otp_session(txn, &reg.otp_session).await?;
                    insert_otp_token(txn, &reg.otp_token).await?;
                    insert_audit(txn, &reg.audit).await?;
                    Ok(())
                })
            })
            .await
            .context("create registration")?;
        Ok(())
    }

    async fn record_login_failure(
        &self,
        user_id: Uuid,
        login_attempts: i32,
        is_locked: bool,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let audit = audit.clone();
                Box::pin(async move {
                    users::ActiveModel {
                        id: Set(user_id),
                        login_attempts: Set(login_attempts),
                        is_locked: Set(is_locked),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_audit(txn, &audit).await?;
                    Ok(())
                })
            })
            .await
            .context("record login failure")?;
        Ok(())
    }

    async fn complete_login(
        &self,
        user_id: Uuid,
        session: &Session,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let session = session.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    users::ActiveModel {
                        id: Set(user_id),
                        login_attempts: Set(0),
                        last_login_at: Set(Some(now)),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_session(txn, &session).await?;
                    insert_audit(txn, &audit).await?;
                    Ok(())
                })
            })
            .await
            .context("complete login")?;
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        keep_session_id: Uuid,
        audit: &AuditEntry,
    ) -> Result<u64, ApiError> {
        let revoked = self
            .db
            .transaction::<_, u64, sea_orm::DbErr>(|txn| {
                let password_hash = password_hash.to_owned();
                let mut audit = audit.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    users::ActiveModel {
                        id: Set(user_id),
                        password_hash: Set(password_hash),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    let revoked =
                        revoke_sessions(txn, user_id, Some(keep_session_id), "password_change", now)
                            .await?;
                    // The revoked count is only known inside the transaction,
                    // so it lands in the audit detail here.
                    audit.detail["revoked_sessions"] = revoked.into();
                    insert_audit(txn, &audit).await?;
                    Ok(revoked)
                })
            })
            .await
            .context("change password")?;
        Ok(revoked)
    }
}

// ── Organization repository ───────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrganizationRepository {
    pub db: DatabaseConnection,
}

impl OrganizationRepository for DbOrganizationRepository {
    async fn slug_exists(&self, slug: &str) -> Result<bool, ApiError> {
        let count = organizations::Entity::find()
            .filter(organizations::Column::Slug.eq(slug))
            .count(&self.db)
            .await
            .context("count organizations by slug")?;
        Ok(count > 0)
    }
}

// ── OTP repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn find_active_session(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpSession>, ApiError> {
        let model = otp_sessions::Entity::find()
            .filter(otp_sessions::Column::Email.eq(email))
            .filter(otp_sessions::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_sessions::Column::Active.eq(true))
            .one(&self.db)
            .await
            .context("find active otp session")?;
        model.map(otp_session_from_model).transpose()
    }

    async fn find_locked_session(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpSession>, ApiError> {
        let model = otp_sessions::Entity::find()
            .filter(otp_sessions::Column::Email.eq(email))
            .filter(otp_sessions::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_sessions::Column::LockUntil.gt(now))
            .one(&self.db)
            .await
            .context("find locked otp session")?;
        model.map(otp_session_from_model).transpose()
    }

    async fn find_latest_unconsumed_token(
        &self,
        session_id: Uuid,
    ) -> Result<Option<OtpToken>, ApiError> {
        let model = otp_tokens::Entity::find()
            .filter(otp_tokens::Column::SessionId.eq(session_id))
            .filter(otp_tokens::Column::ConsumedAt.is_null())
            .order_by_desc(otp_tokens::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest unconsumed otp token")?;
        Ok(model.map(otp_token_from_model))
    }

    async fn record_failed_attempt(
        &self,
        session_id: Uuid,
        attempt_count: i32,
        lock_until: Option<DateTime<Utc>>,
        attempt: &OtpAttemptRecord,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let attempt = attempt.clone();
                Box::pin(async move {
                    let mut session = otp_sessions::ActiveModel {
                        id: Set(session_id),
                        attempt_count: Set(attempt_count),
                        last_attempt_at: Set(Some(Utc::now())),
                        ..Default::default()
                    };
                    // An absent lock leaves any stored value untouched.
                    if lock_until.is_some() {
                        session.lock_until = Set(lock_until);
                    }
                    session.update(txn).await?;
                    insert_otp_attempt(txn, &attempt).await?;
                    Ok(())
                })
            })
            .await
            .context("record failed otp attempt")?;
        Ok(())
    }

    async fn complete_verification(
        &self,
        token_id: Uuid,
        session_id: Uuid,
        user_id: Uuid,
        attempt: &OtpAttemptRecord,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let attempt = attempt.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    consume_token(txn, token_id, now).await?;
                    deactivate_session(txn, session_id).await?;
                    users::ActiveModel {
                        id: Set(user_id),
                        verified: Set(true),
                        verified_at: Set(Some(now)),
                        updated_at: Set(now),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_otp_attempt(txn, &attempt).await?;
                    insert_audit(txn, &audit).await?;
                    Ok(())
                })
            })
            .await
            .context("complete verification")?;
        Ok(())
    }

    async fn replace_session(
        &self,
        old_session_id: Uuid,
        session: &OtpSession,
        token: &OtpToken,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let session = session.clone();
                let token = token.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    deactivate_session(txn, old_session_id).await?;
                    insert_otp_session(txn, &session).await?;
                    insert_otp_token(txn, &token).await?;
                    insert_audit(txn, &audit).await?;
                    Ok(())
                })
            })
            .await
            .context("replace otp session")?;
        Ok(())
    }

    async fn create_session(
        &self,
        session: &OtpSession,
        token: &OtpToken,
        audit: &AuditEntry,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let session = session.clone();
                let token = token.clone();
                let audit = audit.clone();
                Box::pin(async move {
                    insert_otp_session(txn, &session).await?;
                    insert_otp_token(txn, &token).await?;
                    insert_audit(txn, &audit).await?;
                    Ok(())
                })
            })
            .await
            .context("create otp session")?;
        Ok(())
    }

    async fn rotate_token(
        &self,
        session_id: Uuid,
        token: &OtpToken,
        resend_count: i32,
        last_sent_at: DateTime<Utc>,
        attempt: &OtpAttemptRecord,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let token = token.clone();
                let attempt = attempt.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    otp_tokens::Entity::update_many()
                        .col_expr(otp_tokens::Column::ConsumedAt, Expr::value(now))
                        .filter(otp_tokens::Column::SessionId.eq(session_id))
                        .filter(otp_tokens::Column::ConsumedAt.is_null())
                        .exec(txn)
                        .await?;
                    insert_otp_token(txn, &token).await?;
                    otp_sessions::ActiveModel {
                        id: Set(session_id),
                        resend_count: Set(resend_count),
                        last_sent_at: Set(last_sent_at),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    insert_otp_attempt(txn, &attempt).await?;
                    Ok(())
                })
            })
            .await
            .context("rotate otp token")?;
        Ok(())
    }

    async fn complete_password_reset(
        &self,
        completion: &PasswordResetCompletion,
    ) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let c = completion.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    consume_token(txn, c.otp_token_id, now).await?;
                    deactivate_session(txn, c.otp_session_id).await?;
                    let mut user = users::ActiveModel {
                        id: Set(c.user_id),
                        password_hash: Set(c.password_hash.clone()),
                        login_attempts: Set(0),
                        is_locked: Set(false),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    if c.newly_verified {
                        user.verified = Set(true);
                        user.verified_at = Set(Some(now));
                    }
                    user.update(txn).await?;
                    // Full logout-everywhere: credential compromise is
                    // assumed, so no session survives.
                    revoke_sessions(txn, c.user_id, None, "password_reset", now).await?;
                    insert_otp_attempt(txn, &c.attempt).await?;
                    insert_audit(txn, &c.audit).await?;
                    Ok(())
                })
            })
            .await
            .context("complete password reset")?;
        Ok(())
    }
}

// ── Session repository ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbSessionRepository {
    pub db: DatabaseConnection,
}

impl SessionRepository for DbSessionRepository {
    async fn find_for_auth(&self, token_hash: &str) -> Result<Option<SessionForAuth>, ApiError> {
        let Some((session, user)) = sessions::Entity::find()
            .filter(sessions::Column::TokenHash.eq(token_hash))
            .find_also_related(users::Entity)
            .one(&self.db)
            .await
            .context("find session for auth")?
        else {
            return Ok(None);
        };
        let organization = organizations::Entity::find_by_id(session.organization_id)
            .one(&self.db)
            .await
            .context("find session organization")?;
        Ok(Some(SessionForAuth {
            session: session_from_model(session),
            user: user.map(|u| AuthUserFlags {
                verified: u.verified,
                is_locked: u.is_locked,
            }),
            organization: organization.map(|o| AuthOrgFlags {
                deleted_at: o.deleted_at,
            }),
        }))
    }

    async fn touch_activity(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<(), ApiError> {
        sessions::ActiveModel {
            id: Set(session_id),
            last_activity: Set(now),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("touch session activity")?;
        Ok(())
    }

    async fn revoke(
        &self,
        session_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError> {
        sessions::ActiveModel {
            id: Set(session_id),
            revoked_at: Set(Some(now)),
            revoked_reason: Set(Some(reason.to_owned())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("revoke session")?;
        Ok(())
    }
}

// ── Audit log repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuditLogRepository {
    pub db: DatabaseConnection,
}

impl AuditLogRepository for DbAuditLogRepository {
    async fn append(&self, entry: &AuditEntry) -> Result<(), ApiError> {
        audit_log_active_model(entry)
            .insert(&self.db)
            .await
            .context("append audit log")?;
        Ok(())
    }
}

// ── Client repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbClientRepository {
    pub db: DatabaseConnection,
}

impl ClientRepository for DbClientRepository {
    async fn list(
        &self,
        organization_id: Uuid,
        created_by: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<Vec<Client>, ApiError> {
        let mut query = clients::Entity::find()
            .filter(clients::Column::OrganizationId.eq(organization_id));
        if let Some(creator) = created_by {
            query = query.filter(clients::Column::CreatedBy.eq(creator));
        }
        let models = query
            .order_by_desc(clients::Column::CreatedAt)
            .offset((page - 1) * per_page)
            .limit(per_page)
            .all(&self.db)
            .await
            .context("list clients")?;
        Ok(models.into_iter().map(client_from_model).collect())
    }

    async fn create(&self, client: &Client) -> Result<(), ApiError> {
        clients::ActiveModel {
            id: Set(client.id),
            organization_id: Set(client.organization_id),
            created_by: Set(client.created_by),
            name: Set(client.name.clone()),
            email: Set(client.email.clone()),
            phone: Set(client.phone.clone()),
            company: Set(client.company.clone()),
            created_at: Set(client.created_at),
            updated_at: Set(client.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create client")?;
        Ok(())
    }
}

// ── Insert helpers ────────────────────────────────────────────────────────────

async fn insert_organization(
    txn: &DatabaseTransaction,
    organization: &Organization,
) -> Result<(), sea_orm::DbErr> {
    organizations::ActiveModel {
        id: Set(organization.id),
        name: Set(organization.name.clone()),
        slug: Set(organization.slug.clone()),
        deleted_at: Set(organization.deleted_at),
        created_at: Set(organization.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_user(txn: &DatabaseTransaction, user: &User) -> Result<(), sea_orm::DbErr> {
    users::ActiveModel {
        id: Set(user.id),
        email: Set(user.email.clone()),
        first_name: Set(user.first_name.clone()),
        last_name: Set(user.last_name.clone()),
        password_hash: Set(user.password_hash.clone()),
        verified: Set(user.verified),
        verified_at: Set(user.verified_at),
        is_locked: Set(user.is_locked),
        login_attempts: Set(user.login_attempts),
        last_login_at: Set(user.last_login_at),
        organization_id: Set(user.organization_id),
        created_at: Set(user.created_at),
        updated_at: Set(user.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_session(
    txn: &DatabaseTransaction,
    session: &Session,
) -> Result<(), sea_orm::DbErr> {
    sessions::ActiveModel {
        id: Set(session.id),
        user_id: Set(session.user_id),
        organization_id: Set(session.organization_id),
        token_hash: Set(session.token_hash.clone()),
        token_last_four: Set(session.token_last_four.clone()),
        ip_address: Set(session.ip_address.clone()),
        user_agent: Set(session.user_agent.clone()),
        last_activity: Set(session.last_activity),
        expires_at: Set(session.expires_at),
        revoked_at: Set(session.revoked_at),
        revoked_reason: Set(session.revoked_reason.clone()),
        created_at: Set(session.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_otp_session(
    txn: &DatabaseTransaction,
    session: &OtpSession,
) -> Result<(), sea_orm::DbErr> {
    otp_sessions::ActiveModel {
        id: Set(session.id),
        user_id: Set(session.user_id),
        organization_id: Set(session.organization_id),
        email: Set(session.email.clone()),
        purpose: Set(session.purpose.as_str().to_owned()),
        active: Set(session.active),
        expires_at: Set(session.expires_at),
        attempt_count: Set(session.attempt_count),
        max_attempts: Set(session.max_attempts),
        lock_until: Set(session.lock_until),
        resend_count: Set(session.resend_count),
        last_sent_at: Set(session.last_sent_at),
        last_attempt_at: Set(session.last_attempt_at),
        created_at: Set(session.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_otp_token(
    txn: &DatabaseTransaction,
    token: &OtpToken,
) -> Result<(), sea_orm::DbErr> {
    otp_tokens::ActiveModel {
        id: Set(token.id),
        session_id: Set(token.session_id),
        code_hash: Set(token.code_hash.clone()),
        code_length: Set(token.code_length),
        expires_at: Set(token.expires_at),
        consumed_at: Set(token.consumed_at),
        created_at: Set(token.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_otp_attempt(
    txn: &DatabaseTransaction,
    attempt: &OtpAttemptRecord,
) -> Result<(), sea_orm::DbErr> {
    otp_attempts::ActiveModel {
        id: Set(attempt.id),
        session_id: Set(attempt.session_id),
        token_id: Set(attempt.token_id),
        user_id: Set(attempt.user_id),
        outcome: Set(attempt.outcome.as_str().to_owned()),
        ip_address: Set(attempt.ip_address.clone()),
        user_agent: Set(attempt.user_agent.clone()),
        created_at: Set(attempt.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

async fn insert_audit(txn: &DatabaseTransaction, entry: &AuditEntry) -> Result<(), sea_orm::DbErr> {
    audit_log_active_model(entry).insert(txn).await?;
    Ok(())
}

fn audit_log_active_model(entry: &AuditEntry) -> audit_logs::ActiveModel {
    audit_logs::ActiveModel {
        id: Set(entry.id),
        action: Set(entry.action.clone()),
        user_id: Set(entry.user_id),
        organization_id: Set(entry.organization_id),
        detail: Set(entry.detail.clone()),
        ip_address: Set(entry.ip_address.clone()),
        user_agent: Set(entry.user_agent.clone()),
        created_at: Set(entry.created_at),
    }
}

async fn consume_token(
    txn: &DatabaseTransaction,
    token_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), sea_orm::DbErr> {
    otp_tokens::ActiveModel {
        id: Set(token_id),
        consumed_at: Set(Some(now)),
        ..Default::default()
    }
    .update(txn)
    .await?;
    Ok(())
}

async fn deactivate_session(
    txn: &DatabaseTransaction,
    session_id: Uuid,
) -> Result<(), sea_orm::DbErr> {
    otp_sessions::ActiveModel {
        id: Set(session_id),
        active: Set(false),
        ..Default::default()
    }
    .update(txn)
    .await?;
    Ok(())
}

/// Revoke every non-revoked session for a user, optionally sparing one.
/// Returns the number of rows touched.
async fn revoke_sessions(
    txn: &DatabaseTransaction,
    user_id: Uuid,
    keep_session_id: Option<Uuid>,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<u64, sea_orm::DbErr> {
    let mut update = sessions::Entity::update_many()
        .col_expr(sessions::Column::RevokedAt, Expr::value(now))
        .col_expr(sessions::Column::RevokedReason, Expr::value(reason))
        .filter(sessions::Column::UserId.eq(user_id))
        .filter(sessions::Column::RevokedAt.is_null());
    if let Some(keep) = keep_session_id {
        update = update.filter(sessions::Column::Id.ne(keep));
    }
    let result = update.exec(txn).await?;
    Ok(result.rows_affected)
}

// ── Model mappers ─────────────────────────────────────────────────────────────

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        first_name: model.first_name,
        last_name: model.last_name,
        password_hash: model.password_hash,
        verified: model.verified,
        verified_at: model.verified_at,
        is_locked: model.is_locked,
        login_attempts: model.login_attempts,
        last_login_at: model.last_login_at,
        organization_id: model.organization_id,
        created_at: model.created_at,
    }
}

fn organization_from_model(model: organizations::Model) -> Organization {
    Organization {
        id: model.id,
        name: model.name,
        slug: model.slug,
        deleted_at: model.deleted_at,
        created_at: model.created_at,
    }
}

fn session_from_model(model: sessions::Model) -> Session {
    Session {
        id: model.id,
        user_id: model.user_id,
        organization_id: model.organization_id,
        token_hash: model.token_hash,
        token_last_four: model.token_last_four,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        last_activity: model.last_activity,
        expires_at: model.expires_at,
        revoked_at: model.revoked_at,
        revoked_reason: model.revoked_reason,
        created_at: model.created_at,
    }
}

fn otp_session_from_model(model: otp_sessions::Model) -> Result<OtpSession, ApiError> {
    let purpose = OtpPurpose::parse(&model.purpose)
        .ok_or_else(|| anyhow::anyhow!("unknown otp purpose {:?}", model.purpose))?;
    Ok(OtpSession {
        id: model.id,
        user_id: model.user_id,
        organization_id: model.organization_id,
        email: model.email,
        purpose,
        active: model.active,
        expires_at: model.expires_at,
        attempt_count: model.attempt_count,
        max_attempts: model.max_attempts,
        lock_until: model.lock_until,
        resend_count: model.resend_count,
        last_sent_at: model.last_sent_at,
        last_attempt_at: model.last_attempt_at,
        created_at: model.created_at,
    })
}

fn otp_token_from_model(model: otp_tokens::Model) -> OtpToken {
    OtpToken {
        id: model.id,
        session_id: model.session_id,
        code_hash: model.code_hash,
        code_length: model.code_length,
        expires_at: model.expires_at,
        consumed_at: model.consumed_at,
        created_at: model.created_at,
    }
}

fn client_from_model(model: clients::Model) -> Client {
    Client {
        id: model.id,
        organization_id: model.organization_id,
        created_by: model.created_by,
        name: model.name,
        email: model.email,
        phone: model.phone,
        company: model.company,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
