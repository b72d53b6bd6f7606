use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::credentials::{
    generate_session_token, hash_session_token, token_last_four, verify_password,
};
use crate::domain::repository::UserRepository;
use crate::domain::types::{
    AuditEntry, MAX_LOGIN_ATTEMPTS, Organization, RequestContext, SESSION_TTL_DAYS, Session, User,
};
use crate::error::ApiError;

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub organization: Organization,
    pub permissions: Vec<String>,
    pub session_id: Uuid,
    pub session_expires_at: DateTime<Utc>,
    pub token_last_four: String,
    /// Plaintext bearer token, handed to the cookie layer and never stored.
    pub token: String,
}

/// Credential check plus lockout accounting. A wrong password and an
/// unknown email produce the same error so callers cannot probe which
/// accounts exist.
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    pub users: U,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub async fn execute(
        &self,
        input: LoginInput,
        ctx: &RequestContext,
    ) -> Result<LoginOutput, ApiError> {
        let email = input.email.trim().to_lowercase();

        // One query pulls the user with organization and flattened
        // permissions, so the success response needs no second round-trip.
        let Some(found) = self.users.find_for_login(&email).await? else {
            return Err(ApiError::InvalidCredentials);
        };
        let user = found.user;

        if !user.verified {
            return Err(ApiError::AccountNotVerified);
        }
        if user.is_locked {
            return Err(ApiError::AccountLocked);
        }
        if found.organization.deleted_at.is_some() {
            return Err(ApiError::OrganizationInactive);
        }

        if !verify_password(&input.password, &user.password_hash)? {
            let login_attempts = user.login_attempts + 1;
            let is_locked = login_attempts >= MAX_LOGIN_ATTEMPTS;
            let audit = AuditEntry::new(
                "auth.login_failed",
                ctx,
                json!({ "email": email, "login_attempts": login_attempts, "locked": is_locked }),
            )
            .with_user(user.id, user.organization_id);

            self.users
                .record_login_failure(user.id, login_attempts, is_locked, &audit)
                .await?;

            tracing::warn!(email = %email, login_attempts, locked = is_locked, "login failed");
            // Same error as the unknown-email path.
            return Err(ApiError::InvalidCredentials);
        }

        let now = Utc::now();
        let token = generate_session_token();
        let session = Session {
            id: Uuid::now_v7(),
            user_id: user.id,
            organization_id: user.organization_id,
            token_hash: hash_session_token(&token),
            token_last_four: token_last_four(&token),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            last_activity: now,
            expires_at: now + chrono::Duration::days(SESSION_TTL_DAYS),
            revoked_at: None,
            revoked_reason: None,
            created_at: now,
        };
        let audit = AuditEntry::new(
            "auth.login",
            ctx,
            json!({ "email": email, "session_id": session.id }),
        )
        .with_user(user.id, user.organization_id);

        self.users.complete_login(user.id, &session, &audit).await?;

        tracing::info!(email = %email, session_id = %session.id, "login succeeded");
        Ok(LoginOutput {
            session_id: session.id,
            session_expires_at: session.expires_at,
            token_last_four: session.token_last_four.clone(),
            token,
            user,
            organization: found.organization,
            permissions: found.permissions,
        })
    }
}
