use chrono::Utc;
use serde_json::json;

use crate::credentials::hash_session_token;
use crate::domain::repository::{AuditLogRepository, SessionRepository};
use crate::domain::types::{
    ACTIVITY_TOUCH_THRESHOLD_SECS, AuditEntry, AuthContext, RequestContext, SessionState,
};
use crate::error::ApiError;

#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedSession {
    pub auth: AuthContext,
    /// True when `last_activity` is stale enough to deserve a write. The
    /// caller fires that write off the critical path.
    pub should_touch: bool,
}

/// Per-request session validation. The checks run in a fixed order so the
/// most specific error wins: revocation before expiry, account state before
/// organization state.
pub struct AuthenticateSessionUseCase<S>
where
    S: SessionRepository,
{
    pub sessions: S,
}

impl<S> AuthenticateSessionUseCase<S>
where
    S: SessionRepository,
{
    pub async fn execute(&self, token: &str) -> Result<AuthenticatedSession, ApiError> {
        let now = Utc::now();
        let found = self
            .sessions
            .find_for_auth(&hash_session_token(token))
            .await?
            .ok_or(ApiError::InvalidSession)?;
        let session = &found.session;

        match session.state(now) {
            SessionState::Active => {}
            SessionState::Revoked => return Err(ApiError::SessionRevoked),
            SessionState::Expired => return Err(ApiError::SessionExpired),
        }

        // A session row pointing at a missing user or organization is
        // corrupted data, not a client mistake.
        let user = found
            .user
            .ok_or_else(|| anyhow::anyhow!("session {} references no user", session.id))?;
        if !user.verified {
            return Err(ApiError::EmailNotVerified);
        }
        if user.is_locked {
            return Err(ApiError::AccountLocked);
        }

        let organization = found.organization.ok_or_else(|| {
            anyhow::anyhow!("session {} references no organization", session.id)
        })?;
        if organization.deleted_at.is_some() {
            return Err(ApiError::OrganizationInactive);
        }

        let should_touch =
            (now - session.last_activity).num_seconds() > ACTIVITY_TOUCH_THRESHOLD_SECS;

        Ok(AuthenticatedSession {
            auth: AuthContext {
                user_id: session.user_id,
                session_id: session.id,
                organization_id: session.organization_id,
            },
            should_touch,
        })
    }
}

/// Logout never fails visibly: a client asking to be logged out gets a
/// success-shaped answer even if the revocation write blew up.
pub struct LogoutUseCase<S, A>
where
    S: SessionRepository,
    A: AuditLogRepository,
{
    pub sessions: S,
    pub audit: A,
}

impl<S, A> LogoutUseCase<S, A>
where
    S: SessionRepository,
    A: AuditLogRepository,
{
    pub async fn execute(&self, auth: &AuthContext, ctx: &RequestContext) {
        let now = Utc::now();
        if let Err(err) = self.sessions.revoke(auth.session_id, "logout", now).await {
            tracing::error!(session_id = %auth.session_id, error = %err, "logout revoke failed");
            return;
        }

        let entry = AuditEntry::new("auth.logout", ctx, json!({ "session_id": auth.session_id }))
            .with_user(auth.user_id, auth.organization_id);
        if let Err(err) = self.audit.append(&entry).await {
            tracing::warn!(session_id = %auth.session_id, error = %err, "logout audit failed");
        }
    }
}
