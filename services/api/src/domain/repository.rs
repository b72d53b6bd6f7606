#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    AuditEntry, Client, OtpAttemptRecord, OtpPurpose, OtpSession, OtpToken, Organization, Session,
    SessionForAuth, User, UserForLogin,
};
use crate::error::ApiError;

/// Everything the registration composite writes in one transaction.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub organization: Organization,
    pub user: User,
    pub owner_role_id: Uuid,
    pub otp_session: OtpSession,
    pub otp_token: OtpToken,
    pub audit: AuditEntry,
}

/// Everything the password-reset success composite writes in one transaction.
#[derive(Debug, Clone)]
pub struct PasswordResetCompletion {
    pub user_id: Uuid,
    pub otp_session_id: Uuid,
    pub otp_token_id: Uuid,
    pub password_hash: String,
    /// Reset doubles as secondary verification for unverified accounts.
    pub newly_verified: bool,
    pub attempt: OtpAttemptRecord,
    pub audit: AuditEntry,
}

/// Repository for users and the composites that mutate them.
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;

    /// User plus organization plus flattened permission set, fetched in one
    /// repository call so the login response needs no second round-trip.
    async fn find_for_login(&self, email: &str) -> Result<Option<UserForLogin>, ApiError>;

    /// Flattened `resource:action` strings across all assigned roles.
    async fn load_permissions(&self, user_id: Uuid) -> Result<Vec<String>, ApiError>;

    /// Look up a seed role by name. `None` means the deployment is broken.
    async fn find_role_id(&self, name: &str) -> Result<Option<Uuid>, ApiError>;

    /// Registration composite: organization + user + OWNER role assignment +
    /// OTP session/token + audit row, atomically.
    async fn create_registration(&self, reg: &NewRegistration) -> Result<(), ApiError>;

    /// One failed login: persist the new attempt counter and lock flag in a
    /// single update, append the audit row.
    async fn record_login_failure(
        &self,
        user_id: Uuid,
        login_attempts: i32,
        is_locked: bool,
        audit: &AuditEntry,
    ) -> Result<(), ApiError>;

    /// Successful login: reset the attempt counter, set `last_login_at`,
    /// insert the new session, append the audit row — one transaction.
    async fn complete_login(
        &self,
        user_id: Uuid,
        session: &Session,
        audit: &AuditEntry,
    ) -> Result<(), ApiError>;

    /// Authenticated password change: update the hash, revoke every session
    /// for the user except `keep_session_id`, append the audit row. Returns
    /// the number of sibling sessions revoked.
    async fn change_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        keep_session_id: Uuid,
        audit: &AuditEntry,
    ) -> Result<u64, ApiError>;
}

/// Repository for organizations.
pub trait OrganizationRepository: Send + Sync {
    async fn slug_exists(&self, slug: &str) -> Result<bool, ApiError>;
}

/// Repository for OTP sessions, tokens and attempt audit rows.
pub trait OtpRepository: Send + Sync {
    /// The single session with `active = true` for this key, if any.
    async fn find_active_session(
        &self,
        email: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpSession>, ApiError>;

    /// Any session for this key — active or not — whose `lock_until` is in
    /// the future. Backs the global lock check that dominates per-session
    /// state.
    async fn find_locked_session(
        &self,
        email: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Result<Option<OtpSession>, ApiError>;

    /// Newest unconsumed token for a session; older rotated tokens are never
    /// considered.
    async fn find_latest_unconsumed_token(
        &self,
        session_id: Uuid,
    ) -> Result<Option<OtpToken>, ApiError>;

    /// One failed attempt: persist the new counter and (possibly) the lock
    /// timestamp on the session, append the attempt row.
    async fn record_failed_attempt(
        &self,
        session_id: Uuid,
        attempt_count: i32,
        lock_until: Option<DateTime<Utc>>,
        attempt: &OtpAttemptRecord,
    ) -> Result<(), ApiError>;

    /// Verification success composite: consume the token, deactivate the
    /// session, mark the user verified, append attempt + audit rows — one
    /// transaction.
    async fn complete_verification(
        &self,
        token_id: Uuid,
        session_id: Uuid,
        user_id: Uuid,
        attempt: &OtpAttemptRecord,
        audit: &AuditEntry,
    ) -> Result<(), ApiError>;

    /// Replace an expired session: mark the old one inactive, insert the new
    /// session + token, append an audit row linking old to new — one
    /// transaction.
    async fn replace_session(
        &self,
        old_session_id: Uuid,
        session: &OtpSession,
        token: &OtpToken,
        audit: &AuditEntry,
    ) -> Result<(), ApiError>;

    /// Fresh session + token where none existed for the key.
    async fn create_session(
        &self,
        session: &OtpSession,
        token: &OtpToken,
        audit: &AuditEntry,
    ) -> Result<(), ApiError>;

    /// Rotation: consume every unconsumed token in the session, insert the
    /// new token, bump `resend_count` and `last_sent_at`, append the attempt
    /// row — one transaction.
    async fn rotate_token(
        &self,
        session_id: Uuid,
        token: &OtpToken,
        resend_count: i32,
        last_sent_at: DateTime<Utc>,
        attempt: &OtpAttemptRecord,
    ) -> Result<(), ApiError>;

    /// Password-reset success composite: consume the token, deactivate the
    /// session, store the new password hash, clear the login lock and
    /// counter, mark the user verified if not already, revoke every session
    /// for the user, append attempt + audit rows — one transaction.
    async fn complete_password_reset(
        &self,
        completion: &PasswordResetCompletion,
    ) -> Result<(), ApiError>;
}

/// Repository for authentication sessions.
pub trait SessionRepository: Send + Sync {
    /// Session by token hash with the minimal joined user/organization
    /// fields needed for validation.
    async fn find_for_auth(&self, token_hash: &str) -> Result<Option<SessionForAuth>, ApiError>;

    /// Throttled activity write; fired off the critical path.
    async fn touch_activity(&self, session_id: Uuid, now: DateTime<Utc>) -> Result<(), ApiError>;

    async fn revoke(
        &self,
        session_id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ApiError>;
}

/// Append-only audit sink for transitions that happen outside a composite
/// (logout, permission denials).
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, entry: &AuditEntry) -> Result<(), ApiError>;
}

/// Repository for CRM client records. Every query is tenant-scoped.
pub trait ClientRepository: Send + Sync {
    /// List clients for an organization, optionally restricted to records
    /// created by one user (own-records scope), newest first.
    async fn list(
        &self,
        organization_id: Uuid,
        created_by: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<Vec<Client>, ApiError>;

    async fn create(&self, client: &Client) -> Result<(), ApiError>;
}
