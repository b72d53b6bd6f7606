use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Consecutive failed logins before the account locks. Login locks are
/// permanent until password reset — no time-based auto-unlock.
pub const MAX_LOGIN_ATTEMPTS: i32 = 5;

/// OTP code width in digits.
pub const OTP_LENGTH: i32 = 6;

/// OTP session lifetime in hours.
pub const OTP_SESSION_TTL_HOURS: i64 = 24;

/// OTP token (single code) lifetime in minutes.
pub const OTP_TOKEN_TTL_MINS: i64 = 15;

/// Failed verification attempts before the OTP session locks.
pub const OTP_MAX_ATTEMPTS: i32 = 5;

/// OTP session lock duration in minutes. Unlike login locks, OTP locks
/// auto-expire.
pub const OTP_LOCK_MINS: i64 = 15;

/// Maximum resends per OTP session, independent of time elapsed.
pub const OTP_MAX_RESENDS: i32 = 5;

/// Minimum seconds between resends for the same session.
pub const OTP_RESEND_COOLDOWN_SECS: i64 = 60;

/// Authentication session lifetime in days.
pub const SESSION_TTL_DAYS: i64 = 30;

/// Minimum seconds between `last_activity` writes for one session.
pub const ACTIVITY_TOUCH_THRESHOLD_SECS: i64 = 300;

/// Bounded retries for organization slug disambiguation.
pub const SLUG_MAX_RETRIES: usize = 5;

// ── Entities ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub verified: bool,
    pub verified_at: Option<DateTime<Utc>>,
    pub is_locked: bool,
    pub login_attempts: i32,
    pub last_login_at: Option<DateTime<Utc>>,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub token_hash: String,
    pub token_last_four: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub last_activity: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revoked_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Authentication session state at an instant. Revocation dominates expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    Revoked,
    Expired,
}

impl Session {
    pub fn state(&self, now: DateTime<Utc>) -> SessionState {
        if self.revoked_at.is_some() {
            SessionState::Revoked
        } else if self.expires_at <= now {
            SessionState::Expired
        } else {
            SessionState::Active
        }
    }
}

/// What an OTP session proves control of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpPurpose {
    EmailVerification,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailVerification => "EMAIL_VERIFICATION",
            Self::PasswordReset => "PASSWORD_RESET",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EMAIL_VERIFICATION" => Some(Self::EmailVerification),
            "PASSWORD_RESET" => Some(Self::PasswordReset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OtpSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub purpose: OtpPurpose,
    pub active: bool,
    pub expires_at: DateTime<Utc>,
    pub attempt_count: i32,
    pub max_attempts: i32,
    pub lock_until: Option<DateTime<Utc>>,
    pub resend_count: i32,
    pub last_sent_at: DateTime<Utc>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// OTP session state at an instant. A lock is temporary and clears itself
/// once `lock_until` passes; inactive and expired are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpSessionState {
    Active,
    Locked { until: DateTime<Utc> },
    Expired,
    Inactive,
}

impl OtpSession {
    /// Fresh 24-hour session for one verification cycle.
    pub fn start(
        user_id: Uuid,
        organization_id: Uuid,
        email: &str,
        purpose: OtpPurpose,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            organization_id,
            email: email.to_owned(),
            purpose,
            active: true,
            expires_at: now + chrono::Duration::hours(OTP_SESSION_TTL_HOURS),
            attempt_count: 0,
            max_attempts: OTP_MAX_ATTEMPTS,
            lock_until: None,
            resend_count: 0,
            last_sent_at: now,
            last_attempt_at: None,
            created_at: now,
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> OtpSessionState {
        if !self.active {
            OtpSessionState::Inactive
        } else if self.expires_at <= now {
            OtpSessionState::Expired
        } else if let Some(until) = self.lock_until {
            if until > now {
                OtpSessionState::Locked { until }
            } else {
                OtpSessionState::Active
            }
        } else {
            OtpSessionState::Active
        }
    }
}

#[derive(Debug, Clone)]
pub struct OtpToken {
    pub id: Uuid,
    pub session_id: Uuid,
    pub code_hash: String,
    pub code_length: i32,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpTokenState {
    Usable,
    Consumed,
    Expired,
}

impl OtpToken {
    /// Fresh 15-minute token holding the digest of one issued code.
    pub fn issue(session_id: Uuid, code_hash: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            session_id,
            code_hash,
            code_length: OTP_LENGTH,
            expires_at: now + chrono::Duration::minutes(OTP_TOKEN_TTL_MINS),
            consumed_at: None,
            created_at: now,
        }
    }

    pub fn state(&self, now: DateTime<Utc>) -> OtpTokenState {
        if self.consumed_at.is_some() {
            OtpTokenState::Consumed
        } else if self.expires_at <= now {
            OtpTokenState::Expired
        } else {
            OtpTokenState::Usable
        }
    }
}

/// Outcome tag for an append-only OTP attempt audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpAttemptOutcome {
    Success,
    Failure,
    Expired,
    Locked,
    Rotated,
}

impl OtpAttemptOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Expired => "EXPIRED",
            Self::Locked => "LOCKED",
            Self::Rotated => "ROTATED",
        }
    }
}

/// One OTP verification attempt, for forensic reconstruction.
#[derive(Debug, Clone)]
pub struct OtpAttemptRecord {
    pub id: Uuid,
    pub session_id: Uuid,
    pub token_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub outcome: OtpAttemptOutcome,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl OtpAttemptRecord {
    pub fn new(
        session_id: Uuid,
        token_id: Option<Uuid>,
        user_id: Option<Uuid>,
        outcome: OtpAttemptOutcome,
        ctx: &RequestContext,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            token_id,
            user_id,
            outcome,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: Utc::now(),
        }
    }
}

/// Immutable audit record of one security-relevant transition. Written in
/// the same transaction as the mutation it describes.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub action: String,
    pub user_id: Option<Uuid>,
    pub organization_id: Option<Uuid>,
    pub detail: serde_json::Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(action: &str, ctx: &RequestContext, detail: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.to_owned(),
            user_id: None,
            organization_id: None,
            detail,
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            created_at: Utc::now(),
        }
    }

    pub fn with_user(mut self, user_id: Uuid, organization_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self.organization_id = Some(organization_id);
        self
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ── Request-scoped values ────────────────────────────────────────────────────

/// Immutable per-request metadata passed once into every flow instead of
/// threading individual optional fields through each layer.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Minimal authenticated identity attached to a request after session
/// validation.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub organization_id: Uuid,
}

// ── Repository view structs ──────────────────────────────────────────────────

/// Full authorization context for the login flow, fetched in one repository
/// call so the response payload needs no second round-trip.
#[derive(Debug, Clone)]
pub struct UserForLogin {
    pub user: User,
    pub organization: Organization,
    pub permissions: Vec<String>,
}

/// Narrow user fields needed to validate a session.
#[derive(Debug, Clone, Copy)]
pub struct AuthUserFlags {
    pub verified: bool,
    pub is_locked: bool,
}

/// Narrow organization fields needed to validate a session.
#[derive(Debug, Clone, Copy)]
pub struct AuthOrgFlags {
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Session plus the minimal joined fields for per-request validation.
/// The user/organization references are optional so a dangling session can
/// be surfaced as a data-integrity error rather than a panic.
#[derive(Debug, Clone)]
pub struct SessionForAuth {
    pub session: Session,
    pub user: Option<AuthUserFlags>,
    pub organization: Option<AuthOrgFlags>,
}
