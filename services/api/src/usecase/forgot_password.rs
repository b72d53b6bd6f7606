use chrono::Utc;
use serde_json::json;

use crate::credentials::{generate_otp, hash_otp};
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::types::{
    AuditEntry, OTP_MAX_RESENDS, OTP_RESEND_COOLDOWN_SECS, OtpAttemptOutcome, OtpAttemptRecord,
    OtpPurpose, OtpSession, OtpSessionState, OtpToken, RequestContext,
};
use crate::error::ApiError;

/// Which internal branch a forgot-password call took. Logged for operators;
/// the HTTP response is identical for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForgotBranch {
    UnknownEmail,
    GloballyLocked,
    SessionLocked,
    ResendCapped,
    CoolingDown,
    Replaced,
    Rotated,
    Created,
}

/// Initiates a password reset. Enumeration-safe by construction: every
/// branch, including internal failure, collapses to the same success-shaped
/// response. Unverified accounts may initiate too — reset doubles as a
/// secondary recovery path.
pub struct ForgotPasswordUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    pub users: U,
    pub otp: T,
    pub log_otp_codes: bool,
}

impl<U, T> ForgotPasswordUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    /// Never fails visibly. Internal errors are logged at error level and
    /// swallowed; the caller always renders the generic acknowledgement.
    pub async fn execute(&self, email: &str, ctx: &RequestContext) {
        let email = email.trim().to_lowercase();
        match self.initiate(&email, ctx).await {
            Ok(branch) => {
                tracing::info!(email = %email, branch = ?branch, "password reset initiated");
            }
            Err(err) => {
                tracing::error!(email = %email, error = %err, "password reset initiation failed");
            }
        }
    }

    async fn initiate(
        &self,
        email: &str,
        ctx: &RequestContext,
    ) -> Result<ForgotBranch, ApiError> {
        let now = Utc::now();
        let purpose = OtpPurpose::PasswordReset;

        // User existence is checked before the lock, unlike resend; the
        // generic response hides the difference either way.
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(ForgotBranch::UnknownEmail);
        };

        if self
            .otp
            .find_locked_session(email, purpose, now)
            .await?
            .is_some()
        {
            return Ok(ForgotBranch::GloballyLocked);
        }

        let existing = self.otp.find_active_session(email, purpose).await?;
        let code = generate_otp();

        let (branch, otp_expires_at) = match existing {
            Some(session) => match session.state(now) {
                OtpSessionState::Expired => {
                    let replacement =
                        OtpSession::start(user.id, user.organization_id, email, purpose, now);
                    let token = OtpToken::issue(replacement.id, hash_otp(&code), now);
                    let expires = token.expires_at;
                    let audit = AuditEntry::new(
                        "auth.forgot_password",
                        ctx,
                        json!({
                            "email": email,
                            "old_session_id": session.id,
                            "new_session_id": replacement.id,
                        }),
                    )
                    .with_user(user.id, user.organization_id);
                    self.otp
                        .replace_session(session.id, &replacement, &token, &audit)
                        .await?;
                    (ForgotBranch::Replaced, expires)
                }
                OtpSessionState::Locked { .. } => return Ok(ForgotBranch::SessionLocked),
                // find_active_session only returns active-flagged rows.
                OtpSessionState::Inactive => return Err(ApiError::NoActiveOtpSession),
                OtpSessionState::Active => {
                    if session.resend_count >= OTP_MAX_RESENDS {
                        return Ok(ForgotBranch::ResendCapped);
                    }
                    if (now - session.last_sent_at).num_seconds() < OTP_RESEND_COOLDOWN_SECS {
                        return Ok(ForgotBranch::CoolingDown);
                    }
                    let token = OtpToken::issue(session.id, hash_otp(&code), now);
                    let expires = token.expires_at;
                    let attempt = OtpAttemptRecord::new(
                        session.id,
                        Some(token.id),
                        Some(user.id),
                        OtpAttemptOutcome::Rotated,
                        ctx,
                    );
                    self.otp
                        .rotate_token(session.id, &token, session.resend_count + 1, now, &attempt)
                        .await?;
                    (ForgotBranch::Rotated, expires)
                }
            },
            None => {
                let session = OtpSession::start(user.id, user.organization_id, email, purpose, now);
                let token = OtpToken::issue(session.id, hash_otp(&code), now);
                let expires = token.expires_at;
                let audit = AuditEntry::new(
                    "auth.forgot_password",
                    ctx,
                    json!({ "email": email, "session_id": session.id }),
                )
                .with_user(user.id, user.organization_id);
                self.otp.create_session(&session, &token, &audit).await?;
                (ForgotBranch::Created, expires)
            }
        };

        if self.log_otp_codes {
            tracing::info!(
                email = %email,
                code = %code,
                expires_at = %otp_expires_at,
                "password reset code issued"
            );
        }
        Ok(branch)
    }
}
