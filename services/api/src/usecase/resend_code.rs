use chrono::{DateTime, Utc};
use serde_json::json;

use crate::credentials::{generate_otp, hash_otp};
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::types::{
    AuditEntry, OTP_MAX_RESENDS, OTP_RESEND_COOLDOWN_SECS, OtpAttemptOutcome, OtpAttemptRecord,
    OtpPurpose, OtpSession, OtpSessionState, OtpToken, RequestContext,
};
use crate::error::ApiError;

#[derive(Debug)]
pub enum ResendOutput {
    /// The account is already verified; nothing was issued.
    AlreadyVerified,
    /// A fresh code was issued, either by rotating the active session's
    /// token or by replacing an expired session outright.
    Issued { otp_expires_at: DateTime<Utc> },
}

/// Resend / token-rotation flow. The checks run strictly in order and the
/// outcomes are mutually exclusive; the lock check in particular must come
/// first so a caller can never shake off a lock by forcing the expired-
/// session replacement path.
pub struct ResendCodeUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    pub users: U,
    pub otp: T,
    pub log_otp_codes: bool,
}

impl<U, T> ResendCodeUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    pub async fn execute(
        &self,
        email: &str,
        ctx: &RequestContext,
    ) -> Result<ResendOutput, ApiError> {
        let email = email.trim().to_lowercase();
        let now = Utc::now();
        let purpose = OtpPurpose::EmailVerification;

        // 1. Global lock: any session for this email with a live lock blocks
        // the resend, active flag notwithstanding.
        if let Some(locked) = self.otp.find_locked_session(&email, purpose, now).await? {
            let until = locked
                .lock_until
                .ok_or_else(|| anyhow::anyhow!("locked session {} has no lock_until", locked.id))?;
            return Err(ApiError::OtpSessionLocked {
                retry_after_secs: (until - now).num_seconds().max(0),
            });
        }

        // 2. Idempotent no-op for verified accounts.
        if let Some(user) = self.users.find_by_email(&email).await? {
            if user.verified {
                return Ok(ResendOutput::AlreadyVerified);
            }
        }

        // 3. Nothing to resend against; the caller must register.
        let session = self
            .otp
            .find_active_session(&email, purpose)
            .await?
            .ok_or(ApiError::NoActiveOtpSession)?;

        match session.state(now) {
            // 4. Replace an expired session with a fresh one.
            OtpSessionState::Expired => {
                let code = generate_otp();
                let replacement = OtpSession::start(
                    session.user_id,
                    session.organization_id,
                    &email,
                    purpose,
                    now,
                );
                let token = OtpToken::issue(replacement.id, hash_otp(&code), now);
                let otp_expires_at = token.expires_at;
                let audit = AuditEntry::new(
                    "auth.otp_session_replaced",
                    ctx,
                    json!({
                        "email": email,
                        "old_session_id": session.id,
                        "new_session_id": replacement.id,
                    }),
                )
                .with_user(session.user_id, session.organization_id);

                self.otp
                    .replace_session(session.id, &replacement, &token, &audit)
                    .await?;

                if self.log_otp_codes {
                    tracing::info!(email = %email, code = %code, "verification code issued");
                }
                return Ok(ResendOutput::Issued { otp_expires_at });
            }
            // 5. Session-local lock (same error shape as the global check).
            OtpSessionState::Locked { until } => {
                return Err(ApiError::OtpSessionLocked {
                    retry_after_secs: (until - now).num_seconds().max(0),
                });
            }
            OtpSessionState::Inactive => return Err(ApiError::NoActiveOtpSession),
            OtpSessionState::Active => {}
        }

        // 6. Resend cap, independent of time elapsed.
        if session.resend_count >= OTP_MAX_RESENDS {
            return Err(ApiError::ResendLimitReached);
        }

        // 7. Cooldown since the last send.
        let elapsed = (now - session.last_sent_at).num_seconds();
        if elapsed < OTP_RESEND_COOLDOWN_SECS {
            return Err(ApiError::ResendCooldown {
                wait_secs: OTP_RESEND_COOLDOWN_SECS - elapsed,
            });
        }

        // 8. Rotate: retire every outstanding token, issue one fresh code.
        let code = generate_otp();
        let token = OtpToken::issue(session.id, hash_otp(&code), now);
        let otp_expires_at = token.expires_at;
        let attempt = OtpAttemptRecord::new(
            session.id,
            Some(token.id),
            Some(session.user_id),
            OtpAttemptOutcome::Rotated,
            ctx,
        );

        self.otp
            .rotate_token(session.id, &token, session.resend_count + 1, now, &attempt)
            .await?;

        if self.log_otp_codes {
            tracing::info!(email = %email, code = %code, "verification code issued");
        }
        Ok(ResendOutput::Issued { otp_expires_at })
    }
}
