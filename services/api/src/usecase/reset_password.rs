use chrono::Utc;
use serde_json::json;

use crate::credentials::{hash_password, verify_otp};
use crate::domain::repository::{OtpRepository, PasswordResetCompletion, UserRepository};
use crate::domain::types::{
    AuditEntry, OTP_LOCK_MINS, OtpAttemptOutcome, OtpAttemptRecord, OtpPurpose, OtpSessionState,
    OtpTokenState, RequestContext,
};
use crate::error::ApiError;

pub struct ResetPasswordInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Completes a password reset with an OTP. The validation skeleton mirrors
/// email verification; the success path assumes credential compromise and
/// revokes every session for the user, including the one that asked.
pub struct ResetPasswordUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    pub users: U,
    pub otp: T,
}

impl<U, T> ResetPasswordUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    pub async fn execute(
        &self,
        input: ResetPasswordInput,
        ctx: &RequestContext,
    ) -> Result<(), ApiError> {
        let email = input.email.trim().to_lowercase();
        let now = Utc::now();

        let session = self
            .otp
            .find_active_session(&email, OtpPurpose::PasswordReset)
            .await?
            .ok_or(ApiError::NoActiveOtpSession)?;

        match session.state(now) {
            OtpSessionState::Active => {}
            OtpSessionState::Expired => return Err(ApiError::OtpSessionExpired),
            OtpSessionState::Locked { until } => {
                return Err(ApiError::OtpSessionLocked {
                    retry_after_secs: (until - now).num_seconds().max(0),
                });
            }
            OtpSessionState::Inactive => return Err(ApiError::NoActiveOtpSession),
        }

        let token = self
            .otp
            .find_latest_unconsumed_token(session.id)
            .await?
            .ok_or(ApiError::NoValidCode)?;

        if token.state(now) == OtpTokenState::Expired {
            return Err(ApiError::CodeExpired);
        }

        if !verify_otp(&input.code, &token.code_hash) {
            let attempt_count = session.attempt_count + 1;
            let lock_until = (attempt_count >= session.max_attempts)
                .then(|| now + chrono::Duration::minutes(OTP_LOCK_MINS));
            let attempt = OtpAttemptRecord::new(
                session.id,
                Some(token.id),
                Some(session.user_id),
                OtpAttemptOutcome::Failure,
                ctx,
            );
            self.otp
                .record_failed_attempt(session.id, attempt_count, lock_until, &attempt)
                .await?;
            tracing::warn!(
                email = %email,
                attempt_count,
                locked = lock_until.is_some(),
                "reset code mismatch"
            );
            return Err(ApiError::InvalidCode {
                attempts_remaining: (session.max_attempts - attempt_count).max(0),
            });
        }

        let user = self
            .users
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("otp session {} references no user", session.id))?;

        let password_hash = hash_password(&input.new_password)?;
        let newly_verified = !user.verified;
        let attempt = OtpAttemptRecord::new(
            session.id,
            Some(token.id),
            Some(user.id),
            OtpAttemptOutcome::Success,
            ctx,
        );
        let audit = AuditEntry::new(
            "auth.reset_password",
            ctx,
            json!({
                "email": email,
                "was_locked": user.is_locked,
                "login_attempts_before": user.login_attempts,
                "newly_verified": newly_verified,
            }),
        )
        .with_user(user.id, user.organization_id);

        self.otp
            .complete_password_reset(&PasswordResetCompletion {
                user_id: user.id,
                otp_session_id: session.id,
                otp_token_id: token.id,
                password_hash,
                newly_verified,
                attempt,
                audit,
            })
            .await?;

        tracing::info!(email = %email, "password reset completed");
        Ok(())
    }
}
