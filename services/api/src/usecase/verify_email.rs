use chrono::Utc;
use serde_json::json;

use crate::credentials::verify_otp;
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::types::{
    AuditEntry, OTP_LOCK_MINS, OtpAttemptOutcome, OtpAttemptRecord, OtpPurpose, OtpSessionState,
    OtpTokenState, RequestContext,
};
use crate::error::ApiError;

pub struct VerifyEmailInput {
    pub email: String,
    pub code: String,
}

/// Validates a submitted verification code against the single active OTP
/// session for the email, mutating only on the two defined write paths:
/// a failed comparison (counter + possible lock) and a success (the
/// consume/deactivate/verify composite).
pub struct VerifyEmailUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    pub users: U,
    pub otp: T,
}

impl<U, T> VerifyEmailUseCase<U, T>
where
    U: UserRepository,
    T: OtpRepository,
{
    pub async fn execute(
        &self,
        input: VerifyEmailInput,
        ctx: &RequestContext,
    ) -> Result<(), ApiError> {
        let email = input.email.trim().to_lowercase();
        let now = Utc::now();

        // Already verified is a success, not an error, and must not touch
        // any OTP row.
        let user = self.users.find_by_email(&email).await?;
        if let Some(user) = &user {
            if user.verified {
                return Ok(());
            }
        }

        let session = self
            .otp
            .find_active_session(&email, OtpPurpose::EmailVerification)
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
            // find_active_session only returns active-flagged rows.
            OtpSessionState::Inactive => return Err(ApiError::NoActiveOtpSession),
        }

        let token = self
            .otp
            .find_latest_unconsumed_token(session.id)
            .await?
            .ok_or(ApiError::NoValidCode)?;

        // Token expiry is independent of session expiry: a 15-minute code
        // inside a 24-hour session.
        if token.state(now) == OtpTokenState::Expired {
            return Err(ApiError::CodeExpired);
        }

        if !verify_otp(&input.code, &token.code_hash) {
            let attempt_count = session.attempt_count + 1;
            // Lock without resetting the counter, so the count survives for
            // forensics.
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
                "verification code mismatch"
            );
            return Err(ApiError::InvalidCode {
                attempts_remaining: (session.max_attempts - attempt_count).max(0),
            });
        }

        let attempt = OtpAttemptRecord::new(
            session.id,
            Some(token.id),
            Some(session.user_id),
            OtpAttemptOutcome::Success,
            ctx,
        );
        let audit = AuditEntry::new("auth.verify_email", ctx, json!({ "email": email }))
            .with_user(session.user_id, session.organization_id);

        self.otp
            .complete_verification(token.id, session.id, session.user_id, &attempt, &audit)
            .await?;

        tracing::info!(email = %email, "email verified");
        Ok(())
    }
}
