use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API domain error variants.
///
/// Each variant carries a machine-readable `kind()` distinct from its HTTP
/// status so clients can branch on semantics. Security-sensitive flows
/// collapse distinct internal causes into one variant (`InvalidCredentials`
/// covers both unknown email and wrong password).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // Registration
    #[error("email already registered")]
    EmailAlreadyRegistered,
    #[error("email not verified")]
    EmailNotVerified,

    // Login
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account not verified")]
    AccountNotVerified,
    #[error("account locked")]
    AccountLocked,
    #[error("organization inactive")]
    OrganizationInactive,

    // OTP verification
    #[error("no active verification session")]
    NoActiveOtpSession,
    #[error("verification session expired")]
    OtpSessionExpired,
    #[error("verification session locked")]
    OtpSessionLocked { retry_after_secs: i64 },
    #[error("no valid code")]
    NoValidCode,
    #[error("code expired")]
    CodeExpired,
    #[error("invalid code")]
    InvalidCode { attempts_remaining: i32 },

    // Resend
    #[error("resend limit reached")]
    ResendLimitReached,
    #[error("resend cooldown in effect")]
    ResendCooldown { wait_secs: i64 },

    // Session / auth
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("invalid session")]
    InvalidSession,
    #[error("session revoked")]
    SessionRevoked,
    #[error("session expired")]
    SessionExpired,
    #[error("forbidden")]
    Forbidden,

    // Password change
    #[error("current password is incorrect")]
    InvalidCurrentPassword,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmailAlreadyRegistered => "EMAIL_ALREADY_REGISTERED",
            Self::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::OrganizationInactive => "ORGANIZATION_INACTIVE",
            Self::NoActiveOtpSession => "NO_ACTIVE_SESSION",
            Self::OtpSessionExpired => "OTP_SESSION_EXPIRED",
            Self::OtpSessionLocked { .. } => "SESSION_LOCKED",
            Self::NoValidCode => "NO_VALID_CODE",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::InvalidCode { .. } => "INVALID_CODE",
            Self::ResendLimitReached => "RESEND_LIMIT_REACHED",
            Self::ResendCooldown { .. } => "RESEND_COOLDOWN",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::InvalidSession => "INVALID_SESSION",
            Self::SessionRevoked => "SESSION_REVOKED",
            Self::SessionExpired => "SESSION_EXPIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidCurrentPassword => "INVALID_CURRENT_PASSWORD",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmailAlreadyRegistered => StatusCode::CONFLICT,
            Self::EmailNotVerified
            | Self::AccountNotVerified
            | Self::OrganizationInactive
            | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidCredentials
            | Self::AccountLocked
            | Self::AuthenticationRequired
            | Self::InvalidSession
            | Self::SessionRevoked
            | Self::SessionExpired => StatusCode::UNAUTHORIZED,
            Self::NoActiveOtpSession
            | Self::OtpSessionExpired
            | Self::NoValidCode
            | Self::CodeExpired
            | Self::InvalidCode { .. }
            | Self::InvalidCurrentPassword => StatusCode::BAD_REQUEST,
            Self::OtpSessionLocked { .. }
            | Self::ResendLimitReached
            | Self::ResendCooldown { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        match &self {
            Self::InvalidCode { attempts_remaining } => {
                body["attempts_remaining"] = (*attempts_remaining).into();
            }
            Self::OtpSessionLocked { retry_after_secs } => {
                body["retry_after_secs"] = (*retry_after_secs).into();
            }
            Self::ResendCooldown { wait_secs } => {
                body["wait_secs"] = (*wait_secs).into();
            }
            _ => {}
        }
        (status, axum::Json(body)).into_response()
    }
}
