use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cookie::{clear_session_cookie, set_session_cookie};
use crate::domain::repository::UserRepository;
use crate::domain::types::AuthContext;
use crate::error::ApiError;
use crate::handlers::request_context;
use crate::state::AppState;
use crate::usecase::login::{LoginInput, LoginUseCase};
use crate::usecase::register::{RegisterInput, RegisterUseCase};
use crate::usecase::resend_code::{ResendCodeUseCase, ResendOutput};
use crate::usecase::session::LogoutUseCase;
use crate::usecase::verify_email::{VerifyEmailInput, VerifyEmailUseCase};

// ── POST /auth/register ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub organization_name: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    #[serde(serialize_with = "clientele_core::serde::to_rfc3339_ms")]
    pub otp_expires_at: DateTime<Utc>,
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        organizations: state.organization_repo(),
        log_otp_codes: state.log_otp_codes,
    };

    let out = usecase
        .execute(
            RegisterInput {
                first_name: body.first_name,
                last_name: body.last_name,
                email: body.email,
                password: body.password,
                organization_name: body.organization_name,
            },
            &ctx,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            otp_expires_at: out.otp_expires_at,
        }),
    ))
}

// ── POST /auth/verify-email ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyEmailResponse {
    pub verified: bool,
}

pub async fn verify_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    let usecase = VerifyEmailUseCase {
        users: state.user_repo(),
        otp: state.otp_repo(),
    };

    usecase
        .execute(
            VerifyEmailInput {
                email: body.email,
                code: body.code,
            },
            &ctx,
        )
        .await?;

    Ok(Json(VerifyEmailResponse { verified: true }))
}

// ── POST /auth/resend-code ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendCodeRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct ResendCodeResponse {
    pub already_verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp_expires_at: Option<DateTime<Utc>>,
}

pub async fn resend_code(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ResendCodeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    let usecase = ResendCodeUseCase {
        users: state.user_repo(),
        otp: state.otp_repo(),
        log_otp_codes: state.log_otp_codes,
    };

    let body = match usecase.execute(&body.email, &ctx).await? {
        ResendOutput::AlreadyVerified => ResendCodeResponse {
            already_verified: true,
            otp_expires_at: None,
        },
        ResendOutput::Issued { otp_expires_at } => ResendCodeResponse {
            already_verified: false,
            otp_expires_at: Some(otp_expires_at),
        },
    };
    Ok(Json(body))
}

// ── POST /auth/login ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Serialize)]
pub struct LoginOrganization {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Serialize)]
pub struct LoginSession {
    pub id: Uuid,
    #[serde(serialize_with = "clientele_core::serde::to_rfc3339_ms")]
    pub expires_at: DateTime<Utc>,
    pub token_last_four: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub organization: LoginOrganization,
    pub permissions: Vec<String>,
    pub session: LoginSession,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    let usecase = LoginUseCase {
        users: state.user_repo(),
    };

    let out = usecase
        .execute(
            LoginInput {
                email: body.email,
                password: body.password,
            },
            &ctx,
        )
        .await?;

    let jar = set_session_cookie(
        jar,
        out.token,
        state.cookie_domain.clone(),
        state.secure_cookies,
    );

    let body = LoginResponse {
        user: LoginUser {
            id: out.user.id,
            email: out.user.email,
            first_name: out.user.first_name,
            last_name: out.user.last_name,
        },
        organization: LoginOrganization {
            id: out.organization.id,
            name: out.organization.name,
            slug: out.organization.slug,
        },
        permissions: out.permissions,
        session: LoginSession {
            id: out.session_id,
            expires_at: out.session_expires_at,
            token_last_four: out.token_last_four,
        },
    };
    Ok((StatusCode::OK, jar, Json(body)))
}

// ── DELETE /auth/session ──────────────────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    jar: CookieJar,
) -> impl IntoResponse {
    let ctx = request_context(&headers);
    let usecase = LogoutUseCase {
        sessions: state.session_repo(),
        audit: state.audit_repo(),
    };
    usecase.execute(&auth, &ctx).await;

    let jar = clear_session_cookie(jar, state.cookie_domain.clone(), state.secure_cookies);
    (StatusCode::NO_CONTENT, jar)
}

// ── GET /auth/me ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: Uuid,
    pub verified: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub permissions: Vec<String>,
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_repo();
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("authenticated user {} not found", auth.user_id))?;
    let permissions = users.load_permissions(auth.user_id).await?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        organization_id: user.organization_id,
        verified: user.verified,
        last_login_at: user.last_login_at,
        permissions,
    }))
}
