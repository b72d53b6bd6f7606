use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::domain::types::AuthContext;
use crate::error::ApiError;
use crate::handlers::request_context;
use crate::state::AppState;
use crate::usecase::change_password::{ChangePasswordInput, ChangePasswordUseCase};
use crate::usecase::forgot_password::ForgotPasswordUseCase;
use crate::usecase::reset_password::{ResetPasswordInput, ResetPasswordUseCase};

// ── POST /auth/forgot-password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct ForgotPasswordResponse {
    pub message: &'static str,
}

/// Always the same 200 body, whatever happened internally. Comparing
/// responses across emails must reveal nothing about which accounts exist.
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ForgotPasswordRequest>,
) -> impl IntoResponse {
    let ctx = request_context(&headers);
    let usecase = ForgotPasswordUseCase {
        users: state.user_repo(),
        otp: state.otp_repo(),
        log_otp_codes: state.log_otp_codes,
    };
    usecase.execute(&body.email, &ctx).await;

    Json(ForgotPasswordResponse {
        message: "If an account exists for that email, a reset code has been sent.",
    })
}

// ── POST /auth/reset-password ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct ResetPasswordResponse {
    pub reset: bool,
}

pub async fn reset_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
        otp: state.otp_repo(),
    };

    usecase
        .execute(
            ResetPasswordInput {
                email: body.email,
                code: body.code,
                new_password: body.new_password,
            },
            &ctx,
        )
        .await?;

    Ok(Json(ResetPasswordResponse { reset: true }))
}

// ── POST /auth/change-password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct ChangePasswordResponse {
    pub revoked_sessions: u64,
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ctx = request_context(&headers);
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };

    let out = usecase
        .execute(
            &auth,
            ChangePasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
            &ctx,
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(ChangePasswordResponse {
            revoked_sessions: out.revoked_sessions,
        }),
    ))
}
