//! Session-authentication middleware.
//!
//! Pulls the bearer token from the session cookie, validates it through
//! [`AuthenticateSessionUseCase`], and attaches the resulting
//! [`AuthContext`] as a request extension. Terminal session errors clear
//! the cookie; recoverable account-state errors keep it.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use chrono::Utc;

use crate::cookie::{SESSION_COOKIE, clear_session_cookie};
use crate::domain::repository::SessionRepository;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::session::AuthenticateSessionUseCase;

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
        return reject(&state, ApiError::AuthenticationRequired, true);
    };

    let usecase = AuthenticateSessionUseCase {
        sessions: state.session_repo(),
    };
    let authed = match usecase.execute(&token).await {
        Ok(authed) => authed,
        Err(err) => {
            // A dead session cookie is useless; a valid session on an
            // unverified or locked account is recoverable, so it stays.
            let clear = matches!(
                err,
                ApiError::InvalidSession | ApiError::SessionRevoked | ApiError::SessionExpired
            );
            return reject(&state, err, clear);
        }
    };

    if authed.should_touch {
        // Fire-and-forget: a slow or failing activity write must never
        // delay or fail the request it rode in on.
        let sessions = state.session_repo();
        let session_id = authed.auth.session_id;
        tokio::spawn(async move {
            if let Err(err) = sessions.touch_activity(session_id, Utc::now()).await {
                tracing::warn!(
                    session_id = %session_id,
                    error = %err,
                    "session activity touch failed"
                );
            }
        });
    }

    request.extensions_mut().insert(authed.auth);
    next.run(request).await
}

fn reject(state: &AppState, err: ApiError, clear_cookie: bool) -> Response {
    if clear_cookie {
        let jar = clear_session_cookie(
            CookieJar::new(),
            state.cookie_domain.clone(),
            state.secure_cookies,
        );
        (jar, err).into_response()
    } else {
        err.into_response()
    }
}
