use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use clientele_core::health::{healthz, readyz};
use clientele_core::middleware::request_id_layer;

use crate::handlers::{
    auth::{login, logout, me, register, resend_code, verify_email},
    client::{create_client, list_clients},
    password::{change_password, forgot_password, reset_password},
};
use crate::middleware::require_auth;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/session", delete(logout))
        .route("/auth/me", get(me))
        .route("/auth/change-password", post(change_password))
        .route("/clients", get(list_clients))
        .route("/clients", post(create_client))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration and verification
        .route("/auth/register", post(register))
        .route("/auth/verify-email", post(verify_email))
        .route("/auth/resend-code", post(resend_code))
        // Login
        .route("/auth/login", post(login))
        // Password recovery
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}
