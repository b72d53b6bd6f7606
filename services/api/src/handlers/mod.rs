pub mod auth;
pub mod client;
pub mod password;

use axum::http::HeaderMap;

use crate::domain::types::RequestContext;

/// Request metadata for audit rows. The client IP comes from the first
/// `X-Forwarded-For` hop; absent headers stay `None` rather than guessing.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty());
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_owned());
    RequestContext {
        ip_address,
        user_agent,
    }
}
