//! Session cookie builders.
//!
//! The bearer token travels in a single HTTP-only, strict-same-site cookie.
//! `secure` follows the deployment environment (always on in production).

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::domain::types::SESSION_TTL_DAYS;

/// Cookie name for the session bearer token.
pub const SESSION_COOKIE: &str = "clientele_session";

/// Set the session cookie on the jar.
pub fn set_session_cookie(jar: CookieJar, value: String, domain: String, secure: bool) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .domain(domain)
        .max_age(Duration::days(SESSION_TTL_DAYS))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build();
    jar.add(cookie)
}

/// Clear the session cookie by setting Max-Age to 0.
pub fn clear_session_cookie(jar: CookieJar, domain: String, secure: bool) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .domain(domain)
        .max_age(Duration::ZERO)
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build();
    jar.add(cookie)
}
