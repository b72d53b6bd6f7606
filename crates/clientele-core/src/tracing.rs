use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize JSON tracing to stdout for a Clientele service. Call once at
/// startup, before the first request.
///
/// Filtering comes from `RUST_LOG`; when unset the default is `info`, which
/// keeps the auth flows' security events (failed logins, denials) visible
/// without debug noise. Repeat calls are silently ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json())
        .try_init();
}
