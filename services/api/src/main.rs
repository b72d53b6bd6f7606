use sea_orm::Database;
use tracing::info;

use clientele_api::config::ApiConfig;
use clientele_api::router::build_router;
use clientele_api::state::AppState;

#[tokio::main]
async fn main() {
    clientele_core::tracing::init_tracing();

    let config = ApiConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        cookie_domain: config.cookie_domain.clone(),
        secure_cookies: config.is_production(),
        log_otp_codes: !config.is_production(),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("api service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
