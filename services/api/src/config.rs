/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port to listen on (default 3210). Env var: `API_PORT`.
    pub api_port: u16,
    /// Cookie domain attribute (root domain, e.g. "example.com").
    pub cookie_domain: String,
    /// Deployment environment. Anything other than "production" enables
    /// dev-mode OTP logging and non-secure cookies. Env var: `APP_ENV`.
    pub app_env: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3210),
            cookie_domain: std::env::var("COOKIE_DOMAIN").expect("COOKIE_DOMAIN"),
            app_env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_owned()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
