//! Environment-driven configuration.

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub nats_url: Option<String>,
    pub default_currency: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:storefront.db".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8083),
            nats_url: std::env::var("NATS_URL").ok(),
            default_currency: std::env::var("DEFAULT_CURRENCY")
                .unwrap_or_else(|_| "USD".to_string()),
        }
    }
}
