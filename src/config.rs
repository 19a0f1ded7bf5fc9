//! Application Configuration
//! Mission: Collect all env-driven settings in one place, no ambient globals

use anyhow::Result;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub jwt_secret: String,
    /// HTTP mail relay endpoint. When unset the notifier is disabled.
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./mentorlink.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, using development default");
            "dev-secret-change-in-production-minimum-32-characters".to_string()
        });

        let mail_relay_url = std::env::var("MAIL_RELAY_URL").ok();

        let mail_from =
            std::env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@mentorlink.local".to_string());

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            mail_relay_url,
            mail_from,
        })
    }
}
