use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_service_key: String,
    pub jwt_secret: String,
    pub access_token_expire_minutes: i64,
    pub refresh_token_expire_days: i64,
    pub reports_dir: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_URL not set, using empty value");
                    String::new()
                }),
            database_service_key: env::var("DATABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("DATABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("JWT_SECRET not set, using empty value");
                    String::new()
                }),
            access_token_expire_minutes: env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("ACCESS_TOKEN_EXPIRE_MINUTES not set, using default");
                    30
                }),
            refresh_token_expire_days: env::var("REFRESH_TOKEN_EXPIRE_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(|| {
                    warn!("REFRESH_TOKEN_EXPIRE_DAYS not set, using default");
                    7
                }),
            reports_dir: env::var("REPORTS_DIR")
                .unwrap_or_else(|_| {
                    warn!("REPORTS_DIR not set, using default");
                    "./uploads/reports".to_string()
                }),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.database_url.is_empty()
            && !self.database_service_key.is_empty()
            && !self.jwt_secret.is_empty()
    }
}
