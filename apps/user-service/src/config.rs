//! Application configuration loaded from environment variables.

use std::env;

use nimbus_supabase::{ConfigError, SupabaseConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub supabase: SupabaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables. Host and port have
    /// defaults; the two Supabase credentials are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            supabase: SupabaseConfig::from_env()?,
        })
    }
}
