//! Supabase connection configuration.

use thiserror::Error;

/// Connection settings for the Supabase project backing this service.
/// Read once at process start; the client is immutable afterwards.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project base URL, e.g. `https://xyzcompany.supabase.co`.
    pub url: String,
    /// Service-role key. Grants full table access, so it must never be
    /// exposed to callers.
    pub service_role_key: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

impl SupabaseConfig {
    /// Read the two provider credentials from the environment. Both are
    /// required; the service cannot operate without them.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            url: require_var("SUPABASE_URL")?,
            service_role_key: require_var("SUPABASE_SERVICE_ROLE_KEY")?,
        })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}
