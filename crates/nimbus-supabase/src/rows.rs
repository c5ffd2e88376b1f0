//! Typed row shapes returned by PostgREST, and their domain conversions.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use nimbus_core::domain::{Preferences, UserProfile, UserSettings};

/// Raw `users` row. Rows come back from provider-verified lookups, so id
/// and email are required; everything else is optional at the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<String>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        let created_at = row
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(|| {
                // Loose-compatibility fallback: an unreadable timestamp is
                // replaced with the current time rather than failing the row.
                tracing::debug!(user_id = %row.id, "unparseable created_at, substituting now");
                Utc::now()
            });

        Self {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role: row.role.unwrap_or_else(|| "user".to_string()),
            created_at,
        }
    }
}

/// Raw `user_settings` row.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsRow {
    pub user_id: Uuid,
    pub preferences: Option<Preferences>,
}

impl From<SettingsRow> for UserSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            user_id: row.user_id,
            preferences: row.preferences.unwrap_or_default(),
        }
    }
}

/// Parse a provider timestamp. A trailing UTC "Z" marker is normalized to
/// an explicit zero offset before the RFC 3339 parse.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{stripped}+00:00"),
        None => raw.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
