use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's profile row in the provider's `users` table.
///
/// This is distinct from the provider's internal auth identity record:
/// the profile row is inserted by this service at signup, and the two can
/// diverge if that insert fails after the auth identity was created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a fresh profile row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
}

impl NewProfile {
    /// Build the row for a newly signed-up user. Role always starts as "user".
    pub fn new(id: Uuid, email: String, full_name: Option<String>) -> Self {
        Self {
            id,
            email,
            full_name,
            role: "user".to_string(),
        }
    }
}
