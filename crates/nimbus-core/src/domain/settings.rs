use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Arbitrary key-value preference map, stored as a JSON object.
pub type Preferences = serde_json::Map<String, serde_json::Value>;

/// Per-user preference storage, keyed by the user's id.
///
/// Updates are full replacements: there is no merge or partial-update
/// semantics, and no versioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: Uuid,
    pub preferences: Preferences,
}

impl UserSettings {
    /// The default shape for a user with no stored settings row.
    /// Absence of settings is a valid initial state, not a fault.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            preferences: Preferences::new(),
        }
    }
}
