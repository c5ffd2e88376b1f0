//! Table-storage ports for the provider's row store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewProfile, UserProfile, UserSettings};
use crate::error::StoreError;

/// The `users` table: one profile row per auth identity.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert the profile row created at signup.
    async fn insert(&self, profile: NewProfile) -> Result<(), StoreError>;

    /// Look up a profile row by user id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError>;
}

/// The `user_settings` table: one preference row per user, upserted whole.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserSettings>, StoreError>;

    /// Insert-or-replace the settings row. The stored preference map is
    /// fully overwritten. Returns the row as acknowledged by the provider.
    async fn upsert(&self, settings: UserSettings) -> Result<UserSettings, StoreError>;
}
