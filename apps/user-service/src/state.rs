//! Application state - shared across all handlers and resolvers.

use std::sync::Arc;

use nimbus_core::ports::{AuthProvider, ProfileStore, SettingsStore};
use nimbus_supabase::SupabaseClient;

/// Shared application state. One Supabase handle fills all three port
/// slots in production; handlers and resolvers only ever see the traits,
/// so tests substitute in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub profiles: Arc<dyn ProfileStore>,
    pub settings: Arc<dyn SettingsStore>,
}

impl AppState {
    pub fn new(client: Arc<SupabaseClient>) -> Self {
        Self {
            auth: client.clone(),
            profiles: client.clone(),
            settings: client,
        }
    }
}
