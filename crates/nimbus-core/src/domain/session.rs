use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The provider's view of an authenticated identity, as resolved from a
/// bearer token or returned by signup. Only the id is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Tokens issued by the provider at login. Ephemeral - passed through to
/// the caller verbatim and never stored by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
