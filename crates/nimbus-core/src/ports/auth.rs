//! Identity-provider port.

use async_trait::async_trait;

use crate::domain::{AuthSession, AuthUser};

/// The provider's authentication surface. Credential storage, password
/// verification and token issuance all live on the other side of this
/// trait; the service only forwards.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Create an auth identity for a new user. `full_name` rides along as
    /// user metadata.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<AuthUser, AuthError>;

    /// Password-grant sign-in. Returns the provider session verbatim.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError>;

    /// Resolve the identity behind a bearer token.
    async fn user_from_token(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingBearer,

    /// The provider refused the credential, token, or signup request.
    #[error("{0}")]
    Rejected(String),

    /// The call itself failed: transport error or unreadable payload.
    #[error("auth call failed: {0}")]
    Provider(String),
}
