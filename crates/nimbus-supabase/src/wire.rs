//! Typed payloads for the GoTrue auth endpoints.
//!
//! GoTrue's response shape varies by endpoint and confirmation settings:
//! `/signup` may return the user object bare or wrapped, and the password
//! grant returns session fields at the top level. Everything is optional
//! at the wire and resolved here, so handler code never touches raw JSON.

use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use nimbus_core::domain::{AuthSession, AuthUser};

/// A GoTrue user object.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPayload {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
    pub created_at: Option<String>,
}

impl From<UserPayload> for AuthUser {
    fn from(payload: UserPayload) -> Self {
        Self {
            id: payload.id,
            email: payload.email,
        }
    }
}

/// A GoTrue session object.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionPayload {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
    pub user: Option<UserPayload>,
}

/// Envelope for `/signup` and `/token` responses. The user may appear
/// under `user`, inside `session`, or bare at the top level; session
/// fields may be nested or flattened.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponsePayload {
    pub user: Option<UserPayload>,
    pub session: Option<SessionPayload>,
    pub id: Option<Uuid>,
    pub email: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
}

impl AuthResponsePayload {
    /// Resolve the created/authenticated user, wherever it landed.
    pub fn into_user(self) -> Option<AuthUser> {
        if let Some(user) = self.user {
            return Some(user.into());
        }
        if let Some(user) = self.session.and_then(|s| s.user) {
            return Some(user.into());
        }
        let id = self.id?;
        Some(AuthUser {
            id,
            email: self.email,
        })
    }

    /// Resolve the issued session. All four token fields must be present.
    pub fn into_session(self) -> Option<AuthSession> {
        let (access_token, refresh_token, token_type, expires_in) = match self.session {
            Some(s) => (s.access_token, s.refresh_token, s.token_type, s.expires_in),
            None => (
                self.access_token,
                self.refresh_token,
                self.token_type,
                self.expires_in,
            ),
        };
        Some(AuthSession {
            access_token: access_token?,
            refresh_token: refresh_token?,
            token_type: token_type?,
            expires_in: expires_in?,
        })
    }
}

/// Error body shapes returned by GoTrue and PostgREST. The field names
/// differ per endpoint and version, so all are optional and the first
/// present one wins.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorPayload {
    pub error_description: Option<String>,
    pub msg: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Extract a human-readable message from an error response body, falling
/// back to the HTTP status line when the body is not recognizable JSON.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ApiErrorPayload = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error_description
        .or(parsed.msg)
        .or(parsed.message)
        .or(parsed.error)
        .unwrap_or_else(|| format!("provider returned {status}"))
}
