//! The Supabase client - one configured handle implementing every port.

use async_trait::async_trait;
use reqwest::{Method, Response};
use uuid::Uuid;

use nimbus_core::domain::{AuthSession, AuthUser, NewProfile, UserProfile, UserSettings};
use nimbus_core::error::StoreError;
use nimbus_core::ports::{AuthError, AuthProvider, ProfileStore, SettingsStore};

use crate::config::SupabaseConfig;
use crate::rows::{ProfileRow, SettingsRow};
use crate::wire::{AuthResponsePayload, UserPayload, error_message};

/// One configured handle to the Supabase platform, covering both the auth
/// surface (GoTrue) and table operations (PostgREST). Read-only after
/// construction and safe to share across request tasks.
pub struct SupabaseClient {
    http: reqwest::Client,
    auth_base: String,
    rest_base: String,
    service_role_key: String,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Self {
        let base = config.url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            auth_base: format!("{base}/auth/v1"),
            rest_base: format!("{base}/rest/v1"),
            service_role_key: config.service_role_key,
        }
    }

    fn auth_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}{}", self.auth_base, path))
            .header("apikey", self.service_role_key.as_str())
    }

    /// Table requests authenticate with the service-role key, which
    /// bypasses row-level security. Row access policy is the handlers'
    /// responsibility: they only ever query by the authenticated user's id.
    fn rest_request(&self, method: Method, path_and_query: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.rest_base, path_and_query))
            .header("apikey", self.service_role_key.as_str())
            .bearer_auth(&self.service_role_key)
    }
}

#[async_trait]
impl AuthProvider for SupabaseClient {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        tracing::debug!(user_email = %mask_email(email), "Creating auth identity");

        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });

        let resp = self
            .auth_post("/signup")
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(auth_failure(resp).await);
        }

        let payload: AuthResponsePayload = resp
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        payload
            .into_user()
            .ok_or_else(|| AuthError::Rejected("Failed to create user".to_string()))
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        tracing::debug!(user_email = %mask_email(email), "Password sign-in");

        let body = serde_json::json!({ "email": email, "password": password });

        let resp = self
            .auth_post("/token?grant_type=password")
            .json(&body)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(auth_failure(resp).await);
        }

        let payload: AuthResponsePayload = resp
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        payload
            .into_session()
            .ok_or_else(|| AuthError::Rejected("No session returned".to_string()))
    }

    async fn user_from_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let resp = self
            .http
            .get(format!("{}/user", self.auth_base))
            .header("apikey", self.service_role_key.as_str())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(auth_failure(resp).await);
        }

        let payload: UserPayload = resp
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        Ok(payload.into())
    }
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn insert(&self, profile: NewProfile) -> Result<(), StoreError> {
        let resp = self
            .rest_request(Method::POST, "/users")
            .header("Prefer", "return=minimal")
            .json(&profile)
            .send()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(store_failure(resp).await);
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let resp = self
            .rest_request(Method::GET, &format!("/users?select=*&id=eq.{id}"))
            .send()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(store_failure(resp).await);
        }

        let rows: Vec<ProfileRow> = resp
            .json()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;

        Ok(rows.into_iter().next().map(Into::into))
    }
}

#[async_trait]
impl SettingsStore for SupabaseClient {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserSettings>, StoreError> {
        let resp = self
            .rest_request(
                Method::GET,
                &format!("/user_settings?select=*&user_id=eq.{user_id}"),
            )
            .send()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(store_failure(resp).await);
        }

        let rows: Vec<SettingsRow> = resp
            .json()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;

        Ok(rows.into_iter().next().map(Into::into))
    }

    async fn upsert(&self, settings: UserSettings) -> Result<UserSettings, StoreError> {
        let resp = self
            .rest_request(Method::POST, "/user_settings")
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&settings)
            .send()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(store_failure(resp).await);
        }

        let rows: Vec<SettingsRow> = resp
            .json()
            .await
            .map_err(|e| StoreError::Provider(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| StoreError::Rejected("upsert affected no rows".to_string()))
    }
}

async fn auth_failure(resp: Response) -> AuthError {
    let status = resp.status();
    let msg = error_message(status, &resp.text().await.unwrap_or_default());
    if status.is_server_error() {
        AuthError::Provider(msg)
    } else {
        AuthError::Rejected(msg)
    }
}

// Any non-2xx from PostgREST is an unexpected failure of the call itself;
// `Rejected` is reserved for the provider acknowledging that a write did
// not apply (an upsert returning an empty representation).
async fn store_failure(resp: Response) -> StoreError {
    let status = resp.status();
    let msg = error_message(status, &resp.text().await.unwrap_or_default());
    StoreError::Provider(msg)
}

/// Mask an email for logging to avoid PII in logs.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            if local.len() > 1 {
                format!("{}***{}", &local[..1], domain)
            } else {
                format!("***{domain}")
            }
        }
        None => "***".to_string(),
    }
}
