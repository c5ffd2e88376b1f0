//! Schema types and resolvers.
//!
//! The resolvers call the same ports as the REST handlers, so the two
//! fronts cannot drift apart: `me` and `GET /api/v1/users/me` are the
//! same lookup and the same row mapping.

use async_graphql::{
    Context, EmptySubscription, Error, Json, Object, Result, Schema, SimpleObject,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use nimbus_core::domain;
use nimbus_core::domain::{AuthUser, NewProfile};
use nimbus_core::error::StoreError;

use crate::state::AppState;

/// Bearer token lifted from the HTTP request, if any. Stored in the
/// per-request context data so resolvers can authenticate on demand.
pub struct BearerToken(pub Option<String>);

pub type ServiceSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(state: AppState) -> ServiceSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(state)
        .finish()
}

/// A user profile.
#[derive(SimpleObject)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl From<domain::UserProfile> for User {
    fn from(profile: domain::UserProfile) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
            created_at: profile.created_at,
        }
    }
}

/// A user's preference map.
#[derive(SimpleObject)]
pub struct UserSettings {
    pub user_id: Uuid,
    pub preferences: Json<domain::Preferences>,
}

impl From<domain::UserSettings> for UserSettings {
    fn from(settings: domain::UserSettings) -> Self {
        Self {
            user_id: settings.user_id,
            preferences: Json(settings.preferences),
        }
    }
}

/// Tokens issued by the provider at login.
#[derive(SimpleObject)]
pub struct AuthPayload {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// The authenticated user's profile.
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let state = ctx.data_unchecked::<AppState>();
        let current = current_user(ctx).await?;

        let profile = state
            .profiles
            .find_by_id(current.id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .ok_or_else(|| Error::new("User profile not found"))?;

        Ok(profile.into())
    }

    /// The authenticated user's settings; an empty map if none are stored.
    async fn my_settings(&self, ctx: &Context<'_>) -> Result<UserSettings> {
        let state = ctx.data_unchecked::<AppState>();
        let current = current_user(ctx).await?;

        let settings = state
            .settings
            .find_by_user_id(current.id)
            .await
            .map_err(|e| Error::new(e.to_string()))?
            .unwrap_or_else(|| domain::UserSettings::empty(current.id));

        Ok(settings.into())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Register a new user. Same two provider calls as the REST handler,
    /// with the same non-transactional gap between them.
    async fn signup(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        full_name: Option<String>,
    ) -> Result<User> {
        let state = ctx.data_unchecked::<AppState>();

        let user = state
            .auth
            .sign_up(&email, &password, full_name.as_deref())
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        state
            .profiles
            .insert(NewProfile::new(user.id, email.clone(), full_name.clone()))
            .await
            .map_err(|e| Error::new(e.to_string()))?;

        // Respond from the fields just written; wall-clock time stands in
        // for created_at rather than re-reading the inserted row.
        Ok(User {
            id: user.id,
            email,
            full_name,
            role: "user".to_string(),
            created_at: Utc::now(),
        })
    }

    /// Authenticate and return the provider session verbatim.
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<AuthPayload> {
        let state = ctx.data_unchecked::<AppState>();

        let session = state
            .auth
            .sign_in_with_password(&email, &password)
            .await
            .map_err(|_| Error::new("Invalid email or password"))?;

        Ok(AuthPayload {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            token_type: session.token_type,
            expires_in: session.expires_in,
        })
    }

    /// Replace the authenticated user's preference map.
    async fn update_my_settings(
        &self,
        ctx: &Context<'_>,
        preferences: Json<domain::Preferences>,
    ) -> Result<UserSettings> {
        let state = ctx.data_unchecked::<AppState>();
        let current = current_user(ctx).await?;

        let stored = state
            .settings
            .upsert(domain::UserSettings {
                user_id: current.id,
                preferences: preferences.0,
            })
            .await
            .map_err(|e| match e {
                StoreError::Rejected(_) => Error::new("Failed to update settings"),
                StoreError::Provider(msg) => Error::new(msg),
            })?;

        Ok(stored.into())
    }
}

/// Shared auth extraction: the same contract as the REST extractor,
/// reading the token stashed by the HTTP-level handler. Fails before any
/// provider call when the token is absent.
async fn current_user(ctx: &Context<'_>) -> Result<AuthUser> {
    let state = ctx.data_unchecked::<AppState>();

    let token = ctx
        .data_opt::<BearerToken>()
        .and_then(|t| t.0.as_deref())
        .ok_or_else(|| Error::new("Missing bearer token"))?
        .to_string();

    state
        .auth
        .user_from_token(&token)
        .await
        .map_err(|e| Error::new(e.to_string()))
}
