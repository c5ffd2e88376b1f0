//! Handler and schema tests against in-memory fake ports.
//!
//! The fakes count provider calls so the tests can assert that rejected
//! requests never reach the provider at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::http::header;
use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use nimbus_core::domain::{
    AuthSession, AuthUser, NewProfile, Preferences, UserProfile, UserSettings,
};
use nimbus_core::error::StoreError;
use nimbus_core::ports::{AuthError, AuthProvider, ProfileStore, SettingsStore};

use crate::graphql::{self, BearerToken};
use crate::handlers;
use crate::state::AppState;

const VALID_TOKEN: &str = "valid-token";
const PASSWORD: &str = "correct-horse";

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Fake auth provider: one known identity, one valid token.
struct FakeAuth {
    user: AuthUser,
    calls: AtomicUsize,
}

impl FakeAuth {
    fn new(id: Uuid, email: &str) -> Self {
        Self {
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthProvider for FakeAuth {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _full_name: Option<&str>,
    ) -> Result<AuthUser, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(AuthUser {
            id: self.user.id,
            email: Some(email.to_string()),
        })
    }

    async fn sign_in_with_password(
        &self,
        _email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if password == PASSWORD {
            Ok(AuthSession {
                access_token: "access-abc".to_string(),
                refresh_token: "refresh-def".to_string(),
                token_type: "bearer".to_string(),
                expires_in: 3600,
            })
        } else {
            Err(AuthError::Rejected("invalid_grant".to_string()))
        }
    }

    async fn user_from_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if token == VALID_TOKEN {
            Ok(self.user.clone())
        } else {
            Err(AuthError::Rejected("invalid token".to_string()))
        }
    }
}

struct FakeProfiles {
    rows: Mutex<HashMap<Uuid, UserProfile>>,
}

impl FakeProfiles {
    fn empty() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    fn seed(&self, profile: UserProfile) {
        self.rows.lock().unwrap().insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn insert(&self, profile: NewProfile) -> Result<(), StoreError> {
        let row = UserProfile {
            id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
            created_at: fixed_time(),
        };
        self.rows.lock().unwrap().insert(row.id, row);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }
}

struct FakeSettings {
    rows: Mutex<HashMap<Uuid, Preferences>>,
}

impl FakeSettings {
    fn empty() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl SettingsStore for FakeSettings {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<UserSettings>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .get(&user_id)
            .map(|preferences| UserSettings {
                user_id,
                preferences: preferences.clone(),
            }))
    }

    async fn upsert(&self, settings: UserSettings) -> Result<UserSettings, StoreError> {
        self.rows
            .lock()
            .unwrap()
            .insert(settings.user_id, settings.preferences.clone());
        Ok(settings)
    }
}

fn test_state(user_id: Uuid) -> (AppState, Arc<FakeAuth>, Arc<FakeProfiles>, Arc<FakeSettings>) {
    let auth = Arc::new(FakeAuth::new(user_id, "alice@example.com"));
    let profiles = Arc::new(FakeProfiles::empty());
    let settings = Arc::new(FakeSettings::empty());
    let state = AppState {
        auth: auth.clone(),
        profiles: profiles.clone(),
        settings: settings.clone(),
    };
    (state, auth, profiles, settings)
}

fn seeded_profile(id: Uuid) -> UserProfile {
    UserProfile {
        id,
        email: "alice@example.com".to_string(),
        full_name: Some("Alice Example".to_string()),
        role: "user".to_string(),
        created_at: fixed_time(),
    }
}

macro_rules! rest_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

#[actix_web::test]
async fn root_and_health_report_service_identity() {
    let (state, _, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(body["message"], "User Management Service");
    assert!(body["version"].is_string());

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
    assert_eq!(body, json!({"status": "healthy", "service": "user-service"}));
}

#[actix_web::test]
async fn signup_creates_profile_row_with_matching_id() {
    let user_id = Uuid::new_v4();
    let (state, _, profiles, _) = test_state(user_id);
    let app = rest_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({
            "email": "alice@example.com",
            "password": "hunter2hunter2",
            "full_name": "Alice Example"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["email"], "alice@example.com");

    let row = profiles.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(row.email, "alice@example.com");
    assert_eq!(row.role, "user");
}

#[actix_web::test]
async fn signup_rejects_malformed_email_before_provider() {
    let (state, auth, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/signup")
        .set_json(json!({"email": "not-an-email", "password": "hunter2hunter2"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    assert_eq!(auth.call_count(), 0);
}

#[actix_web::test]
async fn login_returns_provider_session_verbatim() {
    let (state, _, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": PASSWORD}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["access_token"], "access-abc");
    assert_eq!(body["refresh_token"], "refresh-def");
    assert_eq!(body["token_type"], "bearer");
    assert!(body["expires_in"].as_i64().unwrap() > 0);
}

#[actix_web::test]
async fn login_failure_is_a_generic_401() {
    let (state, _, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .set_json(json!({"email": "alice@example.com", "password": "wrong"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Provider detail must be discarded on the login path.
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "Invalid email or password");
}

#[actix_web::test]
async fn me_returns_mapped_profile() {
    let user_id = Uuid::new_v4();
    let (state, _, profiles, _) = test_state(user_id);
    profiles.seed(seeded_profile(user_id));
    let app = rest_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(bearer(VALID_TOKEN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["id"], user_id.to_string());
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["full_name"], "Alice Example");
    assert_eq!(body["role"], "user");
    let created_at: DateTime<Utc> = body["created_at"].as_str().unwrap().parse().unwrap();
    assert_eq!(created_at, fixed_time());
}

#[actix_web::test]
async fn me_without_profile_row_is_not_found() {
    // Split identity: the token resolves but no profile row exists.
    let (state, _, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(bearer(VALID_TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn missing_or_malformed_bearer_is_401_without_provider_call() {
    let (state, auth, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/users/me").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/users/me")
            .insert_header((header::AUTHORIZATION, "Token abc"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 401);

    assert_eq!(auth.call_count(), 0);
}

#[actix_web::test]
async fn invalid_token_is_401_after_provider_check() {
    let (state, auth, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(bearer("expired-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
    assert_eq!(auth.call_count(), 1);
}

#[actix_web::test]
async fn settings_default_to_empty_map() {
    let user_id = Uuid::new_v4();
    let (state, _, _, _) = test_state(user_id);
    let app = rest_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me/settings")
        .insert_header(bearer(VALID_TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], user_id.to_string());
    assert_eq!(body["preferences"], json!({}));
}

#[actix_web::test]
async fn settings_update_replaces_the_whole_map() {
    let (state, _, _, _) = test_state(Uuid::new_v4());
    let app = rest_app!(state);

    let req = test::TestRequest::put()
        .uri("/api/v1/users/me/settings")
        .insert_header(bearer(VALID_TOKEN))
        .set_json(json!({"preferences": {"theme": "dark"}}))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["preferences"], json!({"theme": "dark"}));

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me/settings")
        .insert_header(bearer(VALID_TOKEN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["preferences"], json!({"theme": "dark"}));

    // A second update must replace, not merge.
    let req = test::TestRequest::put()
        .uri("/api/v1/users/me/settings")
        .insert_header(bearer(VALID_TOKEN))
        .set_json(json!({"preferences": {"language": "en"}}))
        .to_request();
    let _: Value = test::call_and_read_body_json(&app, req).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/users/me/settings")
        .insert_header(bearer(VALID_TOKEN))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["preferences"], json!({"language": "en"}));
}

#[actix_web::test]
async fn graphql_me_matches_rest_profile() {
    let user_id = Uuid::new_v4();
    let (state, _, profiles, _) = test_state(user_id);
    profiles.seed(seeded_profile(user_id));

    let app = rest_app!(state);
    let req = test::TestRequest::get()
        .uri("/api/v1/users/me")
        .insert_header(bearer(VALID_TOKEN))
        .to_request();
    let rest: Value = test::call_and_read_body_json(&app, req).await;

    let schema = graphql::build_schema(state.clone());
    let resp = schema
        .execute(
            async_graphql::Request::new("{ me { id email fullName role createdAt } }")
                .data(BearerToken(Some(VALID_TOKEN.to_string()))),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let gql = resp.data.into_json().unwrap();

    assert_eq!(gql["me"]["id"], rest["id"]);
    assert_eq!(gql["me"]["email"], rest["email"]);
    assert_eq!(gql["me"]["role"], rest["role"]);

    // The two fronts may format the timestamp differently; the instant
    // must be identical.
    let rest_ts: DateTime<Utc> = rest["created_at"].as_str().unwrap().parse().unwrap();
    let gql_ts: DateTime<Utc> = gql["me"]["createdAt"].as_str().unwrap().parse().unwrap();
    assert_eq!(rest_ts, gql_ts);
}

#[actix_web::test]
async fn graphql_operations_require_a_token() {
    let (state, auth, _, _) = test_state(Uuid::new_v4());
    let schema = graphql::build_schema(state);

    let resp = schema
        .execute(async_graphql::Request::new("{ me { id } }").data(BearerToken(None)))
        .await;

    assert_eq!(resp.errors.len(), 1);
    assert_eq!(resp.errors[0].message, "Missing bearer token");
    assert_eq!(auth.call_count(), 0);
}

#[actix_web::test]
async fn graphql_signup_creates_profile_and_defaults_role() {
    let user_id = Uuid::new_v4();
    let (state, _, profiles, _) = test_state(user_id);
    let schema = graphql::build_schema(state);

    let resp = schema
        .execute(async_graphql::Request::new(
            r#"mutation {
                signup(email: "bob@example.com", password: "hunter2hunter2", fullName: "Bob") {
                    id email fullName role
                }
            }"#,
        ))
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let data = resp.data.into_json().unwrap();

    assert_eq!(data["signup"]["id"], user_id.to_string());
    assert_eq!(data["signup"]["email"], "bob@example.com");
    assert_eq!(data["signup"]["fullName"], "Bob");
    assert_eq!(data["signup"]["role"], "user");

    let row = profiles.find_by_id(user_id).await.unwrap().unwrap();
    assert_eq!(row.email, "bob@example.com");
}

#[actix_web::test]
async fn graphql_settings_round_trip() {
    let user_id = Uuid::new_v4();
    let (state, _, _, _) = test_state(user_id);
    let schema = graphql::build_schema(state);

    let resp = schema
        .execute(
            async_graphql::Request::new(
                "mutation($prefs: JSON!) { updateMySettings(preferences: $prefs) { userId preferences } }",
            )
            .variables(async_graphql::Variables::from_json(
                json!({"prefs": {"theme": "dark"}}),
            ))
            .data(BearerToken(Some(VALID_TOKEN.to_string()))),
        )
        .await;
    assert!(resp.errors.is_empty(), "unexpected errors: {:?}", resp.errors);
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["updateMySettings"]["preferences"], json!({"theme": "dark"}));

    let resp = schema
        .execute(
            async_graphql::Request::new("{ mySettings { userId preferences } }")
                .data(BearerToken(Some(VALID_TOKEN.to_string()))),
        )
        .await;
    assert!(resp.errors.is_empty());
    let data = resp.data.into_json().unwrap();
    assert_eq!(data["mySettings"]["userId"], user_id.to_string());
    assert_eq!(data["mySettings"]["preferences"], json!({"theme": "dark"}));
}
