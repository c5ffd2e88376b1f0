//! Profile and settings handlers - all bearer-protected.

use actix_web::{HttpResponse, web};

use nimbus_core::domain::UserSettings;
use nimbus_core::error::StoreError;
use nimbus_shared::dto::{SettingsResponse, UpdateSettingsRequest, UserResponse};

use crate::middleware::auth::CurrentUser;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/v1/users/me
pub async fn me(state: web::Data<AppState>, user: CurrentUser) -> AppResult<HttpResponse> {
    let profile = state
        .profiles
        .find_by_id(user.0.id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        // A valid token with no profile row is the split-identity state
        // left behind by a partially failed signup.
        .ok_or_else(|| AppError::NotFound("User profile not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserResponse {
        id: profile.id,
        email: profile.email,
        full_name: profile.full_name,
        role: profile.role,
        created_at: profile.created_at,
    }))
}

/// GET /api/v1/users/me/settings
pub async fn get_settings(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> AppResult<HttpResponse> {
    let settings = state
        .settings
        .find_by_user_id(user.0.id)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        // No stored row is a valid initial state, not an error.
        .unwrap_or_else(|| UserSettings::empty(user.0.id));

    Ok(HttpResponse::Ok().json(SettingsResponse {
        user_id: settings.user_id,
        preferences: settings.preferences,
    }))
}

/// PUT /api/v1/users/me/settings
///
/// Full-replace semantics: the stored preference map is overwritten, not
/// merged.
pub async fn update_settings(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<UpdateSettingsRequest>,
) -> AppResult<HttpResponse> {
    let preferences = body.into_inner().preferences;

    let stored = state
        .settings
        .upsert(UserSettings {
            user_id: user.0.id,
            preferences,
        })
        .await
        .map_err(|e| match e {
            StoreError::Rejected(_) => {
                AppError::BadRequest("Failed to update settings".to_string())
            }
            StoreError::Provider(msg) => AppError::Internal(msg),
        })?;

    Ok(HttpResponse::Ok().json(SettingsResponse {
        user_id: stored.user_id,
        preferences: stored.preferences,
    }))
}
