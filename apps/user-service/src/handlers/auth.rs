//! Authentication handlers.

use actix_web::{HttpResponse, web};

use nimbus_core::domain::NewProfile;
use nimbus_shared::dto::{LoginRequest, SignupRequest, SignupResponse, TokenResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/auth/signup
///
/// The auth-identity create and the profile-row insert are two separate
/// provider calls with no transactional linkage: a failure after the
/// first leaves an auth account without a profile row. That gap is
/// documented contract, not compensated here.
pub async fn signup(
    state: web::Data<AppState>,
    body: web::Json<SignupRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Validate input shape; password strength rules are the provider's.
    if !is_valid_email(&req.email) {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    // Create the auth identity
    let user = state
        .auth
        .sign_up(&req.email, &req.password, req.full_name.as_deref())
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    // Create the profile row
    state
        .profiles
        .insert(NewProfile::new(user.id, req.email.clone(), req.full_name))
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created successfully".to_string(),
        user_id: user.id,
        email: req.email,
    }))
}

/// POST /api/v1/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    // Provider error detail is deliberately discarded on this path.
    let session = state
        .auth
        .sign_in_with_password(&req.email, &req.password)
        .await
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
        token_type: session.token_type,
        expires_in: session.expires_in,
    }))
}

/// Syntactic email check only; anything deeper is the provider's concern.
pub(crate) fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
