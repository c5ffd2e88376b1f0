//! Authentication extraction - bearer token to provider-verified identity.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use nimbus_core::domain::AuthUser;
use nimbus_core::ports::AuthError;

use crate::middleware::error::AppError;
use crate::state::AppState;

/// Pull the bearer token out of the Authorization header.
/// Fails without touching the provider.
pub fn bearer_token(req: &HttpRequest) -> Result<String, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingBearer)?;

    let value = header_value
        .to_str()
        .map_err(|_| AuthError::MissingBearer)?;

    value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or(AuthError::MissingBearer)
}

/// Provider-verified identity extractor.
///
/// Use this in handlers to require authentication:
/// ```ignore
/// async fn protected_route(user: CurrentUser) -> impl Responder {
///     format!("Hello, user {}!", user.0.id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // Header parsing happens before the future is polled; a missing
        // or malformed header never reaches the provider.
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token?;

            let state = state.ok_or_else(|| {
                tracing::error!("AppState not found in app data");
                AppError::Internal("Server configuration error".to_string())
            })?;

            let user = state.auth.user_from_token(&token).await?;
            Ok(CurrentUser(user))
        })
    }
}
