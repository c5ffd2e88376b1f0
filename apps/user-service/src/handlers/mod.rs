//! HTTP handlers and route configuration.

mod auth;
mod meta;
mod users;

use actix_web::web;

/// Configure the REST routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/", web::get().to(meta::root))
        .route("/health", web::get().to(meta::health_check))
        .service(
            web::scope("/api/v1")
                // Auth routes
                .service(
                    web::scope("/auth")
                        .route("/signup", web::post().to(auth::signup))
                        .route("/login", web::post().to(auth::login)),
                )
                // Bearer-protected routes
                .service(
                    web::scope("/users")
                        .route("/me", web::get().to(users::me))
                        .route("/me/settings", web::get().to(users::get_settings))
                        .route("/me/settings", web::put().to(users::update_settings)),
                ),
        );
}
