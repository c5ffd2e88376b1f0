//! Root info and health check endpoints.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// GET /
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(RootResponse {
        message: "User Management Service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "user-service",
    })
}
