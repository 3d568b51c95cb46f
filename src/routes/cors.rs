use actix_web::http::{Method, StatusCode};
use actix_web::{HttpRequest, HttpResponse};

use crate::routes::error_response;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";
const MAX_AGE_SECONDS: &str = "86400";

/// Answers a CORS preflight. The allow-* headers themselves are added to
/// every response by the `DefaultHeaders` middleware.
pub async fn preflight() -> HttpResponse {
    HttpResponse::NoContent()
        .insert_header(("Access-Control-Max-Age", MAX_AGE_SECONDS))
        .finish()
}

pub async fn method_not_allowed(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return preflight().await;
    }

    tracing::warn!("{} {} is not allowed", req.method(), req.path());

    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

pub async fn not_found_or_preflight(req: HttpRequest) -> HttpResponse {
    if req.method() == Method::OPTIONS {
        return preflight().await;
    }

    error_response(StatusCode::NOT_FOUND, "Not found")
}
