use actix_web::http::StatusCode;
use actix_web::HttpResponse;

pub mod cors;
mod feedback;
mod health_check;
mod subscriptions;
mod unsubscribe;

pub use cors::{method_not_allowed, not_found_or_preflight, preflight};
pub use feedback::handle_feedback;
pub use health_check::health_check;
pub use subscriptions::handle_create_subscription;
pub use unsubscribe::{handle_unsubscribe_get, handle_unsubscribe_post};

#[derive(serde::Serialize)]
struct SuccessBody<'a> {
    success: bool,
    message: &'a str,
}

#[derive(serde::Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub fn success_response(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(SuccessBody {
        success: true,
        message,
    })
}

pub fn error_response(status: StatusCode, error: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error })
}
