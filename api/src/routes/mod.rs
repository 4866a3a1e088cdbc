//! HTTP route handlers

pub mod health;
pub mod otp;

use actix_web::HttpResponse;
use hb_shared::errors::{error_codes, ErrorResponse};

/// Fallback for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}
