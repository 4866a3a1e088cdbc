//! Application wiring
//!
//! [`configure`] registers routes, shared state and the rate limiter on an
//! actix `App`, so that the binary and the tests build the same service.

use actix_web::{error::JsonPayloadError, web, HttpRequest, HttpResponse};
use std::sync::Arc;

use hb_core::services::{FixedWindowRateLimiter, OtpApiTrait, RateLimitStore};
use hb_shared::errors::{error_codes, ErrorResponse};

use crate::middleware::RateLimiter;
use crate::routes::{health::health_check, otp};

/// Register the HTTP endpoints
///
/// The OTP endpoints sit behind the rate limiter; `/health` does not.
pub fn configure<A, S>(
    cfg: &mut web::ServiceConfig,
    upstream: Arc<A>,
    limiter: Arc<FixedWindowRateLimiter<S>>,
    max_payload_size: usize,
) where
    A: OtpApiTrait + 'static,
    S: RateLimitStore + 'static,
{
    cfg.app_data(web::Data::new(otp::OtpProxyState::new(upstream)))
        .app_data(
            web::JsonConfig::default()
                .limit(max_payload_size)
                .error_handler(json_error_handler),
        )
        .route("/health", web::get().to(health_check))
        .service(
            web::scope("/api/otp")
                .wrap(RateLimiter::new(limiter))
                .route("/send", web::post().to(otp::send_otp::<A>))
                .route("/verify", web::post().to(otp::verify_otp::<A>)),
        );
}

/// Malformed JSON bodies get the standard error body instead of plain text
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    let response = HttpResponse::BadRequest().json(ErrorResponse::new(error_codes::BAD_REQUEST, message));
    actix_web::error::InternalError::from_response(err, response).into()
}
