//! OTP proxy endpoints
//!
//! Requests are validated locally and forwarded to the upstream OTP backend.
//! The upstream status and message are passed through unchanged so that
//! clients see the same wire format whether they talk to the proxy or to the
//! backend directly.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use hb_core::errors::OtpApiError;
use hb_core::services::OtpApiTrait;
use hb_shared::errors::{error_codes, ErrorResponse};
use hb_shared::phone::mask_phone_number;

use crate::dto::otp::wire_field_name;
use crate::dto::{SendOtpBody, VerifyOtpBody};

/// Shared state of the OTP proxy
pub struct OtpProxyState<A: OtpApiTrait> {
    pub upstream: Arc<A>,
}

impl<A: OtpApiTrait> OtpProxyState<A> {
    pub fn new(upstream: Arc<A>) -> Self {
        Self { upstream }
    }
}

/// Handler for POST /api/otp/send
///
/// # Request Body
///
/// ```json
/// { "phoneNumber": "+967771234567", "purpose": "LOGIN" }
/// ```
///
/// # Response
///
/// `200 { "success": true }` or the upstream status with
/// `{ "success": false, "message": "..." }`. `502` when the upstream is
/// unreachable.
pub async fn send_otp<A: OtpApiTrait + 'static>(
    state: web::Data<OtpProxyState<A>>,
    body: web::Json<SendOtpBody>,
) -> HttpResponse {
    let body = body.into_inner();
    if let Err(errors) = body.validate() {
        return validation_failed(errors);
    }

    log::info!(
        "Forwarding OTP send for {} ({})",
        mask_phone_number(&body.phone_number),
        body.purpose
    );

    let result = state.upstream.send_otp(body.into_request()).await;
    respond(result)
}

/// Handler for POST /api/otp/verify
///
/// # Request Body
///
/// ```json
/// { "phoneNumber": "+967771234567", "otp": "123456", "purpose": "LOGIN" }
/// ```
pub async fn verify_otp<A: OtpApiTrait + 'static>(
    state: web::Data<OtpProxyState<A>>,
    body: web::Json<VerifyOtpBody>,
) -> HttpResponse {
    let body = body.into_inner();
    if let Err(errors) = body.validate() {
        return validation_failed(errors);
    }

    log::info!(
        "Forwarding OTP verify for {} ({})",
        mask_phone_number(&body.phone_number),
        body.purpose
    );

    let result = state.upstream.verify_otp(body.into_request()).await;
    respond(result)
}

fn validation_failed(errors: ValidationErrors) -> HttpResponse {
    let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
    for (field, errors) in errors.field_errors() {
        let messages: Vec<String> = errors
            .iter()
            .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
            .collect();
        field_errors.insert(wire_field_name(&field.to_string()), messages);
    }

    log::debug!("Rejected OTP request body: {:?}", field_errors.keys());

    HttpResponse::BadRequest().json(
        ErrorResponse::new(error_codes::VALIDATION_ERROR, "Invalid request data")
            .add_detail("fields", field_errors),
    )
}

fn respond<T: Serialize>(result: Result<T, OtpApiError>) -> HttpResponse {
    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(OtpApiError::Rejected { status, message }) => {
            let status = status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::BAD_REQUEST);
            log::warn!("Upstream rejected OTP request with status {}", status);

            let mut body = json!({ "success": false });
            if let Some(message) = message {
                body["message"] = json!(message);
            }
            HttpResponse::build(status).json(body)
        }
        Err(OtpApiError::Transport { message }) => {
            log::error!("OTP upstream unavailable: {}", message);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                error_codes::UPSTREAM_UNAVAILABLE,
                "Verification service is unavailable. Please try again later.",
            ))
        }
    }
}
