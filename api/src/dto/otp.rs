//! OTP endpoint request bodies

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

use hb_core::domain::value_objects::{SendOtpRequest, VerifyOtpRequest};
use hb_shared::config::OtpPurpose;
use hb_shared::phone::{is_supported_e164, validate_otp_code, OtpValidationError, OTP_LENGTH};

/// Body of `POST /api/otp/send`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpBody {
    #[serde(default)]
    #[validate(custom(function = "validate_e164_phone"))]
    pub phone_number: String,
    pub purpose: OtpPurpose,
}

impl SendOtpBody {
    pub fn into_request(self) -> SendOtpRequest {
        SendOtpRequest::new(self.phone_number, self.purpose)
    }
}

/// Body of `POST /api/otp/verify`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpBody {
    #[serde(default)]
    #[validate(custom(function = "validate_e164_phone"))]
    pub phone_number: String,
    #[serde(default)]
    #[validate(custom(function = "validate_otp_field"))]
    pub otp: String,
    pub purpose: OtpPurpose,
}

impl VerifyOtpBody {
    pub fn into_request(self) -> VerifyOtpRequest {
        VerifyOtpRequest::new(self.phone_number, self.otp, self.purpose)
    }
}

/// JSON name of a body field, as clients send it
pub fn wire_field_name(field: &str) -> String {
    let mut name = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            name.extend(c.to_uppercase());
            upper = false;
        } else {
            name.push(c);
        }
    }
    name
}

fn field_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_e164_phone(phone_number: &str) -> Result<(), ValidationError> {
    if phone_number.is_empty() {
        return Err(field_error("required", "Phone number is required"));
    }
    if !is_supported_e164(phone_number) {
        return Err(field_error(
            "invalid_phone",
            "Phone number must be a +967 mobile number in E.164 format",
        ));
    }
    Ok(())
}

/// The wire code must already be sanitized: exactly six ASCII digits
fn validate_otp_field(otp: &str) -> Result<(), ValidationError> {
    validate_otp_code(otp).map_err(|e| field_error("invalid_otp", e.to_string()))?;
    if otp.len() != OTP_LENGTH || !otp.bytes().all(|b| b.is_ascii_digit()) {
        return Err(field_error(
            "invalid_otp",
            OtpValidationError::WrongLength.to_string(),
        ));
    }
    Ok(())
}
