//! Phone number and OTP code utilities
//!
//! The marketplace supports a single country (`+967`). Local mobile numbers
//! are 9 digits long and start with `7`; one-time codes are 6 digits.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Dial prefix of the one supported country
pub const COUNTRY_DIAL_CODE: &str = "+967";

/// Number of digits in a local mobile number
pub const LOCAL_NUMBER_LENGTH: usize = 9;

/// Number of digits in a one-time code
pub const OTP_LENGTH: usize = 6;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 12;

// Local mobile numbers: leading 7 followed by 8 digits
static LOCAL_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^7\d{8}$").expect("local mobile regex is valid")
});

// International phone number regex (E.164 format)
static E164_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+[1-9]\d{6,14}$").expect("E.164 regex is valid")
});

/// Reasons a phone number is rejected before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhoneValidationError {
    #[error("Phone number is required")]
    Required,

    #[error("Phone number is too short")]
    TooShort,

    #[error("Phone number is too long")]
    TooLong,

    #[error("Phone number must be exactly 9 digits")]
    WrongLength,

    #[error("Phone number must start with 7")]
    InvalidPrefix,
}

/// Reasons a one-time code is rejected before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OtpValidationError {
    #[error("Verification code is required")]
    Required,

    #[error("Verification code must be 6 digits")]
    WrongLength,
}

/// Strip every character that is not an ASCII digit
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Normalize a local number: digits only, without leading zeros
pub fn normalize_local_number(input: &str) -> String {
    digits_only(input).trim_start_matches('0').to_string()
}

/// Build the E.164 form of a locally entered number
///
/// Leading zeros are dropped here, but [`validate_phone_number`] counts them
/// towards the length, so `0771234567` never reaches the backend.
///
/// ```
/// use hb_shared::phone::build_e164;
/// assert_eq!(build_e164("77 123 4567"), "+967771234567");
/// assert_eq!(build_e164("0771234567"), "+967771234567");
/// ```
pub fn build_e164(input: &str) -> String {
    format!("{}{}", COUNTRY_DIAL_CODE, normalize_local_number(input))
}

/// Validate a locally entered phone number
///
/// Generic length checks run first, then the country-specific ones.
pub fn validate_phone_number(input: &str) -> Result<(), PhoneValidationError> {
    let digits = digits_only(input);

    if digits.is_empty() {
        return Err(PhoneValidationError::Required);
    }
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(PhoneValidationError::TooShort);
    }
    if digits.len() > MAX_PHONE_DIGITS {
        return Err(PhoneValidationError::TooLong);
    }
    if digits.len() != LOCAL_NUMBER_LENGTH {
        return Err(PhoneValidationError::WrongLength);
    }
    if !LOCAL_MOBILE_REGEX.is_match(&digits) {
        return Err(PhoneValidationError::InvalidPrefix);
    }

    Ok(())
}

/// Check whether a number is a well-formed E.164 number of the supported country
pub fn is_supported_e164(phone: &str) -> bool {
    E164_REGEX.is_match(phone)
        && phone
            .strip_prefix(COUNTRY_DIAL_CODE)
            .is_some_and(|local| LOCAL_MOBILE_REGEX.is_match(local))
}

/// Sanitize OTP input as typed: digits only, truncated to the code length
pub fn sanitize_otp_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(OTP_LENGTH)
        .collect()
}

/// Validate a one-time code
pub fn validate_otp_code(input: &str) -> Result<(), OtpValidationError> {
    let digits = digits_only(input);

    if digits.is_empty() {
        return Err(OtpValidationError::Required);
    }
    if digits.len() != OTP_LENGTH {
        return Err(OtpValidationError::WrongLength);
    }

    Ok(())
}

/// Mask a phone number for log output (e.g., +967****4567)
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() >= 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}
