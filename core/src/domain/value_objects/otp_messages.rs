//! Wire types of the backend OTP endpoints.

use hb_shared::config::OtpPurpose;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a response field, falling back to its default when it has an
/// unexpected type
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Body of `POST /api/otp/send`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    /// Phone number in E.164 format
    pub phone_number: String,
    pub purpose: OtpPurpose,
}

impl SendOtpRequest {
    pub fn new(phone_number: impl Into<String>, purpose: OtpPurpose) -> Self {
        Self {
            phone_number: phone_number.into(),
            purpose,
        }
    }
}

/// Response of `POST /api/otp/send`
///
/// Every field defaults so that an empty body (`{}`) reads as a failure
/// without a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendOtpResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub success: bool,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /api/otp/verify`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    /// Phone number in E.164 format
    pub phone_number: String,
    /// The 6-digit code
    pub otp: String,
    pub purpose: OtpPurpose,
}

impl VerifyOtpRequest {
    pub fn new(phone_number: impl Into<String>, otp: impl Into<String>, purpose: OtpPurpose) -> Self {
        Self {
            phone_number: phone_number.into(),
            otp: otp.into(),
            purpose,
        }
    }
}

/// Response of `POST /api/otp/verify`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub success: bool,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Session token, present when the phone belongs to an existing account
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Opaque user object, present together with `token`
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub user: Option<serde_json::Value>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub user_exists: Option<bool>,

    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl VerifyOtpResponse {
    /// Token and user object when both are present and usable
    pub fn account(&self) -> Option<(&str, &serde_json::Value)> {
        match (self.token.as_deref(), self.user.as_ref()) {
            (Some(token), Some(user)) if !token.is_empty() && !user.is_null() => Some((token, user)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_request_wire_format() {
        let request = SendOtpRequest::new("+967771234567", OtpPurpose::Login);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "phoneNumber": "+967771234567", "purpose": "LOGIN" })
        );
    }

    #[test]
    fn test_verify_request_wire_format() {
        let request = VerifyOtpRequest::new("+967771234567", "123456", OtpPurpose::Signup);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "phoneNumber": "+967771234567", "otp": "123456", "purpose": "SIGNUP" })
        );
    }

    #[test]
    fn test_empty_object_reads_as_failure() {
        let response: SendOtpResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!response.success);
        assert!(response.message.is_none());
    }

    #[test]
    fn test_verify_response_with_account() {
        let response: VerifyOtpResponse = serde_json::from_value(json!({
            "success": true,
            "token": "abc",
            "user": { "id": 1 },
            "userExists": true
        }))
        .unwrap();

        let (token, user) = response.account().unwrap();
        assert_eq!(token, "abc");
        assert_eq!(user, &json!({ "id": 1 }));
    }

    #[test]
    fn test_verify_response_without_account() {
        let response: VerifyOtpResponse = serde_json::from_value(json!({
            "success": true,
            "userExists": false,
            "token": "abc",
            "user": null
        }))
        .unwrap();

        assert!(response.account().is_none());
        assert_eq!(response.user_exists, Some(false));
    }

    #[test]
    fn test_mistyped_fields_fall_back_to_defaults() {
        let response: VerifyOtpResponse = serde_json::from_value(json!({
            "success": true,
            "token": "abc",
            "user": { "id": 1 },
            "userExists": "yes",
            "phoneNumber": 967771234567u64
        }))
        .unwrap();

        assert!(response.success);
        assert!(response.account().is_some());
        assert_eq!(response.user_exists, None);
        assert_eq!(response.phone_number, None);
    }
}
