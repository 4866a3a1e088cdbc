//! reqwest client for the backend OTP endpoints
//!
//! Response bodies are read leniently: an empty body counts as `{}` and a
//! body that is not JSON becomes `{ "message": <raw text> }`, so a misbehaving
//! gateway still yields a message the user can read.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

use hb_core::domain::value_objects::{
    SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use hb_core::errors::OtpApiError;
use hb_core::services::OtpApiTrait;
use hb_shared::config::ClientConfig;
use hb_shared::phone::mask_phone_number;

use crate::InfrastructureError;

pub const SEND_OTP_PATH: &str = "/api/otp/send";
pub const VERIFY_OTP_PATH: &str = "/api/otp/verify";

/// Backend OTP API over HTTP
#[derive(Debug, Clone)]
pub struct HttpOtpApi {
    client: Client,
    config: ClientConfig,
}

impl HttpOtpApi {
    /// Build a client from configuration
    ///
    /// Without `request_timeout_seconds` the transport default applies.
    pub fn new(config: ClientConfig) -> Result<Self, InfrastructureError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build()?;

        tracing::info!(
            base_url = %config.api_base_url,
            timeout_seconds = ?config.request_timeout_seconds,
            "OTP API client initialized"
        );

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, OtpApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %url, error = %e, event = "otp_api_unreachable", "OTP backend request failed");
                OtpApiError::transport(e.to_string())
            })?;

        let status = response.status();
        let raw = response
            .text()
            .await
            .map_err(|e| OtpApiError::transport(e.to_string()))?;
        let body = parse_lenient(&raw);

        interpret(status, body)
    }
}

/// Parse a response body, tolerating empty and non-JSON bodies
pub(crate) fn parse_lenient(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| json!({ "message": raw }))
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Map status and body to a typed response or a rejection
fn interpret<R: DeserializeOwned>(status: StatusCode, body: Value) -> Result<R, OtpApiError> {
    let succeeded = body.get("success").and_then(Value::as_bool) == Some(true);
    if !status.is_success() || !succeeded {
        return Err(OtpApiError::rejected(Some(status.as_u16()), message_of(&body)));
    }

    serde_json::from_value(body).map_err(|e| {
        tracing::warn!(error = %e, event = "otp_api_decode_failed", "Undecodable OTP response body");
        OtpApiError::rejected(Some(status.as_u16()), None)
    })
}

#[async_trait]
impl OtpApiTrait for HttpOtpApi {
    async fn send_otp(&self, request: SendOtpRequest) -> Result<SendOtpResponse, OtpApiError> {
        tracing::debug!(
            phone = %mask_phone_number(&request.phone_number),
            event = "otp_api_send",
            "POST {}", SEND_OTP_PATH
        );
        self.post(SEND_OTP_PATH, &request).await
    }

    async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<VerifyOtpResponse, OtpApiError> {
        tracing::debug!(
            phone = %mask_phone_number(&request.phone_number),
            event = "otp_api_verify",
            "POST {}", VERIFY_OTP_PATH
        );
        self.post(VERIFY_OTP_PATH, &request).await
    }
}
