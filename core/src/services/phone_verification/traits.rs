//! Traits for the OTP backend, the caller and platform autofill

use async_trait::async_trait;

use crate::domain::value_objects::{
    SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use crate::errors::OtpApiError;

use super::types::{Notice, VerifiedPayload};

/// Trait for the backend OTP endpoints
#[async_trait]
pub trait OtpApiTrait: Send + Sync {
    /// Ask the backend to text a code to `request.phone_number`
    async fn send_otp(&self, request: SendOtpRequest) -> Result<SendOtpResponse, OtpApiError>;
    /// Check a code with the backend
    async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<VerifyOtpResponse, OtpApiError>;
}

/// Receiver of the flow's outward events
pub trait VerificationListener: Send + Sync {
    /// Called once per successful verification, and on mount when a
    /// previously verified session is restored
    fn on_verified(&self, payload: &VerifiedPayload);

    /// Transient user-facing notification
    fn on_notice(&self, _notice: &Notice) {}
}

/// Platform hook that may deliver a received code (SMS retriever and the like)
#[async_trait]
pub trait OtpAutofill: Send + Sync {
    /// Wait for a code; `Ok(None)` when the platform gave up without one
    async fn receive_code(&self) -> Result<Option<String>, String>;
}
