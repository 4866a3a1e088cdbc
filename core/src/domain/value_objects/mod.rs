//! Value objects representing immutable domain concepts.

pub mod otp_messages;

// Re-export commonly used types
pub use otp_messages::{SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse};
