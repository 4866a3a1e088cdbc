//! Phone verification flow
//!
//! This module drives a user through phone OTP verification:
//! - Phone entry and validation
//! - Sending (and resending) a one-time code through the OTP backend
//! - Resend cooldown
//! - Manual and automatic code submission
//! - Persisting the resulting auth record and reporting it to the caller

mod bootstrap;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use bootstrap::bootstrap_session;
pub use service::{PhoneVerificationFlow, SEND_FAILED_MESSAGE, VERIFY_FAILED_MESSAGE};
pub use traits::{OtpApiTrait, OtpAutofill, VerificationListener};
pub use types::{Notice, NoticeLevel, SendOutcome, VerifiedPayload, VerifyOutcome};
