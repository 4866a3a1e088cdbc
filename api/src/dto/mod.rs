//! Request bodies accepted by the HTTP endpoints

pub mod otp;

pub use otp::{SendOtpBody, VerifyOtpBody};
