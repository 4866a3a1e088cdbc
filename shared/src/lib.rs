//! Shared utilities and common types for HomeBook client services
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types
//! - Error response structures
//! - Utility functions (phone and OTP normalization/validation)

pub mod config;
pub mod errors;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, ClientConfig, Environment, LogFormat, LoggingConfig, OtpFlowConfig, OtpPurpose,
    RateLimitConfig, ServerConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use utils::phone;
