//! # HomeBook Core
//!
//! Core domain layer for the HomeBook client services.
//! This crate contains the phone verification session state machine, the
//! async flow that drives it against the OTP backend, the persisted auth
//! record, the fixed-window rate limiter, and the integration traits the
//! infrastructure layer implements.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
