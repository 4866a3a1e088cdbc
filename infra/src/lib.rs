//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the HomeBook client
//! services. It provides concrete implementations of the integration traits
//! defined in `hb_core`.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **HTTP**: reqwest client for the backend OTP endpoints
//! - **Storage**: file-backed durable session store
//! - **Config**: layered configuration loading (`.env`, TOML file, environment)

// Re-export core types for convenience
pub use hb_core::errors::*;

/// HTTP clients for the backend
pub mod http;

/// Durable client session storage
pub mod storage;

/// Configuration loading
pub mod config;

pub use config::load_config;
pub use http::HttpOtpApi;
pub use storage::FileSessionStore;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<::config::ConfigError> for InfrastructureError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
