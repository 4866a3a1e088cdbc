//! Error types for the OTP backend and client-side persistence

use thiserror::Error;

/// Failures of a call to the OTP backend
///
/// Cancellation is not an error and never appears here; superseded calls are
/// reported as outcomes by the verification flow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpApiError {
    /// The backend answered with a non-2xx status or `success` not true
    #[error("OTP request rejected (status: {status:?}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: Option<u16>,
        message: Option<String>,
    },

    /// The backend could not be reached or the exchange failed mid-way
    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl OtpApiError {
    /// Create a rejection carrying the backend's message, if any
    pub fn rejected(status: Option<u16>, message: Option<String>) -> Self {
        Self::Rejected { status, message }
    }

    /// Create a transport failure
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Message suitable for showing to the user, when the backend supplied one
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }
}

/// Failures of the durable client session storage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage I/O error: {message}")]
    Io { message: String },

    #[error("Storage serialization error: {message}")]
    Serialization { message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}
