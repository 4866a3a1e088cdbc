//! Unit tests for the OTP API and storage error types

use crate::errors::{OtpApiError, StorageError};

#[test]
fn test_rejected_error_exposes_backend_message() {
    let error = OtpApiError::rejected(Some(400), Some("Invalid OTP.".to_string()));
    assert_eq!(error.user_message(), Some("Invalid OTP."));
    assert!(error.to_string().contains("Invalid OTP."));
}

#[test]
fn test_blank_or_missing_message_is_not_user_facing() {
    assert_eq!(OtpApiError::rejected(Some(500), None).user_message(), None);
    assert_eq!(
        OtpApiError::rejected(Some(200), Some("   ".to_string())).user_message(),
        None
    );
    assert_eq!(OtpApiError::transport("connection refused").user_message(), None);
}

#[test]
fn test_io_errors_become_storage_errors() {
    let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    let error: StorageError = io_error.into();
    assert_eq!(error.to_string(), "Storage I/O error: disk full");
}

#[test]
fn test_json_errors_become_serialization_errors() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: StorageError = json_error.into();
    assert!(matches!(error, StorageError::Serialization { .. }));
}
