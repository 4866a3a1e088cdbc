//! Outcome and payload types of the verification flow

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{PersistedAuthRecord, SendRejection, VerifyRejection};

/// What the caller learns once a phone is verified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedPayload {
    pub phone_e164: String,
    /// User object of the existing account, `null` otherwise
    pub user: Option<Value>,
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_exists: Option<bool>,
}

impl VerifiedPayload {
    /// Payload for a freshly written record
    ///
    /// An account always reports `user_exists: true`; a phone-only record
    /// passes on whatever the backend said.
    pub fn from_record(record: &PersistedAuthRecord, user_exists: Option<bool>) -> Self {
        match record {
            PersistedAuthRecord::Account {
                token,
                user,
                phone_e164,
            } => Self {
                phone_e164: phone_e164.clone(),
                user: Some(user.clone()),
                token: Some(token.clone()),
                user_exists: Some(true),
            },
            PersistedAuthRecord::PhoneOnly { phone_e164 } => Self {
                phone_e164: phone_e164.clone(),
                user: None,
                token: None,
                user_exists,
            },
        }
    }
}

/// Result of a send request
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The backend sent a code
    Sent,
    /// Not started: local validation or flow state refused it
    Rejected(SendRejection),
    /// The backend refused or could not be reached
    Failed { message: String },
    /// Superseded, invalidated or torn down before completing
    Cancelled,
}

/// Result of a verify request
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    Verified(VerifiedPayload),
    Rejected(VerifyRejection),
    Failed { message: String },
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient notification (toast) shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

pub const CODE_SENT_NOTICE: &str = "Verification code sent";
pub const PHONE_VERIFIED_NOTICE: &str = "Phone number verified";

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice for a send outcome; local rejections and cancellations are silent
    pub fn for_send(outcome: &SendOutcome) -> Option<Self> {
        match outcome {
            SendOutcome::Sent => Some(Self::success(CODE_SENT_NOTICE)),
            SendOutcome::Failed { message } => Some(Self::error(message.clone())),
            SendOutcome::Rejected(_) | SendOutcome::Cancelled => None,
        }
    }

    /// Notice for a verify outcome; local rejections and cancellations are silent
    pub fn for_verify(outcome: &VerifyOutcome) -> Option<Self> {
        match outcome {
            VerifyOutcome::Verified(_) => Some(Self::success(PHONE_VERIFIED_NOTICE)),
            VerifyOutcome::Failed { message } => Some(Self::error(message.clone())),
            VerifyOutcome::Rejected(_) | VerifyOutcome::Cancelled => None,
        }
    }
}
