//! Auth record persisted in durable client storage after verification.

use serde_json::Value;

use crate::domain::value_objects::VerifyOtpResponse;
use crate::errors::StorageError;
use crate::repositories::SessionStore;

/// Auth token of an existing account
pub const TOKEN_KEY: &str = "token";
/// JSON-serialized user object
pub const USER_KEY: &str = "user";
/// Verified phone in E.164 format
pub const USER_PHONE_KEY: &str = "userPhone";
/// Verified flag, either `"true"` or absent
pub const PHONE_VERIFIED_KEY: &str = "phone_verified";
pub const PHONE_VERIFIED_VALUE: &str = "true";

const ALL_KEYS: [&str; 4] = [TOKEN_KEY, USER_KEY, USER_PHONE_KEY, PHONE_VERIFIED_KEY];

/// What a successful verification leaves behind in storage
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedAuthRecord {
    /// The phone belongs to an existing account
    Account {
        token: String,
        user: Value,
        phone_e164: String,
    },
    /// The phone is verified but has no linked account yet
    PhoneOnly { phone_e164: String },
}

impl PersistedAuthRecord {
    /// Build the record for a successful verify response
    pub fn from_verify_response(phone_e164: &str, response: &VerifyOtpResponse) -> Self {
        match response.account() {
            Some((token, user)) => Self::Account {
                token: token.to_string(),
                user: user.clone(),
                phone_e164: phone_e164.to_string(),
            },
            None => Self::PhoneOnly {
                phone_e164: phone_e164.to_string(),
            },
        }
    }

    /// Write the record, removing a stale token and user when there is no account
    pub fn write_to<S: SessionStore + ?Sized>(&self, store: &S) -> Result<(), StorageError> {
        match self {
            Self::Account {
                token,
                user,
                phone_e164,
            } => {
                store.set(TOKEN_KEY, token)?;
                store.set(USER_KEY, &serde_json::to_string(user)?)?;
                store.set(USER_PHONE_KEY, phone_e164)?;
            }
            Self::PhoneOnly { phone_e164 } => {
                store.set(USER_PHONE_KEY, phone_e164)?;
                store.remove(TOKEN_KEY)?;
                store.remove(USER_KEY)?;
            }
        }
        store.set(PHONE_VERIFIED_KEY, PHONE_VERIFIED_VALUE)
    }

    /// Remove every persisted auth key
    pub fn clear<S: SessionStore + ?Sized>(store: &S) -> Result<(), StorageError> {
        ALL_KEYS.iter().try_for_each(|key| store.remove(key))
    }
}
