//! Restoring a previously verified session from durable storage

use hb_shared::phone::mask_phone_number;
use serde_json::Value;

use crate::domain::entities::{
    PersistedAuthRecord, PHONE_VERIFIED_KEY, TOKEN_KEY, USER_KEY, USER_PHONE_KEY,
};
use crate::errors::StorageError;
use crate::repositories::SessionStore;

use super::types::VerifiedPayload;

/// Inspect the persisted auth record and clean up stale entries
///
/// Returns the payload of a still valid verified session. A stored user that
/// is not valid JSON wipes every auth key; a missing token drops the
/// verified flag.
pub fn bootstrap_session<S: SessionStore + ?Sized>(
    store: &S,
) -> Result<Option<VerifiedPayload>, StorageError> {
    let phone = store.get(USER_PHONE_KEY)?;
    let token = store.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
    let flag = store.get(PHONE_VERIFIED_KEY)?;

    let user = match store.get(USER_KEY)? {
        Some(raw) => match serde_json::from_str::<Value>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    event = "session_corrupted",
                    "Stored user is not valid JSON, clearing auth record"
                );
                PersistedAuthRecord::clear(store)?;
                return Ok(None);
            }
        },
        None => None,
    };

    let Some(token) = token else {
        if flag.is_some() {
            tracing::debug!(event = "stale_verified_flag", "Clearing verified flag without token");
            store.remove(PHONE_VERIFIED_KEY)?;
        }
        return Ok(None);
    };

    match (user, flag) {
        (Some(user), Some(_)) => {
            let phone_e164 = phone.unwrap_or_default();
            tracing::info!(
                phone = %mask_phone_number(&phone_e164),
                event = "session_restored",
                "Restored verified session from storage"
            );
            Ok(Some(VerifiedPayload {
                phone_e164,
                user: Some(user),
                token: Some(token),
                user_exists: None,
            }))
        }
        _ => Ok(None),
    }
}
