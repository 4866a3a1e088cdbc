//! Durable key/value storage for the client session.
//!
//! The verification flow persists a handful of string entries (auth token,
//! serialized user, verified phone) that must survive restarts. Storage is
//! synchronous: every operation is a small local read or write.

use crate::errors::StorageError;

/// Key/value storage backing the persisted auth record
///
/// Implementations must be safe to share between the flow and its
/// background tasks.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Entry present
    /// * `Ok(None)` - No entry for `key`
    /// * `Err(StorageError)` - Backing storage could not be read
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the entry under `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
