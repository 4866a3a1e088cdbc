//! Unit tests for the in-memory session store

use super::{InMemorySessionStore, SessionStore};

#[test]
fn test_set_and_get() {
    let store = InMemorySessionStore::new();
    store.set("token", "abc").unwrap();

    assert_eq!(store.get("token").unwrap(), Some("abc".to_string()));
    assert_eq!(store.get("user").unwrap(), None);
}

#[test]
fn test_set_overwrites() {
    let store = InMemorySessionStore::with_entries([("token", "old")]);
    store.set("token", "new").unwrap();

    assert_eq!(store.get("token").unwrap(), Some("new".to_string()));
}

#[test]
fn test_remove_missing_key_is_ok() {
    let store = InMemorySessionStore::new();
    assert!(store.remove("token").is_ok());
}

#[test]
fn test_clones_share_entries() {
    let store = InMemorySessionStore::new();
    let other = store.clone();
    other.set("phone_verified", "true").unwrap();

    assert_eq!(store.snapshot().get("phone_verified"), Some(&"true".to_string()));
}
