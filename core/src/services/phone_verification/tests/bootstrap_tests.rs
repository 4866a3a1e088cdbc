//! Session bootstrap tests

use serde_json::json;

use super::mocks::*;
use crate::domain::entities::{PHONE_VERIFIED_KEY, TOKEN_KEY, USER_KEY, USER_PHONE_KEY};
use crate::repositories::InMemorySessionStore;
use crate::services::phone_verification::{bootstrap_session, SendOutcome, VerifiedPayload};
use crate::domain::entities::SendRejection;

fn full_record() -> InMemorySessionStore {
    InMemorySessionStore::with_entries([
        (TOKEN_KEY, "abc"),
        (USER_KEY, r#"{"id":1}"#),
        (USER_PHONE_KEY, "+967771234567"),
        (PHONE_VERIFIED_KEY, "true"),
    ])
}

#[test]
fn test_valid_record_restores_session() {
    let store = full_record();

    let payload = bootstrap_session(&store).unwrap();

    assert_eq!(
        payload,
        Some(VerifiedPayload {
            phone_e164: "+967771234567".to_string(),
            user: Some(json!({ "id": 1 })),
            token: Some("abc".to_string()),
            user_exists: None,
        })
    );
    assert_eq!(store.snapshot().len(), 4);
}

#[test]
fn test_corrupt_user_clears_all_keys() {
    let store = InMemorySessionStore::with_entries([
        (TOKEN_KEY, "abc"),
        (USER_KEY, "{not json"),
        (USER_PHONE_KEY, "+967771234567"),
        (PHONE_VERIFIED_KEY, "true"),
    ]);

    assert_eq!(bootstrap_session(&store).unwrap(), None);
    assert!(store.snapshot().is_empty());
}

#[test]
fn test_missing_token_clears_flag_only() {
    let store = InMemorySessionStore::with_entries([
        (USER_PHONE_KEY, "+967771234567"),
        (PHONE_VERIFIED_KEY, "true"),
    ]);

    assert_eq!(bootstrap_session(&store).unwrap(), None);

    let entries = store.snapshot();
    assert!(!entries.contains_key(PHONE_VERIFIED_KEY));
    assert_eq!(entries.get(USER_PHONE_KEY).unwrap(), "+967771234567");
}

#[test]
fn test_missing_flag_is_not_verified() {
    let store = InMemorySessionStore::with_entries([(TOKEN_KEY, "abc"), (USER_KEY, "{}")]);

    assert_eq!(bootstrap_session(&store).unwrap(), None);
    assert_eq!(store.snapshot().len(), 2);
}

#[test]
fn test_missing_phone_restores_with_empty_phone() {
    let store = InMemorySessionStore::with_entries([
        (TOKEN_KEY, "abc"),
        (USER_KEY, "{}"),
        (PHONE_VERIFIED_KEY, "true"),
    ]);

    let payload = bootstrap_session(&store).unwrap().unwrap();
    assert_eq!(payload.phone_e164, "");
}

#[tokio::test]
async fn test_mount_reports_restored_session_without_network() {
    let h = harness_with_store(full_record());

    let restored = h.flow.mount();

    assert!(restored.is_some());
    assert_eq!(h.listener.verified().len(), 1);
    let session = h.flow.session();
    assert!(session.is_verified());
    assert_eq!(session.phone_input(), "771234567");
    assert_eq!(
        h.flow.send_otp().await,
        SendOutcome::Rejected(SendRejection::AlreadyVerified)
    );
    assert_eq!(h.api.send_count(), 0);
    assert_eq!(h.api.verify_count(), 0);
}

#[test]
fn test_mount_twice_reports_once() {
    let h = harness_with_store(full_record());

    h.flow.mount();
    assert!(h.flow.mount().is_none());

    assert_eq!(h.listener.verified().len(), 1);
    assert!(h.flow.is_mounted());
}

#[test]
fn test_mount_without_record_stays_idle() {
    let h = harness();

    assert!(h.flow.mount().is_none());
    assert!(h.listener.verified().is_empty());
    assert!(!h.flow.session().is_verified());
}
