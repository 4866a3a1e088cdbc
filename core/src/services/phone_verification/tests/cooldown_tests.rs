//! Resend cooldown timing tests (paused tokio clock)

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use hb_shared::config::OtpFlowConfig;

use super::mocks::*;
use crate::domain::entities::{SendRejection, VerificationStage};
use crate::repositories::InMemorySessionStore;
use crate::services::phone_verification::{PhoneVerificationFlow, SendOutcome, VerifyOutcome};

async fn sleep_ms(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

async fn send(h: &Harness) {
    h.flow.mount();
    h.flow.set_phone("771234567");
    assert_eq!(h.flow.send_otp().await, SendOutcome::Sent);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_ticks_once_per_second() {
    let h = harness();
    send(&h).await;
    assert_eq!(h.flow.session().cooldown_remaining(), 30);

    sleep_ms(1_500).await;
    assert_eq!(h.flow.session().cooldown_remaining(), 29);

    sleep_ms(10_000).await;
    assert_eq!(h.flow.session().cooldown_remaining(), 19);
}

#[tokio::test(start_paused = true)]
async fn test_cooldown_stops_at_zero_and_enables_resend() {
    let h = harness();
    send(&h).await;
    assert!(!h.flow.session().can_resend());

    sleep_ms(30_500).await;
    let session = h.flow.session();
    assert_eq!(session.cooldown_remaining(), 0);
    assert!(session.can_resend());

    sleep_ms(5_000).await;
    assert_eq!(h.flow.session().cooldown_remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resend_refused_during_cooldown() {
    let h = harness();
    send(&h).await;
    sleep_ms(5_500).await;

    assert_eq!(
        h.flow.send_otp().await,
        SendOutcome::Rejected(SendRejection::CooldownActive {
            seconds_remaining: 25
        })
    );
    assert_eq!(h.api.send_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_resend_restarts_cooldown() {
    let h = harness();
    send(&h).await;
    sleep_ms(30_500).await;

    assert_eq!(h.flow.send_otp().await, SendOutcome::Sent);
    assert_eq!(h.flow.session().cooldown_remaining(), 30);

    sleep_ms(2_500).await;
    assert_eq!(h.flow.session().cooldown_remaining(), 28);
}

#[tokio::test(start_paused = true)]
async fn test_failed_resend_keeps_code_usable() {
    let h = harness();
    send(&h).await;
    sleep_ms(30_500).await;
    h.api.script_send(Scripted::now(Err(crate::errors::OtpApiError::transport("down"))));

    assert!(matches!(h.flow.send_otp().await, SendOutcome::Failed { .. }));

    let session = h.flow.session();
    assert_eq!(session.stage(), VerificationStage::OtpPending);
    assert!(session.shows_otp_input());
    assert!(matches!(h.flow.set_otp("123456").await, Some(VerifyOutcome::Verified(_))));
}

#[tokio::test(start_paused = true)]
async fn test_phone_edit_stops_cooldown() {
    let h = harness();
    send(&h).await;
    sleep_ms(3_500).await;

    h.flow.set_phone("771234568");
    assert_eq!(h.flow.session().cooldown_remaining(), 0);

    sleep_ms(3_000).await;
    let session = h.flow.session();
    assert_eq!(session.cooldown_remaining(), 0);
    assert_eq!(session.stage(), VerificationStage::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_unmount_stops_cooldown() {
    let h = harness();
    send(&h).await;
    sleep_ms(2_500).await;

    h.flow.unmount();
    sleep_ms(5_000).await;

    assert_eq!(h.flow.session().cooldown_remaining(), 28);
}

#[tokio::test(start_paused = true)]
async fn test_verification_stops_cooldown() {
    let h = harness();
    send(&h).await;
    h.flow.set_otp("123456").await;

    assert_eq!(h.flow.session().cooldown_remaining(), 0);
    sleep_ms(2_000).await;
    assert_eq!(h.flow.session().cooldown_remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_resend_aborts_verify_in_flight() {
    let api = Arc::new(MockOtpApi::new());
    let listener = Arc::new(RecordingListener::default());
    let flow = PhoneVerificationFlow::new(
        api.clone(),
        Arc::new(InMemorySessionStore::new()),
        listener.clone(),
        OtpFlowConfig {
            resend_cooldown_seconds: 0,
            ..OtpFlowConfig::default()
        },
    );
    flow.mount();
    flow.set_phone("771234567");
    assert_eq!(flow.send_otp().await, SendOutcome::Sent);
    api.script_verify(Scripted::after(
        100,
        verify_json(json!({ "success": true, "token": "abc", "user": {} })),
    ));

    let (verify, resend) = tokio::join!(flow.set_otp("123456"), async {
        sleep_ms(10).await;
        flow.send_otp().await
    });

    assert_eq!(verify, Some(VerifyOutcome::Cancelled));
    assert_eq!(resend, SendOutcome::Sent);
    assert_eq!(flow.session().otp_input(), "");
    assert!(listener.verified().is_empty());
}
