//! Mock implementations for testing the verification flow

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hb_shared::config::OtpFlowConfig;

use crate::domain::value_objects::{
    SendOtpRequest, SendOtpResponse, VerifyOtpRequest, VerifyOtpResponse,
};
use crate::errors::OtpApiError;
use crate::repositories::InMemorySessionStore;
use crate::services::phone_verification::{
    Notice, OtpApiTrait, OtpAutofill, PhoneVerificationFlow, VerificationListener,
    VerifiedPayload,
};

/// A scripted backend reply, delivered after `delay`
pub struct Scripted<T> {
    pub delay: Duration,
    pub result: Result<T, OtpApiError>,
}

impl<T> Scripted<T> {
    pub fn now(result: Result<T, OtpApiError>) -> Self {
        Self {
            delay: Duration::ZERO,
            result,
        }
    }

    pub fn after(millis: u64, result: Result<T, OtpApiError>) -> Self {
        Self {
            delay: Duration::from_millis(millis),
            result,
        }
    }
}

// Mock OTP backend; unscripted calls succeed immediately
#[derive(Default)]
pub struct MockOtpApi {
    send_replies: Mutex<VecDeque<Scripted<SendOtpResponse>>>,
    verify_replies: Mutex<VecDeque<Scripted<VerifyOtpResponse>>>,
    pub send_calls: Arc<Mutex<Vec<SendOtpRequest>>>,
    pub verify_calls: Arc<Mutex<Vec<VerifyOtpRequest>>>,
}

impl MockOtpApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_send(&self, reply: Scripted<SendOtpResponse>) {
        self.send_replies.lock().unwrap().push_back(reply);
    }

    pub fn script_verify(&self, reply: Scripted<VerifyOtpResponse>) {
        self.verify_replies.lock().unwrap().push_back(reply);
    }

    pub fn send_count(&self) -> usize {
        self.send_calls.lock().unwrap().len()
    }

    pub fn verify_count(&self) -> usize {
        self.verify_calls.lock().unwrap().len()
    }
}

pub fn send_ok() -> Result<SendOtpResponse, OtpApiError> {
    Ok(SendOtpResponse {
        success: true,
        message: None,
    })
}

pub fn verify_json(value: serde_json::Value) -> Result<VerifyOtpResponse, OtpApiError> {
    Ok(serde_json::from_value(value).unwrap())
}

#[async_trait]
impl OtpApiTrait for MockOtpApi {
    async fn send_otp(&self, request: SendOtpRequest) -> Result<SendOtpResponse, OtpApiError> {
        self.send_calls.lock().unwrap().push(request);
        let reply = self.send_replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.result
            }
            None => send_ok(),
        }
    }

    async fn verify_otp(&self, request: VerifyOtpRequest) -> Result<VerifyOtpResponse, OtpApiError> {
        self.verify_calls.lock().unwrap().push(request);
        let reply = self.verify_replies.lock().unwrap().pop_front();
        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.result
            }
            None => Ok(VerifyOtpResponse {
                success: true,
                ..Default::default()
            }),
        }
    }
}

// Listener recording every event it receives
#[derive(Default)]
pub struct RecordingListener {
    pub verified: Mutex<Vec<VerifiedPayload>>,
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingListener {
    pub fn verified(&self) -> Vec<VerifiedPayload> {
        self.verified.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl VerificationListener for RecordingListener {
    fn on_verified(&self, payload: &VerifiedPayload) {
        self.verified.lock().unwrap().push(payload.clone());
    }

    fn on_notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

// Platform autofill delivering a fixed result after a delay
pub struct MockAutofill {
    pub delay: Duration,
    pub result: Result<Option<String>, String>,
}

#[async_trait]
impl OtpAutofill for MockAutofill {
    async fn receive_code(&self) -> Result<Option<String>, String> {
        tokio::time::sleep(self.delay).await;
        self.result.clone()
    }
}

pub type TestFlow = PhoneVerificationFlow<MockOtpApi, InMemorySessionStore, RecordingListener>;

pub struct Harness {
    pub flow: TestFlow,
    pub api: Arc<MockOtpApi>,
    pub store: Arc<InMemorySessionStore>,
    pub listener: Arc<RecordingListener>,
}

pub fn harness_with_store(store: InMemorySessionStore) -> Harness {
    let api = Arc::new(MockOtpApi::new());
    let store = Arc::new(store);
    let listener = Arc::new(RecordingListener::default());
    let flow = PhoneVerificationFlow::new(
        api.clone(),
        store.clone(),
        listener.clone(),
        OtpFlowConfig::default(),
    );
    Harness {
        flow,
        api,
        store,
        listener,
    }
}

pub fn harness() -> Harness {
    harness_with_store(InMemorySessionStore::new())
}
