//! Phone verification flow implementation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use hb_shared::config::OtpFlowConfig;
use hb_shared::phone::mask_phone_number;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::domain::entities::{
    PersistedAuthRecord, PhoneEdit, VerificationSession, VerifyTrigger,
};
use crate::domain::value_objects::{SendOtpRequest, VerifyOtpRequest};
use crate::repositories::SessionStore;

use super::bootstrap::bootstrap_session;
use super::traits::{OtpApiTrait, OtpAutofill, VerificationListener};
use super::types::{Notice, SendOutcome, VerifiedPayload, VerifyOutcome};

/// Field error when a send fails without a backend message
pub const SEND_FAILED_MESSAGE: &str = "Failed to send verification code. Please try again.";
/// Field error when a verify fails without a backend message
pub const VERIFY_FAILED_MESSAGE: &str = "Verification failed. Please check the code and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    Unmounted,
}

struct FlowState {
    session: VerificationSession,
    lifecycle: Lifecycle,
    send_seq: u64,
    verify_seq: u64,
    send_abort: Option<AbortHandle>,
    verify_abort: Option<AbortHandle>,
    cooldown_task: Option<JoinHandle<()>>,
    autofill_task: Option<JoinHandle<()>>,
}

impl FlowState {
    fn is_active(&self) -> bool {
        self.lifecycle != Lifecycle::Unmounted
    }

    fn cancel_send(&mut self) {
        self.send_seq += 1;
        if let Some(handle) = self.send_abort.take() {
            handle.abort();
        }
    }

    fn cancel_verify(&mut self) {
        self.verify_seq += 1;
        if let Some(handle) = self.verify_abort.take() {
            handle.abort();
        }
    }

    fn stop_cooldown(&mut self) {
        if let Some(task) = self.cooldown_task.take() {
            task.abort();
        }
    }

    fn teardown(&mut self) {
        self.lifecycle = Lifecycle::Unmounted;
        self.cancel_send();
        self.cancel_verify();
        self.stop_cooldown();
        if let Some(task) = self.autofill_task.take() {
            task.abort();
        }
    }
}

struct FlowInner<A, S, L> {
    api: Arc<A>,
    store: Arc<S>,
    listener: Arc<L>,
    config: OtpFlowConfig,
    state: Mutex<FlowState>,
}

/// Phone verification flow bound to one mounted view
///
/// All operations take `&self`; concurrent calls are serialized through the
/// session stage. At most one send and one verify are outstanding; a newer
/// request aborts the older one, whose outcome is `Cancelled`. Dropping the
/// flow unmounts it.
pub struct PhoneVerificationFlow<A, S, L>
where
    A: OtpApiTrait + 'static,
    S: SessionStore + 'static,
    L: VerificationListener + 'static,
{
    inner: Arc<FlowInner<A, S, L>>,
}

impl<A, S, L> PhoneVerificationFlow<A, S, L>
where
    A: OtpApiTrait + 'static,
    S: SessionStore + 'static,
    L: VerificationListener + 'static,
{
    /// Create a new verification flow
    ///
    /// # Arguments
    ///
    /// * `api` - OTP backend client
    /// * `store` - Durable storage for the auth record
    /// * `listener` - Receiver of verified payloads and notices
    /// * `config` - Cooldown and OTP purpose
    pub fn new(api: Arc<A>, store: Arc<S>, listener: Arc<L>, config: OtpFlowConfig) -> Self {
        let session = VerificationSession::new(config.resend_cooldown_seconds);
        Self {
            inner: Arc::new(FlowInner {
                api,
                store,
                listener,
                config,
                state: Mutex::new(FlowState {
                    session,
                    lifecycle: Lifecycle::Created,
                    send_seq: 0,
                    verify_seq: 0,
                    send_abort: None,
                    verify_abort: None,
                    cooldown_task: None,
                    autofill_task: None,
                }),
            }),
        }
    }

    /// Mount the flow, restoring a previously verified session if one is stored
    ///
    /// A restored session is reported to the listener immediately, without
    /// any network call. Mounting twice, or after unmount, does nothing.
    pub fn mount(&self) -> Option<VerifiedPayload> {
        self.inner.mount()
    }

    /// Update the phone input; an edit after a send invalidates the code
    pub fn set_phone(&self, input: &str) -> PhoneEdit {
        self.inner.set_phone(input)
    }

    /// Send (or resend) a code to the current phone
    pub async fn send_otp(&self) -> SendOutcome {
        self.inner.send_otp().await
    }

    /// Update the code input
    ///
    /// When the input reaches full length the code is verified right away
    /// and the outcome of that attempt is returned.
    pub async fn set_otp(&self, input: &str) -> Option<VerifyOutcome> {
        self.inner.set_otp(input, false).await
    }

    /// Mark the code input as touched
    pub fn blur_otp(&self) {
        let mut state = self.inner.lock();
        if state.is_active() {
            state.session.touch_otp();
        }
    }

    /// Explicitly submit the current code
    pub async fn submit_otp(&self) -> VerifyOutcome {
        self.inner.verify(VerifyTrigger::Manual).await
    }

    /// Listen once for a code delivered by the platform
    ///
    /// A delivered code fills the input and marks it touched, which may
    /// auto-submit. Failures are ignored.
    pub fn listen_for_autofill<F>(&self, autofill: Arc<F>)
    where
        F: OtpAutofill + 'static,
    {
        self.inner.listen_for_autofill(autofill)
    }

    /// Snapshot of the current session
    pub fn session(&self) -> VerificationSession {
        self.inner.lock().session.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.lock().lifecycle == Lifecycle::Mounted
    }

    /// Cancel outstanding requests and background tasks; no state changes afterwards
    pub fn unmount(&self) {
        self.inner.lock().teardown();
        tracing::debug!(event = "verification_unmounted", "Verification flow unmounted");
    }
}

impl<A, S, L> Drop for PhoneVerificationFlow<A, S, L>
where
    A: OtpApiTrait + 'static,
    S: SessionStore + 'static,
    L: VerificationListener + 'static,
{
    fn drop(&mut self) {
        self.inner.lock().teardown();
    }
}

impl<A, S, L> FlowInner<A, S, L>
where
    A: OtpApiTrait + 'static,
    S: SessionStore + 'static,
    L: VerificationListener + 'static,
{
    fn lock(&self) -> MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Never call with the state lock held
    fn notify(&self, notice: Option<Notice>) {
        if let Some(notice) = notice {
            if self.lock().is_active() {
                self.listener.on_notice(&notice);
            }
        }
    }

    fn mount(&self) -> Option<VerifiedPayload> {
        {
            let mut state = self.lock();
            if state.lifecycle != Lifecycle::Created {
                return None;
            }
            state.lifecycle = Lifecycle::Mounted;
        }

        let restored = match bootstrap_session(self.store.as_ref()) {
            Ok(restored) => restored,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    event = "session_bootstrap_failed",
                    "Failed to read persisted auth record"
                );
                None
            }
        }?;

        {
            let mut state = self.lock();
            if !state.is_active() {
                return None;
            }
            state.session.restore_verified(&restored.phone_e164);
        }

        self.listener.on_verified(&restored);
        Some(restored)
    }

    fn set_phone(&self, input: &str) -> PhoneEdit {
        let mut state = self.lock();
        if !state.is_active() {
            return PhoneEdit::Ignored;
        }

        let edit = state.session.edit_phone(input);
        if edit == PhoneEdit::Invalidated {
            state.cancel_send();
            state.cancel_verify();
            state.stop_cooldown();
            tracing::debug!(event = "otp_invalidated", "Phone edited, pending code invalidated");
        }
        edit
    }

    async fn send_otp(self: &Arc<Self>) -> SendOutcome {
        let (seq, phone_e164, registration) = {
            let mut state = self.lock();
            if !state.is_active() {
                return SendOutcome::Cancelled;
            }

            let phone_e164 = match state.session.begin_send() {
                Ok(phone_e164) => phone_e164,
                Err(rejection) => return SendOutcome::Rejected(rejection),
            };

            // A new send supersedes both the previous send and a pending verify
            state.cancel_send();
            state.cancel_verify();
            let (handle, registration) = AbortHandle::new_pair();
            state.send_abort = Some(handle);
            (state.send_seq, phone_e164, registration)
        };

        tracing::info!(
            phone = %mask_phone_number(&phone_e164),
            purpose = %self.config.purpose,
            event = "otp_send_started",
            "Requesting verification code"
        );

        let request = SendOtpRequest::new(phone_e164.clone(), self.config.purpose);
        let result = Abortable::new(self.api.send_otp(request), registration).await;

        let outcome = {
            let mut state = self.lock();
            if !state.is_active() || state.send_seq != seq {
                return SendOutcome::Cancelled;
            }
            state.send_abort = None;

            match result {
                Err(_aborted) => return SendOutcome::Cancelled,
                Ok(Ok(response)) if response.success => {
                    state.session.complete_send();
                    self.start_cooldown(&mut state);
                    SendOutcome::Sent
                }
                Ok(Ok(response)) => {
                    let message = response
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| SEND_FAILED_MESSAGE.to_string());
                    state.session.fail_send(message.clone());
                    SendOutcome::Failed { message }
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, event = "otp_send_error", "OTP send request failed");
                    let message = e.user_message().unwrap_or(SEND_FAILED_MESSAGE).to_string();
                    state.session.fail_send(message.clone());
                    SendOutcome::Failed { message }
                }
            }
        };

        match &outcome {
            SendOutcome::Sent => tracing::info!(
                phone = %mask_phone_number(&phone_e164),
                event = "otp_sent",
                "Verification code sent"
            ),
            SendOutcome::Failed { message } => tracing::warn!(
                phone = %mask_phone_number(&phone_e164),
                reason = %message,
                event = "otp_send_failed",
                "Verification code was not sent"
            ),
            _ => {}
        }

        self.notify(Notice::for_send(&outcome));
        outcome
    }

    async fn set_otp(self: &Arc<Self>, input: &str, touch: bool) -> Option<VerifyOutcome> {
        let candidate = {
            let mut state = self.lock();
            if !state.is_active() {
                return None;
            }
            let candidate = state.session.edit_otp(input);
            if touch {
                state.session.touch_otp();
            }
            candidate
        };

        candidate?;
        Some(self.verify(VerifyTrigger::Auto).await)
    }

    async fn verify(self: &Arc<Self>, trigger: VerifyTrigger) -> VerifyOutcome {
        let (seq, pending, registration) = {
            let mut state = self.lock();
            if !state.is_active() {
                return VerifyOutcome::Cancelled;
            }

            let pending = match state.session.begin_verify(trigger) {
                Ok(pending) => pending,
                Err(rejection) => return VerifyOutcome::Rejected(rejection),
            };

            state.cancel_verify();
            let (handle, registration) = AbortHandle::new_pair();
            state.verify_abort = Some(handle);
            (state.verify_seq, pending, registration)
        };

        tracing::info!(
            phone = %mask_phone_number(&pending.phone_e164),
            trigger = ?trigger,
            event = "otp_verify_started",
            "Verifying code"
        );

        let request = VerifyOtpRequest::new(
            pending.phone_e164.clone(),
            pending.otp.clone(),
            self.config.purpose,
        );
        let result = Abortable::new(self.api.verify_otp(request), registration).await;

        let (outcome, record) = {
            let mut state = self.lock();
            if !state.is_active() || state.verify_seq != seq {
                return VerifyOutcome::Cancelled;
            }
            state.verify_abort = None;

            match result {
                Err(_aborted) => return VerifyOutcome::Cancelled,
                Ok(Ok(response)) if response.success => {
                    state.session.complete_verify();
                    state.stop_cooldown();
                    let record =
                        PersistedAuthRecord::from_verify_response(&pending.phone_e164, &response);
                    let payload = VerifiedPayload::from_record(&record, response.user_exists);
                    (VerifyOutcome::Verified(payload), Some(record))
                }
                Ok(Ok(response)) => {
                    let message = response
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| VERIFY_FAILED_MESSAGE.to_string());
                    state.session.fail_verify(message.clone());
                    (VerifyOutcome::Failed { message }, None)
                }
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, event = "otp_verify_error", "OTP verify request failed");
                    let message = e.user_message().unwrap_or(VERIFY_FAILED_MESSAGE).to_string();
                    state.session.fail_verify(message.clone());
                    (VerifyOutcome::Failed { message }, None)
                }
            }
        };

        if let Some(record) = record {
            if let Err(e) = record.write_to(self.store.as_ref()) {
                tracing::error!(
                    error = %e,
                    event = "auth_record_write_failed",
                    "Failed to persist auth record"
                );
            }
        }

        // The lock was released above; an unmount in between silences the listener
        if !self.lock().is_active() {
            return outcome;
        }

        match &outcome {
            VerifyOutcome::Verified(payload) => {
                tracing::info!(
                    phone = %mask_phone_number(&payload.phone_e164),
                    has_account = payload.token.is_some(),
                    event = "otp_verified",
                    "Phone number verified"
                );
                self.listener.on_verified(payload);
            }
            VerifyOutcome::Failed { message } => tracing::warn!(
                phone = %mask_phone_number(&pending.phone_e164),
                reason = %message,
                event = "otp_verify_failed",
                "Verification code rejected"
            ),
            _ => {}
        }

        self.notify(Notice::for_verify(&outcome));
        outcome
    }

    /// Restart the one-second cooldown ticker; the caller holds the state lock
    fn start_cooldown(self: &Arc<Self>, state: &mut FlowState) {
        state.stop_cooldown();

        let weak: Weak<Self> = Arc::downgrade(self);
        let period = Duration::from_secs(1);
        state.cooldown_task = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let remaining = {
                    let mut state = inner.lock();
                    if !state.is_active() {
                        break;
                    }
                    state.session.tick_cooldown()
                };
                if remaining == 0 {
                    break;
                }
            }
        }));
    }

    fn listen_for_autofill<F>(self: &Arc<Self>, autofill: Arc<F>)
    where
        F: OtpAutofill + 'static,
    {
        let mut state = self.lock();
        if !state.is_active() || state.autofill_task.is_some() {
            return;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        state.autofill_task = Some(tokio::spawn(async move {
            let code = match autofill.receive_code().await {
                Ok(Some(code)) => code,
                Ok(None) => return,
                Err(e) => {
                    tracing::debug!(error = %e, event = "otp_autofill_failed", "OTP autofill unavailable");
                    return;
                }
            };
            let Some(inner) = weak.upgrade() else {
                return;
            };
            tracing::debug!(event = "otp_autofilled", "Verification code delivered by platform");
            inner.set_otp(&code, true).await;
        }));
    }
}
