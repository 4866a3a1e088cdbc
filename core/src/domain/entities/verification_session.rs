//! Phone verification session: the state a single mounted flow owns.
//!
//! The session is a plain state machine. It never performs I/O; the
//! verification flow service feeds it user input and network results and
//! acts on what it returns.

use hb_shared::phone::{
    build_e164, sanitize_otp_input, validate_otp_code, validate_phone_number, OtpValidationError,
    PhoneValidationError, COUNTRY_DIAL_CODE, OTP_LENGTH,
};
use serde::Serialize;

/// Where the session stands in the verification flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStage {
    /// Waiting for a phone number and a send request
    Idle,
    /// A send request is in flight; `resend` when a code had already been sent
    Sending { resend: bool },
    /// A code was sent and the user can enter it
    OtpPending,
    /// A verify request is in flight
    Verifying,
    /// The phone is verified; terminal for this session
    Verified,
}

/// Why a send request was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    InvalidPhone(PhoneValidationError),
    AlreadyVerified,
    CooldownActive { seconds_remaining: u32 },
}

/// Why a verify request was not started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyRejection {
    InvalidOtp(OtpValidationError),
    AlreadyVerified,
    OtpNotSent,
    Busy,
    DuplicateCode,
}

/// What triggered a verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyTrigger {
    /// The user explicitly submitted the code
    Manual,
    /// The code input reached its full length
    Auto,
}

/// Effect of a phone number edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhoneEdit {
    /// The session is verified; the edit was ignored
    Ignored,
    /// Only the input changed
    Updated,
    /// A sent code (or in-flight request) was invalidated; outstanding
    /// requests and the cooldown timer must be cancelled
    Invalidated,
}

/// Phone and code of a verify request the session has committed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub phone_e164: String,
    pub otp: String,
}

/// Ephemeral verification state of one mounted flow
#[derive(Debug, Clone, Serialize)]
pub struct VerificationSession {
    phone_input: String,
    phone_e164: Option<String>,
    otp_input: String,
    stage: VerificationStage,
    cooldown_remaining: u32,
    last_attempted_otp: Option<String>,
    phone_error: Option<String>,
    otp_error: Option<String>,
    otp_touched: bool,
    #[serde(skip)]
    cooldown_seconds: u32,
}

impl VerificationSession {
    /// Create a fresh session whose resend cooldown lasts `cooldown_seconds`
    pub fn new(cooldown_seconds: u32) -> Self {
        Self {
            phone_input: String::new(),
            phone_e164: None,
            otp_input: String::new(),
            stage: VerificationStage::Idle,
            cooldown_remaining: 0,
            last_attempted_otp: None,
            phone_error: None,
            otp_error: None,
            otp_touched: false,
            cooldown_seconds,
        }
    }

    /// Mark the session verified from a persisted record, without any request
    pub fn restore_verified(&mut self, phone_e164: &str) {
        self.phone_e164 = Some(phone_e164.to_string()).filter(|p| !p.is_empty());
        self.phone_input = phone_e164
            .strip_prefix(COUNTRY_DIAL_CODE)
            .unwrap_or(phone_e164)
            .to_string();
        self.stage = VerificationStage::Verified;
        self.cooldown_remaining = 0;
    }

    pub fn stage(&self) -> VerificationStage {
        self.stage
    }

    pub fn phone_input(&self) -> &str {
        &self.phone_input
    }

    /// E.164 number the current code was requested for
    pub fn phone_e164(&self) -> Option<&str> {
        self.phone_e164.as_deref()
    }

    pub fn otp_input(&self) -> &str {
        &self.otp_input
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    pub fn last_attempted_otp(&self) -> Option<&str> {
        self.last_attempted_otp.as_deref()
    }

    pub fn phone_error(&self) -> Option<&str> {
        self.phone_error.as_deref()
    }

    /// OTP error, shown once the field was touched
    pub fn otp_error(&self) -> Option<&str> {
        if self.otp_touched {
            self.otp_error.as_deref()
        } else {
            None
        }
    }

    pub fn is_verified(&self) -> bool {
        self.stage == VerificationStage::Verified
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.stage, VerificationStage::Sending { .. })
    }

    pub fn is_verifying(&self) -> bool {
        self.stage == VerificationStage::Verifying
    }

    /// Whether a code has been sent and not invalidated
    pub fn otp_sent(&self) -> bool {
        matches!(
            self.stage,
            VerificationStage::OtpPending
                | VerificationStage::Verifying
                | VerificationStage::Sending { resend: true }
        )
    }

    /// The code input is shown as soon as a code was sent; cooldown does not gate it
    pub fn shows_otp_input(&self) -> bool {
        self.otp_sent()
    }

    /// Resend is disabled while sending, during cooldown, and once verified
    pub fn can_resend(&self) -> bool {
        matches!(
            self.stage,
            VerificationStage::OtpPending | VerificationStage::Verifying
        ) && self.cooldown_remaining == 0
    }

    /// Apply an edit of the phone input
    pub fn edit_phone(&mut self, input: &str) -> PhoneEdit {
        if self.is_verified() {
            return PhoneEdit::Ignored;
        }

        self.phone_input = input.to_string();
        if self.phone_error.is_some() {
            self.phone_error = validate_phone_number(&self.phone_input)
                .err()
                .map(|e| e.to_string());
        }

        if self.stage == VerificationStage::Idle {
            return PhoneEdit::Updated;
        }

        self.reset_otp();
        self.stage = VerificationStage::Idle;
        self.phone_e164 = None;
        PhoneEdit::Invalidated
    }

    /// Enter `Sending`, returning the E.164 number to request a code for
    ///
    /// A send while another send is in flight supersedes it; the caller is
    /// responsible for cancelling the earlier request.
    pub fn begin_send(&mut self) -> Result<String, SendRejection> {
        let resend = match self.stage {
            VerificationStage::Verified => return Err(SendRejection::AlreadyVerified),
            VerificationStage::OtpPending | VerificationStage::Verifying
                if self.cooldown_remaining > 0 =>
            {
                return Err(SendRejection::CooldownActive {
                    seconds_remaining: self.cooldown_remaining,
                })
            }
            VerificationStage::Idle => false,
            VerificationStage::Sending { resend } => resend,
            VerificationStage::OtpPending | VerificationStage::Verifying => true,
        };

        if let Err(error) = validate_phone_number(&self.phone_input) {
            self.phone_error = Some(error.to_string());
            return Err(SendRejection::InvalidPhone(error));
        }

        let phone_e164 = build_e164(&self.phone_input);
        self.phone_error = None;
        self.phone_e164 = Some(phone_e164.clone());
        self.stage = VerificationStage::Sending { resend };
        Ok(phone_e164)
    }

    /// The backend accepted the send request
    pub fn complete_send(&mut self) -> bool {
        if !self.is_sending() {
            return false;
        }
        self.reset_otp();
        self.cooldown_remaining = self.cooldown_seconds;
        self.stage = VerificationStage::OtpPending;
        true
    }

    /// The send request failed; a failed resend keeps the earlier code usable
    pub fn fail_send(&mut self, message: impl Into<String>) -> bool {
        let VerificationStage::Sending { resend } = self.stage else {
            return false;
        };
        self.phone_error = Some(message.into());
        if resend {
            self.stage = VerificationStage::OtpPending;
        } else {
            self.stage = VerificationStage::Idle;
            self.phone_e164 = None;
        }
        true
    }

    /// Apply an edit of the code input
    ///
    /// Returns the code when the edit should trigger an automatic verify.
    pub fn edit_otp(&mut self, input: &str) -> Option<String> {
        if self.is_verified() {
            return None;
        }

        self.otp_input = sanitize_otp_input(input);
        self.otp_error = validate_otp_code(&self.otp_input)
            .err()
            .map(|e| e.to_string());

        self.auto_verify_candidate()
    }

    /// Mark the code input as touched (blur), revealing its error
    pub fn touch_otp(&mut self) {
        self.otp_touched = true;
        self.otp_error = validate_otp_code(&self.otp_input)
            .err()
            .map(|e| e.to_string());
    }

    fn auto_verify_candidate(&self) -> Option<String> {
        let complete = self.otp_input.len() == OTP_LENGTH;
        let fresh = self.last_attempted_otp.as_deref() != Some(self.otp_input.as_str());
        if complete && fresh && self.stage == VerificationStage::OtpPending {
            Some(self.otp_input.clone())
        } else {
            None
        }
    }

    /// Enter `Verifying` with the current code
    ///
    /// A manual submit while verifying supersedes the earlier attempt; an
    /// automatic one never does, and never repeats the last attempted code.
    pub fn begin_verify(&mut self, trigger: VerifyTrigger) -> Result<PendingVerification, VerifyRejection> {
        match (self.stage, trigger) {
            (VerificationStage::Verified, _) => return Err(VerifyRejection::AlreadyVerified),
            (VerificationStage::Idle, _) => return Err(VerifyRejection::OtpNotSent),
            (VerificationStage::Sending { .. }, _) => return Err(VerifyRejection::Busy),
            (VerificationStage::Verifying, VerifyTrigger::Auto) => return Err(VerifyRejection::Busy),
            (VerificationStage::OtpPending, _) | (VerificationStage::Verifying, VerifyTrigger::Manual) => {}
        }

        if trigger == VerifyTrigger::Manual {
            self.otp_touched = true;
        }

        if let Err(error) = validate_otp_code(&self.otp_input) {
            self.otp_error = Some(error.to_string());
            return Err(VerifyRejection::InvalidOtp(error));
        }

        if trigger == VerifyTrigger::Auto
            && self.last_attempted_otp.as_deref() == Some(self.otp_input.as_str())
        {
            return Err(VerifyRejection::DuplicateCode);
        }

        let phone_e164 = self
            .phone_e164
            .clone()
            .unwrap_or_else(|| build_e164(&self.phone_input));

        self.last_attempted_otp = Some(self.otp_input.clone());
        self.otp_error = None;
        self.stage = VerificationStage::Verifying;

        Ok(PendingVerification {
            phone_e164,
            otp: self.otp_input.clone(),
        })
    }

    /// The backend accepted the code
    pub fn complete_verify(&mut self) -> bool {
        if !self.is_verifying() {
            return false;
        }
        self.stage = VerificationStage::Verified;
        self.cooldown_remaining = 0;
        self.otp_error = None;
        true
    }

    /// The code was rejected or the request failed; the input stays editable
    pub fn fail_verify(&mut self, message: impl Into<String>) -> bool {
        if !self.is_verifying() {
            return false;
        }
        self.stage = VerificationStage::OtpPending;
        self.otp_touched = true;
        self.otp_error = Some(message.into());
        true
    }

    /// Advance the resend cooldown by one second, returning what remains
    pub fn tick_cooldown(&mut self) -> u32 {
        if self.otp_sent() && self.cooldown_remaining > 0 {
            self.cooldown_remaining -= 1;
        }
        self.cooldown_remaining
    }

    fn reset_otp(&mut self) {
        self.otp_input.clear();
        self.otp_error = None;
        self.otp_touched = false;
        self.cooldown_remaining = 0;
        self.last_attempted_otp = None;
    }
}
