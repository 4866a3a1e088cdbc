//! Business services containing domain logic and use cases.

pub mod phone_verification;
pub mod rate_limit;

// Re-export commonly used types
pub use phone_verification::{
    bootstrap_session, Notice, NoticeLevel, OtpApiTrait, OtpAutofill, PhoneVerificationFlow,
    SendOutcome, VerificationListener, VerifiedPayload, VerifyOutcome,
};
pub use rate_limit::{
    FixedWindowRateLimiter, InMemoryRateLimitStore, RateLimitBucket, RateLimitDecision,
    RateLimitStore,
};
