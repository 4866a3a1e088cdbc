//! Domain entities representing core business objects.

pub mod auth_record;
pub mod verification_session;

// Re-export commonly used types
pub use auth_record::{
    PersistedAuthRecord, PHONE_VERIFIED_KEY, PHONE_VERIFIED_VALUE, TOKEN_KEY, USER_KEY,
    USER_PHONE_KEY,
};
pub use verification_session::{
    PendingVerification, PhoneEdit, SendRejection, VerificationSession, VerificationStage,
    VerifyRejection, VerifyTrigger,
};
