//! Domain-specific error types and error handling.

mod types;

#[cfg(test)]
mod tests;

pub use types::{OtpApiError, StorageError};
