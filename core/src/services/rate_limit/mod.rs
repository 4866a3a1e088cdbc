//! Fixed-window rate limiting
//!
//! Counters are kept per key (client IP for the HTTP middleware) in an
//! injectable store, so the in-memory default can be replaced by a shared
//! store when several instances sit behind a load balancer.

pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
mod limiter;
mod memory;

#[cfg(test)]
mod tests;

pub use limiter::{FixedWindowRateLimiter, RateLimitDecision};
pub use memory::InMemoryRateLimitStore;
pub use r#trait::{RateLimitBucket, RateLimitStore};
