//! HTTP middleware

pub mod rate_limit;

pub use rate_limit::{get_client_ip, spawn_sweeper, RateLimiter};
