//! Rate limiting configuration module

use serde::{Deserialize, Serialize};
use std::env;

/// Longest accepted window; anything above is refused when loading config
pub const MAX_WINDOW_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Fixed-window rate limiting configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Enable rate limiting
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Window length in seconds
    #[serde(default = "default_window_seconds")]
    pub window_seconds: u64,

    /// Max requests per client per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// How often expired buckets are swept, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,

    /// Key clients by `X-Forwarded-For` / `X-Real-IP`
    ///
    /// Only enable behind a reverse proxy that overwrites these headers;
    /// otherwise clients pick their own key.
    #[serde(default)]
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_seconds: default_window_seconds(),
            max_requests: default_max_requests(),
            sweep_interval_seconds: default_sweep_interval(),
            trust_forwarded_headers: false,
        }
    }
}

impl RateLimitConfig {
    /// Relaxed limits for local development
    pub fn development() -> Self {
        Self {
            max_requests: 100,
            ..Default::default()
        }
    }

    /// Production limits
    pub fn production() -> Self {
        Self::default()
    }

    /// Apply `RATE_LIMIT_*` environment overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(enabled) = env::var("RATE_LIMIT_ENABLED").ok().and_then(|v| v.parse().ok()) {
            self.enabled = enabled;
        }
        if let Some(window) = env::var("RATE_LIMIT_WINDOW_SECONDS").ok().and_then(|v| v.parse().ok()) {
            self.window_seconds = window;
        }
        if let Some(max) = env::var("RATE_LIMIT_MAX_REQUESTS").ok().and_then(|v| v.parse().ok()) {
            self.max_requests = max;
        }
        if let Some(sweep) = env::var("RATE_LIMIT_SWEEP_INTERVAL_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.sweep_interval_seconds = sweep;
        }
        if let Some(trust) = env::var("RATE_LIMIT_TRUST_FORWARDED_HEADERS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.trust_forwarded_headers = trust;
        }
        self
    }

    /// Check the values a limiter cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }
        if self.max_requests == 0 {
            return Err("rate_limit.max_requests must be at least 1".to_string());
        }
        if self.window_seconds == 0 || self.window_seconds > MAX_WINDOW_SECONDS {
            return Err(format!(
                "rate_limit.window_seconds must be between 1 and {}",
                MAX_WINDOW_SECONDS
            ));
        }
        Ok(())
    }
}

fn default_enabled() -> bool {
    true
}

fn default_window_seconds() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    10
}

fn default_sweep_interval() -> u64 {
    300
}
