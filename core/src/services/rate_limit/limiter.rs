//! Fixed-window rate limiter

use chrono::{DateTime, TimeDelta, Utc};
use hb_shared::config::rate_limit::MAX_WINDOW_SECONDS;
use hb_shared::config::RateLimitConfig;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::errors::StorageError;

use super::trait_::{RateLimitBucket, RateLimitStore};

/// Verdict for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_at: DateTime<Utc>,
    },
    Limited {
        limit: u32,
        /// Whole seconds until the window ends, at least 1
        retry_after_seconds: u64,
        reset_at: DateTime<Utc>,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Counts requests per key in fixed windows of `window_seconds`
///
/// Each check is a read-modify-write on the store; checks are serialized
/// within one limiter so concurrent requests never lose a count.
pub struct FixedWindowRateLimiter<S: RateLimitStore> {
    store: Arc<S>,
    config: RateLimitConfig,
    update_lock: Mutex<()>,
}

impl<S: RateLimitStore> FixedWindowRateLimiter<S> {
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config,
            update_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn limit(&self) -> u32 {
        self.config.max_requests
    }

    /// Window length, clamped to the longest window the config accepts
    fn window(&self) -> TimeDelta {
        let seconds = self.config.window_seconds.clamp(1, MAX_WINDOW_SECONDS) as i64;
        TimeDelta::try_seconds(seconds).unwrap_or(TimeDelta::weeks(1))
    }

    /// Record a request for `key` at `now` and decide whether it may proceed
    pub async fn check(
        &self,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<RateLimitDecision, StorageError> {
        let limit = self.limit();
        if !self.config.enabled {
            return Ok(RateLimitDecision::Allowed {
                limit,
                remaining: limit,
                reset_at: now,
            });
        }

        let _guard = self.update_lock.lock().await;

        let bucket = match self.store.get(key).await? {
            Some(bucket) if !bucket.is_expired(now) => {
                if bucket.count >= limit {
                    let retry_after = (bucket.reset_at - now).num_milliseconds();
                    let retry_after_seconds = u64::try_from((retry_after + 999) / 1000)
                        .unwrap_or(1)
                        .max(1);

                    tracing::warn!(
                        key = key,
                        count = bucket.count,
                        limit = limit,
                        retry_after_seconds = retry_after_seconds,
                        event = "rate_limit_exceeded",
                        "Rate limit exceeded"
                    );
                    return Ok(RateLimitDecision::Limited {
                        limit,
                        retry_after_seconds,
                        reset_at: bucket.reset_at,
                    });
                }
                RateLimitBucket {
                    count: bucket.count + 1,
                    ..bucket
                }
            }
            _ => RateLimitBucket::open(now, self.window()),
        };

        self.store.set(key, bucket).await?;

        Ok(RateLimitDecision::Allowed {
            limit,
            remaining: limit.saturating_sub(bucket.count),
            reset_at: bucket.reset_at,
        })
    }

    /// Drop buckets whose window has ended
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let removed = self.store.sweep(now).await?;
        if removed > 0 {
            tracing::debug!(removed = removed, event = "rate_limit_swept", "Removed expired rate limit buckets");
        }
        Ok(removed)
    }
}
