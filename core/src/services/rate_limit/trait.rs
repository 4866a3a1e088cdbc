//! Storage interface for rate limit counters

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StorageError;

/// Request counter of one key within one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitBucket {
    pub count: u32,
    pub window_started_at: DateTime<Utc>,
    /// End of the window; the bucket is expired from this instant on
    pub reset_at: DateTime<Utc>,
}

impl RateLimitBucket {
    /// Open a window at `now` holding one request
    ///
    /// A window reaching past the representable range ends at
    /// `DateTime::<Utc>::MAX_UTC`.
    pub fn open(now: DateTime<Utc>, window: TimeDelta) -> Self {
        Self {
            count: 1,
            window_started_at: now,
            reset_at: now.checked_add_signed(window).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset_at
    }
}

/// Storage of rate limit buckets
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Bucket currently stored for `key`, expired or not
    async fn get(&self, key: &str) -> Result<Option<RateLimitBucket>, StorageError>;

    /// Store `bucket` for `key`
    async fn set(&self, key: &str, bucket: RateLimitBucket) -> Result<(), StorageError>;

    /// Remove every bucket expired at `now`, returning how many were removed
    async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, StorageError>;
}
