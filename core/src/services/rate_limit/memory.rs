//! In-memory rate limit store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::errors::StorageError;

use super::trait_::{RateLimitBucket, RateLimitStore};

/// Buckets kept in process memory; each instance counts on its own
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    buckets: Mutex<HashMap<String, RateLimitBucket>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored buckets, including expired ones not yet swept
    pub async fn len(&self) -> usize {
        self.buckets.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.buckets.lock().await.is_empty()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitBucket>, StorageError> {
        Ok(self.buckets.lock().await.get(key).copied())
    }

    async fn set(&self, key: &str, bucket: RateLimitBucket) -> Result<(), StorageError> {
        self.buckets.lock().await.insert(key.to_string(), bucket);
        Ok(())
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| !bucket.is_expired(now));
        Ok(before - buckets.len())
    }
}
