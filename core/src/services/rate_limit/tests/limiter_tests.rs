//! Unit tests for the fixed-window rate limiter

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;

use hb_shared::config::RateLimitConfig;

use crate::services::rate_limit::{
    FixedWindowRateLimiter, InMemoryRateLimitStore, RateLimitBucket, RateLimitDecision,
    RateLimitStore,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
}

fn limiter(max_requests: u32) -> (FixedWindowRateLimiter<InMemoryRateLimitStore>, Arc<InMemoryRateLimitStore>) {
    let store = Arc::new(InMemoryRateLimitStore::new());
    let config = RateLimitConfig {
        enabled: true,
        window_seconds: 60,
        max_requests,
        sweep_interval_seconds: 300,
        trust_forwarded_headers: false,
    };
    (FixedWindowRateLimiter::new(store.clone(), config), store)
}

#[tokio::test]
async fn test_allows_up_to_max_requests() {
    let (limiter, _) = limiter(3);

    for expected_remaining in [2, 1, 0] {
        let decision = limiter.check("10.0.0.1", t0()).await.unwrap();
        assert_eq!(
            decision,
            RateLimitDecision::Allowed {
                limit: 3,
                remaining: expected_remaining,
                reset_at: t0() + Duration::seconds(60),
            }
        );
    }
}

#[tokio::test]
async fn test_refuses_with_retry_after() {
    let (limiter, _) = limiter(2);
    limiter.check("10.0.0.1", t0()).await.unwrap();
    limiter.check("10.0.0.1", t0()).await.unwrap();

    let decision = limiter
        .check("10.0.0.1", t0() + Duration::milliseconds(15_500))
        .await
        .unwrap();

    assert_eq!(
        decision,
        RateLimitDecision::Limited {
            limit: 2,
            retry_after_seconds: 45,
            reset_at: t0() + Duration::seconds(60),
        }
    );
}

#[tokio::test]
async fn test_retry_after_is_at_least_one_second() {
    let (limiter, _) = limiter(1);
    limiter.check("k", t0()).await.unwrap();

    let decision = limiter
        .check("k", t0() + Duration::milliseconds(59_999))
        .await
        .unwrap();

    assert!(matches!(
        decision,
        RateLimitDecision::Limited { retry_after_seconds: 1, .. }
    ));
}

#[tokio::test]
async fn test_new_window_after_expiry() {
    let (limiter, _) = limiter(1);
    limiter.check("k", t0()).await.unwrap();
    assert!(!limiter.check("k", t0() + Duration::seconds(30)).await.unwrap().is_allowed());

    let later = t0() + Duration::seconds(60);
    let decision = limiter.check("k", later).await.unwrap();

    assert_eq!(
        decision,
        RateLimitDecision::Allowed {
            limit: 1,
            remaining: 0,
            reset_at: later + Duration::seconds(60),
        }
    );
}

#[tokio::test]
async fn test_keys_are_independent() {
    let (limiter, _) = limiter(1);
    assert!(limiter.check("a", t0()).await.unwrap().is_allowed());
    assert!(limiter.check("b", t0()).await.unwrap().is_allowed());
    assert!(!limiter.check("a", t0()).await.unwrap().is_allowed());
}

#[tokio::test]
async fn test_refused_requests_do_not_extend_window() {
    let (limiter, store) = limiter(1);
    limiter.check("k", t0()).await.unwrap();
    limiter.check("k", t0() + Duration::seconds(10)).await.unwrap();
    limiter.check("k", t0() + Duration::seconds(20)).await.unwrap();

    let bucket = store.get("k").await.unwrap().unwrap();
    assert_eq!(bucket.count, 1);
    assert_eq!(bucket.reset_at, t0() + Duration::seconds(60));
}

#[tokio::test]
async fn test_disabled_limiter_always_allows() {
    let store = Arc::new(InMemoryRateLimitStore::new());
    let limiter = FixedWindowRateLimiter::new(
        store.clone(),
        RateLimitConfig {
            enabled: false,
            max_requests: 1,
            ..RateLimitConfig::default()
        },
    );

    for _ in 0..5 {
        assert!(limiter.check("k", t0()).await.unwrap().is_allowed());
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_sweep_removes_only_expired_buckets() {
    let (limiter, store) = limiter(5);
    limiter.check("old", t0()).await.unwrap();
    limiter.check("fresh", t0() + Duration::seconds(30)).await.unwrap();

    let removed = limiter.sweep(t0() + Duration::seconds(60)).await.unwrap();

    assert_eq!(removed, 1);
    assert_eq!(store.len().await, 1);
    assert!(store.get("fresh").await.unwrap().is_some());
    assert!(store.get("old").await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_checks_count_every_request() {
    let (limiter, store) = limiter(100);
    let limiter = Arc::new(limiter);

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.check("k", t0()).await.unwrap() })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.get("k").await.unwrap().unwrap().count, 20);
}

#[test]
fn test_bucket_expiry_boundary() {
    let bucket = RateLimitBucket::open(t0(), Duration::seconds(60));
    assert!(!bucket.is_expired(t0() + Duration::seconds(59)));
    assert!(bucket.is_expired(t0() + Duration::seconds(60)));
}

#[tokio::test]
async fn test_oversized_window_is_clamped() {
    let limiter = FixedWindowRateLimiter::new(
        Arc::new(InMemoryRateLimitStore::new()),
        RateLimitConfig {
            window_seconds: 10_000_000_000_000_000,
            max_requests: 1,
            ..RateLimitConfig::default()
        },
    );

    let first = limiter.check("k", t0()).await.unwrap();
    let second = limiter.check("k", t0()).await.unwrap();

    assert_eq!(
        first,
        RateLimitDecision::Allowed {
            limit: 1,
            remaining: 0,
            reset_at: t0() + Duration::weeks(1),
        }
    );
    assert_eq!(
        second,
        RateLimitDecision::Limited {
            limit: 1,
            retry_after_seconds: 7 * 24 * 60 * 60,
            reset_at: t0() + Duration::weeks(1),
        }
    );
}

#[test]
fn test_bucket_window_saturates_at_max_time() {
    let bucket = RateLimitBucket::open(DateTime::<Utc>::MAX_UTC - Duration::seconds(10), Duration::seconds(60));

    assert_eq!(bucket.reset_at, DateTime::<Utc>::MAX_UTC);
    assert!(!bucket.is_expired(DateTime::<Utc>::MAX_UTC - Duration::seconds(1)));
}
