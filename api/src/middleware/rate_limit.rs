//! Rate limiting middleware for API endpoints
//!
//! Requests are counted per client IP in fixed windows. Refused requests get
//! `429 Too Many Requests` with a `Retry-After` header; allowed responses
//! carry `X-RateLimit-Limit` and `X-RateLimit-Remaining`.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue, RETRY_AFTER},
    Error, HttpResponse,
};
use chrono::Utc;
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    sync::Arc,
    time::Duration,
};
use tokio::task::JoinHandle;

use hb_core::services::{FixedWindowRateLimiter, RateLimitDecision, RateLimitStore};
use hb_shared::errors::{error_codes, ErrorResponse};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Rate limiter middleware factory
pub struct RateLimiter<S: RateLimitStore> {
    limiter: Arc<FixedWindowRateLimiter<S>>,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(limiter: Arc<FixedWindowRateLimiter<S>>) -> Self {
        Self { limiter }
    }
}

impl<S: RateLimitStore> Clone for RateLimiter<S> {
    fn clone(&self) -> Self {
        Self {
            limiter: self.limiter.clone(),
        }
    }
}

/// Middleware implementation for rate limiting
impl<Svc, B, S> Transform<Svc, ServiceRequest> for RateLimiter<S>
where
    Svc: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    Svc::Future: 'static,
    B: 'static,
    S: RateLimitStore + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimiterMiddleware<Svc, S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: Svc) -> Self::Future {
        ready(Ok(RateLimiterMiddleware {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

/// Rate limiter middleware service
pub struct RateLimiterMiddleware<Svc, S: RateLimitStore> {
    service: Rc<Svc>,
    limiter: Arc<FixedWindowRateLimiter<S>>,
}

impl<Svc, B, S> Service<ServiceRequest> for RateLimiterMiddleware<Svc, S>
where
    Svc: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    Svc::Future: 'static,
    B: 'static,
    S: RateLimitStore + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut std::task::Context<'_>) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = self.limiter.clone();

        Box::pin(async move {
            let ip = get_client_ip(&req, limiter.config().trust_forwarded_headers);

            let decision = match limiter.check(&ip, Utc::now()).await {
                Ok(decision) => decision,
                Err(e) => {
                    // Store failures must not take the endpoints down
                    log::error!("Rate limit store error for {}: {}", ip, e);
                    let res = service.call(req).await?;
                    return Ok(res.map_into_left_body());
                }
            };

            match decision {
                RateLimitDecision::Allowed {
                    limit, remaining, ..
                } => {
                    let mut res = service.call(req).await?;
                    let headers = res.headers_mut();
                    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
                    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
                    Ok(res.map_into_left_body())
                }
                RateLimitDecision::Limited {
                    limit,
                    retry_after_seconds,
                    ..
                } => {
                    log::warn!(
                        "Rate limit exceeded for {} on {}, retry after {}s",
                        ip,
                        req.path(),
                        retry_after_seconds
                    );

                    let body = ErrorResponse::new(
                        error_codes::RATE_LIMIT_EXCEEDED,
                        format!(
                            "Too many requests. Please try again in {} seconds",
                            retry_after_seconds
                        ),
                    )
                    .add_detail("retry_after_seconds", retry_after_seconds)
                    .add_detail("limit", limit);

                    let response = HttpResponse::TooManyRequests()
                        .insert_header((RETRY_AFTER, retry_after_seconds))
                        .insert_header((X_RATELIMIT_LIMIT, limit))
                        .insert_header((X_RATELIMIT_REMAINING, 0u32))
                        .json(body);

                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// Get client IP address from request
///
/// With `trust_forwarded` set, uses the first `X-Forwarded-For` entry, then
/// `X-Real-IP`. The peer address is used otherwise and as the fallback.
pub fn get_client_ip(req: &ServiceRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        if let Some(ip) = forwarded_client_ip(req) {
            return ip;
        }
    }

    // Fall back to connection info
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_client_ip(req: &ServiceRequest) -> Option<String> {
    // Try to get IP from X-Forwarded-For header (for reverse proxy scenarios)
    if let Some(forwarded_for) = req.headers().get("X-Forwarded-For") {
        if let Ok(forwarded_str) = forwarded_for.to_str() {
            // Take the first IP from the comma-separated list
            if let Some(ip) = forwarded_str.split(',').next().map(str::trim) {
                if !ip.is_empty() {
                    return Some(ip.to_string());
                }
            }
        }
    }

    // Try to get IP from X-Real-IP header
    let real_ip = req.headers().get("X-Real-IP")?.to_str().ok()?.trim();
    (!real_ip.is_empty()).then(|| real_ip.to_string())
}

/// Periodically remove expired buckets from the limiter's store
pub fn spawn_sweeper<S>(limiter: Arc<FixedWindowRateLimiter<S>>, period: Duration) -> JoinHandle<()>
where
    S: RateLimitStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match limiter.sweep(Utc::now()).await {
                Ok(removed) if removed > 0 => log::debug!("Swept {} expired rate limit buckets", removed),
                Ok(_) => {}
                Err(e) => log::error!("Rate limit sweep failed: {}", e),
            }
        }
    })
}
