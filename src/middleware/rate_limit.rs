//! Rate limiting middleware
//!
//! IP-based rate limiting for the login/registration endpoints and the rest of
//! the API, using a governor limiter per client address.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::utils::error::ErrorResponse;

const MAX_TRACKED_IPS: usize = 10_000;

/// Requests per second and burst for one limiter class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimitQuota {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl LimitQuota {
    /// Quota applied to `/api/auth`
    pub fn auth(config: &RateLimitConfig) -> Self {
        Self {
            requests_per_second: config.auth_requests_per_second,
            burst_size: config.auth_burst_size,
        }
    }

    /// Quota applied to every other API route
    pub fn api(config: &RateLimitConfig) -> Self {
        Self {
            requests_per_second: config.api_requests_per_second,
            burst_size: config.api_burst_size,
        }
    }
}

/// Per-IP rate limiter using governor
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Thread-safe map of IP addresses to their rate limiters
#[derive(Clone)]
pub struct RateLimitState {
    limiters: Arc<RwLock<HashMap<IpAddr, Arc<IpRateLimiter>>>>,
    quota: LimitQuota,
}

impl RateLimitState {
    pub fn new(quota: LimitQuota) -> Self {
        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            quota,
        }
    }

    /// Get or create the limiter for `ip`
    async fn get_limiter(&self, ip: IpAddr) -> Arc<IpRateLimiter> {
        {
            let limiters = self.limiters.read().await;
            if let Some(limiter) = limiters.get(&ip) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().await;

        // Another task may have inserted it meanwhile
        if let Some(limiter) = limiters.get(&ip) {
            return limiter.clone();
        }

        let quota = Quota::per_second(
            NonZeroU32::new(self.quota.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(self.quota.burst_size).unwrap_or(NonZeroU32::MIN));

        let limiter = Arc::new(RateLimiter::direct(quota));
        limiters.insert(ip, limiter.clone());
        limiter
    }

    /// Bound the number of tracked addresses
    pub async fn cleanup(&self) {
        let mut limiters = self.limiters.write().await;
        let initial_count = limiters.len();

        if limiters.len() > MAX_TRACKED_IPS {
            let to_remove: Vec<_> = limiters
                .keys()
                .take(limiters.len() / 2)
                .cloned()
                .collect();

            for ip in to_remove {
                limiters.remove(&ip);
            }

            debug!(
                "Rate limiter cleanup: {} -> {} entries",
                initial_count,
                limiters.len()
            );
        }
    }
}

/// Rate limiting middleware for Axum
///
/// Requests without peer address information (e.g. in-process tests) pass through.
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(ip) = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
    else {
        return next.run(request).await;
    };

    let limiter = rate_limit.get_limiter(ip).await;

    match limiter.check() {
        Ok(_) => next.run(request).await,
        Err(_) => {
            warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
            RateLimitExceeded.into_response()
        }
    }
}

/// Rate limit exceeded response
pub struct RateLimitExceeded;

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", "1")],
            Json(ErrorResponse::new(
                "rate_limited",
                "Too many requests. Please try again later.",
            )),
        )
            .into_response()
    }
}

/// Spawn a background task that periodically bounds the limiter map
pub fn spawn_rate_limit_cleanup(state: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            state.cleanup().await;
        }
    });
}
