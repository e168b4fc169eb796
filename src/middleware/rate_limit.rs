//! Rate limiting middleware (`throttle`).
//!
//! Provides IP-based rate limiting using the token bucket algorithm.
//! Configuration is loaded from the `[rate_limit]` section; a disabled
//! limiter passes every request through.

use axum::{body::Body, extract::ConnectInfo, http::Request};
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};
use tracing::warn;

use super::Middleware;
use crate::config::RateLimitConfig;
use crate::error::{AppError, Result};

type DirectLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Past this count every tracked limiter is dropped before a new client is added
const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Rate limiter state shared across requests
#[derive(Clone)]
pub struct RateLimiter {
    /// Per-IP rate limiters
    limiters: Arc<DashMap<IpAddr, Arc<DirectLimiter>>>,
    /// `None` when disabled
    quota: Option<Quota>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let quota = if config.enabled {
            quota_for(config.requests_per_window, config.window_seconds)
        } else {
            None
        };

        Self {
            limiters: Arc::new(DashMap::new()),
            quota,
        }
    }

    /// Check if a request from the given IP is allowed
    pub fn check(&self, ip: IpAddr) -> bool {
        let Some(quota) = self.quota else {
            return true;
        };

        if !self.limiters.contains_key(&ip) {
            self.cleanup();
        }

        let limiter = self
            .limiters
            .entry(ip)
            .or_insert_with(|| Arc::new(GovRateLimiter::direct(quota)))
            .clone();

        limiter.check().is_ok()
    }

    /// Clean up limiters once too many clients are tracked
    pub fn cleanup(&self) {
        if self.limiters.len() > MAX_TRACKED_CLIENTS {
            self.limiters.clear();
        }
    }
}

/// `requests` per `window_seconds`, allowing a full burst up front
fn quota_for(requests: u32, window_seconds: u64) -> Option<Quota> {
    let burst = NonZeroU32::new(requests)?;
    let period = Duration::from_secs(window_seconds) / burst.get();
    Some(Quota::with_period(period)?.allow_burst(burst))
}

impl Middleware for RateLimiter {
    fn handle(&self, request: &mut Request<Body>) -> Result<()> {
        let ip = extract_client_ip(request);

        if self.check(ip) {
            return Ok(());
        }

        warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
        Err(AppError::rate_limit_exceeded(
            "Too many requests. Please try again later.",
        ))
    }
}

/// Extract client IP from request
fn extract_client_ip<B>(req: &Request<B>) -> IpAddr {
    // Reverse proxy headers first
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            if let Some(first_ip) = forwarded_str.split(',').next() {
                if let Ok(ip) = first_ip.trim().parse::<IpAddr>() {
                    return ip;
                }
            }
        }
    }

    if let Some(real_ip) = req.headers().get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            if let Ok(ip) = ip_str.parse::<IpAddr>() {
                return ip;
            }
        }
    }

    // Requires serving with `into_make_service_with_connect_info`
    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip();
    }

    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_enabled() {
        let config = RateLimitConfig {
            enabled: true,
            requests_per_window: 5,
            window_seconds: 60,
        };

        let limiter = RateLimiter::new(&config);
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        for _ in 0..5 {
            assert!(limiter.check(ip));
        }
        assert!(!limiter.check(ip));

        // Other clients have their own bucket
        let other: IpAddr = "192.168.1.2".parse().unwrap();
        assert!(limiter.check(other));
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let config = RateLimitConfig {
            enabled: false,
            requests_per_window: 1,
            window_seconds: 60,
        };

        let limiter = RateLimiter::new(&config);
        let ip: IpAddr = "192.168.1.1".parse().unwrap();

        for _ in 0..100 {
            assert!(limiter.check(ip));
        }
    }

    #[test]
    fn test_tracked_clients_are_bounded() {
        let config = RateLimitConfig {
            enabled: true,
            requests_per_window: 10,
            window_seconds: 60,
        };
        let limiter = RateLimiter::new(&config);

        // No client is ever throttled here
        for n in 0..(MAX_TRACKED_CLIENTS as u32 + 50) {
            assert!(limiter.check(IpAddr::V4(Ipv4Addr::from(n))));
            assert!(limiter.limiters.len() <= MAX_TRACKED_CLIENTS + 1);
        }
    }

    #[test]
    fn test_throttle_middleware_uses_forwarded_ip() {
        let config = RateLimitConfig {
            enabled: true,
            requests_per_window: 1,
            window_seconds: 60,
        };
        let limiter = RateLimiter::new(&config);

        let request = |ip: &str| {
            Request::builder()
                .uri("/page/hello")
                .header("x-forwarded-for", ip)
                .body(Body::empty())
                .unwrap()
        };

        assert!(limiter.handle(&mut request("10.0.0.1")).is_ok());
        assert!(matches!(
            limiter.handle(&mut request("10.0.0.1")).unwrap_err(),
            AppError::RateLimitExceeded(_)
        ));
        assert!(limiter.handle(&mut request("10.0.0.2")).is_ok());
    }
}
