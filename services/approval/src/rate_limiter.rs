//! Per-source rate limiter for the externally reachable token endpoints
//!
//! The token endpoints accept unauthenticated traffic, so a fixed-window
//! counter per source caps how fast anyone can probe for valid tokens. The
//! counters live in process memory and are advisory: losing them on restart
//! costs nothing, because token validity itself is enforced in the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_seconds: 60,
        }
    }
}

#[derive(Debug)]
struct Window {
    count: u32,
    started: Instant,
}

/// Fixed-window rate limiter keyed by an arbitrary source string
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    windows: Arc<Mutex<HashMap<String, Window>>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a request from `key` and report whether it is allowed
    pub async fn is_allowed(&self, key: &str) -> bool {
        let mut windows = self.windows.lock().await;
        let now = Instant::now();

        let window = windows.entry(key.to_string()).or_insert(Window {
            count: 0,
            started: now,
        });

        if now.duration_since(window.started) >= Duration::from_secs(self.config.window_seconds) {
            window.count = 0;
            window.started = now;
        }

        if window.count >= self.config.max_requests {
            warn!("Rate limit exceeded for {}", key);
            return false;
        }

        window.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimiter {
        RateLimiter::new(RateLimiterConfig {
            max_requests,
            window_seconds: 60,
        })
    }

    #[tokio::test]
    async fn requests_under_the_limit_are_allowed() {
        let limiter = limiter(3);
        for _ in 0..3 {
            assert!(limiter.is_allowed("10.0.0.1").await);
        }
    }

    #[tokio::test]
    async fn requests_over_the_limit_are_blocked() {
        let limiter = limiter(2);
        assert!(limiter.is_allowed("10.0.0.1").await);
        assert!(limiter.is_allowed("10.0.0.1").await);
        assert!(!limiter.is_allowed("10.0.0.1").await);
    }

    #[tokio::test]
    async fn sources_are_limited_independently() {
        let limiter = limiter(1);
        assert!(limiter.is_allowed("10.0.0.1").await);
        assert!(!limiter.is_allowed("10.0.0.1").await);
        assert!(limiter.is_allowed("10.0.0.2").await);
    }
}
