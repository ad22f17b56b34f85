//! Rate Limiter
//!
//! Token bucket used by the rate limiting middleware. Built from
//! configuration and handed to the router; there is no global instance.

use std::time::Instant;

use parking_lot::Mutex;

/// Rate limiter settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Tokens added per second
    pub per_second: u32,
    /// Bucket capacity
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_second: 10,
            burst: 100,
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Create a limiter with a full bucket
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            bucket: Mutex::new(Bucket {
                tokens: f64::from(config.burst),
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Take one token if available
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        let mut bucket = self.bucket.lock();

        let elapsed = now.saturating_duration_since(bucket.last_refill).as_secs_f64();
        let capacity = f64::from(self.config.burst);
        bucket.tokens = (bucket.tokens + elapsed * f64::from(self.config.per_second)).min(capacity);
        bucket.last_refill = bucket.last_refill.max(now);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_burst_then_reject() {
        let limiter = RateLimiter::new(RateLimitConfig { per_second: 1, burst: 3 });
        let now = Instant::now();

        assert!(limiter.try_acquire_at(now));
        assert!(limiter.try_acquire_at(now));
        assert!(limiter.try_acquire_at(now));
        assert!(!limiter.try_acquire_at(now));
    }

    #[test]
    fn test_refill_over_time() {
        let limiter = RateLimiter::new(RateLimitConfig { per_second: 10, burst: 1 });
        let start = Instant::now();

        assert!(limiter.try_acquire_at(start));
        assert!(!limiter.try_acquire_at(start));

        // 150ms at 10/s refills past one token, capped at the burst
        assert!(limiter.try_acquire_at(start + Duration::from_millis(150)));
        assert!(!limiter.try_acquire_at(start + Duration::from_millis(150)));
    }

    #[test]
    fn test_refill_capped_at_burst() {
        let limiter = RateLimiter::new(RateLimitConfig { per_second: 100, burst: 2 });
        let later = Instant::now() + Duration::from_secs(60);

        assert!(limiter.try_acquire_at(later));
        assert!(limiter.try_acquire_at(later));
        assert!(!limiter.try_acquire_at(later));
    }

    #[test]
    fn test_zero_burst_rejects_everything() {
        let limiter = RateLimiter::new(RateLimitConfig { per_second: 10, burst: 0 });
        assert!(!limiter.try_acquire());
    }
}
