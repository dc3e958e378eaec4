//! Fixed-window request counting per client IP.
//!
//! Windows are aligned to the epoch (`now - now % window`), so a burst that
//! straddles a boundary can get up to twice the limit through in a short span.
//! Counts live in process memory only: with several instances behind a load
//! balancer the effective limit is `limit * instances`.

use dashmap::DashMap;
use std::time::Duration;

/// Buckets kept before a sweep of expired windows is attempted.
pub const SWEEP_THRESHOLD: usize = 1000;

/// Source of wall-clock time in milliseconds since the epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

pub trait RateLimiter: Send + Sync {
    /// Counts one request for `key`. Returns false once the key's window is full.
    fn check_and_consume(&self, key: &str) -> bool;
}

// Bucket key - client key plus the start of its window
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BucketKey {
    client: String,
    window_start: u64,
}

pub struct FixedWindowLimiter<C: Clock = SystemClock> {
    buckets: DashMap<BucketKey, u32>,
    limit: u32,
    window_ms: u64,
    clock: C,
}

impl FixedWindowLimiter<SystemClock> {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, SystemClock)
    }
}

impl<C: Clock> FixedWindowLimiter<C> {
    pub fn with_clock(limit: u32, window: Duration, clock: C) -> Self {
        Self {
            buckets: DashMap::new(),
            limit,
            // zero-length windows would divide by zero
            window_ms: (window.as_millis() as u64).max(1),
            clock,
        }
    }

    pub fn window_start(&self, now_ms: u64) -> u64 {
        now_ms - now_ms % self.window_ms
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    // Drop every bucket whose window started before `now - window`
    fn sweep(&self, now_ms: u64) {
        let cutoff = now_ms.saturating_sub(self.window_ms);
        let before = self.buckets.len();
        self.buckets.retain(|key, _| key.window_start >= cutoff);
        tracing::debug!(
            removed = before.saturating_sub(self.buckets.len()),
            remaining = self.buckets.len(),
            "swept rate limit buckets"
        );
    }
}

impl<C: Clock> RateLimiter for FixedWindowLimiter<C> {
    fn check_and_consume(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let bucket = BucketKey {
            client: key.to_string(),
            window_start: self.window_start(now),
        };

        // the entry guard holds the shard lock, so check and increment are atomic
        {
            let mut count = self.buckets.entry(bucket).or_insert(0);
            if *count >= self.limit {
                return false;
            }
            *count += 1;
        }

        if self.buckets.len() > SWEEP_THRESHOLD {
            self.sweep(now);
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    const HOUR: Duration = Duration::from_secs(60 * 60);

    #[derive(Clone, Default)]
    struct ManualClock(Arc<AtomicU64>);

    impl ManualClock {
        fn at(ms: u64) -> Self {
            Self(Arc::new(AtomicU64::new(ms)))
        }

        fn set(&self, ms: u64) {
            self.0.store(ms, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn admits_up_to_limit_then_rejects() {
        let limiter = FixedWindowLimiter::with_clock(3, HOUR, ManualClock::at(10_000));

        for _ in 0..3 {
            assert!(limiter.check_and_consume("10.0.0.1"));
        }
        assert!(!limiter.check_and_consume("10.0.0.1"));
        assert!(!limiter.check_and_consume("10.0.0.1"));
    }

    #[test]
    fn next_window_starts_fresh() {
        let clock = ManualClock::at(0);
        let limiter = FixedWindowLimiter::with_clock(1, HOUR, clock.clone());

        assert!(limiter.check_and_consume("10.0.0.1"));
        assert!(!limiter.check_and_consume("10.0.0.1"));

        clock.set(HOUR.as_millis() as u64);
        assert!(limiter.check_and_consume("10.0.0.1"));
    }

    #[test]
    fn windows_align_to_epoch_so_boundary_bursts_pass() {
        let window_ms = HOUR.as_millis() as u64;
        let clock = ManualClock::at(window_ms - 1);
        let limiter = FixedWindowLimiter::with_clock(2, HOUR, clock.clone());

        assert_eq!(limiter.window_start(window_ms - 1), 0);
        assert!(limiter.check_and_consume("ip"));
        assert!(limiter.check_and_consume("ip"));

        // two milliseconds later a whole new window is open
        clock.set(window_ms + 1);
        assert_eq!(limiter.window_start(window_ms + 1), window_ms);
        assert!(limiter.check_and_consume("ip"));
        assert!(limiter.check_and_consume("ip"));
        assert!(!limiter.check_and_consume("ip"));
    }

    #[test]
    fn keys_are_counted_separately() {
        let limiter = FixedWindowLimiter::with_clock(1, HOUR, ManualClock::at(5));

        assert!(limiter.check_and_consume("a"));
        assert!(limiter.check_and_consume("b"));
        assert!(!limiter.check_and_consume("a"));
    }

    #[test]
    fn sweep_runs_only_past_threshold() {
        let window_ms = HOUR.as_millis() as u64;
        let clock = ManualClock::at(0);
        let limiter = FixedWindowLimiter::with_clock(5, HOUR, clock.clone());

        for i in 0..SWEEP_THRESHOLD {
            limiter.check_and_consume(&format!("old-{i}"));
        }
        assert_eq!(limiter.len(), SWEEP_THRESHOLD);

        // two windows later the old buckets are stale but nothing triggers yet
        clock.set(2 * window_ms + 10);
        assert_eq!(limiter.len(), SWEEP_THRESHOLD);

        // the insert that crosses the threshold clears them out
        assert!(limiter.check_and_consume("fresh"));
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn sweep_keeps_current_window() {
        let clock = ManualClock::at(1_000);
        let limiter = FixedWindowLimiter::with_clock(5, HOUR, clock);

        for i in 0..=SWEEP_THRESHOLD {
            limiter.check_and_consume(&format!("ip-{i}"));
        }
        assert_eq!(limiter.len(), SWEEP_THRESHOLD + 1);
    }
}
