//! Sliding-window limiter for the public submission path.
//!
//! Every attempt from an address is recorded, accepted or not. An attempt is
//! accepted when fewer than `max_attempts` earlier attempts from the same
//! address fall inside the trailing window. State is in memory and resets on
//! restart.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::SubmissionLimitConfig;

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock used in production.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        self.start + offset
    }
}

impl<C: Clock> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Gate in front of word submissions.
pub trait SubmissionLimiter: Send + Sync {
    /// Record an attempt from `addr`. Returns `true` if it may proceed.
    fn record(&self, addr: IpAddr) -> bool;

    /// Drop state for addresses with no attempts inside the window.
    fn prune(&self);
}

/// Per-address sliding window over attempt timestamps.
pub struct SlidingWindowLimiter<C: Clock = SystemClock> {
    attempts: Mutex<HashMap<IpAddr, VecDeque<Instant>>>,
    max_attempts: usize,
    window: Duration,
    clock: C,
}

impl SlidingWindowLimiter<SystemClock> {
    /// Create a limiter on the system clock.
    #[must_use]
    pub fn new(config: SubmissionLimitConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> SlidingWindowLimiter<C> {
    /// Create a limiter on an injected clock.
    #[must_use]
    pub fn with_clock(config: SubmissionLimitConfig, clock: C) -> Self {
        Self {
            attempts: Mutex::new(HashMap::new()),
            max_attempts: config.max_attempts,
            window: config.window,
            clock,
        }
    }

    fn attempts(&self) -> MutexGuard<'_, HashMap<IpAddr, VecDeque<Instant>>> {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of addresses currently tracked.
    #[must_use]
    pub fn tracked_addresses(&self) -> usize {
        self.attempts().len()
    }

    fn expire(entries: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(oldest) = entries.front() {
            if now.duration_since(*oldest) < window {
                break;
            }
            entries.pop_front();
        }
    }
}

impl<C: Clock> SubmissionLimiter for SlidingWindowLimiter<C> {
    fn record(&self, addr: IpAddr) -> bool {
        let now = self.clock.now();
        let mut attempts = self.attempts();
        let entries = attempts.entry(addr).or_default();

        Self::expire(entries, now, self.window);
        let allowed = entries.len() < self.max_attempts;
        entries.push_back(now);

        if !allowed {
            tracing::debug!(%addr, recent = entries.len(), "submission rate limit hit");
        }
        allowed
    }

    fn prune(&self) {
        let now = self.clock.now();
        let window = self.window;
        self.attempts().retain(|_, entries| {
            Self::expire(entries, now, window);
            !entries.is_empty()
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    type TestLimiter = SlidingWindowLimiter<Arc<ManualClock>>;

    fn limiter(max_attempts: usize, window_secs: u64) -> (Arc<ManualClock>, TestLimiter) {
        let clock = Arc::new(ManualClock::new());
        let config = SubmissionLimitConfig {
            max_attempts,
            window: Duration::from_secs(window_secs),
        };
        let limiter = SlidingWindowLimiter::with_clock(config, Arc::clone(&clock));
        (clock, limiter)
    }

    fn addr(last: u8) -> IpAddr {
        IpAddr::from([10, 0, 0, last])
    }

    #[test]
    fn test_eleventh_attempt_rejected() {
        let (_, limiter) = limiter(10, 900);
        for _ in 0..10 {
            assert!(limiter.record(addr(1)));
        }
        assert!(!limiter.record(addr(1)));
    }

    #[test]
    fn test_addresses_are_independent() {
        let (_, limiter) = limiter(10, 900);
        for i in 0..11 {
            let which = if i < 6 { addr(1) } else { addr(2) };
            assert!(limiter.record(which));
        }
    }

    #[test]
    fn test_window_slides() {
        let (clock, limiter) = limiter(2, 60);
        assert!(limiter.record(addr(1)));
        clock.advance(Duration::from_secs(30));
        assert!(limiter.record(addr(1)));
        assert!(!limiter.record(addr(1)));

        // First attempt leaves the window; the rejected one at t=30 still counts.
        clock.advance(Duration::from_secs(31));
        assert!(!limiter.record(addr(1)));

        clock.advance(Duration::from_secs(60));
        assert!(limiter.record(addr(1)));
    }

    #[test]
    fn test_prune_drops_idle_addresses() {
        let (clock, limiter) = limiter(10, 60);
        limiter.record(addr(1));
        limiter.record(addr(2));
        clock.advance(Duration::from_secs(30));
        limiter.record(addr(2));
        assert_eq!(limiter.tracked_addresses(), 2);

        clock.advance(Duration::from_secs(45));
        limiter.prune();
        assert_eq!(limiter.tracked_addresses(), 1);
    }
}
