//! Token bucket used for every client.

use std::time::Duration;
use tokio::time::Instant;

/// Slack for refills that fall a few nanoseconds short of a whole token,
/// e.g. waiting `1/rps` when that is not a whole number of nanoseconds.
const TOKEN_EPSILON: f64 = 1e-6;

/// Sustained rate and burst capacity shared by every client bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    /// Tokens added per second.
    pub rps: f64,
    /// Maximum tokens held.
    pub burst: u32,
}

impl Quota {
    pub fn new(rps: f64, burst: u32) -> Self {
        Self { rps, burst }
    }
}

/// A token bucket that starts full and refills continuously.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    quota: Quota,
    tokens: f64,
    last_update: Instant,
}

impl TokenBucket {
    pub fn new(quota: Quota, now: Instant) -> Self {
        Self {
            quota,
            tokens: f64::from(quota.burst),
            last_update: now,
        }
    }

    /// Try to take one token at `now`.
    ///
    /// Returns `Ok(())` when a token was consumed. Otherwise returns the time
    /// until the next token becomes available, or `None` if the bucket never
    /// refills (`rps == 0`).
    pub fn try_acquire(&mut self, now: Instant) -> Result<(), Option<Duration>> {
        self.refill(now);

        if self.tokens + TOKEN_EPSILON >= 1.0 {
            self.tokens = (self.tokens - 1.0).max(0.0);
            Ok(())
        } else {
            Err(self.time_to_next_token())
        }
    }

    #[cfg(test)]
    fn available(&mut self, now: Instant) -> f64 {
        self.refill(now);
        self.tokens
    }

    fn refill(&mut self, now: Instant) {
        // Instants handed in out of order must not drain the bucket.
        let elapsed = now.saturating_duration_since(self.last_update).as_secs_f64();
        let capacity = f64::from(self.quota.burst);

        self.tokens = (self.tokens + elapsed * self.quota.rps).min(capacity);
        if now > self.last_update {
            self.last_update = now;
        }
    }

    fn time_to_next_token(&self) -> Option<Duration> {
        if self.quota.rps <= 0.0 || self.quota.burst == 0 {
            return None;
        }
        let missing = 1.0 - self.tokens;
        Duration::try_from_secs_f64(missing / self.quota.rps)
            .ok()
            .map(|wait| wait.max(Duration::from_nanos(1)))
    }
}
