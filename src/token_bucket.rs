use std::time::Duration;
use tokio::time::Instant;

/// Longest single wait handed out. Callers re-check the bucket afterwards, so
/// a very slow refill rate only means more wake-ups.
pub const MAX_WAIT: Duration = Duration::from_secs(3600);

/// Token bucket holding at most `capacity` tokens, refilled continuously at
/// `refill_rate` tokens per second.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: u32,
    tokens: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            capacity,
            tokens: capacity as f64,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    /// Take one token if available.
    pub fn try_consume(&mut self) -> bool {
        self.refill();

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    pub fn available_tokens(&mut self) -> u32 {
        self.refill();
        self.tokens.floor() as u32
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Time until one token can be taken, `Duration::ZERO` if one is ready.
    pub fn time_until_available(&mut self) -> Duration {
        self.refill();

        if self.tokens >= 1.0 {
            return Duration::ZERO;
        }

        let seconds_to_wait = (1.0 - self.tokens) / self.refill_rate;
        Duration::try_from_secs_f64(seconds_to_wait)
            .map(|wait| wait.min(MAX_WAIT))
            .unwrap_or(MAX_WAIT)
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill);

        let tokens_to_add = self.refill_rate * elapsed.as_secs_f64();
        self.tokens = (self.tokens + tokens_to_add).min(self.capacity as f64);
        self.last_refill = now;
    }
}
