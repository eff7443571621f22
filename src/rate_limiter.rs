use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ExporterError, Result};
use crate::token_bucket::TokenBucket;

/// Process-wide gate in front of every provider request.
///
/// Waiters queue on a fair mutex around the bucket, so tokens are handed out
/// in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(burst, requests_per_second)),
        }
    }

    /// Wait for one token, or fail with `Cancelled` once `cancel` fires.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("rate limiter wait cancelled");
                Err(ExporterError::Cancelled)
            }
            _ = self.wait_for_token() => Ok(()),
        }
    }

    /// Take a token without waiting.
    pub async fn try_acquire(&self) -> bool {
        self.bucket.lock().await.try_consume()
    }

    pub async fn available_tokens(&self) -> u32 {
        self.bucket.lock().await.available_tokens()
    }

    async fn wait_for_token(&self) {
        let mut bucket = self.bucket.lock().await;
        loop {
            if bucket.try_consume() {
                return;
            }
            let wait = bucket.time_until_available().max(Duration::from_millis(1));
            debug!(wait_ms = wait.as_millis() as u64, "waiting for rate limiter token");
            tokio::time::sleep(wait).await;
        }
    }
}
