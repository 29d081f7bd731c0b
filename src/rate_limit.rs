//! Global pacing of outbound requests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("waiting for a pace slot has been cancelled")]
pub struct Cancelled;

/// Hands out pace slots strictly `interval` apart, no matter how many tasks ask concurrently.
///
/// The next free slot is reserved under a lock, so no two callers ever get the same slot; waiting for the
/// reserved slot happens outside of the lock. An interval of zero disables pacing.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
    issued: AtomicU64,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> RateLimiter {
        RateLimiter {
            interval,
            next_slot: Mutex::new(None),
            issued: AtomicU64::new(0),
        }
    }

    /// Creates a rate limiter for at most `per_second` slots per second.
    pub fn per_second(per_second: u32) -> RateLimiter {
        let interval = if per_second == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / per_second
        };
        RateLimiter::new(interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of slots handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::Relaxed)
    }

    /// Waits for the next pace slot.
    pub async fn acquire(&self) {
        let slot = self.reserve();
        time::sleep_until(slot).await;
    }

    /// Waits for the next pace slot unless `shutdown` fires first. A reserved slot is forfeited on
    /// cancellation.
    pub async fn acquire_or_cancel(&self, shutdown: &CancellationToken) -> Result<(), Cancelled> {
        if shutdown.is_cancelled() {
            return Err(Cancelled);
        }
        let slot = self.reserve();
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => Err(Cancelled),
            _ = time::sleep_until(slot) => Ok(()),
        }
    }

    fn reserve(&self) -> Instant {
        let now = Instant::now();
        let mut next_slot = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match *next_slot {
            Some(next) if next > now => next,
            _ => now,
        };
        *next_slot = Some(slot + self.interval);
        self.issued.fetch_add(1, Ordering::Relaxed);

        slot
    }
}
