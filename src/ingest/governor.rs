//! Rate-limit detection and suspension.
//!
//! GitHub signals an exhausted quota with `403 Forbidden` plus
//! `X-RateLimit-Remaining: 0`, and says when the window reopens through
//! `X-RateLimit-Reset`. The governor turns such a rejection into a wait and
//! sleeps it out, racing the run's cancellation token.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use http::StatusCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::github::{IngestError, RejectedResponse};

/// Source of the current Unix time.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_unix(&self) -> u64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        // A clock set before 1970 reads as the epoch, which only shortens
        // waits.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_unix(&self) -> u64 {
        self.0
    }
}

/// Decides whether a rejected request may be retried and waits until it may.
#[derive(Clone)]
pub struct RateLimitGovernor {
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for RateLimitGovernor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimitGovernor")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl RateLimitGovernor {
    /// Creates a governor reading time from `clock` and abandoning waits
    /// when `cancel` fires.
    #[must_use]
    pub const fn new(clock: Arc<dyn Clock>, cancel: CancellationToken) -> Self {
        Self { clock, cancel }
    }

    /// Whether the run has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns the wait before `rejected` may be retried, or `None` when the
    /// rejection is not a recoverable rate limit.
    ///
    /// Only `403` with a zero remaining quota and a readable reset time
    /// qualifies. A reset time already in the past yields a zero wait.
    #[must_use]
    pub fn assess(&self, rejected: &RejectedResponse) -> Option<Duration> {
        if rejected.status != StatusCode::FORBIDDEN {
            return None;
        }
        let info = rejected.rate_limit.filter(|info| info.is_exhausted())?;
        let wait = info.seconds_until_reset(self.clock.now_unix());
        debug!(limit = ?info.limit(), wait_seconds = wait, "rate limit quota exhausted");
        Some(Duration::from_secs(wait))
    }

    /// Sleeps for `wait` unless the run is cancelled first.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Cancelled` when the cancellation token fires
    /// before or during the wait.
    pub async fn suspend(&self, wait: Duration) -> Result<(), IngestError> {
        if self.cancel.is_cancelled() {
            return Err(IngestError::Cancelled);
        }

        warn!(
            wait_seconds = wait.as_secs(),
            "GitHub rate limit reached, waiting for the quota window to reset"
        );

        tokio::select! {
            () = self.cancel.cancelled() => Err(IngestError::Cancelled),
            () = tokio::time::sleep(wait) => Ok(()),
        }
    }
}
