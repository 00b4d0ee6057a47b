//! Time sources for the scheduler.
//!
//! Every suspension in the crate (transit, charge ticks, wait-queue polls) goes
//! through [`Clock`] so tests can run the whole fleet under tokio's paused,
//! auto-advancing virtual time.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::time::Instant;

/// Milliseconds since the Unix epoch, or 0 if the system clock is before it.
#[must_use]
pub fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Injectable monotonic clock and sleeper.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Suspend the calling task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by `tokio::time`.
///
/// Under `#[tokio::test(start_paused = true)]` this clock follows the runtime's
/// virtual time, so multi-minute charge episodes complete instantly.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
