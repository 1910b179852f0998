//! Deadlines and cancellable waits.
//!
//! Every suspension point in the submitter goes through here so that a
//! triggered [`ShutdownSignal`] interrupts it immediately.

use std::time::Duration;
use tokio::time::Instant;

use crate::lifecycle::ShutdownSignal;

/// Marker returned when a wait was interrupted by cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

/// Sleep for `duration` unless `shutdown` fires first.
pub async fn sleep_unless_cancelled(
    duration: Duration,
    shutdown: &ShutdownSignal,
) -> Result<(), Cancelled> {
    if shutdown.is_cancelled() {
        return Err(Cancelled);
    }
    tokio::select! {
        _ = tokio::time::sleep(duration) => Ok(()),
        _ = shutdown.cancelled() => Err(Cancelled),
    }
}

/// A fixed point in time after which waiting stops.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    at: Instant,
}

impl Deadline {
    pub fn after(duration: Duration) -> Self {
        let started = Instant::now();
        Self {
            started,
            at: started + duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// The next wait: `interval`, clipped so it never overshoots the deadline.
    pub fn next_wait(&self, interval: Duration) -> Duration {
        interval.min(self.remaining())
    }
}
