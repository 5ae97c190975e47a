//! Soft rate limiting between series fetches
//!
//! The governor remembers when the last fetch started. When enabled, it
//! suspends the pipeline until the configured minimum interval has passed
//! since that moment. The run is sequential, so the governor is owned by the
//! executor and needs no synchronisation.

use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Minimum-interval gate in front of each series fetch.
#[derive(Debug, Clone)]
pub struct RateGovernor {
    enabled: bool,
    min_interval: Duration,
    last_fetch_start: Option<Instant>,
}

impl RateGovernor {
    /// Create a governor
    ///
    /// # Arguments
    /// * `enabled` - Whether pauses are applied at all
    /// * `min_interval` - Minimum spacing between fetch starts
    pub fn new(enabled: bool, min_interval: Duration) -> Self {
        Self {
            enabled,
            min_interval,
            last_fetch_start: None,
        }
    }

    /// Governor that never pauses
    pub fn disabled() -> Self {
        Self::new(false, Duration::ZERO)
    }

    /// Whether pauses are applied
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Start time of the last fetch, if any
    pub fn last_fetch_start(&self) -> Option<Instant> {
        self.last_fetch_start
    }

    /// Remaining wait at `now` before the next fetch may start.
    pub fn required_wait(&self, now: Instant) -> Duration {
        match (self.enabled, self.last_fetch_start) {
            (true, Some(last)) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            _ => Duration::ZERO,
        }
    }

    /// Suspend until the next fetch may start.
    ///
    /// # Returns
    /// The pause that was applied
    pub async fn wait_turn(&self) -> Duration {
        let wait = self.required_wait(Instant::now());
        if !wait.is_zero() {
            debug!("Pausing for {}ms", wait.as_millis());
            sleep(wait).await;
        }
        wait
    }

    /// Record that a fetch starts now.
    pub fn mark_fetch_start(&mut self) {
        self.last_fetch_start = Some(Instant::now());
    }
}
