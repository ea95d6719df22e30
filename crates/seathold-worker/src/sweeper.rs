//! Periodic expiry queue sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use seathold_core::config::SweepConfig;
use seathold_core::result::AppResult;
use seathold_database::repositories::ExpiryRepository;
use seathold_engine::{ExpiredRelease, ExpiryService};

/// Sweep loop that releases lapsed holds found in the expiry queue.
pub struct SweepRunner {
    /// Expiry queue for listing due entries.
    expiry_queue: Arc<ExpiryRepository>,
    /// Release path shared with the in-process timers.
    expiry: Arc<ExpiryService>,
    /// Sweep configuration.
    config: SweepConfig,
}

impl std::fmt::Debug for SweepRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepRunner").finish()
    }
}

impl SweepRunner {
    /// Create a new sweep runner.
    pub fn new(
        expiry_queue: Arc<ExpiryRepository>,
        expiry: Arc<ExpiryService>,
        config: SweepConfig,
    ) -> Self {
        Self {
            expiry_queue,
            expiry,
            config,
        }
    }

    /// Run sweep passes until the cancel signal is received.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        info!(
            interval_seconds = self.config.interval_seconds,
            batch_size = self.config.batch_size,
            "Expiry sweep started"
        );

        let mut ticker = time::interval(Duration::from_secs(self.config.interval_seconds));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        info!("Expiry sweep received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        // Entries survive a failed pass; the next tick
                        // retries them.
                        error!(error = %e, "Sweep pass failed");
                    }
                }
            }
        }

        info!("Expiry sweep shut down");
    }

    /// One sweep pass. Returns the number of holds released.
    pub async fn sweep_once(&self) -> AppResult<u32> {
        let due = self.expiry_queue.find_due(self.config.batch_size).await?;
        if due.is_empty() {
            return Ok(0);
        }

        debug!(count = due.len(), "Found due expiry entries");

        let mut released = 0u32;
        for entry in &due {
            match self.expiry.release_expired(entry.hold_id).await {
                Ok(ExpiredRelease::Released { seat_ids }) => {
                    debug!(
                        hold_id = %entry.hold_id,
                        seats = seat_ids.len(),
                        "Sweep released expired hold"
                    );
                    released += 1;
                }
                Ok(ExpiredRelease::Noop) => {}
                Err(e) => {
                    // Retries were already exhausted inside the release
                    // path; the entry stays queued for the next pass.
                    error!(
                        hold_id = %entry.hold_id,
                        error = %e,
                        "Failed to release expired hold"
                    );
                }
            }
        }

        if released > 0 {
            info!(released, scanned = due.len(), "Sweep pass completed");
        }

        Ok(released)
    }
}
