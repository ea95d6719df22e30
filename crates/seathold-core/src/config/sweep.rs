//! Durable expiry sweep configuration.

use serde::{Deserialize, Serialize};

/// Settings for the periodic expiry queue sweep.
///
/// The sweep is the correctness backstop for hold expiry; the in-process
/// timers are only a latency optimization. Disabling it is safe solely in
/// deployments where another process runs the sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Whether this process runs the sweep loop.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval between sweep passes, in seconds.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
    /// Maximum number of due entries processed per pass.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interval_seconds: default_interval(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    5
}

fn default_batch_size() -> i64 {
    100
}
