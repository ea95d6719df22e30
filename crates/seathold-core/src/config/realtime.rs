//! Live seat-update broadcast configuration.

use serde::{Deserialize, Serialize};

/// Settings for the in-memory seat-update pub/sub.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Buffer size of each per-event broadcast channel. Slow subscribers
    /// that fall further behind than this lose messages and must re-fetch
    /// current seat state.
    #[serde(default = "default_buffer")]
    pub channel_buffer: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer: default_buffer(),
        }
    }
}

fn default_buffer() -> usize {
    256
}
