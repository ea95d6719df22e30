//! Lock manager and hold lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Settings governing hold acquisition and the expiry release path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// TTL applied when the caller does not specify one, in seconds.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u32,
    /// Upper bound on a caller-supplied TTL, in seconds.
    #[serde(default = "default_max_ttl")]
    pub max_ttl_seconds: u32,
    /// Maximum number of seats a single hold may cover.
    #[serde(default = "default_max_seats")]
    pub max_seats_per_hold: usize,
    /// Bounded retry policy for the expiry release database mutation.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Bounded exponential backoff policy.
///
/// Applied only around the expiry release database mutation, never around
/// notification delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first).
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Cap on the backoff delay, in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_ttl(),
            max_ttl_seconds: default_max_ttl(),
            max_seats_per_hold: default_max_seats(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_ttl() -> u32 {
    600
}

fn default_max_ttl() -> u32 {
    1800
}

fn default_max_seats() -> usize {
    10
}

fn default_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    100
}

fn default_max_delay() -> u64 {
    2000
}
