//! Configuration Module
//!
//! Handles loading cache defaults from environment variables.

use std::env;
use std::time::Duration;

use crate::cache::{DEFAULT_SHARD_KEY_LEN, DEFAULT_SWEEP_INTERVAL};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of leading characters of a key that select its shard
    pub shard_key_len: usize,
    /// Sweep interval for shards created implicitly
    pub sweep_interval: Duration,
    /// TTL default for shards created implicitly, zero = never expires
    pub default_ttl: Duration,
    /// Upper bound applied to every write through the group, zero = no ceiling
    pub group_ttl: Duration,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SHARD_KEY_LEN` - Shard key prefix length (default: 3)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep interval in milliseconds (default: 1000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default entry TTL in milliseconds (default: 0)
    /// - `CACHE_GROUP_TTL_MS` - Group-wide TTL ceiling in milliseconds (default: 0)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            shard_key_len: env::var("CACHE_SHARD_KEY_LEN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.shard_key_len),
            sweep_interval: env_millis("CACHE_SWEEP_INTERVAL_MS")
                .unwrap_or(defaults.sweep_interval),
            default_ttl: env_millis("CACHE_DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl),
            group_ttl: env_millis("CACHE_GROUP_TTL_MS").unwrap_or(defaults.group_ttl),
        }
    }
}

fn env_millis(name: &str) -> Option<Duration> {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            shard_key_len: DEFAULT_SHARD_KEY_LEN,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            default_ttl: Duration::ZERO,
            group_ttl: Duration::ZERO,
        }
    }
}
