//! Cache Module
//!
//! Provides a prefix-sharded in-memory cache with lazy and active TTL expiration.

use std::time::Duration;

mod entry;
mod group;
mod shard;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, Value};
pub use group::{shard_id, Group};
pub use shard::Shard;
pub use stats::{GroupStats, ShardStats};

pub(crate) use shard::EntryStore;

// == Public Constants ==
/// Sweep interval used when none (or zero) is supplied
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Number of leading key characters that select a shard
pub const DEFAULT_SHARD_KEY_LEN: usize = 3;
