//! Shard Cache - An in-process TTL cache partitioned by key prefix
//!
//! Keys are routed to independently locked shards by their leading
//! characters. Each shard hides expired entries on read and runs its own
//! background sweeper to reclaim them.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{Group, GroupStats, Shard, ShardStats, Value};
pub use config::Config;
pub use error::{CacheError, Result};
