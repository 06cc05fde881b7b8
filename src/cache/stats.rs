//! Cache Statistics Module
//!
//! Snapshots of shard and group activity: hits, misses and sweep reclamation.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Shard Stats ==
/// Point-in-time statistics for a single shard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShardStats {
    /// Entries physically held, including expired ones not yet swept
    pub entries: usize,
    /// Reads that returned a live value
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed by the sweeper
    pub swept: u64,
    /// Completed sweep passes
    pub sweeps: u64,
    /// Wall-clock time of the last sweep pass
    pub last_sweep_at: Option<DateTime<Utc>>,
    /// Whether the shard's sweeper is still running
    pub sweeper_running: bool,
}

// == Group Stats ==
/// Aggregated statistics across every shard of a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupStats {
    /// Number of live shards
    pub shards: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub swept: u64,
    pub sweeps: u64,
}

impl GroupStats {
    // == Accumulate ==
    /// Folds one shard's snapshot into the totals.
    pub fn add_shard(&mut self, shard: &ShardStats) {
        self.shards += 1;
        self.entries += shard.entries;
        self.hits += shard.hits;
        self.misses += shard.misses;
        self.swept += shard.swept;
        self.sweeps += shard.sweeps;
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = GroupStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_group_stats_accumulate() {
        let mut stats = GroupStats::default();
        let shard = ShardStats {
            entries: 4,
            hits: 3,
            misses: 1,
            swept: 2,
            sweeps: 5,
            ..Default::default()
        };

        stats.add_shard(&shard);
        stats.add_shard(&shard);

        assert_eq!(stats.shards, 2);
        assert_eq!(stats.entries, 8);
        assert_eq!(stats.hits, 6);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.swept, 4);
        assert_eq!(stats.sweeps, 10);
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = ShardStats::default();
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["entries"], 0);
        assert_eq!(json["sweeper_running"], false);
        assert!(json["last_sweep_at"].is_null());
    }
}
