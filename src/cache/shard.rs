//! Shard Module
//!
//! An independently locked entry store with lazy expiration on read and a
//! dedicated background sweeper for active expiration.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

use crate::cache::{CacheEntry, ShardStats, Value, DEFAULT_SWEEP_INTERVAL};
use crate::tasks::Sweeper;

// == Entry Store ==
/// Entries plus sweep bookkeeping, mutated only under the write lock.
#[derive(Debug, Default)]
pub(crate) struct ShardState {
    entries: HashMap<String, CacheEntry>,
    swept: u64,
    sweeps: u64,
    last_sweep_at: Option<chrono::DateTime<Utc>>,
}

/// Lock-guarded storage shared between a shard and its sweeper.
///
/// The sweeper only holds a weak reference, so dropping the shard frees the
/// entries even if the sweeper has not yet observed its stop signal.
#[derive(Debug, Default)]
pub(crate) struct EntryStore {
    state: RwLock<ShardState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl EntryStore {
    // == Cleanup Expired ==
    /// Removes every expired entry under the exclusive lock.
    ///
    /// Returns the number of entries removed.
    pub(crate) async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.state.write().await;

        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - state.entries.len();

        state.swept += removed as u64;
        state.sweeps += 1;
        state.last_sweep_at = Some(Utc::now());
        removed
    }
}

// == Shard ==
/// A partition of the keyspace with its own lock and sweeper.
#[derive(Debug)]
pub struct Shard {
    /// Prefix this shard serves
    id: String,
    store: Arc<EntryStore>,
    /// TTL used by `set_default`, zero = never expires
    default_ttl: Duration,
    sweep_interval: Duration,
    sweeper: Sweeper,
}

impl Shard {
    // == Constructor ==
    /// Creates a shard and starts its sweeper.
    ///
    /// A zero `sweep_interval` falls back to the default of one second.
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime, since the sweeper is
    /// spawned as a task.
    pub fn new(id: impl Into<String>, default_ttl: Duration, sweep_interval: Duration) -> Self {
        let id = id.into();
        let sweep_interval = if sweep_interval.is_zero() {
            DEFAULT_SWEEP_INTERVAL
        } else {
            sweep_interval
        };

        let store = Arc::new(EntryStore::default());
        let sweeper = Sweeper::start(Arc::downgrade(&store), sweep_interval, id.clone());

        Self {
            id,
            store,
            default_ttl,
            sweep_interval,
            sweeper,
        }
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// Expired entries are hidden but left in place for the sweeper, so reads
    /// never need more than the shared lock.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        let value = {
            let state = self.store.state.read().await;
            state
                .entries
                .get(key)
                .filter(|entry| !entry.is_expired_at(now))
                .map(|entry| Arc::clone(&entry.value))
        };

        let counter = if value.is_some() {
            &self.store.hits
        } else {
            &self.store.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        trace!(shard = %self.id, key, hit = value.is_some(), "shard get");
        value
    }

    // == Set ==
    /// Stores a value, replacing any previous entry for the key.
    ///
    /// A zero `ttl` stores the entry without expiration.
    pub async fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
        let key = key.into();
        let entry = CacheEntry::new(value, ttl);
        trace!(shard = %self.id, key = %key, ?ttl, "shard set");

        let mut state = self.store.state.write().await;
        state.entries.insert(key, entry);
    }

    /// Stores a value using this shard's default TTL.
    pub async fn set_default<V>(&self, key: impl Into<String>, value: V)
    where
        V: Any + Send + Sync,
    {
        self.set(key, Arc::new(value), self.default_ttl).await;
    }

    // == Purge ==
    /// Runs one sweep pass immediately, returning the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.purge_expired().await
    }

    /// Stops the background sweeper. Entries stay readable; expired ones are
    /// only hidden from then on.
    pub fn stop_sweeper(&self) {
        self.sweeper.stop();
    }

    /// Returns true while the background sweeper is running.
    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper.is_running()
    }

    // == Length ==
    /// Returns the number of entries physically held, expired or not.
    pub async fn len(&self) -> usize {
        self.store.state.read().await.entries.len()
    }

    /// Returns true if the shard holds no entries, expired or not.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the key prefix this shard serves.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the TTL used by `set_default`, zero = never expires.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the interval between sweep passes.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    // == Stats ==
    /// Returns a snapshot of this shard's statistics.
    pub async fn stats(&self) -> ShardStats {
        let state = self.store.state.read().await;
        ShardStats {
            entries: state.entries.len(),
            hits: self.store.hits.load(Ordering::Relaxed),
            misses: self.store.misses.load(Ordering::Relaxed),
            swept: state.swept,
            sweeps: state.sweeps,
            last_sweep_at: state.last_sweep_at,
            sweeper_running: self.sweeper.is_running(),
        }
    }
}
