//! Shard Group Module
//!
//! Routes keys to shards by literal key prefix and manages shard lifecycle.
//!
//! The group's directory lock is always released before a shard's lock is
//! taken, so the two levels never nest.

use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{GroupStats, Shard, Value, DEFAULT_SHARD_KEY_LEN, DEFAULT_SWEEP_INTERVAL};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Shard Id ==
/// Returns the shard identifier for `key`: its first `len` characters, or the
/// whole key if it is shorter.
///
/// Counts characters, not bytes, so multi-byte keys are never split.
pub fn shard_id(key: &str, len: usize) -> &str {
    match key.char_indices().nth(len) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}

// == Group ==
/// Top-level cache handle mapping key prefixes to shards.
#[derive(Debug)]
pub struct Group {
    shards: RwLock<HashMap<String, Arc<Shard>>>,
    shard_key_len: usize,
    /// Ceiling on every write's TTL, zero = no ceiling
    group_ttl: Duration,
    /// Defaults for shards created implicitly by writes
    default_ttl: Duration,
    default_sweep_interval: Duration,
}

impl Group {
    // == Constructor ==
    /// Creates an empty group.
    ///
    /// `group_ttl` caps the TTL of every write; zero disables the cap. A zero
    /// `shard_key_len` falls back to the default of 3 characters.
    pub fn new(group_ttl: Duration, shard_key_len: usize) -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
            shard_key_len: if shard_key_len == 0 {
                DEFAULT_SHARD_KEY_LEN
            } else {
                shard_key_len
            },
            group_ttl,
            default_ttl: Duration::ZERO,
            default_sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    /// Creates a group from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_ttl: config.default_ttl,
            default_sweep_interval: config.sweep_interval,
            ..Self::new(config.group_ttl, config.shard_key_len)
        }
    }

    /// Returns the number of leading key characters that select a shard.
    pub fn shard_key_len(&self) -> usize {
        self.shard_key_len
    }

    /// Returns the TTL ceiling applied to writes, zero if there is none.
    pub fn group_ttl(&self) -> Duration {
        self.group_ttl
    }

    fn shard_id<'k>(&self, key: &'k str) -> &'k str {
        shard_id(key, self.shard_key_len)
    }

    // == Add Shard ==
    /// Creates the shard for `key`'s prefix unless one already exists.
    pub async fn add_shard(&self, key: &str, default_ttl: Duration, sweep_interval: Duration) {
        let id = self.shard_id(key);
        let mut shards = self.shards.write().await;

        if let Entry::Vacant(slot) = shards.entry(id.to_string()) {
            info!(shard = %id, ?default_ttl, "Creating shard");
            slot.insert(Arc::new(Shard::new(id, default_ttl, sweep_interval)));
        }
    }

    /// Returns the shard for `key`'s prefix, creating it with the group's
    /// defaults if missing.
    pub async fn add_default_shard(&self, key: &str) -> Arc<Shard> {
        let id = self.shard_id(key);
        let mut shards = self.shards.write().await;

        let shard = shards.entry(id.to_string()).or_insert_with(|| {
            info!(shard = %id, "Creating default shard");
            Arc::new(Shard::new(id, self.default_ttl, self.default_sweep_interval))
        });
        Arc::clone(shard)
    }

    // == Lookup Shard ==
    /// Returns the shard for `key`'s prefix, if any.
    pub async fn lookup_shard(&self, key: &str) -> Option<Arc<Shard>> {
        let shards = self.shards.read().await;
        shards.get(self.shard_id(key)).cloned()
    }

    // == Get ==
    /// Retrieves a live value. Never creates a shard.
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        let shard = self.lookup_shard(key).await?;
        shard.get(key).await
    }

    /// Retrieves a value of type `T`.
    ///
    /// Fails with `NotFound` if the key is absent or expired, and with
    /// `TypeMismatch` if the stored value is some other type.
    pub async fn get<T>(&self, key: &str) -> Result<T>
    where
        T: Any + Clone,
    {
        let value = self
            .get_value(key)
            .await
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Retrieves a string value, accepting both `String` and `&'static str`.
    pub async fn get_string(&self, key: &str) -> Result<String> {
        let value = self
            .get_value(key)
            .await
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        if let Some(s) = value.downcast_ref::<String>() {
            Ok(s.clone())
        } else if let Some(s) = value.downcast_ref::<&'static str>() {
            Ok((*s).to_string())
        } else {
            Err(CacheError::TypeMismatch {
                key: key.to_string(),
                expected: "String",
            })
        }
    }

    // == Set ==
    /// Stores a value, creating the prefix's shard with defaults if needed.
    ///
    /// A zero `ttl` means never expires, unless the group TTL ceiling applies.
    pub async fn set_value<V>(&self, key: &str, value: V, ttl: Duration)
    where
        V: Any + Send + Sync,
    {
        let shard = self.shard_for_write(key).await;
        shard.set(key, Arc::new(value), self.effective_ttl(ttl)).await;
    }

    /// Stores a value using the owning shard's default TTL.
    pub async fn set_value_default<V>(&self, key: &str, value: V)
    where
        V: Any + Send + Sync,
    {
        let shard = self.shard_for_write(key).await;
        let ttl = self.effective_ttl(shard.default_ttl());
        shard.set(key, Arc::new(value), ttl).await;
    }

    async fn shard_for_write(&self, key: &str) -> Arc<Shard> {
        match self.lookup_shard(key).await {
            Some(shard) => shard,
            None => self.add_default_shard(key).await,
        }
    }

    /// Applies the group ceiling: unbounded or longer TTLs are clamped to it.
    fn effective_ttl(&self, ttl: Duration) -> Duration {
        if self.group_ttl.is_zero() {
            ttl
        } else if ttl.is_zero() || ttl > self.group_ttl {
            self.group_ttl
        } else {
            ttl
        }
    }

    // == Delete Shard ==
    /// Drops the whole shard for `key`'s prefix along with every entry in it,
    /// and stops its sweeper.
    pub async fn delete_shard(&self, key: &str) -> Result<()> {
        let id = self.shard_id(key);
        let removed = self.shards.write().await.remove(id);

        match removed {
            Some(shard) => {
                shard.stop_sweeper();
                info!(shard = %id, "Deleted shard");
                Ok(())
            }
            None => {
                debug!(shard = %id, "Delete requested for unknown shard");
                Err(CacheError::NotFound(id.to_string()))
            }
        }
    }

    // == Introspection ==
    /// Returns the number of live shards.
    pub async fn shard_count(&self) -> usize {
        self.shards.read().await.len()
    }

    /// Returns the identifiers of all live shards, sorted.
    pub async fn shard_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.shards.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Aggregates statistics over all shards.
    pub async fn stats(&self) -> GroupStats {
        // Snapshot the directory first so no shard lock is taken under it
        let shards: Vec<Arc<Shard>> = self.shards.read().await.values().cloned().collect();

        let mut stats = GroupStats::default();
        for shard in shards {
            stats.add_shard(&shard.stats().await);
        }
        stats
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
