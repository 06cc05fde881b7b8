//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check routing, overwrite and expiration behavior over
//! generated keys and values.

use proptest::prelude::*;
use std::collections::HashMap;
use std::time::Duration;

use crate::cache::{shard_id, Group};
use crate::error::CacheError;

// == Strategies ==
/// Generates cache keys, including some shorter than the shard prefix
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9:]{1,16}"
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,64}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    DeleteShard { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => key_strategy().prop_map(|key| CacheOp::DeleteShard { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // The shard id is always a prefix of the key and never longer than the
    // configured number of characters.
    #[test]
    fn prop_shard_id_is_bounded_prefix(key in "\\PC{0,24}", len in 1usize..8) {
        let id = shard_id(&key, len);

        prop_assert!(key.starts_with(id));
        prop_assert_eq!(id.chars().count(), key.chars().count().min(len));
    }

    // Keys sharing a prefix land in the same shard, and deleting that shard
    // via any one of them hides all of them.
    #[test]
    fn prop_prefix_colocation(
        prefix in "[a-z]{3}",
        suffixes in prop::collection::hash_set("[a-z0-9]{1,8}", 1..10)
    ) {
        tokio_test::block_on(async {
            let group = Group::default();
            let keys: Vec<String> = suffixes.iter().map(|s| format!("{prefix}{s}")).collect();

            for key in &keys {
                group.set_value(key, key.clone(), Duration::ZERO).await;
            }
            prop_assert_eq!(group.shard_count().await, 1);
            for key in &keys {
                prop_assert_eq!(group.get_string(key).await, Ok(key.clone()));
            }

            prop_assert_eq!(group.delete_shard(&keys[0]).await, Ok(()));
            for key in &keys {
                prop_assert_eq!(
                    group.get_string(key).await,
                    Err(CacheError::NotFound(key.clone()))
                );
            }
            Ok(())
        })?;
    }

    // Storing V1 then V2 under one key always reads back V2.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        tokio_test::block_on(async {
            let group = Group::default();

            group.set_value(&key, value1, Duration::from_secs(3600)).await;
            group.set_value(&key, value2.clone(), Duration::ZERO).await;

            prop_assert_eq!(group.get_string(&key).await, Ok(value2));
            let shard = group.lookup_shard(&key).await.unwrap();
            prop_assert_eq!(shard.len().await, 1);
            Ok(())
        })?;
    }

    // Any sequence of operations agrees with a model of prefix-grouped maps.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        tokio_test::block_on(async {
            let group = Group::default();
            let mut model: HashMap<String, HashMap<String, String>> = HashMap::new();

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        group.set_value(&key, value.clone(), Duration::ZERO).await;
                        model
                            .entry(shard_id(&key, 3).to_string())
                            .or_default()
                            .insert(key, value);
                    }
                    CacheOp::Get { key } => {
                        let expected = model
                            .get(shard_id(&key, 3))
                            .and_then(|entries| entries.get(&key))
                            .cloned();
                        prop_assert_eq!(group.get_string(&key).await.ok(), expected);
                    }
                    CacheOp::DeleteShard { key } => {
                        let existed = model.remove(shard_id(&key, 3)).is_some();
                        prop_assert_eq!(group.delete_shard(&key).await.is_ok(), existed);
                    }
                }
            }

            prop_assert_eq!(group.shard_count().await, model.len());
            Ok(())
        })?;
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // An entry with a TTL is readable immediately and gone once it elapses;
    // an entry without one survives the same wait.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy()
    ) {
        tokio_test::block_on(async {
            let group = Group::default();
            let forever = format!("{key}:forever");

            group.set_value(&key, value.clone(), Duration::from_millis(50)).await;
            group.set_value(&forever, value.clone(), Duration::ZERO).await;
            prop_assert_eq!(group.get_string(&key).await, Ok(value.clone()));

            tokio::time::sleep(Duration::from_millis(80)).await;

            prop_assert!(group.get_value(&key).await.is_none());
            prop_assert_eq!(group.get_string(&forever).await, Ok(value));
            Ok(())
        })?;
    }
}
