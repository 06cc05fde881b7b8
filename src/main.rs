//! Shard Cache demo
//!
//! Runs a short workload against a cache group built from the environment
//! and prints the resulting statistics as JSON.

use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shard_cache::{CacheError, Config, Group};

/// Entry point for the demo.
///
/// # Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Write a mix of expiring and permanent entries
/// 4. Read them back before and after expiry
/// 5. Drop one prefix family and print statistics
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shard_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: shard_key_len={}, sweep_interval={:?}, default_ttl={:?}, group_ttl={:?}",
        config.shard_key_len, config.sweep_interval, config.default_ttl, config.group_ttl
    );

    let group = Group::from_config(&config);

    group.add_shard("usr", Duration::from_millis(500), Duration::from_millis(100)).await;
    group.set_value_default("usr:1", "alice".to_string()).await;
    group.set_value_default("usr:2", "bob".to_string()).await;
    group.set_value("cfg:retries", 3u32, Duration::ZERO).await;
    group.set_value("tmp:token", "abc123".to_string(), Duration::from_millis(200)).await;

    let user = group.get_string("usr:1").await.context("reading usr:1")?;
    let retries: u32 = group.get("cfg:retries").await.context("reading cfg:retries")?;
    info!("usr:1={}, cfg:retries={}", user, retries);

    let mismatch = group.get_string("cfg:retries").await;
    if let Err(CacheError::TypeMismatch { key, expected }) = mismatch {
        warn!("{} does not hold a {}", key, expected);
    }

    tokio::time::sleep(Duration::from_millis(700)).await;

    match group.get_string("tmp:token").await {
        Ok(token) => info!("tmp:token still live: {}", token),
        Err(err) => info!("tmp:token gone: {}", err),
    }

    group.delete_shard("tmp").await.context("deleting tmp shard")?;

    let stats = group.stats().await;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    info!("Hit rate: {:.2}", stats.hit_rate());

    Ok(())
}
