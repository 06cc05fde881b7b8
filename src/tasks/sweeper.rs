//! Shard Sweeper Task
//!
//! Background task that periodically removes expired entries from one shard.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::EntryStore;

/// Handle to a running sweeper.
///
/// The sweeper stops when `stop` is called, when this handle is dropped, or
/// when the store it prunes has been dropped.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Spawns a sweeper for `store`, waking every `interval`.
    ///
    /// The task holds only a weak reference to the store and acquires the
    /// store's write lock for the duration of each pass.
    pub(crate) fn start(store: Weak<EntryStore>, interval: Duration, shard_id: String) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            shard = %shard_id,
            "Starting sweeper with interval of {:?}", interval
        );
        let handle = tokio::spawn(sweep_loop(store, interval, shutdown_rx, shard_id));

        Self {
            shutdown_tx,
            handle,
        }
    }

    /// Signals the sweeper to stop. Idempotent.
    pub fn stop(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Returns true until the sweeper has been told to stop or has exited.
    pub fn is_running(&self) -> bool {
        !*self.shutdown_tx.borrow() && !self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweep_loop(
    store: Weak<EntryStore>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
    shard_id: String,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!(shard = %shard_id, "Sweeper stopped");
                    return;
                }
            }
        }

        let Some(entries) = store.upgrade() else {
            debug!(shard = %shard_id, "Shard dropped, sweeper exiting");
            return;
        };

        let removed = entries.purge_expired().await;
        // Release the strong reference before sleeping
        drop(entries);

        if removed > 0 {
            info!(shard = %shard_id, "Sweep: removed {} expired entries", removed);
        } else {
            debug!(shard = %shard_id, "Sweep: no expired entries found");
        }
    }
}
