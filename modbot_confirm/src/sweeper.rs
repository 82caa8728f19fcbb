//! Background eviction of expired pending actions.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::store::PendingStore;

/// Default sweep period: 10 minutes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(600);

/// Timer task that periodically evicts expired entries from a
/// [`PendingStore`].
///
/// The read paths already hide expired entries, so the sweeper exists only
/// to bound memory growth from flows nobody ever touches again. Dropping
/// the sweeper (or calling [`shutdown`](Self::shutdown)) aborts the task,
/// so a hosted environment gets a clean stop for free.
pub struct ExpirySweeper {
    handle: JoinHandle<()>,
}

impl ExpirySweeper {
    /// Spawn a sweeper over `store`, ticking every `period`.
    #[must_use]
    pub fn spawn(store: Arc<PendingStore>, period: Duration) -> Self {
        info!("Starting pending-action sweeper (period: {period:?})");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; harmless on an empty store.
            loop {
                ticker.tick().await;
                let removed = store.sweep().await;
                if removed > 0 {
                    debug!("Sweeper evicted {removed} expired pending action(s)");
                }
            }
        });

        Self { handle }
    }

    /// Spawn with the default 10-minute period.
    #[must_use]
    pub fn spawn_default(store: Arc<PendingStore>) -> Self {
        Self::spawn(store, DEFAULT_SWEEP_INTERVAL)
    }

    /// Stop the sweeper task.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
