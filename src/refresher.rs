//! Background trending refresh
//!
//! The scheduled path and foreground stale-cache rebuilds funnel through
//! the same snapshot-swap routine, so a race between the two simply leaves
//! the last completed rebuild in place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::engine::RecommendationEngine;

/// Handle for gracefully stopping the refresh task
pub struct RefresherHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl RefresherHandle {
    /// Signals the refresh task to stop after its current cycle
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Trending refresher shutdown signal sent");
    }
}

/// Spawns the periodic trending refresh task
pub fn spawn(engine: Arc<RecommendationEngine>, interval: Duration) -> RefresherHandle {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

    tokio::spawn(async move {
        tracing::info!(interval_secs = interval.as_secs(), "Trending refresher started");

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick fires immediately; initialization already built the
        // snapshot, so skip it
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = engine.refresh_trending().await {
                        // Stale-but-available: the previous snapshot keeps
                        // serving until a later cycle succeeds
                        tracing::error!(error = %e, "Scheduled trending refresh failed");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Trending refresher stopped");
                    break;
                }
            }
        }
    });

    RefresherHandle { shutdown_tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[tokio::test]
    async fn test_refresher_populates_snapshot_on_tick() {
        let engine = Arc::new(RecommendationEngine::new(Arc::new(InMemoryCatalog::new())));

        let handle = spawn(Arc::clone(&engine), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(80)).await;
        handle.shutdown().await;

        // An empty catalog still yields an (empty) snapshot with a timestamp
        let snapshot = engine.trending().await.unwrap();
        assert!(snapshot.entries.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_task() {
        let engine = Arc::new(RecommendationEngine::new(Arc::new(InMemoryCatalog::new())));

        let handle = spawn(engine, Duration::from_millis(10));
        handle.shutdown().await;
        // Nothing to assert beyond clean return; the task exits on signal
    }
}
