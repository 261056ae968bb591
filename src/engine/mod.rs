//! Recommendation engine
//!
//! Holds the process-lifetime read models (trending snapshot, genre
//! statistics, collaborative interaction table) and answers the
//! recommendation queries. Every read model is rebuilt wholesale and
//! swapped in as a unit: the write lock is only ever held for the pointer
//! swap, so concurrent readers observe either the old or the new snapshot,
//! never a mix. When two rebuilds race, the last completed swap wins.

mod genres;
mod interactions;
mod personalized;
mod similar;
mod trending;

pub use genres::{GenreStats, DEFAULT_GENRE_LIMIT};
pub use interactions::UserInteraction;
pub use similar::{SimilarContent, SimilarFilm, SimilarityDebug};
pub use trending::{TrendingEntry, TrendingSnapshot};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::CatalogStore;
use crate::error::AppResult;

/// Trailing window, in days, for trending and interaction aggregation
pub(crate) const AGGREGATION_WINDOW_DAYS: i64 = 30;

/// Engine lifecycle state, observable for diagnostics and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

/// The recommendation engine
///
/// Constructed once at process start and shared behind an `Arc`; request
/// handlers and the background refresher borrow the same instance.
pub struct RecommendationEngine {
    catalog: Arc<dyn CatalogStore>,
    trending: RwLock<Option<Arc<TrendingSnapshot>>>,
    genre_stats: RwLock<Option<Arc<HashMap<Uuid, GenreStats>>>>,
    interactions: RwLock<Option<Arc<HashMap<Uuid, Vec<UserInteraction>>>>>,
    init_state: RwLock<InitState>,
}

impl RecommendationEngine {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog,
            trending: RwLock::new(None),
            genre_stats: RwLock::new(None),
            interactions: RwLock::new(None),
            init_state: RwLock::new(InitState::Uninitialized),
        }
    }

    /// Builds every read model in order: trending snapshot, genre
    /// statistics, interaction table.
    ///
    /// A failing step aborts the remaining steps and leaves the engine in
    /// `Failed`; steps that already completed keep their results. Safe to
    /// call repeatedly — each successful call fully replaces prior state.
    pub async fn initialize(&self) -> AppResult<()> {
        *self.init_state.write().await = InitState::Initializing;
        tracing::info!("Initializing recommendation engine");

        let result = self.initialize_models().await;

        *self.init_state.write().await = match &result {
            Ok(()) => InitState::Ready,
            Err(_) => InitState::Failed,
        };

        match &result {
            Ok(()) => tracing::info!("Recommendation engine initialized"),
            Err(e) => tracing::error!(error = %e, "Recommendation engine initialization failed"),
        }

        result
    }

    async fn initialize_models(&self) -> AppResult<()> {
        self.refresh_trending().await?;
        self.build_genre_stats().await?;
        self.build_interactions().await?;
        Ok(())
    }

    pub async fn init_state(&self) -> InitState {
        *self.init_state.read().await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FailingCatalog;
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[tokio::test]
    async fn test_initialize_moves_to_ready() {
        let engine = RecommendationEngine::new(Arc::new(InMemoryCatalog::new()));
        assert_eq!(engine.init_state().await, InitState::Uninitialized);

        engine.initialize().await.unwrap();
        assert_eq!(engine.init_state().await, InitState::Ready);
    }

    #[tokio::test]
    async fn test_initialize_failure_moves_to_failed() {
        let engine = RecommendationEngine::new(Arc::new(FailingCatalog));

        let result = engine.initialize().await;
        assert!(result.is_err());
        assert_eq!(engine.init_state().await, InitState::Failed);
    }

    #[tokio::test]
    async fn test_initialize_is_repeatable() {
        let engine = RecommendationEngine::new(Arc::new(InMemoryCatalog::new()));
        engine.initialize().await.unwrap();
        engine.initialize().await.unwrap();
        assert_eq!(engine.init_state().await, InitState::Ready);
    }
}
