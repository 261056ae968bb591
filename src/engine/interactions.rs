use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{RecommendationEngine, AGGREGATION_WINDOW_DAYS};
use crate::error::AppResult;
use crate::models::WatchHistoryEntry;

/// A viewing session reduced to a film and a derived rating
///
/// A completed session counts as a full 5; partial sessions scale linearly
/// with watch progress.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserInteraction {
    pub film_id: Uuid,
    pub rating: f64,
}

impl UserInteraction {
    fn from_session(session: &WatchHistoryEntry) -> Self {
        let rating = if session.is_complete() {
            5.0
        } else {
            session.watch_progress / 100.0 * 5.0
        };
        Self {
            film_id: session.film_id,
            rating,
        }
    }
}

impl RecommendationEngine {
    /// Rebuilds the per-user interaction table from the trailing 30-day
    /// window, replacing it wholesale.
    ///
    /// This is the collaborative-filtering substrate; no query consumes it
    /// yet.
    // TODO: fold interaction ratings into the personalized ranking once a
    // user-to-user similarity pass exists
    pub async fn build_interactions(
        &self,
    ) -> AppResult<Arc<HashMap<Uuid, Vec<UserInteraction>>>> {
        let cutoff = Utc::now() - Duration::days(AGGREGATION_WINDOW_DAYS);
        let window = self.catalog.watch_history_since(cutoff).await?;

        let mut table: HashMap<Uuid, Vec<UserInteraction>> = HashMap::new();
        for session in &window {
            table
                .entry(session.user_id)
                .or_default()
                .push(UserInteraction::from_session(session));
        }

        let table = Arc::new(table);
        *self.interactions.write().await = Some(Arc::clone(&table));

        tracing::info!(users = table.len(), "Interaction table rebuilt");
        Ok(table)
    }

    /// Current interaction table, if it has been built
    pub async fn interactions(&self) -> Option<Arc<HashMap<Uuid, Vec<UserInteraction>>>> {
        self.interactions.read().await.clone()
    }
}
