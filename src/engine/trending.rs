use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{RecommendationEngine, AGGREGATION_WINDOW_DAYS};
use crate::error::AppResult;
use crate::models::Film;

/// How long a trending snapshot may be served before lookups rebuild it
const CACHE_TTL_SECS: i64 = 3600;

/// How many films a trending snapshot holds
const TRENDING_LIMIT: usize = 20;

/// One film's aggregate over the trailing trending window
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrendingEntry {
    pub film_id: Uuid,
    pub title: String,
    pub description: String,
    /// Viewing sessions within the window, not the lifetime view count
    pub view_count: u64,
    pub average_watch_duration_secs: f64,
    /// Fraction of window sessions that reached the end of the film
    pub completion_rate: f64,
    pub score: f64,
}

/// A fully built trending ranking, replaced as a unit on refresh
#[derive(Debug, Clone, Serialize)]
pub struct TrendingSnapshot {
    pub entries: Vec<TrendingEntry>,
    pub last_update: DateTime<Utc>,
}

impl TrendingSnapshot {
    /// Whether the snapshot is still within its validity window
    pub fn is_fresh(&self) -> bool {
        Utc::now() - self.last_update < Duration::seconds(CACHE_TTL_SECS)
    }
}

/// Per-film accumulator while grouping window sessions
#[derive(Default)]
struct WindowAccumulator {
    sessions: u64,
    complete: u64,
    duration_total: i64,
}

impl WindowAccumulator {
    fn into_entry(self, film: &Film) -> TrendingEntry {
        let sessions = self.sessions as f64;
        let completion_rate = self.complete as f64 / sessions;
        TrendingEntry {
            film_id: film.id,
            title: film.title.clone(),
            description: film.description.clone(),
            view_count: self.sessions,
            average_watch_duration_secs: self.duration_total as f64 / sessions,
            completion_rate,
            score: sessions * 0.5 + completion_rate * 50.0,
        }
    }
}

impl RecommendationEngine {
    /// Rebuilds the trending snapshot from the trailing 30-day window and
    /// swaps it in.
    ///
    /// The new ranking is fully assembled before the swap, so a catalog
    /// failure leaves the previous snapshot and its timestamp untouched.
    pub async fn refresh_trending(&self) -> AppResult<Arc<TrendingSnapshot>> {
        let cutoff = Utc::now() - Duration::days(AGGREGATION_WINDOW_DAYS);
        let window = self.catalog.watch_history_since(cutoff).await?;

        let mut accumulators: HashMap<Uuid, WindowAccumulator> = HashMap::new();
        for session in &window {
            let acc = accumulators.entry(session.film_id).or_default();
            acc.sessions += 1;
            acc.duration_total += session.watch_duration_secs;
            if session.is_complete() {
                acc.complete += 1;
            }
        }

        let films: HashMap<Uuid, Film> = self
            .catalog
            .films()
            .await?
            .into_iter()
            .map(|film| (film.id, film))
            .collect();

        let mut entries: Vec<TrendingEntry> = accumulators
            .into_iter()
            // Sessions can reference films since removed from the catalog
            .filter_map(|(film_id, acc)| films.get(&film_id).map(|film| acc.into_entry(film)))
            .collect();

        // Tiebreak: window view count, then film id, keeping the ranking
        // deterministic for identical history
        entries.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.view_count.cmp(&a.view_count))
                .then_with(|| a.film_id.cmp(&b.film_id))
        });
        entries.truncate(TRENDING_LIMIT);

        let snapshot = Arc::new(TrendingSnapshot {
            entries,
            last_update: Utc::now(),
        });
        *self.trending.write().await = Some(Arc::clone(&snapshot));

        tracing::info!(entries = snapshot.entries.len(), "Trending cache refreshed");
        Ok(snapshot)
    }

    /// Serves the current trending ranking, rebuilding first when the
    /// snapshot is absent or older than its validity window.
    pub async fn trending(&self) -> AppResult<Arc<TrendingSnapshot>> {
        {
            let guard = self.trending.read().await;
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.is_fresh() {
                    return Ok(Arc::clone(snapshot));
                }
            }
        }

        self.refresh_trending().await
    }

    /// Rewrites the snapshot timestamp, for staleness tests
    #[cfg(test)]
    pub(crate) async fn backdate_trending(&self, age: Duration) {
        let mut guard = self.trending.write().await;
        if let Some(snapshot) = guard.as_ref() {
            let mut aged = TrendingSnapshot::clone(snapshot);
            aged.last_update = Utc::now() - age;
            *guard = Some(Arc::new(aged));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::engine::testing::FailingCatalog;
    use crate::models::WatchHistoryEntry;

    fn film(title: &str) -> Film {
        Film {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("About {title}"),
            release_year: 2021,
            age_rating: "PG-13".to_string(),
            genres: vec![],
            cast: vec![],
            studio_id: None,
            view_count: 0,
            internal_ratings: vec![],
        }
    }

    fn session(film_id: Uuid, progress: f64, age_days: i64) -> WatchHistoryEntry {
        WatchHistoryEntry {
            user_id: Uuid::new_v4(),
            film_id,
            watch_date: Utc::now() - Duration::days(age_days),
            watch_duration_secs: 5400,
            watch_progress: progress,
        }
    }

    async fn engine_with(catalog: InMemoryCatalog) -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(catalog))
    }

    #[tokio::test]
    async fn test_snapshot_never_exceeds_twenty_entries() {
        let catalog = InMemoryCatalog::new();
        for i in 0..25 {
            let f = film(&format!("Film {i}"));
            catalog.add_session(session(f.id, 50.0, 1)).await;
            catalog.add_film(f).await;
        }

        let engine = engine_with(catalog).await;
        let snapshot = engine.refresh_trending().await.unwrap();
        assert_eq!(snapshot.entries.len(), 20);
    }

    #[tokio::test]
    async fn test_completion_rate_and_score() {
        // 10 sessions, 4 complete: completion rate 0.4, score 10*0.5 + 0.4*50
        let catalog = InMemoryCatalog::new();
        let f = film("Night Train");
        for i in 0..10 {
            let progress = if i < 4 { 100.0 } else { 60.0 };
            catalog.add_session(session(f.id, progress, 3)).await;
        }
        catalog.add_film(f).await;

        let engine = engine_with(catalog).await;
        let snapshot = engine.refresh_trending().await.unwrap();

        assert_eq!(snapshot.entries.len(), 1);
        let entry = &snapshot.entries[0];
        assert_eq!(entry.view_count, 10);
        assert!((entry.completion_rate - 0.4).abs() < 1e-9);
        assert!((entry.score - 25.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sessions_outside_window_are_ignored() {
        let catalog = InMemoryCatalog::new();
        let f = film("Old News");
        catalog.add_session(session(f.id, 100.0, 45)).await;
        catalog.add_film(f).await;

        let engine = engine_with(catalog).await;
        let snapshot = engine.refresh_trending().await.unwrap();
        assert!(snapshot.entries.is_empty());
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let catalog = InMemoryCatalog::new();
        for i in 0..5 {
            let f = film(&format!("Film {i}"));
            for _ in 0..=i {
                catalog.add_session(session(f.id, 80.0, 2)).await;
            }
            catalog.add_film(f).await;
        }

        let engine = engine_with(catalog).await;
        let first = engine.refresh_trending().await.unwrap();
        let second = engine.refresh_trending().await.unwrap();
        assert_eq!(first.entries, second.entries);
    }

    #[tokio::test]
    async fn test_entries_ordered_by_score() {
        let catalog = InMemoryCatalog::new();
        for views in [1u64, 8, 3] {
            let f = film(&format!("{views} views"));
            for _ in 0..views {
                catalog.add_session(session(f.id, 100.0, 2)).await;
            }
            catalog.add_film(f).await;
        }

        let engine = engine_with(catalog).await;
        let snapshot = engine.refresh_trending().await.unwrap();
        let scores: Vec<f64> = snapshot.entries.iter().map(|e| e.score).collect();
        assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn test_stale_snapshot_triggers_rebuild() {
        let catalog = InMemoryCatalog::new();
        let f = film("Evergreen");
        catalog.add_session(session(f.id, 100.0, 1)).await;
        catalog.add_film(f).await;

        let engine = engine_with(catalog).await;
        engine.refresh_trending().await.unwrap();
        engine.backdate_trending(Duration::minutes(61)).await;

        let stale_stamp = engine.trending.read().await.as_ref().unwrap().last_update;
        let snapshot = engine.trending().await.unwrap();
        assert!(snapshot.last_update > stale_stamp);
    }

    #[tokio::test]
    async fn test_fresh_snapshot_is_served_without_rebuild() {
        let catalog = InMemoryCatalog::new();
        let f = film("Steady");
        catalog.add_session(session(f.id, 100.0, 1)).await;
        catalog.add_film(f).await;

        let engine = engine_with(catalog).await;
        let built = engine.refresh_trending().await.unwrap();
        let served = engine.trending().await.unwrap();
        assert_eq!(built.last_update, served.last_update);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let catalog = InMemoryCatalog::new();
        let f = film("Survivor");
        catalog.add_session(session(f.id, 100.0, 1)).await;
        catalog.add_film(f).await;

        let engine = engine_with(catalog).await;
        let snapshot = engine.refresh_trending().await.unwrap();

        // Swap in a backend that fails every query; the old snapshot must
        // keep serving
        let broken = RecommendationEngine::new(Arc::new(FailingCatalog));
        *broken.trending.write().await = Some(Arc::clone(&snapshot));

        assert!(broken.refresh_trending().await.is_err());
        let kept = broken.trending.read().await.clone().unwrap();
        assert_eq!(kept.entries, snapshot.entries);
        assert_eq!(kept.last_update, snapshot.last_update);
    }
}
