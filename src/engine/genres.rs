use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::RecommendationEngine;
use crate::error::AppResult;
use crate::models::Film;

/// Films returned by a genre query when the caller does not ask for a limit
pub const DEFAULT_GENRE_LIMIT: usize = 10;

/// Aggregate popularity statistics for one genre
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenreStats {
    pub genre_id: Uuid,
    pub genre_name: String,
    pub film_count: u64,
    pub total_views: i64,
    /// Average lifetime views per film in the genre
    pub popularity_score: f64,
}

/// Ranking weight for a film inside its genre
fn genre_popularity(film: &Film) -> f64 {
    film.view_count as f64 * film.internal_rating()
}

impl RecommendationEngine {
    /// Expands film-genre pairs over the whole catalog and replaces the
    /// genre statistics wholesale.
    ///
    /// There is no incremental update path; callers needing fresh numbers
    /// re-invoke this explicitly.
    pub async fn build_genre_stats(&self) -> AppResult<Arc<HashMap<Uuid, GenreStats>>> {
        let films = self.catalog.films().await?;

        let mut stats: HashMap<Uuid, GenreStats> = HashMap::new();
        for film in &films {
            for tag in &film.genres {
                let entry = stats.entry(tag.genre_id).or_insert_with(|| GenreStats {
                    genre_id: tag.genre_id,
                    genre_name: tag.genre_name.clone(),
                    film_count: 0,
                    total_views: 0,
                    popularity_score: 0.0,
                });
                entry.film_count += 1;
                entry.total_views += film.view_count;
            }
        }
        for entry in stats.values_mut() {
            entry.popularity_score = entry.total_views as f64 / entry.film_count as f64;
        }

        let stats = Arc::new(stats);
        *self.genre_stats.write().await = Some(Arc::clone(&stats));

        tracing::info!(genres = stats.len(), "Genre statistics rebuilt");
        Ok(stats)
    }

    /// Current genre statistics, built on first use
    pub async fn genre_stats(&self) -> AppResult<Arc<HashMap<Uuid, GenreStats>>> {
        {
            let guard = self.genre_stats.read().await;
            if let Some(stats) = guard.as_ref() {
                return Ok(Arc::clone(stats));
            }
        }

        self.build_genre_stats().await
    }

    /// The most popular films carrying the given genre
    ///
    /// Popularity is lifetime view count weighted by the editorial rating;
    /// films without a rating sink to the bottom. An unknown genre yields
    /// an empty list.
    pub async fn recommendations_by_genre(
        &self,
        genre_id: Uuid,
        limit: usize,
    ) -> AppResult<Vec<Film>> {
        // Stats build lazily on the first genre query; the ranking itself
        // reads live catalog rows
        self.genre_stats().await?;

        let mut films = self.catalog.films_in_genre(genre_id).await?;
        films.sort_by(|a, b| {
            genre_popularity(b)
                .partial_cmp(&genre_popularity(a))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        films.truncate(limit);
        Ok(films)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::models::GenreTag;

    fn film_in_genre(genre: &GenreTag, view_count: i64, rating: Option<f64>) -> Film {
        Film {
            id: Uuid::new_v4(),
            title: format!("{} views", view_count),
            description: String::new(),
            release_year: 2019,
            age_rating: "PG".to_string(),
            genres: vec![genre.clone()],
            cast: vec![],
            studio_id: None,
            view_count,
            internal_ratings: rating.map(|r| vec![r]).unwrap_or_default(),
        }
    }

    fn genre(name: &str) -> GenreTag {
        GenreTag {
            genre_id: Uuid::new_v4(),
            genre_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_stats_average_views_per_film() {
        let catalog = InMemoryCatalog::new();
        let action = genre("Action");
        catalog.add_film(film_in_genre(&action, 100, None)).await;
        catalog.add_film(film_in_genre(&action, 300, None)).await;

        let engine = RecommendationEngine::new(Arc::new(catalog));
        let stats = engine.build_genre_stats().await.unwrap();

        let entry = stats.get(&action.genre_id).unwrap();
        assert_eq!(entry.film_count, 2);
        assert_eq!(entry.total_views, 400);
        assert!((entry.popularity_score - 200.0).abs() < 1e-9);
        assert_eq!(entry.genre_name, "Action");
    }

    #[tokio::test]
    async fn test_unknown_genre_returns_empty_list() {
        let catalog = InMemoryCatalog::new();
        catalog.add_film(film_in_genre(&genre("Drama"), 50, Some(4.0))).await;

        let engine = RecommendationEngine::new(Arc::new(catalog));
        let films = engine
            .recommendations_by_genre(Uuid::new_v4(), DEFAULT_GENRE_LIMIT)
            .await
            .unwrap();
        assert!(films.is_empty());
    }

    #[tokio::test]
    async fn test_ranking_weights_views_by_rating() {
        let catalog = InMemoryCatalog::new();
        let thriller = genre("Thriller");
        // 1000 views at rating 1.0 loses to 500 views at rating 4.0
        catalog.add_film(film_in_genre(&thriller, 1000, Some(1.0))).await;
        catalog.add_film(film_in_genre(&thriller, 500, Some(4.0))).await;
        // No rating scores zero regardless of views
        catalog.add_film(film_in_genre(&thriller, 9000, None)).await;

        let engine = RecommendationEngine::new(Arc::new(catalog));
        let films = engine
            .recommendations_by_genre(thriller.genre_id, DEFAULT_GENRE_LIMIT)
            .await
            .unwrap();

        assert_eq!(films.len(), 3);
        assert_eq!(films[0].view_count, 500);
        assert_eq!(films[1].view_count, 1000);
        assert_eq!(films[2].view_count, 9000);
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let catalog = InMemoryCatalog::new();
        let comedy = genre("Comedy");
        for views in 0..6 {
            catalog.add_film(film_in_genre(&comedy, views, Some(3.0))).await;
        }

        let engine = RecommendationEngine::new(Arc::new(catalog));
        let films = engine
            .recommendations_by_genre(comedy.genre_id, 2)
            .await
            .unwrap();
        assert_eq!(films.len(), 2);
    }

    #[tokio::test]
    async fn test_genre_query_builds_stats_lazily() {
        let catalog = InMemoryCatalog::new();
        let horror = genre("Horror");
        catalog.add_film(film_in_genre(&horror, 10, Some(2.0))).await;

        let engine = RecommendationEngine::new(Arc::new(catalog));
        assert!(engine.genre_stats.read().await.is_none());

        engine
            .recommendations_by_genre(horror.genre_id, DEFAULT_GENRE_LIMIT)
            .await
            .unwrap();
        assert!(engine.genre_stats.read().await.is_some());
    }
}
