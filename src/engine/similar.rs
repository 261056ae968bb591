use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use super::RecommendationEngine;
use crate::error::{AppError, AppResult};
use crate::models::{Film, GenreTag};

/// Films returned per similarity query
const SIMILAR_LIMIT: usize = 5;

/// Candidate window around the source film's release year
const YEAR_WINDOW: i32 = 5;

/// A similar film with its score and the criteria that matched
#[derive(Debug, Clone, Serialize)]
pub struct SimilarFilm {
    #[serde(flatten)]
    pub film: Film,
    pub similarity_score: f64,
    pub similarity_reasons: String,
}

/// Diagnostics attached in development environments
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityDebug {
    pub source_genres: Vec<GenreTag>,
    pub source_release_year: i32,
    pub source_age_rating: String,
    pub year_range: String,
    pub total_found: usize,
}

/// Similarity query result
#[derive(Debug, Serialize)]
pub struct SimilarContent {
    pub similar: Vec<SimilarFilm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<SimilarityDebug>,
}

/// Weighted similarity between a candidate and the source film.
///
/// Genre overlap dominates (5 per shared genre); release-year proximity
/// contributes up to 3 and goes negative for distant years; an age-rating
/// match adds 2; lifetime views add up to 2. The year term applies to every
/// candidate, window or not — the window only gates candidacy.
fn similarity_score(candidate: &Film, source: &Film, shared_genres: usize) -> f64 {
    let year_gap = (candidate.release_year - source.release_year).abs();
    let genre_term = shared_genres as f64 * 5.0;
    let year_term = 3.0 - year_gap as f64 / 2.0;
    let rating_term = if candidate.age_rating == source.age_rating {
        2.0
    } else {
        0.0
    };
    let views_term = (candidate.view_count as f64 / 1000.0).min(2.0);
    genre_term + year_term + rating_term + views_term
}

fn similarity_reasons(shared_genres: usize, same_rating: bool, within_window: bool) -> String {
    let mut reasons = String::new();
    if shared_genres > 0 {
        reasons.push_str("Similar genres, ");
    }
    if same_rating {
        reasons.push_str("Same age rating, ");
    }
    if within_window {
        reasons.push_str("Released in similar period");
    }
    reasons
}

impl RecommendationEngine {
    /// Films similar to the given one
    ///
    /// Candidates share a genre, fall within the release-year window, or
    /// carry the same age rating; anything scoring at or below zero is
    /// dropped. No surviving candidate is an error case — the result is
    /// simply empty.
    pub async fn similar(&self, film_id: Uuid, include_debug: bool) -> AppResult<SimilarContent> {
        let source = self
            .catalog
            .film(film_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Film {film_id} not found")))?;

        let source_genres: HashSet<Uuid> = source.genres.iter().map(|g| g.genre_id).collect();

        let mut similar: Vec<SimilarFilm> = Vec::new();
        for candidate in self.catalog.films().await? {
            if candidate.id == source.id {
                continue;
            }

            let shared_genres = candidate
                .genres
                .iter()
                .filter(|g| source_genres.contains(&g.genre_id))
                .count();
            let same_rating = candidate.age_rating == source.age_rating;
            let within_window =
                (candidate.release_year - source.release_year).abs() <= YEAR_WINDOW;

            if shared_genres == 0 && !same_rating && !within_window {
                continue;
            }

            let score = similarity_score(&candidate, &source, shared_genres);
            if score <= 0.0 {
                continue;
            }

            similar.push(SimilarFilm {
                similarity_score: score,
                similarity_reasons: similarity_reasons(shared_genres, same_rating, within_window),
                film: candidate,
            });
        }

        similar.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.film.view_count.cmp(&a.film.view_count))
        });
        similar.truncate(SIMILAR_LIMIT);

        let debug = include_debug.then(|| SimilarityDebug {
            year_range: format!(
                "{} to {}",
                source.release_year - YEAR_WINDOW,
                source.release_year + YEAR_WINDOW
            ),
            source_genres: source.genres.clone(),
            source_release_year: source.release_year,
            source_age_rating: source.age_rating.clone(),
            total_found: similar.len(),
        });

        Ok(SimilarContent { similar, debug })
    }
}
