use std::collections::HashSet;

use rand::Rng;
use uuid::Uuid;

use super::RecommendationEngine;
use crate::error::{AppError, AppResult};
use crate::models::Film;

/// Films returned per personalized request
const PERSONALIZED_LIMIT: usize = 10;

impl RecommendationEngine {
    /// Personalized recommendations for a user
    ///
    /// Candidates are unwatched films that hit one of the user's preferred
    /// genres or cast members. Qualifying candidates are ranked by a uniform
    /// random draw rather than preference strength, trading precision for
    /// exploration; callers must not rely on any ordering among them.
    pub async fn personalized(&self, user_id: Uuid) -> AppResult<Vec<Film>> {
        let user = self
            .catalog
            .user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        // A user without preferences has empty filters and gets an empty
        // result, not an error
        let preferred_genres: HashSet<Uuid> = user.preferred_genres().collect();
        let preferred_actors: HashSet<Uuid> = user.preferred_actors().collect();

        let watched = self.catalog.watched_film_ids(user_id).await?;
        let films = self.catalog.films().await?;

        let mut rng = rand::rng();
        let mut candidates: Vec<(f64, Film)> = films
            .into_iter()
            .filter(|film| !watched.contains(&film.id))
            .filter(|film| {
                film.genres
                    .iter()
                    .any(|g| preferred_genres.contains(&g.genre_id))
                    || film
                        .cast
                        .iter()
                        .any(|c| preferred_actors.contains(&c.actor_id))
            })
            .map(|film| (rng.random::<f64>(), film))
            .collect();

        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(candidates
            .into_iter()
            .take(PERSONALIZED_LIMIT)
            .map(|(_, film)| film)
            .collect())
    }
}
