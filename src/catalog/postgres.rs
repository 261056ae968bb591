use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::CatalogStore;
use crate::error::AppResult;
use crate::models::{CastMember, Film, GenreTag, Preference, User, WatchHistoryEntry};

/// Catalog store backed by PostgreSQL
///
/// Films are stored relationally (films + film_genres + film_cast +
/// film_ratings) and reassembled into the embedded-document shape the
/// engine works with.
pub struct PostgresCatalog {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct FilmRow {
    id: Uuid,
    title: String,
    description: String,
    release_year: i32,
    age_rating: String,
    studio_id: Option<Uuid>,
    view_count: i64,
}

#[derive(sqlx::FromRow)]
struct GenreRow {
    film_id: Uuid,
    genre_id: Uuid,
    genre_name: String,
}

#[derive(sqlx::FromRow)]
struct CastRow {
    film_id: Uuid,
    actor_id: Uuid,
    actor_name: String,
}

#[derive(sqlx::FromRow)]
struct RatingRow {
    film_id: Uuid,
    rating: f64,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
}

#[derive(sqlx::FromRow)]
struct PreferenceRow {
    genre_id: Option<Uuid>,
    actor_id: Option<Uuid>,
    preference_score: f64,
}

#[derive(sqlx::FromRow)]
struct WatchHistoryRow {
    user_id: Uuid,
    film_id: Uuid,
    watch_date: DateTime<Utc>,
    watch_duration_secs: i64,
    watch_progress: f64,
}

impl From<WatchHistoryRow> for WatchHistoryEntry {
    fn from(row: WatchHistoryRow) -> Self {
        Self {
            user_id: row.user_id,
            film_id: row.film_id,
            watch_date: row.watch_date,
            watch_duration_secs: row.watch_duration_secs,
            watch_progress: row.watch_progress,
        }
    }
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects a pooled catalog store
    ///
    /// The pool manages connection lifecycle and limits; five connections
    /// are plenty for a read-mostly service.
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Loads films (all of them, or the given ids) together with their
    /// genre, cast, and rating rows.
    async fn load_films(&self, ids: Option<&[Uuid]>) -> AppResult<Vec<Film>> {
        let rows: Vec<FilmRow> = match ids {
            Some(ids) => {
                sqlx::query_as(
                    "SELECT id, title, description, release_year, age_rating, studio_id, view_count \
                     FROM films WHERE id = ANY($1)",
                )
                .bind(ids)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, title, description, release_year, age_rating, studio_id, view_count \
                     FROM films",
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let film_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let genre_rows: Vec<GenreRow> = sqlx::query_as(
            "SELECT film_id, genre_id, genre_name FROM film_genres \
             WHERE film_id = ANY($1) ORDER BY position",
        )
        .bind(&film_ids[..])
        .fetch_all(&self.pool)
        .await?;

        let cast_rows: Vec<CastRow> = sqlx::query_as(
            "SELECT film_id, actor_id, actor_name FROM film_cast \
             WHERE film_id = ANY($1) ORDER BY position",
        )
        .bind(&film_ids[..])
        .fetch_all(&self.pool)
        .await?;

        let rating_rows: Vec<RatingRow> = sqlx::query_as(
            "SELECT film_id, rating FROM film_ratings \
             WHERE film_id = ANY($1) ORDER BY position",
        )
        .bind(&film_ids[..])
        .fetch_all(&self.pool)
        .await?;

        let mut genres: HashMap<Uuid, Vec<GenreTag>> = HashMap::new();
        for row in genre_rows {
            genres.entry(row.film_id).or_default().push(GenreTag {
                genre_id: row.genre_id,
                genre_name: row.genre_name,
            });
        }

        let mut cast: HashMap<Uuid, Vec<CastMember>> = HashMap::new();
        for row in cast_rows {
            cast.entry(row.film_id).or_default().push(CastMember {
                actor_id: row.actor_id,
                actor_name: row.actor_name,
            });
        }

        let mut ratings: HashMap<Uuid, Vec<f64>> = HashMap::new();
        for row in rating_rows {
            ratings.entry(row.film_id).or_default().push(row.rating);
        }

        Ok(rows
            .into_iter()
            .map(|row| Film {
                genres: genres.remove(&row.id).unwrap_or_default(),
                cast: cast.remove(&row.id).unwrap_or_default(),
                internal_ratings: ratings.remove(&row.id).unwrap_or_default(),
                id: row.id,
                title: row.title,
                description: row.description,
                release_year: row.release_year,
                age_rating: row.age_rating,
                studio_id: row.studio_id,
                view_count: row.view_count,
            })
            .collect())
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalog {
    async fn film(&self, film_id: Uuid) -> AppResult<Option<Film>> {
        Ok(self.load_films(Some(&[film_id])).await?.pop())
    }

    async fn films(&self) -> AppResult<Vec<Film>> {
        self.load_films(None).await
    }

    async fn films_in_genre(&self, genre_id: Uuid) -> AppResult<Vec<Film>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT DISTINCT film_id FROM film_genres WHERE genre_id = $1")
                .bind(genre_id)
                .fetch_all(&self.pool)
                .await?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.load_films(Some(&ids)).await
    }

    async fn user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT id, email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let preference_rows: Vec<PreferenceRow> = sqlx::query_as(
            "SELECT genre_id, actor_id, preference_score FROM user_preferences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(User {
            id: row.id,
            email: row.email,
            preferences: preference_rows
                .into_iter()
                .map(|p| Preference {
                    genre_id: p.genre_id,
                    actor_id: p.actor_id,
                    preference_score: p.preference_score,
                })
                .collect(),
        }))
    }

    async fn watch_history_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<WatchHistoryEntry>> {
        let rows: Vec<WatchHistoryRow> = sqlx::query_as(
            "SELECT user_id, film_id, watch_date, watch_duration_secs, watch_progress \
             FROM watch_history WHERE watch_date >= $1",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn watched_film_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        let ids: Vec<Uuid> =
            sqlx::query_scalar("SELECT DISTINCT film_id FROM watch_history WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().collect())
    }
}
