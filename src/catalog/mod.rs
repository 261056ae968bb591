//! Catalog store abstraction
//!
//! The recommendation engine only ever reads the catalog: films, users, and
//! viewing sessions. Keeping the access behind a trait allows multiple
//! backends (PostgreSQL in production, in-memory for tests and fixtures)
//! without the engine knowing which one it is talking to.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Film, User, WatchHistoryEntry},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryCatalog;
pub use postgres::PostgresCatalog;

/// Trait for read-only catalog backends
///
/// Scans return unsorted rows; ordering, grouping, and scoring are the
/// engine's job so that both backends share one aggregation code path.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a single film by id
    async fn film(&self, film_id: Uuid) -> AppResult<Option<Film>>;

    /// Scan the full film catalog
    async fn films(&self) -> AppResult<Vec<Film>>;

    /// Films whose genre list contains the given genre
    async fn films_in_genre(&self, genre_id: Uuid) -> AppResult<Vec<Film>>;

    /// Fetch a single user by id
    async fn user(&self, user_id: Uuid) -> AppResult<Option<User>>;

    /// Viewing sessions with a watch date at or after the cutoff
    async fn watch_history_since(&self, cutoff: DateTime<Utc>)
        -> AppResult<Vec<WatchHistoryEntry>>;

    /// Ids of every film the user has at least one viewing session for
    async fn watched_film_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>>;
}
