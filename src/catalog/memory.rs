use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CatalogStore;
use crate::error::AppResult;
use crate::models::{Film, User, WatchHistoryEntry};

/// In-memory catalog store
///
/// Backs tests and local fixtures. Writers exist only here; the engine still
/// sees the same read-only `CatalogStore` surface as in production.
#[derive(Default)]
pub struct InMemoryCatalog {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    films: HashMap<Uuid, Film>,
    users: HashMap<Uuid, User>,
    watch_history: Vec<WatchHistoryEntry>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_film(&self, film: Film) {
        self.inner.write().await.films.insert(film.id, film);
    }

    pub async fn add_user(&self, user: User) {
        self.inner.write().await.users.insert(user.id, user);
    }

    pub async fn add_session(&self, entry: WatchHistoryEntry) {
        self.inner.write().await.watch_history.push(entry);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn film(&self, film_id: Uuid) -> AppResult<Option<Film>> {
        Ok(self.inner.read().await.films.get(&film_id).cloned())
    }

    async fn films(&self) -> AppResult<Vec<Film>> {
        Ok(self.inner.read().await.films.values().cloned().collect())
    }

    async fn films_in_genre(&self, genre_id: Uuid) -> AppResult<Vec<Film>> {
        Ok(self
            .inner
            .read()
            .await
            .films
            .values()
            .filter(|film| film.has_genre(genre_id))
            .cloned()
            .collect())
    }

    async fn user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    async fn watch_history_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> AppResult<Vec<WatchHistoryEntry>> {
        Ok(self
            .inner
            .read()
            .await
            .watch_history
            .iter()
            .filter(|entry| entry.watch_date >= cutoff)
            .cloned()
            .collect())
    }

    async fn watched_film_ids(&self, user_id: Uuid) -> AppResult<HashSet<Uuid>> {
        Ok(self
            .inner
            .read()
            .await
            .watch_history
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.film_id)
            .collect())
    }
}
