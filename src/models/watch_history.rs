use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One viewing session; the history collection is append-only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchHistoryEntry {
    pub user_id: Uuid,
    pub film_id: Uuid,
    pub watch_date: DateTime<Utc>,
    pub watch_duration_secs: i64,
    /// Percentage of the film watched, 0-100
    pub watch_progress: f64,
}

impl WatchHistoryEntry {
    /// Whether the session reached the end of the film
    pub fn is_complete(&self) -> bool {
        self.watch_progress >= 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(progress: f64) -> WatchHistoryEntry {
        WatchHistoryEntry {
            user_id: Uuid::new_v4(),
            film_id: Uuid::new_v4(),
            watch_date: Utc::now(),
            watch_duration_secs: 3600,
            watch_progress: progress,
        }
    }

    #[test]
    fn test_complete_session() {
        assert!(session(100.0).is_complete());
        assert!(!session(99.9).is_complete());
        assert!(!session(0.0).is_complete());
    }
}
