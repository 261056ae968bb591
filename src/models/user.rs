use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An explicit taste signal: a genre or an actor with a strength in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preference {
    pub genre_id: Option<Uuid>,
    pub actor_id: Option<Uuid>,
    pub preference_score: f64,
}

/// A platform user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub preferences: Vec<Preference>,
}

impl User {
    /// Genre ids the user has expressed a preference for
    pub fn preferred_genres(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.preferences.iter().filter_map(|p| p.genre_id)
    }

    /// Actor ids the user has expressed a preference for
    pub fn preferred_actors(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.preferences.iter().filter_map(|p| p.actor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_ids_split_by_kind() {
        let genre_id = Uuid::new_v4();
        let actor_id = Uuid::new_v4();
        let user = User {
            id: Uuid::new_v4(),
            email: "viewer@example.com".to_string(),
            preferences: vec![
                Preference {
                    genre_id: Some(genre_id),
                    actor_id: None,
                    preference_score: 0.9,
                },
                Preference {
                    genre_id: None,
                    actor_id: Some(actor_id),
                    preference_score: 0.4,
                },
            ],
        };

        assert_eq!(user.preferred_genres().collect::<Vec<_>>(), vec![genre_id]);
        assert_eq!(user.preferred_actors().collect::<Vec<_>>(), vec![actor_id]);
    }
}
