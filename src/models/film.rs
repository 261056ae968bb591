use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Embedded genre reference on a film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenreTag {
    pub genre_id: Uuid,
    pub genre_name: String,
}

/// Embedded cast credit on a film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CastMember {
    pub actor_id: Uuid,
    pub actor_name: String,
}

/// A film in the streaming catalog
///
/// Genre and cast identifiers are immutable once set; the view count only
/// ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Film {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub age_rating: String,
    pub genres: Vec<GenreTag>,
    pub cast: Vec<CastMember>,
    pub studio_id: Option<Uuid>,
    pub view_count: i64,
    /// Editorial ratings; the first entry drives genre recommendations
    pub internal_ratings: Vec<f64>,
}

impl Film {
    pub fn has_genre(&self, genre_id: Uuid) -> bool {
        self.genres.iter().any(|g| g.genre_id == genre_id)
    }

    /// First editorial rating, or 0 when the film has none
    pub fn internal_rating(&self) -> f64 {
        self.internal_ratings.first().copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film_with_ratings(ratings: Vec<f64>) -> Film {
        Film {
            id: Uuid::new_v4(),
            title: "Event Horizon".to_string(),
            description: "A rescue crew boards a derelict ship".to_string(),
            release_year: 1997,
            age_rating: "R".to_string(),
            genres: vec![GenreTag {
                genre_id: Uuid::new_v4(),
                genre_name: "Horror".to_string(),
            }],
            cast: vec![],
            studio_id: None,
            view_count: 0,
            internal_ratings: ratings,
        }
    }

    #[test]
    fn test_internal_rating_uses_first_entry() {
        let film = film_with_ratings(vec![4.2, 1.0]);
        assert_eq!(film.internal_rating(), 4.2);
    }

    #[test]
    fn test_internal_rating_defaults_to_zero() {
        let film = film_with_ratings(vec![]);
        assert_eq!(film.internal_rating(), 0.0);
    }

    #[test]
    fn test_has_genre() {
        let film = film_with_ratings(vec![]);
        let genre_id = film.genres[0].genre_id;
        assert!(film.has_genre(genre_id));
        assert!(!film.has_genre(Uuid::new_v4()));
    }
}
