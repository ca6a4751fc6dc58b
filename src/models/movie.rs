//! Movie model
//!
//! A movie owns zero or more showtimes. Every descriptive attribute except the
//! title may be missing, and the showtime collection distinguishes "not
//! loaded" (`None`) from "loaded, none scheduled" (`Some(vec![])`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::showtime::{NewShowtime, Showtime};
use super::validation::not_blank;

/// Movie entity as stored in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    /// Unique identifier, assigned by the store
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Running time in minutes
    pub duration_minutes: Option<i32>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Showtimes, when they were loaded together with the movie
    pub showtimes: Option<Vec<Showtime>>,
}

#[cfg(test)]
impl Movie {
    /// Create a movie with only a title set.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title: title.into(),
            description: None,
            duration_minutes: None,
            genre: None,
            language: None,
            release_date: None,
            created_at: now,
            updated_at: now,
            showtimes: None,
        }
    }
}

/// Input for inserting a movie together with its initial showtimes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct NewMovie {
    #[validate(custom(function = not_blank, message = "Title cannot be blank"))]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    #[validate(range(min = 1, message = "Duration must be positive"))]
    pub duration_minutes: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub showtimes: Vec<NewShowtime>,
}

#[cfg(test)]
impl NewMovie {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_showtime(mut self, showtime: NewShowtime) -> Self {
        self.showtimes.push(showtime);
        self
    }
}

/// Optional movie filters. `None` matches any value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieFilter {
    pub genre: Option<String>,
    pub language: Option<String>,
}

impl MovieFilter {
    pub fn new(genre: Option<String>, language: Option<String>) -> Self {
        Self { genre, language }
    }

    /// True when a movie satisfies every supplied filter
    pub fn matches(&self, movie: &Movie) -> bool {
        let genre_ok = self
            .genre
            .as_ref()
            .map_or(true, |g| movie.genre.as_ref() == Some(g));
        let language_ok = self
            .language
            .as_ref()
            .map_or(true, |l| movie.language.as_ref() == Some(l));
        genre_ok && language_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::field_violations;
    use chrono::NaiveDateTime;

    fn showtime_input(theater: &str, seats: i32) -> NewShowtime {
        NewShowtime {
            show_date_time: NaiveDateTime::parse_from_str("2025-09-30 14:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            theater: theater.to_string(),
            available_seats: seats,
        }
    }

    #[test]
    fn test_movie_new_leaves_attributes_absent() {
        let movie = Movie::new("Inception");

        assert_eq!(movie.id, 0);
        assert_eq!(movie.title, "Inception");
        assert!(movie.genre.is_none());
        assert!(movie.showtimes.is_none());
        assert_eq!(movie.created_at, movie.updated_at);
    }

    #[test]
    fn test_filter_matches() {
        let mut movie = Movie::new("Inception");
        movie.genre = Some("Sci-Fi".to_string());
        movie.language = Some("English".to_string());

        assert!(MovieFilter::default().matches(&movie));
        assert!(MovieFilter::new(Some("Sci-Fi".into()), None).matches(&movie));
        assert!(MovieFilter::new(Some("Sci-Fi".into()), Some("English".into())).matches(&movie));
        assert!(!MovieFilter::new(Some("Sci-Fi".into()), Some("French".into())).matches(&movie));
        assert!(!MovieFilter::new(Some("sci-fi".into()), None).matches(&movie));
        assert!(!MovieFilter::new(Some(String::new()), None).matches(&movie));
    }

    #[test]
    fn test_valid_new_movie() {
        let input = NewMovie::new("Inception")
            .with_genre("Sci-Fi")
            .with_showtime(showtime_input("Theater 1", 0));

        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let input = NewMovie::new("   ");

        let violations = field_violations(&input.validate().unwrap_err());

        assert_eq!(violations.get("title").map(String::as_str), Some("Title cannot be blank"));
    }

    #[test]
    fn test_non_positive_duration_is_rejected() {
        let mut input = NewMovie::new("Inception");
        input.duration_minutes = Some(0);

        let violations = field_violations(&input.validate().unwrap_err());

        assert_eq!(
            violations.get("duration_minutes").map(String::as_str),
            Some("Duration must be positive")
        );
    }

    #[test]
    fn test_nested_showtime_violations_are_reported_with_index() {
        let input = NewMovie::new("Inception")
            .with_showtime(showtime_input("Theater 1", 10))
            .with_showtime(showtime_input("", -1));

        let violations = field_violations(&input.validate().unwrap_err());

        assert_eq!(
            violations.get("showtimes[1].theater").map(String::as_str),
            Some("Theater cannot be blank")
        );
        assert_eq!(
            violations.get("showtimes[1].available_seats").map(String::as_str),
            Some("Available seats cannot be negative")
        );
        assert!(!violations.keys().any(|k| k.starts_with("showtimes[0]")));
    }
}
