//! Showtime model

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::not_blank;

/// Snapshot of the movie that owns a showtime, taken by the read that
/// loaded the showtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRef {
    pub id: i64,
    pub title: String,
}

impl MovieRef {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }
}

/// A scheduled screening of a movie in a theater.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Showtime {
    pub id: i64,
    /// Owning movie; absent only for showtimes built without their owner
    pub movie: Option<MovieRef>,
    pub show_date_time: NaiveDateTime,
    pub theater: String,
    pub available_seats: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Showtime {
    /// Create a showtime owned by `movie`.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    #[cfg(test)]
    pub fn new(
        movie: MovieRef,
        show_date_time: NaiveDateTime,
        theater: impl Into<String>,
        available_seats: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            movie: Some(movie),
            show_date_time,
            theater: theater.into(),
            available_seats,
            created_at: now,
            updated_at: now,
        }
    }

    /// Calendar date of the screening
    pub fn show_date(&self) -> NaiveDate {
        self.show_date_time.date()
    }
}

/// Input for scheduling a showtime of a movie being inserted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewShowtime {
    pub show_date_time: NaiveDateTime,
    #[validate(
        custom(function = not_blank, message = "Theater cannot be blank"),
        length(max = 100, message = "Theater name must be at most 100 characters")
    )]
    pub theater: String,
    #[validate(range(min = 0, message = "Available seats cannot be negative"))]
    pub available_seats: i32,
}

/// Optional showtime filters, combined with AND. `None` matches any value.
///
/// Text values are matched exactly: no trimming and no case folding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowtimeFilter {
    pub movie_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub theater: Option<String>,
}

impl ShowtimeFilter {
    pub fn new(movie_id: Option<i64>, date: Option<NaiveDate>, theater: Option<String>) -> Self {
        Self {
            movie_id,
            date,
            theater,
        }
    }

    pub fn movie(mut self, movie_id: i64) -> Self {
        self.movie_id = Some(movie_id);
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn theater(mut self, theater: impl Into<String>) -> Self {
        self.theater = Some(theater.into());
        self
    }

    /// True when a showtime satisfies every supplied filter
    pub fn matches(&self, showtime: &Showtime) -> bool {
        let movie_ok = self
            .movie_id
            .map_or(true, |id| showtime.movie.as_ref().map(|m| m.id) == Some(id));
        let date_ok = self.date.map_or(true, |d| showtime.show_date() == d);
        let theater_ok = self
            .theater
            .as_ref()
            .map_or(true, |t| &showtime.theater == t);
        movie_ok && date_ok && theater_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn test_showtime_new() {
        let showtime = Showtime::new(MovieRef::new(1, "Inception"), at("2025-09-30 14:00:00"), "Theater 1", 100);

        assert_eq!(showtime.id, 0);
        assert_eq!(showtime.movie, Some(MovieRef::new(1, "Inception")));
        assert_eq!(showtime.show_date(), NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());
    }

    #[test]
    fn test_filter_builder() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 30).unwrap();
        let filter = ShowtimeFilter::default().movie(1).on(date).theater("Theater 1");

        assert_eq!(
            filter,
            ShowtimeFilter::new(Some(1), Some(date), Some("Theater 1".to_string()))
        );
    }

    #[test]
    fn test_filter_matches_date_ignoring_time_of_day() {
        let showtime = Showtime::new(MovieRef::new(1, "Inception"), at("2025-09-30 23:59:59"), "Theater 1", 100);

        let same_day = ShowtimeFilter::default().on(NaiveDate::from_ymd_opt(2025, 9, 30).unwrap());
        let next_day = ShowtimeFilter::default().on(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());

        assert!(same_day.matches(&showtime));
        assert!(!next_day.matches(&showtime));
    }

    #[test]
    fn test_filter_theater_is_exact() {
        let showtime = Showtime::new(MovieRef::new(1, "Inception"), at("2025-09-30 14:00:00"), "Theater 1", 100);

        assert!(ShowtimeFilter::default().theater("Theater 1").matches(&showtime));
        assert!(!ShowtimeFilter::default().theater("theater 1").matches(&showtime));
        assert!(!ShowtimeFilter::default().theater(" Theater 1").matches(&showtime));
        assert!(!ShowtimeFilter::default().theater("").matches(&showtime));
        assert!(!ShowtimeFilter::default().movie(2).matches(&showtime));
    }

    #[test]
    fn test_long_theater_name_is_rejected() {
        let input = NewShowtime {
            show_date_time: at("2025-09-30 14:00:00"),
            theater: "T".repeat(101),
            available_seats: 10,
        };

        assert!(input.validate().is_err());

        let input = NewShowtime {
            theater: "T".repeat(100),
            ..input
        };
        assert!(input.validate().is_ok());
    }
}
