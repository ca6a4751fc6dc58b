//! Entity to response conversion
//!
//! Conversions are pure. The `Option` wrappers propagate absence: a missing
//! entity maps to a missing DTO, a missing list to a missing list, and a
//! missing list element stays missing at the same position.

use crate::models::{Movie, MovieDetail, MovieSummary, Showtime, ShowtimeSummary};

/// Raised when an entity lacks data its response form requires
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("Showtime {showtime_id} has no owning movie")]
    MissingMovie { showtime_id: i64 },
}

impl From<&Movie> for MovieSummary {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            duration_minutes: movie.duration_minutes,
            genre: movie.genre.clone(),
            language: movie.language.clone(),
            release_date: movie.release_date,
        }
    }
}

impl TryFrom<&Showtime> for ShowtimeSummary {
    type Error = MappingError;

    fn try_from(showtime: &Showtime) -> Result<Self, Self::Error> {
        let movie = showtime.movie.as_ref().ok_or(MappingError::MissingMovie {
            showtime_id: showtime.id,
        })?;
        Ok(Self {
            id: showtime.id,
            movie_id: movie.id,
            movie_title: movie.title.clone(),
            show_date_time: showtime.show_date_time,
            theater: showtime.theater.clone(),
            available_seats: showtime.available_seats,
        })
    }
}

impl TryFrom<&Movie> for MovieDetail {
    type Error = MappingError;

    fn try_from(movie: &Movie) -> Result<Self, Self::Error> {
        let showtimes = movie
            .showtimes
            .as_deref()
            .map(to_showtime_summaries)
            .transpose()?;
        Ok(Self {
            id: movie.id,
            title: movie.title.clone(),
            description: movie.description.clone(),
            duration_minutes: movie.duration_minutes,
            genre: movie.genre.clone(),
            language: movie.language.clone(),
            release_date: movie.release_date,
            showtimes,
        })
    }
}

pub fn to_movie_summary(movie: Option<&Movie>) -> Option<MovieSummary> {
    movie.map(MovieSummary::from)
}

pub fn to_movie_summary_list(movies: Option<&[Option<Movie>]>) -> Option<Vec<Option<MovieSummary>>> {
    movies.map(|movies| movies.iter().map(|m| to_movie_summary(m.as_ref())).collect())
}

pub fn to_movie_summaries(movies: &[Movie]) -> Vec<MovieSummary> {
    movies.iter().map(MovieSummary::from).collect()
}

pub fn to_movie_detail(movie: Option<&Movie>) -> Result<Option<MovieDetail>, MappingError> {
    movie.map(MovieDetail::try_from).transpose()
}

pub fn to_showtime_summary(showtime: Option<&Showtime>) -> Result<Option<ShowtimeSummary>, MappingError> {
    showtime.map(ShowtimeSummary::try_from).transpose()
}

pub fn to_showtime_summary_list(
    showtimes: Option<&[Option<Showtime>]>,
) -> Result<Option<Vec<Option<ShowtimeSummary>>>, MappingError> {
    showtimes
        .map(|showtimes| {
            showtimes
                .iter()
                .map(|s| to_showtime_summary(s.as_ref()))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
}

pub fn to_showtime_summaries(showtimes: &[Showtime]) -> Result<Vec<ShowtimeSummary>, MappingError> {
    showtimes.iter().map(ShowtimeSummary::try_from).collect()
}
