//! Movie service
//!
//! Lists movies by optional genre/language and resolves the detail view of a
//! single movie with its showtimes.

use crate::db::repositories::MovieRepository;
use crate::models::{MovieDetail, MovieFilter, MovieSummary};
use crate::services::mapper::{self, MappingError};
use anyhow::Context;
use std::sync::Arc;

/// Error types for movie service operations
#[derive(Debug, thiserror::Error)]
pub enum MovieServiceError {
    /// No movie with the requested id
    #[error("Movie not found with ID: {0}")]
    NotFound(i64),

    /// A loaded record could not be converted to its response form
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Read-only movie queries
pub struct MovieService {
    repo: Arc<dyn MovieRepository>,
}

impl MovieService {
    pub fn new(repo: Arc<dyn MovieRepository>) -> Self {
        Self { repo }
    }

    /// List movies matching every supplied filter.
    ///
    /// Filter values are used exactly as given; an empty string is a value,
    /// not a wildcard.
    pub async fn list_movies(&self, filter: &MovieFilter) -> Result<Vec<MovieSummary>, MovieServiceError> {
        tracing::info!(
            "Fetching movies with filters - genre: {:?}, language: {:?}",
            filter.genre,
            filter.language
        );

        let movies = self
            .repo
            .find_with_filters(filter)
            .await
            .context("Failed to list movies")?;

        tracing::info!("Found {} movies", movies.len());
        Ok(mapper::to_movie_summaries(&movies))
    }

    /// Get a movie and all of its showtimes.
    ///
    /// # Errors
    /// - `NotFound` if no movie has this id
    pub async fn get_movie_detail(&self, id: i64) -> Result<MovieDetail, MovieServiceError> {
        tracing::info!("Fetching movie details for ID: {}", id);

        let movie = self
            .repo
            .find_by_id_with_showtimes(id)
            .await
            .context("Failed to get movie")?;

        let Some(detail) = mapper::to_movie_detail(movie.as_ref())? else {
            tracing::warn!("Movie not found with ID: {}", id);
            return Err(MovieServiceError::NotFound(id));
        };

        tracing::info!(
            "Found movie: {} with {} showtimes",
            detail.title,
            detail.showtimes.as_ref().map_or(0, Vec::len)
        );
        Ok(detail)
    }
}
