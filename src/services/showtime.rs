//! Showtime service

use crate::db::repositories::ShowtimeRepository;
use crate::models::{ShowtimeFilter, ShowtimeSummary};
use crate::services::mapper::{self, MappingError};
use anyhow::Context;
use std::sync::Arc;

/// Error types for showtime service operations
#[derive(Debug, thiserror::Error)]
pub enum ShowtimeServiceError {
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Read-only showtime queries
pub struct ShowtimeService {
    repo: Arc<dyn ShowtimeRepository>,
}

impl ShowtimeService {
    pub fn new(repo: Arc<dyn ShowtimeRepository>) -> Self {
        Self { repo }
    }

    /// List showtimes matching every supplied filter.
    ///
    /// Values are not normalized: ids that cannot exist, dates in the past
    /// and blank theater names are queried as given.
    pub async fn list_showtimes(
        &self,
        filter: &ShowtimeFilter,
    ) -> Result<Vec<ShowtimeSummary>, ShowtimeServiceError> {
        tracing::info!(
            "Fetching showtimes with filters - movieId: {:?}, date: {:?}, theater: {:?}",
            filter.movie_id,
            filter.date,
            filter.theater
        );

        let showtimes = self
            .repo
            .find_with_filters(filter)
            .await
            .context("Failed to list showtimes")?;

        tracing::info!("Found {} showtimes", showtimes.len());
        Ok(mapper::to_showtime_summaries(&showtimes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{MovieRepository, SqlxMovieRepository, SqlxShowtimeRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{NewMovie, NewShowtime, Showtime};
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    async fn setup_test_service() -> (i64, ShowtimeService) {
        let pool = create_test_pool()
            .await
            .expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let movie_id = SqlxMovieRepository::new(pool.clone())
            .create(
                &NewMovie::new("Inception")
                    .with_showtime(NewShowtime {
                        show_date_time: at("2025-09-30T14:00:00"),
                        theater: "Theater 1".to_string(),
                        available_seats: 100,
                    })
                    .with_showtime(NewShowtime {
                        show_date_time: at("2025-10-01T14:00:00"),
                        theater: "Theater 1".to_string(),
                        available_seats: 0,
                    }),
            )
            .await
            .expect("Failed to create movie")
            .id;

        let service = ShowtimeService::new(SqlxShowtimeRepository::boxed(pool));
        (movie_id, service)
    }

    struct UnavailableRepository;

    #[async_trait]
    impl ShowtimeRepository for UnavailableRepository {
        async fn find_with_filters(&self, _: &ShowtimeFilter) -> anyhow::Result<Vec<Showtime>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    #[tokio::test]
    async fn test_list_showtimes_with_all_filters() {
        let (movie_id, service) = setup_test_service().await;

        let showtimes = service
            .list_showtimes(&ShowtimeFilter::new(
                Some(movie_id),
                NaiveDate::from_ymd_opt(2025, 9, 30),
                Some("Theater 1".to_string()),
            ))
            .await
            .unwrap();

        assert_eq!(showtimes.len(), 1);
        assert_eq!(showtimes[0].movie_id, movie_id);
        assert_eq!(showtimes[0].movie_title, "Inception");
        assert_eq!(showtimes[0].show_date_time, at("2025-09-30T14:00:00"));
        assert_eq!(showtimes[0].available_seats, 100);
    }

    #[tokio::test]
    async fn test_list_showtimes_without_filters() {
        let (_, service) = setup_test_service().await;

        let showtimes = service.list_showtimes(&ShowtimeFilter::default()).await.unwrap();

        assert_eq!(showtimes.len(), 2);
    }

    #[tokio::test]
    async fn test_list_showtimes_edge_values_pass_through() {
        let (_, service) = setup_test_service().await;

        let filters = [
            ShowtimeFilter::default().movie(0),
            ShowtimeFilter::default().movie(-1),
            ShowtimeFilter::default().on(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            ShowtimeFilter::default().on(NaiveDate::from_ymd_opt(2999, 12, 31).unwrap()),
            ShowtimeFilter::default().theater(""),
            ShowtimeFilter::default().theater("   "),
        ];
        for filter in filters {
            assert!(service.list_showtimes(&filter).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_list_showtimes_store_failure_is_internal() {
        let service = ShowtimeService::new(Arc::new(UnavailableRepository));

        let err = service.list_showtimes(&ShowtimeFilter::default()).await.unwrap_err();

        assert!(matches!(err, ShowtimeServiceError::InternalError(_)));
    }
}
