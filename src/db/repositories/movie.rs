//! Movie repository
//!
//! This module provides:
//! - `MovieRepository` trait defining the interface for movie data access
//! - `SqlxMovieRepository` implementing the trait for SQLite and MySQL
//!
//! Filtered listings are built with `QueryBuilder`: every present filter adds
//! one `AND` clause, absent filters add nothing.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql_pool, sqlite_pool};
use crate::db::DynDatabasePool;
use crate::models::{Movie, MovieFilter, MovieRef, NewMovie, Showtime};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{mysql::MySqlRow, sqlite::SqliteRow, MySql, MySqlPool, QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Movie repository trait
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// List movies matching every present filter, ordered by id
    async fn find_with_filters(&self, filter: &MovieFilter) -> Result<Vec<Movie>>;

    /// Get a movie together with all of its showtimes in one read.
    ///
    /// The returned movie always carries `Some` showtimes, empty when none
    /// are scheduled.
    async fn find_by_id_with_showtimes(&self, id: i64) -> Result<Option<Movie>>;

    /// Insert movies and their showtimes in one transaction.
    ///
    /// Either every movie is stored or, on error, none is.
    async fn create_many(&self, inputs: &[NewMovie]) -> Result<Vec<Movie>>;

    /// Insert a movie and its showtimes atomically
    async fn create(&self, input: &NewMovie) -> Result<Movie> {
        self.create_many(std::slice::from_ref(input))
            .await?
            .pop()
            .context("Insert returned no movie")
    }

    /// Number of movies in the catalog
    async fn count(&self) -> Result<i64>;
}

/// SQLx-based movie repository implementation
///
/// Supports both SQLite and MySQL databases.
pub struct SqlxMovieRepository {
    pool: DynDatabasePool,
}

impl SqlxMovieRepository {
    /// Create a new SQLx movie repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn MovieRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl MovieRepository for SqlxMovieRepository {
    async fn find_with_filters(&self, filter: &MovieFilter) -> Result<Vec<Movie>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_movies_sqlite(sqlite_pool(&self.pool)?, filter).await,
            DatabaseDriver::Mysql => find_movies_mysql(mysql_pool(&self.pool)?, filter).await,
        }
    }

    async fn find_by_id_with_showtimes(&self, id: i64) -> Result<Option<Movie>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                find_movie_with_showtimes_sqlite(sqlite_pool(&self.pool)?, id).await
            }
            DatabaseDriver::Mysql => {
                find_movie_with_showtimes_mysql(mysql_pool(&self.pool)?, id).await
            }
        }
    }

    async fn create_many(&self, inputs: &[NewMovie]) -> Result<Vec<Movie>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_movies_sqlite(sqlite_pool(&self.pool)?, inputs).await,
            DatabaseDriver::Mysql => create_movies_mysql(mysql_pool(&self.pool)?, inputs).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_movies_sqlite(sqlite_pool(&self.pool)?).await,
            DatabaseDriver::Mysql => count_movies_mysql(mysql_pool(&self.pool)?).await,
        }
    }
}

const SELECT_MOVIES: &str = r#"
    SELECT id, title, description, duration_minutes, genre, language, release_date,
           created_at, updated_at
    FROM movies
    WHERE 1=1"#;

const SELECT_MOVIE_WITH_SHOWTIMES: &str = r#"
    SELECT m.id, m.title, m.description, m.duration_minutes, m.genre, m.language,
           m.release_date, m.created_at, m.updated_at,
           s.id AS showtime_id, s.show_date_time, s.theater, s.available_seats,
           s.created_at AS showtime_created_at, s.updated_at AS showtime_updated_at
    FROM movies m
    LEFT JOIN showtimes s ON s.movie_id = m.id
    WHERE m.id = ?
    ORDER BY s.id"#;

const INSERT_MOVIE: &str = r#"
    INSERT INTO movies (title, description, duration_minutes, genre, language, release_date,
                        created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#;

const INSERT_SHOWTIME: &str = r#"
    INSERT INTO showtimes (movie_id, show_date_time, theater, available_seats, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?)"#;

/// Build the movie a fresh insert produced, showtime ids in insertion order
fn inserted_movie(id: i64, input: &NewMovie, showtime_ids: Vec<i64>, now: DateTime<Utc>) -> Movie {
    let owner = MovieRef::new(id, input.title.clone());
    let showtimes = input
        .showtimes
        .iter()
        .zip(showtime_ids)
        .map(|(s, showtime_id)| Showtime {
            id: showtime_id,
            movie: Some(owner.clone()),
            show_date_time: s.show_date_time,
            theater: s.theater.clone(),
            available_seats: s.available_seats,
            created_at: now,
            updated_at: now,
        })
        .collect();

    Movie {
        id,
        title: input.title.clone(),
        description: input.description.clone(),
        duration_minutes: input.duration_minutes,
        genre: input.genre.clone(),
        language: input.language.clone(),
        release_date: input.release_date,
        created_at: now,
        updated_at: now,
        showtimes: Some(showtimes),
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn find_movies_sqlite(pool: &SqlitePool, filter: &MovieFilter) -> Result<Vec<Movie>> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_MOVIES);
    if let Some(genre) = &filter.genre {
        query.push(" AND genre = ").push_bind(genre.clone());
    }
    if let Some(language) = &filter.language {
        query.push(" AND language = ").push_bind(language.clone());
    }
    query.push(" ORDER BY id");

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list movies")?;

    rows.iter().map(row_to_movie_sqlite).collect()
}

async fn find_movie_with_showtimes_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Movie>> {
    let rows = sqlx::query(SELECT_MOVIE_WITH_SHOWTIMES)
        .bind(id)
        .fetch_all(pool)
        .await
        .context("Failed to get movie with showtimes")?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut movie = row_to_movie_sqlite(first)?;
    let owner = MovieRef::new(movie.id, movie.title.clone());
    let mut showtimes = Vec::new();
    for row in &rows {
        let showtime_id: Option<i64> = row.try_get("showtime_id")?;
        if let Some(showtime_id) = showtime_id {
            showtimes.push(Showtime {
                id: showtime_id,
                movie: Some(owner.clone()),
                show_date_time: row.try_get("show_date_time")?,
                theater: row.try_get("theater")?,
                available_seats: row.try_get("available_seats")?,
                created_at: row.try_get("showtime_created_at")?,
                updated_at: row.try_get("showtime_updated_at")?,
            });
        }
    }
    movie.showtimes = Some(showtimes);

    Ok(Some(movie))
}

async fn create_movies_sqlite(pool: &SqlitePool, inputs: &[NewMovie]) -> Result<Vec<Movie>> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let mut created = Vec::with_capacity(inputs.len());
    for input in inputs {
        let movie_id = sqlx::query(INSERT_MOVIE)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration_minutes)
            .bind(&input.genre)
            .bind(&input.language)
            .bind(input.release_date)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to create movie '{}'", input.title))?
            .last_insert_rowid();

        let mut showtime_ids = Vec::with_capacity(input.showtimes.len());
        for showtime in &input.showtimes {
            let showtime_id = sqlx::query(INSERT_SHOWTIME)
                .bind(movie_id)
                .bind(showtime.show_date_time)
                .bind(&showtime.theater)
                .bind(showtime.available_seats)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .context("Failed to create showtime")?
                .last_insert_rowid();
            showtime_ids.push(showtime_id);
        }

        created.push(inserted_movie(movie_id, input, showtime_ids, now));
    }

    tx.commit().await.context("Failed to commit movies")?;

    Ok(created)
}

async fn count_movies_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM movies")
        .fetch_one(pool)
        .await
        .context("Failed to count movies")?;
    Ok(row.get("count"))
}

fn row_to_movie_sqlite(row: &SqliteRow) -> Result<Movie> {
    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        duration_minutes: row.try_get("duration_minutes")?,
        genre: row.try_get("genre")?,
        language: row.try_get("language")?,
        release_date: row.try_get("release_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        showtimes: None,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn find_movies_mysql(pool: &MySqlPool, filter: &MovieFilter) -> Result<Vec<Movie>> {
    let mut query = QueryBuilder::<MySql>::new(SELECT_MOVIES);
    if let Some(genre) = &filter.genre {
        query.push(" AND genre = ").push_bind(genre.clone());
    }
    if let Some(language) = &filter.language {
        query.push(" AND language = ").push_bind(language.clone());
    }
    query.push(" ORDER BY id");

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list movies")?;

    rows.iter().map(row_to_movie_mysql).collect()
}

async fn find_movie_with_showtimes_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Movie>> {
    let rows = sqlx::query(SELECT_MOVIE_WITH_SHOWTIMES)
        .bind(id)
        .fetch_all(pool)
        .await
        .context("Failed to get movie with showtimes")?;

    let Some(first) = rows.first() else {
        return Ok(None);
    };

    let mut movie = row_to_movie_mysql(first)?;
    let owner = MovieRef::new(movie.id, movie.title.clone());
    let mut showtimes = Vec::new();
    for row in &rows {
        let showtime_id: Option<i64> = row.try_get("showtime_id")?;
        if let Some(showtime_id) = showtime_id {
            showtimes.push(Showtime {
                id: showtime_id,
                movie: Some(owner.clone()),
                show_date_time: row.try_get("show_date_time")?,
                theater: row.try_get("theater")?,
                available_seats: row.try_get("available_seats")?,
                created_at: row.try_get("showtime_created_at")?,
                updated_at: row.try_get("showtime_updated_at")?,
            });
        }
    }
    movie.showtimes = Some(showtimes);

    Ok(Some(movie))
}

async fn create_movies_mysql(pool: &MySqlPool, inputs: &[NewMovie]) -> Result<Vec<Movie>> {
    let now = Utc::now();
    let mut tx = pool.begin().await.context("Failed to begin transaction")?;

    let mut created = Vec::with_capacity(inputs.len());
    for input in inputs {
        let result = sqlx::query(INSERT_MOVIE)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.duration_minutes)
            .bind(&input.genre)
            .bind(&input.language)
            .bind(input.release_date)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to create movie '{}'", input.title))?;
        let movie_id = i64::try_from(result.last_insert_id()).context("Movie id out of range")?;

        let mut showtime_ids = Vec::with_capacity(input.showtimes.len());
        for showtime in &input.showtimes {
            let result = sqlx::query(INSERT_SHOWTIME)
                .bind(movie_id)
                .bind(showtime.show_date_time)
                .bind(&showtime.theater)
                .bind(showtime.available_seats)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .context("Failed to create showtime")?;
            showtime_ids.push(i64::try_from(result.last_insert_id()).context("Showtime id out of range")?);
        }

        created.push(inserted_movie(movie_id, input, showtime_ids, now));
    }

    tx.commit().await.context("Failed to commit movies")?;

    Ok(created)
}

async fn count_movies_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM movies")
        .fetch_one(pool)
        .await
        .context("Failed to count movies")?;
    Ok(row.get("count"))
}

fn row_to_movie_mysql(row: &MySqlRow) -> Result<Movie> {
    Ok(Movie {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        duration_minutes: row.try_get("duration_minutes")?,
        genre: row.try_get("genre")?,
        language: row.try_get("language")?,
        release_date: row.try_get("release_date")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        showtimes: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::models::NewShowtime;
    use chrono::{NaiveDate, NaiveDateTime};

    async fn setup_test_repo() -> SqlxMovieRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxMovieRepository::new(pool)
    }

    fn showtime(at: &str, theater: &str, seats: i32) -> NewShowtime {
        NewShowtime {
            show_date_time: NaiveDateTime::parse_from_str(at, "%Y-%m-%dT%H:%M:%S").unwrap(),
            theater: theater.to_string(),
            available_seats: seats,
        }
    }

    fn movie(title: &str, genre: Option<&str>, language: Option<&str>) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            genre: genre.map(str::to_string),
            language: language.map(str::to_string),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch_with_showtimes() {
        let repo = setup_test_repo().await;

        let input = NewMovie {
            title: "Inception".to_string(),
            description: Some("A thief who steals corporate secrets".to_string()),
            duration_minutes: Some(148),
            genre: Some("Sci-Fi".to_string()),
            language: Some("English".to_string()),
            release_date: NaiveDate::from_ymd_opt(2010, 7, 16),
            showtimes: vec![
                showtime("2025-09-30T14:00:00", "Theater 1", 100),
                showtime("2025-09-30T19:30:00", "Theater 2", 80),
            ],
        };
        let created = repo.create(&input).await.expect("Failed to create movie");

        let found = repo
            .find_by_id_with_showtimes(created.id)
            .await
            .expect("Failed to get movie")
            .expect("Movie should exist");

        assert_eq!(found.title, "Inception");
        assert_eq!(found.duration_minutes, Some(148));
        assert_eq!(found.release_date, NaiveDate::from_ymd_opt(2010, 7, 16));

        let showtimes = found.showtimes.expect("Showtimes should be loaded");
        assert_eq!(showtimes.len(), 2);
        assert_eq!(showtimes[0].theater, "Theater 1");
        assert_eq!(showtimes[0].available_seats, 100);
        assert_eq!(
            showtimes[0].show_date_time,
            NaiveDateTime::parse_from_str("2025-09-30T14:00:00", "%Y-%m-%dT%H:%M:%S").unwrap()
        );
        for s in &showtimes {
            assert_eq!(s.movie, Some(MovieRef::new(created.id, "Inception")));
        }
        assert_eq!(created.showtimes.unwrap().iter().map(|s| s.id).collect::<Vec<_>>(),
            showtimes.iter().map(|s| s.id).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_movie_without_showtimes_has_empty_collection() {
        let repo = setup_test_repo().await;
        let created = repo.create(&NewMovie::new("Solaris")).await.unwrap();

        let found = repo.find_by_id_with_showtimes(created.id).await.unwrap().unwrap();

        assert_eq!(found.showtimes, Some(vec![]));
        assert!(found.genre.is_none());
        assert!(found.release_date.is_none());
    }

    #[tokio::test]
    async fn test_missing_movie_is_none() {
        let repo = setup_test_repo().await;
        repo.create(&NewMovie::new("Inception")).await.unwrap();

        for id in [0, -1, 999, i64::MAX] {
            assert!(repo.find_by_id_with_showtimes(id).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn test_find_with_filters_is_conjunctive() {
        let repo = setup_test_repo().await;
        let inception = repo.create(&movie("Inception", Some("Sci-Fi"), Some("English"))).await.unwrap();
        let amelie = repo.create(&movie("Amelie", Some("Comedy"), Some("French"))).await.unwrap();
        let arrival = repo.create(&movie("Arrival", Some("Sci-Fi"), Some("French"))).await.unwrap();
        let untitled = repo.create(&movie("Untitled", None, None)).await.unwrap();

        let ids = |movies: Vec<Movie>| movies.into_iter().map(|m| m.id).collect::<Vec<_>>();

        let all = repo.find_with_filters(&MovieFilter::default()).await.unwrap();
        assert_eq!(ids(all), vec![inception.id, amelie.id, arrival.id, untitled.id]);

        let sci_fi = repo
            .find_with_filters(&MovieFilter::new(Some("Sci-Fi".into()), None))
            .await
            .unwrap();
        assert_eq!(ids(sci_fi), vec![inception.id, arrival.id]);

        let french = repo
            .find_with_filters(&MovieFilter::new(None, Some("French".into())))
            .await
            .unwrap();
        assert_eq!(ids(french), vec![amelie.id, arrival.id]);

        let both = repo
            .find_with_filters(&MovieFilter::new(Some("Sci-Fi".into()), Some("French".into())))
            .await
            .unwrap();
        assert_eq!(ids(both), vec![arrival.id]);

        let listed = repo.find_with_filters(&MovieFilter::default()).await.unwrap();
        assert!(listed.iter().all(|m| m.showtimes.is_none()));
    }

    #[tokio::test]
    async fn test_empty_and_blank_filters_are_literal() {
        let repo = setup_test_repo().await;
        repo.create(&movie("Inception", Some("Sci-Fi"), Some("English"))).await.unwrap();

        for value in ["", "   ", "sci-fi", "Sci-Fi "] {
            let movies = repo
                .find_with_filters(&MovieFilter::new(Some(value.to_string()), None))
                .await
                .unwrap();
            assert!(movies.is_empty(), "genre {:?} should match nothing", value);
        }
    }

    #[tokio::test]
    async fn test_create_many_in_order() {
        let repo = setup_test_repo().await;

        let created = repo
            .create_many(&[
                movie("Inception", Some("Sci-Fi"), None),
                NewMovie {
                    showtimes: vec![showtime("2025-09-30T17:00:00", "Theater 3", 60)],
                    ..movie("Arrival", Some("Sci-Fi"), None)
                },
            ])
            .await
            .unwrap();

        assert_eq!(created.iter().map(|m| m.title.as_str()).collect::<Vec<_>>(), vec!["Inception", "Arrival"]);
        assert!(created[0].id < created[1].id);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_create_many_rolls_back_on_failure() {
        let repo = setup_test_repo().await;
        let sqlite = sqlite_pool(&repo.pool).unwrap();
        sqlx::query(
            "CREATE TRIGGER reject_arrival BEFORE INSERT ON movies WHEN NEW.title = 'Arrival' \
             BEGIN SELECT RAISE(ABORT, 'store unavailable'); END",
        )
        .execute(sqlite)
        .await
        .unwrap();

        let result = repo
            .create_many(&[
                movie("Inception", None, None).with_showtime(showtime("2025-09-30T14:00:00", "Theater 1", 100)),
                movie("Arrival", None, None),
                movie("Amelie", None, None),
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(repo.count().await.unwrap(), 0);
        let showtimes: i64 = sqlx::query("SELECT COUNT(*) AS n FROM showtimes")
            .fetch_one(sqlite)
            .await
            .unwrap()
            .get("n");
        assert_eq!(showtimes, 0);
    }

    #[tokio::test]
    async fn test_count() {
        let repo = setup_test_repo().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        repo.create(&NewMovie::new("Inception")).await.unwrap();
        repo.create(&NewMovie::new("Arrival")).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
    }

    // ============================================================================
    // Property tests
    // ============================================================================

    use proptest::prelude::*;

    fn attribute() -> impl Strategy<Value = Option<&'static str>> {
        proptest::option::of(prop_oneof![Just("Drama"), Just("English"), Just("")])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Listing returns exactly the movies matching every present filter
        #[test]
        fn filters_are_conjunctive(
            catalog in proptest::collection::vec((attribute(), attribute()), 0..8),
            genre in attribute(),
            language in attribute(),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let repo = setup_test_repo().await;
                let mut created = Vec::new();
                for (i, (g, l)) in catalog.iter().enumerate() {
                    created.push(repo.create(&movie(&format!("Movie {}", i), *g, *l)).await.unwrap());
                }

                let filter = MovieFilter::new(genre.map(str::to_string), language.map(str::to_string));
                let expected: Vec<i64> = created.iter().filter(|m| filter.matches(m)).map(|m| m.id).collect();
                let actual: Vec<i64> = repo
                    .find_with_filters(&filter)
                    .await
                    .unwrap()
                    .iter()
                    .map(|m| m.id)
                    .collect();

                prop_assert_eq!(actual, expected);
                Ok(())
            })?;
        }
    }
}
