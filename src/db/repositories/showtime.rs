//! Showtime repository
//!
//! Every showtime read joins its movie so the returned records carry the
//! owner's id and title.

use crate::config::DatabaseDriver;
use crate::db::pool::{mysql_pool, sqlite_pool};
use crate::db::DynDatabasePool;
use crate::models::{MovieRef, Showtime, ShowtimeFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{mysql::MySqlRow, sqlite::SqliteRow, MySql, MySqlPool, QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// Showtime repository trait
#[async_trait]
pub trait ShowtimeRepository: Send + Sync {
    /// List showtimes matching every present filter, ordered by id
    async fn find_with_filters(&self, filter: &ShowtimeFilter) -> Result<Vec<Showtime>>;

    async fn find_by_movie_and_date(&self, movie_id: i64, date: NaiveDate) -> Result<Vec<Showtime>> {
        self.find_with_filters(&ShowtimeFilter::default().movie(movie_id).on(date))
            .await
    }

    async fn find_by_movie_and_theater(&self, movie_id: i64, theater: &str) -> Result<Vec<Showtime>> {
        self.find_with_filters(&ShowtimeFilter::default().movie(movie_id).theater(theater))
            .await
    }

    async fn find_by_date_and_theater(&self, date: NaiveDate, theater: &str) -> Result<Vec<Showtime>> {
        self.find_with_filters(&ShowtimeFilter::default().on(date).theater(theater))
            .await
    }
}

/// SQLx-based showtime repository implementation
pub struct SqlxShowtimeRepository {
    pool: DynDatabasePool,
}

impl SqlxShowtimeRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ShowtimeRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ShowtimeRepository for SqlxShowtimeRepository {
    async fn find_with_filters(&self, filter: &ShowtimeFilter) -> Result<Vec<Showtime>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => find_showtimes_sqlite(sqlite_pool(&self.pool)?, filter).await,
            DatabaseDriver::Mysql => find_showtimes_mysql(mysql_pool(&self.pool)?, filter).await,
        }
    }
}

const SELECT_SHOWTIMES: &str = r#"
    SELECT s.id, s.movie_id, m.title AS movie_title, s.show_date_time, s.theater,
           s.available_seats, s.created_at, s.updated_at
    FROM showtimes s
    JOIN movies m ON m.id = s.movie_id
    WHERE 1=1"#;

// ============================================================================
// SQLite implementations
// ============================================================================

async fn find_showtimes_sqlite(pool: &SqlitePool, filter: &ShowtimeFilter) -> Result<Vec<Showtime>> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_SHOWTIMES);
    if let Some(movie_id) = filter.movie_id {
        query.push(" AND s.movie_id = ").push_bind(movie_id);
    }
    if let Some(date) = filter.date {
        query.push(" AND date(s.show_date_time) = ").push_bind(date);
    }
    if let Some(theater) = &filter.theater {
        query.push(" AND s.theater = ").push_bind(theater.clone());
    }
    query.push(" ORDER BY s.id");

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list showtimes")?;

    rows.iter().map(row_to_showtime_sqlite).collect()
}

fn row_to_showtime_sqlite(row: &SqliteRow) -> Result<Showtime> {
    Ok(Showtime {
        id: row.try_get("id")?,
        movie: Some(MovieRef {
            id: row.try_get("movie_id")?,
            title: row.try_get("movie_title")?,
        }),
        show_date_time: row.try_get("show_date_time")?,
        theater: row.try_get("theater")?,
        available_seats: row.try_get("available_seats")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn find_showtimes_mysql(pool: &MySqlPool, filter: &ShowtimeFilter) -> Result<Vec<Showtime>> {
    let mut query = QueryBuilder::<MySql>::new(SELECT_SHOWTIMES);
    if let Some(movie_id) = filter.movie_id {
        query.push(" AND s.movie_id = ").push_bind(movie_id);
    }
    if let Some(date) = filter.date {
        query.push(" AND DATE(s.show_date_time) = ").push_bind(date);
    }
    if let Some(theater) = &filter.theater {
        // BINARY keeps the comparison case- and trailing-space-sensitive
        query.push(" AND s.theater = BINARY ").push_bind(theater.clone());
    }
    query.push(" ORDER BY s.id");

    let rows = query
        .build()
        .fetch_all(pool)
        .await
        .context("Failed to list showtimes")?;

    rows.iter().map(row_to_showtime_mysql).collect()
}

fn row_to_showtime_mysql(row: &MySqlRow) -> Result<Showtime> {
    Ok(Showtime {
        id: row.try_get("id")?,
        movie: Some(MovieRef {
            id: row.try_get("movie_id")?,
            title: row.try_get("movie_title")?,
        }),
        show_date_time: row.try_get("show_date_time")?,
        theater: row.try_get("theater")?,
        available_seats: row.try_get("available_seats")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
