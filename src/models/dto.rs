//! Wire representations returned by the HTTP API
//!
//! All payloads use camelCase keys. Absent attributes are serialized as
//! `null`, never omitted.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Movie as listed by `GET /api/v1/movies`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Movie with its showtimes, returned by `GET /api/v1/movies/{id}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// `null` when showtimes were not loaded, `[]` when there are none
    pub showtimes: Option<Vec<ShowtimeSummary>>,
}

/// Showtime with a denormalized copy of its movie's id and title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeSummary {
    pub id: i64,
    pub movie_id: i64,
    pub movie_title: String,
    #[serde(with = "local_date_time")]
    pub show_date_time: NaiveDateTime,
    pub theater: String,
    pub available_seats: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoviesResponse {
    pub movies: Vec<MovieSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowtimesResponse {
    pub showtimes: Vec<ShowtimeSummary>,
}

/// `yyyy-MM-ddTHH:mm:ss`, without fractional seconds or offset
mod local_date_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
