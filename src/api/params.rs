//! Query and path parameter binding
//!
//! Parameters are bound by hand instead of through `Query<T>` so every
//! failure maps onto the error taxonomy: an undecodable query string or a
//! repeated parameter is `InvalidParameters`, a value that does not convert
//! to its declared type is `InvalidParameterType`.

use std::collections::{BTreeMap, HashMap};

use axum::{
    extract::{FromRequestParts, Path, Query},
    http::{request::Parts, Uri},
};
use chrono::NaiveDate;

use crate::api::error::ApiError;
use crate::models::{MovieFilter, ShowtimeFilter};

// Type names reported in `InvalidParameterType` messages, language neutral
// rather than the names of the Rust types behind them
const INTEGER: &str = "integer";
const DATE: &str = "date";

const MOVIE_PARAMS: &[&str] = &["genre", "language"];
const SHOWTIME_PARAMS: &[&str] = &["movieId", "date", "theater"];

/// Decoded values of a route's declared query parameters
#[derive(Debug, Default)]
struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// Keep the first value of each declared name; anything undeclared is ignored
    fn from_uri(uri: &Uri, declared: &[&str]) -> Result<Self, ApiError> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri)
            .map_err(|e| ApiError::invalid_parameter("query", e.body_text()))?;

        let mut params = HashMap::with_capacity(declared.len());
        let mut repeated = BTreeMap::new();
        for (name, value) in pairs {
            if !declared.contains(&name.as_str()) {
                continue;
            }
            if params.contains_key(&name) {
                repeated.insert(name, "must not be repeated".to_string());
            } else {
                params.insert(name, value);
            }
        }

        if !repeated.is_empty() {
            return Err(ApiError::InvalidParameters(repeated));
        }
        Ok(Self(params))
    }

    /// Text value, passed through as given (an empty string is a value)
    fn text(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }

    /// Typed value; an empty string counts as absent
    fn typed<T>(
        &self,
        name: &str,
        expected: &'static str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<Option<T>, ApiError> {
        match self.0.get(name).map(String::as_str) {
            None | Some("") => Ok(None),
            Some(raw) => parse(raw)
                .map(Some)
                .ok_or_else(|| ApiError::invalid_type(raw, name, expected)),
        }
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// `?genre=&language=` bound into a [`MovieFilter`]
#[derive(Debug, Clone)]
pub struct MovieFilterParams(pub MovieFilter);

impl<S> FromRequestParts<S> for MovieFilterParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = QueryParams::from_uri(&parts.uri, MOVIE_PARAMS)?;
        Ok(Self(MovieFilter::new(
            params.text("genre"),
            params.text("language"),
        )))
    }
}

/// `?movieId=&date=&theater=` bound into a [`ShowtimeFilter`]
#[derive(Debug, Clone)]
pub struct ShowtimeFilterParams(pub ShowtimeFilter);

impl<S> FromRequestParts<S> for ShowtimeFilterParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let params = QueryParams::from_uri(&parts.uri, SHOWTIME_PARAMS)?;
        Ok(Self(ShowtimeFilter::new(
            params.typed("movieId", INTEGER, parse_id)?,
            params.typed("date", DATE, parse_date)?,
            params.text("theater"),
        )))
    }
}

/// Numeric `{id}` path segment
#[derive(Debug, Clone, Copy)]
pub struct MovieId(pub i64);

impl<S> FromRequestParts<S> for MovieId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_parameter("id", e.body_text()))?;
        parse_id(&raw)
            .map(Self)
            .ok_or_else(|| ApiError::invalid_type(raw, "id", INTEGER))
    }
}
