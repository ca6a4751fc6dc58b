//! Movie API endpoints
//!
//! - GET /api/v1/movies - List movies, optionally by genre and language
//! - GET /api/v1/movies/{id} - Get a movie with its showtimes

use axum::{extract::State, routing::get, Json, Router};

use crate::api::error::ApiError;
use crate::api::middleware::AppState;
use crate::api::params::{MovieFilterParams, MovieId};
use crate::models::{MovieDetail, MoviesResponse};

/// Build the movies router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
}

/// GET /api/v1/movies
async fn list_movies(
    State(state): State<AppState>,
    MovieFilterParams(filter): MovieFilterParams,
) -> Result<Json<MoviesResponse>, ApiError> {
    let movies = state.movie_service.list_movies(&filter).await?;
    Ok(Json(MoviesResponse { movies }))
}

/// GET /api/v1/movies/{id}
async fn get_movie(
    State(state): State<AppState>,
    MovieId(id): MovieId,
) -> Result<Json<MovieDetail>, ApiError> {
    Ok(Json(state.movie_service.get_movie_detail(id).await?))
}
