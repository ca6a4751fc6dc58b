//! Showtime API endpoints
//!
//! - GET /api/v1/showtimes - List showtimes by movie, date and theater

use axum::{extract::State, routing::get, Json, Router};

use crate::api::error::ApiError;
use crate::api::middleware::AppState;
use crate::api::params::ShowtimeFilterParams;
use crate::models::ShowtimesResponse;

/// Build the showtimes router
pub fn router() -> Router<AppState> {
    Router::new().route("/showtimes", get(list_showtimes))
}

/// GET /api/v1/showtimes
async fn list_showtimes(
    State(state): State<AppState>,
    ShowtimeFilterParams(filter): ShowtimeFilterParams,
) -> Result<Json<ShowtimesResponse>, ApiError> {
    let showtimes = state.showtime_service.list_showtimes(&filter).await?;
    Ok(Json(ShowtimesResponse { showtimes }))
}
