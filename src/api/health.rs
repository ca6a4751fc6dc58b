//! Health check endpoint

use anyhow::Context;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::middleware::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// GET /health - 200 when the store answers a ping
async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state
        .pool
        .ping()
        .await
        .context("Database ping failed")
        .map_err(ApiError::Internal)?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }))
}
