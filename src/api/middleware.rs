//! API middleware and shared state
//!
//! - `AppState`: services shared by every handler
//! - `error_envelope`: stamps the request path into error bodies
//! - `handle_panic`: renders a caught panic as an Internal error

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::error::{ApiError, ErrorResponse};
use crate::services::{MovieService, ShowtimeService};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub movie_service: Arc<MovieService>,
    pub showtime_service: Arc<ShowtimeService>,
}

/// Fill in `path` on error envelopes.
///
/// Handlers and extractors only know the error; the original request path
/// is taken here, before any nesting strips its prefix.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ErrorResponse>() {
        Some(mut body) => {
            body.path = path;
            let (mut parts, _) = response.into_parts();
            // Content length changed with the path
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            let rendered = Json(body).into_response();
            Response::from_parts(parts, rendered.into_body())
        }
        None => response,
    }
}

/// Turn a panic payload into the Internal error response
pub fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::internal(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}
