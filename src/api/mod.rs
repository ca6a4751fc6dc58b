//! API layer - HTTP handlers and routing
//!
//! - Movie endpoints (`/api/v1/movies`)
//! - Showtime endpoints (`/api/v1/showtimes`)
//! - Health check (`/health`)
//!
//! Unrouted requests get an empty 404, except `favicon.ico` which gets an
//! empty 204.

pub mod error;
pub mod health;
pub mod middleware;
pub mod movies;
pub mod params;
pub mod showtimes;


use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware as axum_middleware,
    response::IntoResponse,
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use error::{ApiError, ErrorResponse};
pub use middleware::AppState;

/// Build the `/api/v1` router
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .merge(movies::router())
        .merge(showtimes::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: HeaderValue) -> Router {
    let routes = Router::new()
        .nest("/api/v1", build_api_router())
        .merge(health::router())
        .fallback(fallback);

    with_middleware(routes, cors_origin).with_state(state)
}

/// Apply the middleware stack, innermost first:
///
/// 1. Panic recovery (Internal error envelope)
/// 2. Error envelope path stamping
/// 3. CORS
/// 4. Request tracing
pub fn with_middleware<S>(router: Router<S>, cors_origin: HeaderValue) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    router
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(axum_middleware::from_fn(middleware::error_envelope))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Unrouted requests
async fn fallback(uri: Uri) -> impl IntoResponse {
    if uri.path().ends_with("favicon.ico") {
        return StatusCode::NO_CONTENT;
    }
    tracing::warn!("No handler for {}", uri.path());
    StatusCode::NOT_FOUND
}
