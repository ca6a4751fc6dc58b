//! Movie catalog - read-only movie and showtime API

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movie_catalog::{
    api::{self, AppState},
    config::Config,
    db::{
        self,
        repositories::{SqlxMovieRepository, SqlxShowtimeRepository},
    },
    services::{seed_catalog, MovieService, ShowtimeService},
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; it carries the default log filter
    let config = Config::load_with_env(Path::new("config.yml"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting movie catalog...");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let movie_repo = SqlxMovieRepository::boxed(pool.clone());
    let showtime_repo = SqlxShowtimeRepository::boxed(pool.clone());

    if let Some(seed_file) = &config.catalog.seed_file {
        let imported = seed_catalog(movie_repo.as_ref(), seed_file).await?;
        tracing::info!("Catalog import finished ({} movies added)", imported);
    }

    let state = AppState {
        pool: pool.clone(),
        movie_service: Arc::new(MovieService::new(movie_repo)),
        showtime_service: Arc::new(ShowtimeService::new(showtime_repo)),
    };

    let app = api::build_router(state, config.server.cors_origin_header()?);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
