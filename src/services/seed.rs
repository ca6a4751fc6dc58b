//! Catalog import
//!
//! Populates an empty store from a YAML catalog file on startup:
//!
//! ```yaml
//! movies:
//!   - title: Inception
//!     genre: Sci-Fi
//!     language: English
//!     release_date: 2010-07-16
//!     showtimes:
//!       - show_date_time: 2025-09-30T14:00:00
//!         theater: Theater 1
//!         available_seats: 100
//! ```
//!
//! Every entry is validated before anything is written.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use validator::Validate;

use crate::db::repositories::MovieRepository;
use crate::models::validation::field_violations;
use crate::models::NewMovie;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read catalog file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Invalid catalog entry #{index}: {violations:?}")]
    Invalid {
        index: usize,
        violations: BTreeMap<String, String>,
    },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Contents of a catalog file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub movies: Vec<NewMovie>,
}

impl Catalog {
    /// Parse and validate a catalog document
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self, SeedError> {
        let catalog: Catalog = if content.trim().is_empty() {
            Catalog::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| SeedError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };

        for (index, movie) in catalog.movies.iter().enumerate() {
            if let Err(errors) = movie.validate() {
                return Err(SeedError::Invalid {
                    index,
                    violations: field_violations(&errors),
                });
            }
        }

        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let content = std::fs::read_to_string(path).map_err(|e| SeedError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_yaml(&content, &path.display().to_string())
    }
}

/// Import the catalog at `path` when the store holds no movies yet.
///
/// The whole catalog is written in one transaction, so a failed import
/// leaves the store empty and the next start retries it. Returns the number
/// of movies inserted; 0 when the store was already populated.
pub async fn seed_catalog(repo: &dyn MovieRepository, path: &Path) -> Result<usize, SeedError> {
    let existing = repo.count().await?;
    if existing > 0 {
        tracing::info!("Catalog already holds {} movies, skipping import", existing);
        return Ok(0);
    }

    let catalog = Catalog::load(path)?;
    let created = repo.create_many(&catalog.movies).await?;
    for movie in &created {
        tracing::debug!("Imported movie {} ({})", movie.id, movie.title);
    }

    tracing::info!(
        "Imported {} movies from {}",
        catalog.movies.len(),
        path.display()
    );
    Ok(catalog.movies.len())
}
