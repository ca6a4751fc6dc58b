//! Services layer - Business logic
//!
//! Services sit between the HTTP handlers and the repositories:
//! - Resolve optional filters into repository queries
//! - Convert entities to response types
//! - Raise not-found for single-entity lookups

pub mod mapper;
pub mod movie;
pub mod seed;
pub mod showtime;

pub use mapper::MappingError;
pub use movie::{MovieService, MovieServiceError};
pub use seed::{seed_catalog, Catalog, SeedError};
pub use showtime::{ShowtimeService, ShowtimeServiceError};
