//! Data models
//!
//! This module contains the data structures used throughout the catalog:
//! - Database entities (Movie, Showtime)
//! - Write-side inputs used to populate the catalog
//! - Query filters
//! - API response types

mod dto;
mod movie;
mod showtime;
pub mod validation;

pub use dto::{MovieDetail, MovieSummary, MoviesResponse, ShowtimeSummary, ShowtimesResponse};
pub use movie::{Movie, MovieFilter, NewMovie};
pub use showtime::{MovieRef, NewShowtime, Showtime, ShowtimeFilter};
