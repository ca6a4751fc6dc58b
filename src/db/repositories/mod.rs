//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles the reads (and seeding writes) for one entity.

pub mod movie;
pub mod showtime;

pub use movie::{MovieRepository, SqlxMovieRepository};
pub use showtime::{ShowtimeRepository, SqlxShowtimeRepository};
