//! Movie catalog - a read-only catalog of movies and their showtimes
//!
//! Layers, bottom-up: `db` (pool, migrations, repositories), `models`
//! (entities, filters, wire types), `services` (queries, mapping, catalog
//! import) and `api` (HTTP routing and error envelopes).

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
