//! SQLite record store for the Marquee catalog.
//!
//! Canonical persistence for movies and users: paginated listing, sorted
//! listing, two-tier text search (FTS5 then substring), and the upsert rule
//! shared by the write queue and direct creation.

mod db;
mod models;
mod movie_queries;
mod user_queries;


pub use db::CatalogDatabase;
pub use models::StoredUser;
pub use movie_queries::UpsertAction;
