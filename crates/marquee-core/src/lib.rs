//! Marquee Core Library
//!
//! Shared functionality for Marquee components:
//! - Movie and user domain models with field-level validation
//! - Pagination and sort-parameter parsing
//! - SQLite pool helpers and shared storage error types
//! - Tracing/logging initialisation

pub mod db;
pub mod movie;
pub mod page;
pub mod tracing_init;
pub mod user;

pub mod validate;

pub use movie::{Movie, MovieDraft, MoviePatch, NewMovie, SortField, SortOrder};
pub use page::{PageParams, Pagination};
pub use user::{PublicUser, Role};
pub use validate::FieldError;
