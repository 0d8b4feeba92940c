//! HTTP API for the Marquee catalog.

pub mod auth_api;
pub mod envelope;
pub mod movie_api;
pub mod router;
pub mod state;

#[cfg(test)]
mod movie_api_tests;

pub use envelope::ApiError;
pub use router::{router, serve};
pub use state::AppState;
