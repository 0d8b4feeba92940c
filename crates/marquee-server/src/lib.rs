//! Marquee Catalog Server Library
//!
//! Core functionality for the Marquee movie catalog:
//! - SQLite record store for movies and users (with FTS5 text search)
//! - JWT authentication, argon2 password hashing, and the admin access gate
//! - Asynchronous write queue with retrying upsert semantics
//! - In-memory fallback ledger used whenever the record store is unreachable
//! - HTTP API handlers implementing the store -> queue -> ledger degrade

pub mod auth;
pub mod ledger;
pub mod queue;
pub mod server;
pub mod storage;
