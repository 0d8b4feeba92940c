//! Authentication module for the Marquee server.
//!
//! Provides JWT token management, password hashing, and the access gate
//! extractors that guard mutation endpoints.

pub mod claims;
pub mod gate;
pub mod jwt;
pub mod password;

#[cfg(test)]
mod gate_tests;

pub use claims::Claims;
pub use gate::{AdminUser, AuthUser};
pub use jwt::{TokenIssuer, VerifyError};
