//! JWT claims structure for Marquee session tokens.

use serde::{Deserialize, Serialize};

/// Claims embedded in a session token.
///
/// Tokens are stateless: nothing is persisted and there is no revocation
/// list, so a token stays valid until `exp` passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Subject (user ID).
    pub sub: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}
