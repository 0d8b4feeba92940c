//! Access gate: authentication and role authorization extractors.
//!
//! `AuthUser` resolves a bearer token to a full user identity, trying the
//! record store first (only when the token subject is a well-formed store
//! key) and falling back to the in-memory ledger. `AdminUser` layers the
//! role check on top; it only runs after authentication succeeds.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use marquee_core::{PublicUser, Role};
use tracing::warn;

use crate::server::{ApiError, AppState};

/// An authenticated request identity.
#[derive(Debug, Clone)]
pub struct AuthUser(pub PublicUser);

/// An authenticated identity that holds the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub PublicUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                ApiError::Unauthenticated("Authentication required. Please login.".into())
            })?;

        let claims = state.tokens.verify(token).map_err(|e| match e {
            crate::auth::VerifyError::Expired => {
                ApiError::Unauthenticated("Token expired. Please login again.".into())
            }
            crate::auth::VerifyError::Invalid => {
                ApiError::Unauthenticated("Invalid token. Please login again.".into())
            }
        })?;

        // Only store-assigned ids are well-formed store keys; a synthetic
        // ledger id must not reach the store as a query.
        if uuid::Uuid::parse_str(&claims.sub).is_ok()
            && let Some(db) = &state.db
        {
            match db.get_user(&claims.sub).await {
                Ok(Some(user)) => return Ok(Self(user.public())),
                Ok(None) => {}
                Err(e) => {
                    warn!(error = %e, "Store auth lookup failed, checking fallback ledger");
                }
            }
        }

        if let Some(user) = state.ledger.find_user_by_id(&claims.sub) {
            return Ok(Self(user.public()));
        }

        // The token was valid but its subject no longer resolves.
        Err(ApiError::Unauthenticated(
            "User not found. Please login again.".into(),
        ))
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        match user.role {
            Role::Admin => Ok(Self(user)),
            Role::User => Err(ApiError::Forbidden(
                "Access denied. Admin privileges required.".into(),
            )),
        }
    }
}
