//! Registration, login and identity endpoints.
//!
//! Each handler tries the record store first and falls back to the
//! in-memory ledger when the store is unavailable or errors out.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{Value, json};
use tracing::warn;

use marquee_core::db::DatabaseError;
use marquee_core::user::{LoginInput, NewUser, RegisterInput};
use marquee_core::{PublicUser, Role};

use crate::auth::AuthUser;
use crate::auth::password::{hash_password, verify_password};
use crate::server::{ApiError, AppState};
use crate::storage::CatalogDatabase;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = body.validate().map_err(ApiError::Validation)?;

    if let Some(db) = &state.db {
        match register_in_store(db, &input).await {
            Ok(user) => return registered(&state, user, false),
            Err(StoreRegister::Conflict) => {
                return Err(ApiError::Conflict(
                    "User with this email or username already exists".to_owned(),
                ));
            }
            Err(StoreRegister::Failed(err)) => {
                warn!(error = %err, "record store unavailable, registering in fallback ledger");
            }
        }
    }

    if state.ledger.has_user(&input.username, &input.email) {
        return Err(ApiError::Conflict(
            "User with this email or username already exists (Offline Mode)".to_owned(),
        ));
    }
    let user = state.ledger.register_user(input);
    registered(&state, user.public(), true)
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginInput>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    body.validate().map_err(ApiError::Validation)?;
    let email = body.email.trim().to_lowercase();

    if let Some(db) = &state.db {
        match db.find_user_by_email(&email).await {
            Ok(Some(user)) => {
                if verify_password(&body.password, &user.password_hash).unwrap_or(false) {
                    return logged_in(&state, user.public());
                }
                return Err(invalid_credentials());
            }
            // A store miss still checks the ledger: offline registrations
            // and the seeded accounts only exist there.
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "record store unavailable, authenticating against fallback ledger");
            }
        }
    }

    login_from_ledger(&state, &email, &body.password)
}

pub async fn me(user: AuthUser) -> Json<Value> {
    Json(json!({ "success": true, "user": user.0 }))
}

enum StoreRegister {
    Conflict,
    Failed(DatabaseError),
}

async fn register_in_store(
    db: &CatalogDatabase,
    input: &NewUser,
) -> Result<PublicUser, StoreRegister> {
    match db
        .find_user_by_username_or_email(&input.username, &input.email)
        .await
    {
        Ok(Some(_)) => return Err(StoreRegister::Conflict),
        Ok(None) => {}
        Err(err) => return Err(StoreRegister::Failed(err)),
    }
    let hash = hash_password(&input.password)
        .map_err(|err| StoreRegister::Failed(DatabaseError::Query(err.to_string())))?;
    match db
        .create_user(&input.username, &input.email, &hash, Role::User)
        .await
    {
        Ok(user) => Ok(user.public()),
        Err(err) => Err(StoreRegister::Failed(err)),
    }
}

fn login_from_ledger(
    state: &AppState,
    email: &str,
    password: &str,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Some(user) = state.ledger.find_user_by_email(email) else {
        return Err(invalid_credentials());
    };
    if user.password != password {
        return Err(invalid_credentials());
    }
    logged_in(state, user.public())
}

fn registered(
    state: &AppState,
    user: PublicUser,
    offline: bool,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let token = issue_token(state, &user.id)?;
    let message = if offline {
        "User registered successfully (Offline Mode)"
    } else {
        "User registered successfully"
    };
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": message,
            "token": token,
            "user": user,
        })),
    ))
}

fn logged_in(state: &AppState, user: PublicUser) -> Result<(StatusCode, Json<Value>), ApiError> {
    let token = issue_token(state, &user.id)?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "token": token,
            "user": user,
        })),
    ))
}

fn issue_token(state: &AppState, user_id: &str) -> Result<String, ApiError> {
    state.tokens.issue(user_id).map_err(|err| {
        tracing::error!(error = %err, "token signing failed");
        ApiError::Internal("Internal server error".to_owned())
    })
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("Invalid email or password".to_owned())
}
