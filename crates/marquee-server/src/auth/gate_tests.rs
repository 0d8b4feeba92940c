#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use axum::extract::FromRequestParts;
use axum::http::Request;
use axum::http::request::Parts;

use marquee_core::Role;

use super::{AdminUser, AuthUser, TokenIssuer};
use crate::server::{ApiError, AppState};
use crate::storage::CatalogDatabase;

fn offline_state(tokens: TokenIssuer) -> AppState {
    AppState::offline(tokens)
}

fn parts_with(token: Option<&str>) -> Parts {
    let mut builder = Request::builder().uri("/movies");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(()).unwrap().into_parts().0
}

fn message(err: &ApiError) -> String {
    err.to_string()
}

#[tokio::test]
async fn missing_header_is_rejected() {
    let state = offline_state(TokenIssuer::new(b"s", 3600));
    let mut parts = parts_with(None);
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(message(&err), "Authentication required. Please login.");
}

#[tokio::test]
async fn malformed_token_is_rejected() {
    let state = offline_state(TokenIssuer::new(b"s", 3600));
    let mut parts = parts_with(Some("not.a.token"));
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(message(&err), "Invalid token. Please login again.");
}

#[tokio::test]
async fn expired_token_gets_its_own_message() {
    // TTL past the 60s default leeway so the token is already expired.
    let issuer = TokenIssuer::new(b"s", -120);
    let token = issuer.issue("admin_offline").unwrap();
    let state = offline_state(issuer);
    let mut parts = parts_with(Some(&token));
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(message(&err), "Token expired. Please login again.");
}

#[tokio::test]
async fn ledger_user_resolves_when_offline() {
    let issuer = TokenIssuer::new(b"s", 3600);
    let token = issuer.issue("user_offline").unwrap();
    let state = offline_state(issuer);
    let mut parts = parts_with(Some(&token));
    let AuthUser(user) = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(user.email, "demo@example.com");
    assert_eq!(user.role, Role::User);
}

#[tokio::test]
async fn valid_token_with_unknown_subject_is_rejected() {
    let issuer = TokenIssuer::new(b"s", 3600);
    let token = issuer.issue("nobody").unwrap();
    let state = offline_state(issuer);
    let mut parts = parts_with(Some(&token));
    let err = AuthUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(message(&err), "User not found. Please login again.");
}

#[tokio::test]
async fn store_user_resolves_by_uuid_subject() {
    let db = CatalogDatabase::open_in_memory().await.unwrap();
    let stored = db
        .create_user("carol", "carol@example.com", "hash", Role::Admin)
        .await
        .unwrap();

    let issuer = TokenIssuer::new(b"s", 3600);
    let token = issuer.issue(&stored.id).unwrap();
    let mut state = offline_state(issuer);
    state.db = Some(db);

    let mut parts = parts_with(Some(&token));
    let AdminUser(user) = AdminUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(user.username, "carol");
}

#[tokio::test]
async fn non_admin_is_forbidden() {
    let issuer = TokenIssuer::new(b"s", 3600);
    let token = issuer.issue("user_offline").unwrap();
    let state = offline_state(issuer);
    let mut parts = parts_with(Some(&token));
    let err = AdminUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    assert_eq!(message(&err), "Access denied. Admin privileges required.");
}

#[tokio::test]
async fn admin_passes_the_gate() {
    let issuer = TokenIssuer::new(b"s", 3600);
    let token = issuer.issue("admin_offline").unwrap();
    let state = offline_state(issuer);
    let mut parts = parts_with(Some(&token));
    let AdminUser(user) = AdminUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(user.role, Role::Admin);
}
