//! Route table and the serve loop.

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};
use serde_json::json;
use tracing::info;

use super::state::AppState;
use super::{auth_api, movie_api};

/// Build the full route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth_api::register))
        .route("/auth/login", post(auth_api::login))
        .route("/auth/me", get(auth_api::me))
        .route("/movies", get(movie_api::list).post(movie_api::create))
        .route("/movies/sorted", get(movie_api::sorted))
        .route("/movies/search", get(movie_api::search))
        .route(
            "/movies/{id}",
            get(movie_api::get)
                .put(movie_api::update)
                .delete(movie_api::delete),
        )
        .fallback(route_not_found)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, offline = state.db.is_none(), "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "message": "Server is running",
        "offline": state.db.is_none(),
    }))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "API Route not found",
        })),
    )
}
