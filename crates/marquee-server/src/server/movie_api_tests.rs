#![allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, Uri};
use serde::de::DeserializeOwned;

use marquee_core::{MovieDraft, MoviePatch, PublicUser, Role};

use super::movie_api::{create, delete, get, list, search, sorted, update};
use crate::auth::{AdminUser, TokenIssuer};
use crate::queue::InsertQueue;
use crate::server::{ApiError, AppState};
use crate::storage::CatalogDatabase;

fn tokens() -> TokenIssuer {
    TokenIssuer::new(b"test-secret", 3600)
}

async fn store_state() -> AppState {
    let db = CatalogDatabase::open_in_memory().await.unwrap();
    AppState::store_only(db, tokens())
}

async fn queued_state() -> AppState {
    let db = CatalogDatabase::open_in_memory().await.unwrap();
    let queue = InsertQueue::start(db.clone());
    AppState::new(db, queue, tokens())
}

fn offline_state() -> AppState {
    AppState::offline(tokens())
}

fn admin() -> AdminUser {
    AdminUser(PublicUser {
        id: "admin_offline".into(),
        username: "Admin User".into(),
        email: "admin@example.com".into(),
        role: Role::Admin,
    })
}

fn query<T: DeserializeOwned>(uri: &str) -> Query<T> {
    let uri: Uri = uri.parse().unwrap();
    Query::try_from_uri(&uri).unwrap()
}

fn draft(title: &str) -> MovieDraft {
    MovieDraft {
        title: title.into(),
        description: format!("About {title}"),
        rating: Some(8.0),
        release_date: "2020-01-01".into(),
        duration: Some(120),
        ..MovieDraft::default()
    }
}

#[tokio::test]
async fn list_serves_ledger_seeds_when_offline() {
    let state = offline_state();
    let Json(body) = list(State(state), query("/movies")).await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["total"], 5);
    assert_eq!(body["pagination"]["pages"], 1);
}

#[tokio::test]
async fn list_rejects_non_numeric_page() {
    let state = offline_state();
    let err = list(State(state), query("/movies?page=abc"))
        .await
        .unwrap_err();
    let ApiError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors[0].message, "Page must be a positive integer");
}

#[tokio::test]
async fn sorted_requires_sort_by() {
    let state = offline_state();
    let err = sorted(State(state), query("/movies/sorted"))
        .await
        .unwrap_err();
    let ApiError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors[0].field, "sortBy");
}

#[tokio::test]
async fn sorted_rejects_unknown_field_and_order() {
    let state = offline_state();
    let err = sorted(State(state.clone()), query("/movies/sorted?sortBy=year"))
        .await
        .unwrap_err();
    let ApiError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(
        errors[0].message,
        "sortBy must be one of: name, rating, releaseDate, duration"
    );

    let err = sorted(
        State(state),
        query("/movies/sorted?sortBy=rating&order=sideways"),
    )
    .await
    .unwrap_err();
    let ApiError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors[0].message, "order must be asc or desc");
}

#[tokio::test]
async fn sorted_echoes_parameters_and_defaults_to_desc() {
    let state = offline_state();
    let Json(body) = sorted(State(state), query("/movies/sorted?sortBy=rating"))
        .await
        .unwrap();

    assert_eq!(body["sortBy"], "rating");
    assert_eq!(body["order"], "desc");
    let ratings: Vec<f64> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["rating"].as_f64().unwrap())
        .collect();
    let mut expected = ratings.clone();
    expected.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert_eq!(ratings, expected);
}

#[tokio::test]
async fn search_requires_a_query() {
    let state = offline_state();
    let err = search(State(state.clone()), query("/movies/search"))
        .await
        .unwrap_err();
    let ApiError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(errors[0].message, "Search query is required");

    let err = search(State(state), query("/movies/search?q=%20%20"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn search_echoes_the_query() {
    let state = offline_state();
    let Json(body) = search(State(state), query("/movies/search?q=the"))
        .await
        .unwrap();
    assert_eq!(body["query"], "the");
    assert!(body["pagination"]["total"].as_i64().unwrap() >= 1);
}

#[tokio::test]
async fn get_serves_ledger_seed_by_synthetic_id() {
    let state = offline_state();
    let Json(body) = get(State(state), Path("1".to_string())).await.unwrap();
    assert_eq!(body["data"]["id"], "1");
}

#[tokio::test]
async fn get_miss_is_not_found() {
    let state = offline_state();
    let err = get(State(state), Path("does-not-exist".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Movie not found");
}

#[tokio::test]
async fn create_hands_the_write_to_the_queue() {
    let state = queued_state().await;
    let (status, Json(body)) = create(admin(), State(state.clone()), Json(draft("Queued Movie")))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["message"], "Movie queued for insertion");
    assert!(body["jobId"].is_u64());

    // The worker inserts asynchronously.
    let db = state.db.unwrap();
    for _ in 0..50 {
        let (_, total) = db.list_movies(0, 10).await.unwrap();
        if total == 1 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("queued movie never reached the store");
}

#[tokio::test]
async fn create_writes_directly_without_a_queue() {
    let state = store_state().await;
    let (status, Json(body)) = create(admin(), State(state.clone()), Json(draft("Direct Movie")))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Movie created successfully");

    // Same title again becomes an update.
    let (status, Json(body)) = create(admin(), State(state), Json(draft("Direct Movie")))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Movie updated successfully");
}

#[tokio::test]
async fn create_appends_to_ledger_when_offline() {
    let state = offline_state();
    let (status, Json(body)) = create(admin(), State(state.clone()), Json(draft("Offline Movie")))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Movie added successfully (Offline Mode)");
    assert_eq!(body["data"]["poster"], "https://via.placeholder.com/300x450");

    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert!(state.ledger.get(&id).is_some());
}

#[tokio::test]
async fn create_rejects_invalid_draft() {
    let state = offline_state();
    let err = create(admin(), State(state), Json(MovieDraft::default()))
        .await
        .unwrap_err();
    let ApiError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(
        fields,
        vec!["title", "description", "rating", "releaseDate", "duration"]
    );
}

#[tokio::test]
async fn update_patches_the_store_record() {
    let state = store_state().await;
    let (_, Json(body)) = create(admin(), State(state.clone()), Json(draft("Patch Me")))
        .await
        .unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let patch = MoviePatch {
        rating: Some(9.5),
        ..MoviePatch::default()
    };
    let Json(body) = update(admin(), State(state), Path(id), Json(patch))
        .await
        .unwrap();
    assert_eq!(body["message"], "Movie updated successfully");
    assert!((body["data"]["rating"].as_f64().unwrap() - 9.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn update_store_miss_checks_the_ledger_before_404() {
    let state = store_state().await;
    let missing = uuid::Uuid::new_v4().to_string();
    let patch = MoviePatch {
        rating: Some(5.0),
        ..MoviePatch::default()
    };

    // Absent in the store, then absent in the ledger.
    let err = update(admin(), State(state.clone()), Path(missing), Json(patch.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Movie not found");

    // A ledger record stays reachable even while the store is healthy.
    let Json(body) = update(admin(), State(state), Path("3".to_string()), Json(patch))
        .await
        .unwrap();
    assert_eq!(body["message"], "Movie updated successfully");
}

#[tokio::test]
async fn update_rejects_an_empty_patch() {
    let state = offline_state();
    let err = update(
        admin(),
        State(state),
        Path("1".to_string()),
        Json(MoviePatch::default()),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn update_merges_into_ledger_when_offline() {
    let state = offline_state();
    let patch = MoviePatch {
        title: Some("Renamed".into()),
        ..MoviePatch::default()
    };
    let Json(body) = update(admin(), State(state.clone()), Path("2".to_string()), Json(patch))
        .await
        .unwrap();
    assert_eq!(body["data"]["title"], "Renamed");
    assert_eq!(state.ledger.get("2").unwrap().title, "Renamed");
}

#[tokio::test]
async fn delete_removes_from_store_and_misses_404() {
    let state = store_state().await;
    let (_, Json(body)) = create(admin(), State(state.clone()), Json(draft("Doomed")))
        .await
        .unwrap();
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let Json(body) = delete(admin(), State(state.clone()), Path(id.clone()))
        .await
        .unwrap();
    assert_eq!(body["message"], "Movie deleted successfully");

    let err = delete(admin(), State(state), Path(id)).await.unwrap_err();
    assert_eq!(err.to_string(), "Movie not found");
}

#[tokio::test]
async fn delete_removes_from_ledger_when_offline() {
    let state = offline_state();
    let Json(body) = delete(admin(), State(state.clone()), Path("5".to_string()))
        .await
        .unwrap();
    assert_eq!(body["message"], "Movie deleted successfully");
    assert!(state.ledger.get("5").is_none());
}
