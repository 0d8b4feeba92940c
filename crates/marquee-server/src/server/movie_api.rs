//! Catalog endpoints: list, sort, search, CRUD.
//!
//! Reads try the record store first and fall back to the in-memory ledger.
//! Creation degrades through three tiers: queue, direct store write,
//! ledger append.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use marquee_core::{
    FieldError, Movie, MovieDraft, MoviePatch, PageParams, Pagination, SortField, SortOrder,
};

use crate::auth::AdminUser;
use crate::server::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortedQuery {
    page: Option<String>,
    limit: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    page: Option<String>,
    limit: Option<String>,
    q: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = page_params(query.page.as_deref(), query.limit.as_deref())?;

    let (movies, total) = if let Some(db) = &state.db {
        match db.list_movies(params.skip(), params.limit).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "record store unavailable, listing from fallback ledger");
                state.ledger.page(params.skip(), params.limit)
            }
        }
    } else {
        state.ledger.page(params.skip(), params.limit)
    };

    Ok(page_response(movies, params, total, json!({})))
}

pub async fn sorted(
    State(state): State<AppState>,
    Query(query): Query<SortedQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = page_params(query.page.as_deref(), query.limit.as_deref())?;

    let field = match query.sort_by.as_deref() {
        Some(raw) => SortField::parse(raw).ok_or_else(|| {
            field_failure(
                "sortBy",
                "sortBy must be one of: name, rating, releaseDate, duration",
            )
        })?,
        None => return Err(field_failure("sortBy", "sortBy parameter is required")),
    };
    let order = match query.order.as_deref() {
        Some(raw) => SortOrder::parse(raw)
            .ok_or_else(|| field_failure("order", "order must be asc or desc"))?,
        None => SortOrder::default(),
    };

    let (movies, total) = if let Some(db) = &state.db {
        match db
            .list_movies_sorted(field, order, params.skip(), params.limit)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "record store unavailable, sorting from fallback ledger");
                state
                    .ledger
                    .sorted_page(field, order, params.skip(), params.limit)
            }
        }
    } else {
        state
            .ledger
            .sorted_page(field, order, params.skip(), params.limit)
    };

    Ok(page_response(
        movies,
        params,
        total,
        json!({ "sortBy": field.as_str(), "order": order.as_str() }),
    ))
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let params = page_params(query.page.as_deref(), query.limit.as_deref())?;

    let needle = query.q.as_deref().map(str::trim).unwrap_or_default();
    if needle.is_empty() {
        return Err(field_failure("q", "Search query is required"));
    }

    let (movies, total) = if let Some(db) = &state.db {
        match db.search_movies(needle, params.skip(), params.limit).await {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "record store unavailable, searching fallback ledger");
                state.ledger.search(needle, params.skip(), params.limit)
            }
        }
    } else {
        state.ledger.search(needle, params.skip(), params.limit)
    };

    Ok(page_response(
        movies,
        params,
        total,
        json!({ "query": needle }),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if let Some(db) = &state.db
        && Uuid::parse_str(&id).is_ok()
    {
        match db.get_movie(&id).await {
            Ok(Some(movie)) => {
                return Ok(Json(json!({ "success": true, "data": movie })));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "record store unavailable, reading fallback ledger");
            }
        }
    }

    match state.ledger.get(&id) {
        Some(movie) => Ok(Json(json!({ "success": true, "data": movie }))),
        None => Err(not_found()),
    }
}

pub async fn create(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(draft): Json<MovieDraft>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new = draft.validate().map_err(ApiError::Validation)?;

    // Tier 1: hand the write to the queue for retried insertion.
    if state.db.is_some()
        && let Some(queue) = &state.queue
    {
        match queue.enqueue(new.clone()) {
            Ok(job_id) => {
                info!(job_id, title = %new.title, "movie accepted for queued insertion");
                return Ok((
                    StatusCode::ACCEPTED,
                    Json(json!({
                        "success": true,
                        "message": "Movie queued for insertion",
                        "jobId": job_id,
                    })),
                ));
            }
            Err(err) => {
                warn!(error = %err, "insert queue unavailable, writing directly");
            }
        }
    }

    // Tier 2: synchronous store write.
    if let Some(db) = &state.db {
        match db.upsert_movie(&new).await {
            Ok((action, movie)) => {
                return Ok((
                    StatusCode::CREATED,
                    Json(json!({
                        "success": true,
                        "message": format!("Movie {} successfully", action.as_str()),
                        "data": movie,
                    })),
                ));
            }
            Err(err) => {
                warn!(error = %err, "record store unavailable, appending to fallback ledger");
            }
        }
    }

    // Tier 3: in-memory append, lost on restart.
    let movie = state.ledger.append(new);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Movie added successfully (Offline Mode)",
            "data": movie,
        })),
    ))
}

pub async fn update(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<MoviePatch>,
) -> Result<Json<Value>, ApiError> {
    if patch.is_empty() {
        return Err(field_failure("body", "At least one field must be provided"));
    }
    patch.validate().map_err(ApiError::Validation)?;

    if let Some(db) = &state.db
        && Uuid::parse_str(&id).is_ok()
    {
        match db.update_movie(&id, &patch).await {
            Ok(Some(movie)) => return Ok(updated(movie)),
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "record store unavailable, patching fallback ledger");
            }
        }
    }

    match state.ledger.merge(&id, &patch) {
        Some(movie) => Ok(updated(movie)),
        None => Err(not_found()),
    }
}

pub async fn delete(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if let Some(db) = &state.db
        && Uuid::parse_str(&id).is_ok()
    {
        match db.delete_movie(&id).await {
            Ok(Some(_)) => return Ok(deleted()),
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "record store unavailable, removing from fallback ledger");
            }
        }
    }

    match state.ledger.remove(&id) {
        Some(_) => Ok(deleted()),
        None => Err(not_found()),
    }
}

/// Parse raw `page`/`limit` query strings. A non-numeric value gets the
/// same field error as an out-of-range one.
fn page_params(page: Option<&str>, limit: Option<&str>) -> Result<PageParams, ApiError> {
    let mut errors = Vec::new();
    let page = parse_numeric(page, "page", "Page must be a positive integer", &mut errors);
    let limit = parse_numeric(limit, "limit", "Limit must be between 1 and 100", &mut errors);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }
    PageParams::from_query(page, limit).map_err(ApiError::Validation)
}

fn parse_numeric(
    raw: Option<&str>,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<i64> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn page_response(movies: Vec<Movie>, params: PageParams, total: i64, extra: Value) -> Json<Value> {
    let mut body = json!({
        "success": true,
        "data": movies,
        "pagination": Pagination::new(params, total),
    });
    if let (Some(body_map), Value::Object(extra_map)) = (body.as_object_mut(), extra) {
        body_map.extend(extra_map);
    }
    Json(body)
}

fn field_failure(field: &str, message: &str) -> ApiError {
    ApiError::Validation(vec![FieldError::new(field, message)])
}

fn updated(movie: Movie) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Movie updated successfully",
        "data": movie,
    }))
}

fn deleted() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Movie deleted successfully",
    }))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Movie not found".to_owned())
}
