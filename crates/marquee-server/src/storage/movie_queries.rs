//! Movie queries for the catalog store.

use marquee_core::db::{DatabaseError, unix_timestamp};
use marquee_core::{Movie, MoviePatch, NewMovie, SortField, SortOrder};
use tracing::debug;

use super::db::CatalogDatabase;
use super::models::MovieRow;

/// Outcome of the upsert-by-title-or-imdb rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    Created,
    Updated,
}

impl UpsertAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

const MOVIE_COLUMNS: &str = "id, title, description, rating, release_date, duration, \
     genre, director, cast_list, poster, imdb_id, created_at, updated_at";

fn encode_list(list: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(list).map_err(|e| DatabaseError::Query(e.to_string()))
}

impl CatalogDatabase {
    /// List movies newest-first with the total count.
    pub async fn list_movies(
        &self,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Movie>, i64), DatabaseError> {
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT * FROM movies ORDER BY created_at DESC, rowid DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool())
        .await?;

        let total = self.count_movies().await?;
        Ok((rows.into_iter().map(MovieRow::into_movie).collect(), total))
    }

    /// List movies ordered by a public sort key, with the total count.
    ///
    /// The ORDER BY clause is assembled from closed enums, never from user
    /// input. Title sorting is case-insensitive; ties keep rowid order.
    pub async fn list_movies_sorted(
        &self,
        field: SortField,
        order: SortOrder,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Movie>, i64), DatabaseError> {
        let collate = match field {
            SortField::Name => " COLLATE NOCASE",
            SortField::Rating | SortField::ReleaseDate | SortField::Duration => "",
        };
        let sql = format!(
            "SELECT * FROM movies ORDER BY {}{} {}, rowid ASC LIMIT ? OFFSET ?",
            field.column(),
            collate,
            order.sql(),
        );
        let rows = sqlx::query_as::<_, MovieRow>(&sql)
            .bind(limit)
            .bind(skip)
            .fetch_all(self.pool())
            .await?;

        let total = self.count_movies().await?;
        Ok((rows.into_iter().map(MovieRow::into_movie).collect(), total))
    }

    /// Two-tier text search over title and description.
    ///
    /// Tier 1 runs the query as a quoted FTS5 phrase in relevance order; a
    /// tier that matches nothing (or cannot parse the phrase) falls through
    /// to a case-insensitive substring match with its own true count.
    pub async fn search_movies(
        &self,
        query: &str,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Movie>, i64), DatabaseError> {
        let phrase = fts_phrase(query);

        let indexed = sqlx::query_as::<_, MovieRow>(
            "SELECT movies.* FROM movies JOIN movies_fts ON movies.rowid = movies_fts.rowid \
             WHERE movies_fts MATCH ? ORDER BY movies_fts.rank LIMIT ? OFFSET ?",
        )
        .bind(&phrase)
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool())
        .await;

        match indexed {
            Ok(rows) if !rows.is_empty() => {
                let total: (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM movies_fts WHERE movies_fts MATCH ?")
                        .bind(&phrase)
                        .fetch_one(self.pool())
                        .await?;
                Ok((
                    rows.into_iter().map(MovieRow::into_movie).collect(),
                    total.0,
                ))
            }
            Ok(_) => self.search_movies_substring(query, skip, limit).await,
            Err(e) => {
                // FTS5 rejects some inputs outright; treat that the same as
                // zero indexed matches and let the substring tier decide.
                debug!(error = %e, "FTS search failed, falling back to substring match");
                self.search_movies_substring(query, skip, limit).await
            }
        }
    }

    async fn search_movies_substring(
        &self,
        query: &str,
        skip: i64,
        limit: i64,
    ) -> Result<(Vec<Movie>, i64), DatabaseError> {
        let pattern = format!("%{}%", like_escape(query));
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT * FROM movies \
             WHERE title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' \
             ORDER BY rowid ASC LIMIT ? OFFSET ?",
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind(skip)
        .fetch_all(self.pool())
        .await?;

        let total: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM movies WHERE title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\'",
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(self.pool())
        .await?;

        Ok((
            rows.into_iter().map(MovieRow::into_movie).collect(),
            total.0,
        ))
    }

    /// Get a movie by id.
    pub async fn get_movie(&self, id: &str) -> Result<Option<Movie>, DatabaseError> {
        let row = sqlx::query_as::<_, MovieRow>("SELECT * FROM movies WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(row.map(MovieRow::into_movie))
    }

    /// Insert a new movie with a store-assigned uuid.
    pub async fn insert_movie(&self, new: &NewMovie) -> Result<Movie, DatabaseError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = unix_timestamp();

        sqlx::query(&format!(
            "INSERT INTO movies ({MOVIE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.rating)
        .bind(&new.release_date)
        .bind(new.duration)
        .bind(encode_list(&new.genre)?)
        .bind(&new.director)
        .bind(encode_list(&new.cast)?)
        .bind(&new.poster)
        .bind(&new.imdb_id)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_movie(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Movie {id}")))
    }

    /// Patch a movie in place; `None` when the id does not exist.
    pub async fn update_movie(
        &self,
        id: &str,
        patch: &MoviePatch,
    ) -> Result<Option<Movie>, DatabaseError> {
        let Some(mut movie) = self.get_movie(id).await? else {
            return Ok(None);
        };
        patch.apply_to(&mut movie, unix_timestamp());

        sqlx::query(
            "UPDATE movies SET title = ?, description = ?, rating = ?, release_date = ?, \
             duration = ?, genre = ?, director = ?, cast_list = ?, poster = ?, imdb_id = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(movie.rating)
        .bind(&movie.release_date)
        .bind(movie.duration)
        .bind(encode_list(&movie.genre)?)
        .bind(&movie.director)
        .bind(encode_list(&movie.cast)?)
        .bind(&movie.poster)
        .bind(&movie.imdb_id)
        .bind(movie.updated_at)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(Some(movie))
    }

    /// Delete a movie, returning the deleted record; `None` when absent.
    pub async fn delete_movie(&self, id: &str) -> Result<Option<Movie>, DatabaseError> {
        let Some(movie) = self.get_movie(id).await? else {
            return Ok(None);
        };
        sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(Some(movie))
    }

    /// Probe for an existing movie by exact title or external catalog id.
    pub async fn find_movie_by_title_or_imdb(
        &self,
        title: &str,
        imdb_id: Option<&str>,
    ) -> Result<Option<Movie>, DatabaseError> {
        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT * FROM movies WHERE title = ? OR (? IS NOT NULL AND imdb_id = ?) LIMIT 1",
        )
        .bind(title)
        .bind(imdb_id)
        .bind(imdb_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(MovieRow::into_movie))
    }

    /// Create-or-update: a movie with the same title or imdb id is updated
    /// in place instead of duplicated. This is the single semantic-merge
    /// rule shared by the write queue worker and direct creation.
    pub async fn upsert_movie(
        &self,
        new: &NewMovie,
    ) -> Result<(UpsertAction, Movie), DatabaseError> {
        if let Some(existing) = self
            .find_movie_by_title_or_imdb(&new.title, new.imdb_id.as_deref())
            .await?
        {
            let patch = MoviePatch {
                title: Some(new.title.clone()),
                description: Some(new.description.clone()),
                rating: Some(new.rating),
                release_date: Some(new.release_date.clone()),
                duration: Some(new.duration),
                genre: Some(new.genre.clone()),
                director: new.director.clone(),
                cast: Some(new.cast.clone()),
                poster: new.poster.clone(),
                imdb_id: new.imdb_id.clone(),
            };
            let updated = self
                .update_movie(&existing.id, &patch)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("Movie {}", existing.id)))?;
            return Ok((UpsertAction::Updated, updated));
        }

        let movie = self.insert_movie(new).await?;
        Ok((UpsertAction::Created, movie))
    }

    async fn count_movies(&self) -> Result<i64, DatabaseError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }
}

/// Quote the user query as a single FTS5 phrase so punctuation cannot be
/// parsed as match syntax.
fn fts_phrase(query: &str) -> String {
    format!("\"{}\"", query.replace('"', " "))
}

/// Escape LIKE wildcards in the user query.
fn like_escape(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
