//! Row types for the catalog store and their domain conversions.
//!
//! `genre` and `cast_list` are stored as JSON-encoded arrays; unparsable
//! values decode as empty lists rather than failing the whole row.

use marquee_core::db::DatabaseError;
use marquee_core::{Movie, PublicUser, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MovieRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub rating: f64,
    pub release_date: String,
    pub duration: i64,
    pub genre: String,
    pub director: Option<String>,
    pub cast_list: String,
    pub poster: Option<String>,
    pub imdb_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MovieRow {
    pub fn into_movie(self) -> Movie {
        Movie {
            id: self.id,
            title: self.title,
            description: self.description,
            rating: self.rating,
            release_date: self.release_date,
            duration: self.duration,
            genre: serde_json::from_str(&self.genre).unwrap_or_default(),
            director: self.director,
            cast: serde_json::from_str(&self.cast_list).unwrap_or_default(),
            poster: self.poster,
            imdb_id: self.imdb_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRow {
    /// Convert to the domain user; an unknown role string in the database is
    /// a data error, never an implicit grant.
    pub fn into_user(self) -> Result<StoredUser, DatabaseError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| DatabaseError::Query(format!("unknown role {:?}", self.role)))?;
        Ok(StoredUser {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A user as held by the record store (password hashed at rest).
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

impl StoredUser {
    /// API-facing identity, without the password hash.
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}
