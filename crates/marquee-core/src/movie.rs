//! Movie domain model, create/update payloads, and sort parameters.

use serde::{Deserialize, Serialize};
use time::Date;
use time::macros::format_description;

use crate::validate::FieldError;

/// A catalog movie record.
///
/// `id` is a uuid string when the record store assigned it, or a
/// millisecond-timestamp string when the fallback ledger created it offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: String,
    pub rating: f64,
    /// ISO `YYYY-MM-DD`.
    pub release_date: String,
    /// Runtime in minutes.
    pub duration: i64,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Unvalidated create payload as it arrives on the wire.
///
/// Every field is optional at the serde level so that missing fields surface
/// as field-level validation errors rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MovieDraft {
    pub title: String,
    pub description: String,
    pub rating: Option<f64>,
    pub release_date: String,
    pub duration: Option<i64>,
    pub genre: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<String>,
    pub poster: Option<String>,
    pub imdb_id: Option<String>,
}

/// A validated, normalized movie to insert.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    pub description: String,
    pub rating: f64,
    pub release_date: String,
    pub duration: i64,
    pub genre: Vec<String>,
    pub director: Option<String>,
    pub cast: Vec<String>,
    pub poster: Option<String>,
    pub imdb_id: Option<String>,
}

impl MovieDraft {
    /// Validate the draft, returning a normalized [`NewMovie`] or the full
    /// list of field errors.
    ///
    /// Invariants enforced: non-empty title/description, rating in `[0, 10]`,
    /// a well-formed calendar release date, and duration >= 1 minute.
    pub fn validate(self) -> Result<NewMovie, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        }

        let description = self.description.trim().to_string();
        if description.is_empty() {
            errors.push(FieldError::new("description", "Description is required"));
        }

        let rating = match self.rating {
            None => {
                errors.push(FieldError::new("rating", "Rating is required"));
                0.0
            }
            Some(r) if !(0.0..=10.0).contains(&r) => {
                errors.push(FieldError::new("rating", "Rating must be between 0 and 10"));
                r
            }
            Some(r) => r,
        };

        if parse_release_date(&self.release_date).is_none() {
            errors.push(FieldError::new(
                "releaseDate",
                "Release date must be a valid date",
            ));
        }

        let duration = match self.duration {
            None => {
                errors.push(FieldError::new("duration", "Duration is required"));
                0
            }
            Some(d) if d < 1 => {
                errors.push(FieldError::new(
                    "duration",
                    "Duration must be a positive integer",
                ));
                d
            }
            Some(d) => d,
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewMovie {
            title,
            description,
            rating,
            release_date: self.release_date,
            duration,
            genre: self.genre,
            director: self.director,
            cast: self.cast,
            poster: self.poster,
            imdb_id: self.imdb_id,
        })
    }
}

/// Partial update payload; absent fields leave the record untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub release_date: Option<String>,
    pub duration: Option<i64>,
    pub genre: Option<Vec<String>>,
    pub director: Option<String>,
    pub cast: Option<Vec<String>>,
    pub poster: Option<String>,
    pub imdb_id: Option<String>,
}

impl MoviePatch {
    /// Validate whichever fields are present; same invariants as create.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            errors.push(FieldError::new("title", "Title is required"));
        }
        if let Some(description) = &self.description
            && description.trim().is_empty()
        {
            errors.push(FieldError::new("description", "Description is required"));
        }
        if let Some(rating) = self.rating
            && !(0.0..=10.0).contains(&rating)
        {
            errors.push(FieldError::new("rating", "Rating must be between 0 and 10"));
        }
        if let Some(date) = &self.release_date
            && parse_release_date(date).is_none()
        {
            errors.push(FieldError::new(
                "releaseDate",
                "Release date must be a valid date",
            ));
        }
        if let Some(duration) = self.duration
            && duration < 1
        {
            errors.push(FieldError::new(
                "duration",
                "Duration must be a positive integer",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// True when the patch carries no fields at all.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.rating.is_none()
            && self.release_date.is_none()
            && self.duration.is_none()
            && self.genre.is_none()
            && self.director.is_none()
            && self.cast.is_none()
            && self.poster.is_none()
            && self.imdb_id.is_none()
    }

    /// Shallow-merge this patch over an existing movie, bumping `updated_at`.
    pub fn apply_to(&self, movie: &mut Movie, now: i64) {
        if let Some(title) = &self.title {
            movie.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            movie.description = description.trim().to_string();
        }
        if let Some(rating) = self.rating {
            movie.rating = rating;
        }
        if let Some(date) = &self.release_date {
            movie.release_date = date.clone();
        }
        if let Some(duration) = self.duration {
            movie.duration = duration;
        }
        if let Some(genre) = &self.genre {
            movie.genre = genre.clone();
        }
        if let Some(director) = &self.director {
            movie.director = Some(director.clone());
        }
        if let Some(cast) = &self.cast {
            movie.cast = cast.clone();
        }
        if let Some(poster) = &self.poster {
            movie.poster = Some(poster.clone());
        }
        if let Some(imdb_id) = &self.imdb_id {
            movie.imdb_id = Some(imdb_id.clone());
        }
        movie.updated_at = now;
    }
}

/// Parse an ISO `YYYY-MM-DD` release date.
pub fn parse_release_date(value: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, &format).ok()
}

/// Public sort keys accepted by the sorted-list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Rating,
    ReleaseDate,
    Duration,
}

impl SortField {
    /// Parse the public query-parameter value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "rating" => Some(Self::Rating),
            "releaseDate" => Some(Self::ReleaseDate),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }

    /// Database column backing this sort key.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Name => "title",
            Self::Rating => "rating",
            Self::ReleaseDate => "release_date",
            Self::Duration => "duration",
        }
    }

    /// Public name, echoed back in sorted-list responses.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Rating => "rating",
            Self::ReleaseDate => "releaseDate",
            Self::Duration => "duration",
        }
    }
}

/// Sort direction; defaults to descending like the catalog UI expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}
