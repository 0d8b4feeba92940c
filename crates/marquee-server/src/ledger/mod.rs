//! In-memory fallback ledger.
//!
//! A process-lifetime shadow store used whenever the record store is
//! unreachable or misses. Seeded at startup with a small set of well-known
//! movies and offline users; never persisted and never reconciled with the
//! record store once connectivity returns.
//!
//! Individual operations take a `Mutex` so they are atomic on a
//! multi-threaded runtime, but there is no cross-request ordering: two
//! concurrent creates interleave however the scheduler lands them. That is
//! the accepted weak consistency of offline mode.

use std::sync::{Mutex, MutexGuard, PoisonError};

use marquee_core::db::{unix_timestamp, unix_timestamp_millis};
use marquee_core::{Movie, MoviePatch, NewMovie, PublicUser, Role, SortField, SortOrder};
use marquee_core::user::NewUser;

/// Poster assigned to offline creations that did not provide one.
const PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/300x450";

/// An offline-mode user. The password is plain text: an explicitly accepted
/// weakness of the disposable ledger, never of the record store.
#[derive(Debug, Clone)]
pub struct LedgerUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl LedgerUser {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }
}

/// Process-wide fallback store for movies and users.
pub struct FallbackLedger {
    movies: Mutex<Vec<Movie>>,
    users: Mutex<Vec<LedgerUser>>,
}

/// A poisoned lock only means another thread panicked mid-operation; the
/// ledger is best-effort, so keep serving whatever state is there.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FallbackLedger {
    /// Build a ledger seeded with the well-known catalog sample and the
    /// offline operator accounts.
    pub fn seeded() -> Self {
        Self {
            movies: Mutex::new(seed_movies()),
            users: Mutex::new(seed_users()),
        }
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self {
            movies: Mutex::new(Vec::new()),
            users: Mutex::new(Vec::new()),
        }
    }

    // === Movies ===

    /// One page of movies in insertion order, with the total count.
    pub fn page(&self, skip: i64, limit: i64) -> (Vec<Movie>, i64) {
        let movies = lock(&self.movies);
        (slice_page(&movies, skip, limit), movies.len() as i64)
    }

    /// One page of movies under the given sort, with the total count.
    ///
    /// Strings compare case-insensitively; the sort is stable so ties keep
    /// insertion order.
    pub fn sorted_page(
        &self,
        field: SortField,
        order: SortOrder,
        skip: i64,
        limit: i64,
    ) -> (Vec<Movie>, i64) {
        let movies = lock(&self.movies);
        let mut sorted: Vec<Movie> = movies.clone();
        drop(movies);

        sorted.sort_by(|a, b| {
            let ordering = match field {
                SortField::Name => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
                SortField::Rating => a
                    .rating
                    .partial_cmp(&b.rating)
                    .unwrap_or(std::cmp::Ordering::Equal),
                SortField::ReleaseDate => a.release_date.cmp(&b.release_date),
                SortField::Duration => a.duration.cmp(&b.duration),
            };
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = sorted.len() as i64;
        (slice_page(&sorted, skip, limit), total)
    }

    /// Case-insensitive substring search over title OR description.
    pub fn search(&self, query: &str, skip: i64, limit: i64) -> (Vec<Movie>, i64) {
        let needle = query.to_lowercase();
        let movies = lock(&self.movies);
        let matched: Vec<Movie> = movies
            .iter()
            .filter(|m| {
                m.title.to_lowercase().contains(&needle)
                    || m.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        let total = matched.len() as i64;
        (slice_page(&matched, skip, limit), total)
    }

    pub fn get(&self, id: &str) -> Option<Movie> {
        lock(&self.movies).iter().find(|m| m.id == id).cloned()
    }

    /// Append a movie with a synthetic timestamp-derived id. No uniqueness
    /// check: offline creations may duplicate existing titles.
    pub fn append(&self, new: NewMovie) -> Movie {
        let now = unix_timestamp();
        let movie = Movie {
            id: unix_timestamp_millis().to_string(),
            title: new.title,
            description: new.description,
            rating: new.rating,
            release_date: new.release_date,
            duration: new.duration,
            genre: new.genre,
            director: new.director,
            cast: new.cast,
            poster: new.poster.or_else(|| Some(PLACEHOLDER_POSTER.to_string())),
            imdb_id: new.imdb_id,
            created_at: now,
            updated_at: now,
        };
        lock(&self.movies).push(movie.clone());
        movie
    }

    /// Shallow-merge a patch over the movie with the given id.
    pub fn merge(&self, id: &str, patch: &MoviePatch) -> Option<Movie> {
        let mut movies = lock(&self.movies);
        let movie = movies.iter_mut().find(|m| m.id == id)?;
        patch.apply_to(movie, unix_timestamp());
        Some(movie.clone())
    }

    /// Remove the movie with the given id, returning it.
    pub fn remove(&self, id: &str) -> Option<Movie> {
        let mut movies = lock(&self.movies);
        let index = movies.iter().position(|m| m.id == id)?;
        Some(movies.remove(index))
    }

    // === Users ===

    pub fn find_user_by_id(&self, id: &str) -> Option<LedgerUser> {
        lock(&self.users).iter().find(|u| u.id == id).cloned()
    }

    /// Case-insensitive email lookup.
    pub fn find_user_by_email(&self, email: &str) -> Option<LedgerUser> {
        let needle = email.to_lowercase();
        lock(&self.users)
            .iter()
            .find(|u| u.email.to_lowercase() == needle)
            .cloned()
    }

    /// Duplicate probe for offline registration.
    pub fn has_user(&self, username: &str, email: &str) -> bool {
        let email = email.to_lowercase();
        lock(&self.users)
            .iter()
            .any(|u| u.username == username || u.email.to_lowercase() == email)
    }

    /// Register an offline user (role `user`, plain-text password).
    pub fn register_user(&self, new: NewUser) -> LedgerUser {
        let user = LedgerUser {
            id: unix_timestamp_millis().to_string(),
            username: new.username,
            email: new.email,
            password: new.password,
            role: Role::User,
        };
        lock(&self.users).push(user.clone());
        user
    }
}

fn slice_page(movies: &[Movie], skip: i64, limit: i64) -> Vec<Movie> {
    let skip = usize::try_from(skip).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    movies.iter().skip(skip).take(limit).cloned().collect()
}

fn sample(
    title: &str,
    rating: f64,
    duration: i64,
    release_date: &str,
    description: &str,
    poster: &str,
) -> NewMovie {
    NewMovie {
        title: title.to_string(),
        description: description.to_string(),
        rating,
        release_date: release_date.to_string(),
        duration,
        genre: Vec::new(),
        director: None,
        cast: Vec::new(),
        poster: Some(poster.to_string()),
        imdb_id: None,
    }
}

/// The well-known sample catalog. The ledger seeds itself from this list,
/// and the operator `seed` command upserts it into the record store.
pub fn sample_catalog() -> Vec<NewMovie> {
    vec![
        sample(
            "The Shawshank Redemption",
            9.3,
            142,
            "1994-09-22",
            "Two imprisoned men bond over a number of years, finding solace and eventual \
             redemption through acts of common decency.",
            "https://m.media-amazon.com/images/M/MV5BMDFkYTc0MGEtZmNhMC00ZDIzLWFmNTEtODM1ZmRlYWMwMWFmXkEyXkFqcGdeQXVyMTMxODk2OTU@._V1_FMjpg_UX1000_.jpg",
        ),
        sample(
            "The Godfather",
            9.2,
            175,
            "1972-03-24",
            "The aging patriarch of an organized crime dynasty transfers control of his \
             clandestine empire to his reluctant son.",
            "https://m.media-amazon.com/images/M/MV5BM2MyNjYxNmUtYTAwNi00MTYxLWJmNWYtYzZlODY3ZTk3OTFlXkEyXkFqcGdeQXVyNzkwMjQ5NzM@._V1_FMjpg_UX1000_.jpg",
        ),
        sample(
            "The Dark Knight",
            9.0,
            152,
            "2008-07-18",
            "When the menace known as the Joker wreaks havoc and chaos on the people of \
             Gotham, Batman must accept one of the greatest psychological and physical tests \
             of his ability to fight injustice.",
            "https://image.tmdb.org/t/p/w500/qJ2tW6WMUDux911r6m7haRef0WH.jpg",
        ),
        sample(
            "Pulp Fiction",
            8.9,
            154,
            "1994-10-14",
            "The lives of two mob hitmen, a boxer, a gangster and his wife, and a pair of \
             diner bandits intertwine in four tales of violence and redemption.",
            "https://m.media-amazon.com/images/M/MV5BNGNhMDIzZTUtNTBlZi00MTRlLWFjM2ItYzViMjE3YzI5MjljXkEyXkFqcGdeQXVyNzkwMjQ5NzM@._V1_.jpg",
        ),
        sample(
            "Inception",
            8.8,
            148,
            "2010-07-16",
            "A thief who steals corporate secrets through the use of dream-sharing technology \
             is given the inverse task of planting an idea into the mind of a C.E.O.",
            "https://m.media-amazon.com/images/M/MV5BMjAxMzY3NjcxNF5BMl5BanBnXkFtZTcwNTI5OTM0Mw@@._V1_.jpg",
        ),
    ]
}

/// Ledger seeds carry small fixed ids so offline reads are predictable.
fn seed_movies() -> Vec<Movie> {
    let now = unix_timestamp();
    sample_catalog()
        .into_iter()
        .zip(1..)
        .map(|(new, n): (NewMovie, i64)| Movie {
            id: n.to_string(),
            title: new.title,
            description: new.description,
            rating: new.rating,
            release_date: new.release_date,
            duration: new.duration,
            genre: new.genre,
            director: new.director,
            cast: new.cast,
            poster: new.poster,
            imdb_id: new.imdb_id,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

fn seed_users() -> Vec<LedgerUser> {
    vec![
        LedgerUser {
            id: "admin_offline".to_string(),
            username: "Admin User".to_string(),
            email: "admin@example.com".to_string(),
            password: "password123".to_string(),
            role: Role::Admin,
        },
        LedgerUser {
            id: "user_offline".to_string(),
            username: "Demo User".to_string(),
            email: "demo@example.com".to_string(),
            password: "password123".to_string(),
            role: Role::User,
        },
    ]
}

#[cfg(test)]
mod tests;
