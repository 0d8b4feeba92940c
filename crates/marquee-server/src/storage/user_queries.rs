//! User queries for the catalog store.

use marquee_core::Role;
use marquee_core::db::{DatabaseError, unix_timestamp};

use super::db::CatalogDatabase;
use super::models::{StoredUser, UserRow};

impl CatalogDatabase {
    /// Create a new user with an already-hashed password.
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<StoredUser, DatabaseError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = unix_timestamp();

        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        self.get_user(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Get a user by id.
    pub async fn get_user(&self, id: &str) -> Result<Option<StoredUser>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .map(UserRow::into_user)
            .transpose()
    }

    /// Find a user by normalized email.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?
            .map(UserRow::into_user)
            .transpose()
    }

    /// Duplicate probe used at registration.
    pub async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<StoredUser>, DatabaseError> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ? OR email = ? LIMIT 1")
            .bind(username)
            .bind(email)
            .fetch_optional(self.pool())
            .await?
            .map(UserRow::into_user)
            .transpose()
    }

    /// Promote an existing user to admin (out-of-band operator path).
    pub async fn promote_to_admin(&self, id: &str) -> Result<StoredUser, DatabaseError> {
        let result = sqlx::query("UPDATE users SET role = 'admin', updated_at = ? WHERE id = ?")
            .bind(unix_timestamp())
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        self.get_user(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }
}
