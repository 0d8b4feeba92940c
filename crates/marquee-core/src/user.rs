//! User domain model, roles, and auth-input validation.

use serde::{Deserialize, Serialize};

use crate::validate::FieldError;

/// Closed set of roles. Authorization matches on this enum exhaustively so a
/// typo in stored data can never silently grant access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Parse the stored role string; unknown values are rejected.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// User identity as returned by the API (never includes the password).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Unvalidated registration payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A validated, normalized registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    /// Lowercased and trimmed.
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    /// Validate username length, email shape, and password length; normalize
    /// the email to lowercase.
    pub fn validate(self) -> Result<NewUser, Vec<FieldError>> {
        let mut errors = Vec::new();

        let username = self.username.trim().to_string();
        if username.len() < 3 || username.len() > 30 {
            errors.push(FieldError::new(
                "username",
                "Username must be between 3 and 30 characters",
            ));
        }

        let email = self.email.trim().to_lowercase();
        if !is_well_formed_email(&email) {
            errors.push(FieldError::new("email", "Please provide a valid email"));
        }

        if self.password.len() < 6 {
            errors.push(FieldError::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewUser {
            username,
            email,
            password: self.password,
        })
    }
}

/// Unvalidated login payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if !is_well_formed_email(self.email.trim()) {
            errors.push(FieldError::new("email", "Please provide a valid email"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Minimal email shape check: `local@domain.tld`, no whitespace.
fn is_well_formed_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
