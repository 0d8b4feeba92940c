//! Field-level validation errors surfaced in API responses.

use serde::{Deserialize, Serialize};

/// A single validation failure tied to an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending input field.
    pub field: String,
    /// Human-readable description of the failure.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}
