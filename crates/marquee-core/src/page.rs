//! Pagination parameters and the response pagination block.

use serde::{Deserialize, Serialize};

use crate::validate::FieldError;

/// Validated pagination parameters (defaults: page 1, limit 10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Validate raw query values; `None` means "use the default".
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let page = page.unwrap_or(1);
        if page < 1 {
            errors.push(FieldError::new("page", "Page must be a positive integer"));
        }

        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if limit < 1 || limit > Self::MAX_LIMIT {
            errors.push(FieldError::new("limit", "Limit must be between 1 and 100"));
        }

        if errors.is_empty() {
            Ok(Self { page, limit })
        } else {
            Err(errors)
        }
    }

    /// Records to skip before this page starts. Saturates rather than
    /// overflowing for absurdly large page numbers.
    pub const fn skip(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    /// `ceil(total / limit)`; 0 when the result set is empty.
    pub pages: i64,
}

impl Pagination {
    // `i64::div_ceil` is not stable; spell the rounding out.
    #[allow(clippy::manual_div_ceil)]
    pub const fn new(params: PageParams, total: i64) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            total,
            pages: (total + params.limit - 1) / params.limit,
        }
    }
}
