//! Offset/limit pagination for CircleCI list endpoints.
//!
//! The v1.1 API pages build lists with `offset` and `limit` query keys. The
//! client passes them through untouched and never follows pages itself.

use serde::{Deserialize, Serialize};

/// Default number of builds per request (the API's own default).
pub const DEFAULT_LIMIT: u32 = 30;

/// Largest page the API will return.
pub const MAX_LIMIT: u32 = 100;

/// Query parameters for paginated requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Number of items to return.
    pub limit: u32,
    /// Index of the first item, counted from the most recent.
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Create pagination parameters.
    #[must_use]
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}
