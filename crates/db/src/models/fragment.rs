//! Fragment entity model and DTOs.
//!
//! One row per creative atom. `content` holds the copy text for copy
//! fragments and the storage path for asset fragments.

use adcraft_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `fragments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fragment {
    pub id: DbId,
    pub ad_set_id: DbId,
    /// One of the `VALID_FRAGMENT_KINDS` strings.
    pub kind: String,
    pub content: String,
    /// `image` or `video`; only set for asset fragments.
    pub media_kind: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub generated_by_ai: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new fragment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFragment {
    pub ad_set_id: DbId,
    pub kind: String,
    pub content: String,
    pub media_kind: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Defaults to false (human-authored) if omitted.
    pub generated_by_ai: Option<bool>,
}
