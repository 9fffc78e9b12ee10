//! Ad set entity model.
//!
//! Ad set CRUD lives outside this engine; the table exists as the owner of
//! fragments and combinations, so only a minimal model is needed here.

use adcraft_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `ad_sets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdSet {
    pub id: DbId,
    pub name: String,
    /// Identifier of the ad set on the external ad platform, if linked.
    pub external_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new ad set.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAdSet {
    pub name: String,
    pub external_id: Option<String>,
}
