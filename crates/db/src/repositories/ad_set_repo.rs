//! Repository for the `ad_sets` table.
//!
//! Only the operations this engine needs: full ad set CRUD belongs to the
//! campaign management service.

use adcraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::ad_set::{AdSet, CreateAdSet};

const COLUMNS: &str = "id, name, external_id, created_at, updated_at";

pub struct AdSetRepo;

impl AdSetRepo {
    /// Insert a new ad set, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAdSet) -> Result<AdSet, sqlx::Error> {
        let query = format!(
            "INSERT INTO ad_sets (name, external_id) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdSet>(&query)
            .bind(&input.name)
            .bind(&input.external_id)
            .fetch_one(pool)
            .await
    }

    /// Find an ad set by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AdSet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ad_sets WHERE id = $1");
        sqlx::query_as::<_, AdSet>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
