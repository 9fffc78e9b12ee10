//! Repository for the `fragments` table (the component store).

use adcraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::fragment::{CreateFragment, Fragment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ad_set_id, kind, content, media_kind, width, height, \
    generated_by_ai, created_at, updated_at";

/// Provides CRUD operations for creative fragments.
pub struct FragmentRepo;

impl FragmentRepo {
    /// Insert a new fragment, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateFragment) -> Result<Fragment, sqlx::Error> {
        let query = format!(
            "INSERT INTO fragments
                (ad_set_id, kind, content, media_kind, width, height, generated_by_ai)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Fragment>(&query)
            .bind(input.ad_set_id)
            .bind(&input.kind)
            .bind(&input.content)
            .bind(&input.media_kind)
            .bind(input.width)
            .bind(input.height)
            .bind(input.generated_by_ai)
            .fetch_one(pool)
            .await
    }

    /// Find a fragment by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Fragment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fragments WHERE id = $1");
        sqlx::query_as::<_, Fragment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch a batch of fragments by id, in no particular order.
    ///
    /// Missing ids are simply absent from the result; the caller decides
    /// whether that is an error.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Fragment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM fragments WHERE id = ANY($1)");
        sqlx::query_as::<_, Fragment>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List all fragments for an ad set, newest first.
    pub async fn list_by_adset(
        pool: &PgPool,
        ad_set_id: DbId,
    ) -> Result<Vec<Fragment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fragments
             WHERE ad_set_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Fragment>(&query)
            .bind(ad_set_id)
            .fetch_all(pool)
            .await
    }

    /// List fragments of one kind for an ad set, newest first.
    pub async fn list_by_adset_and_kind(
        pool: &PgPool,
        ad_set_id: DbId,
        kind: &str,
    ) -> Result<Vec<Fragment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM fragments
             WHERE ad_set_id = $1 AND kind = $2
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Fragment>(&query)
            .bind(ad_set_id)
            .bind(kind)
            .fetch_all(pool)
            .await
    }

    /// Delete a fragment. Fails with a foreign key violation if any
    /// combination still references it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM fragments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
