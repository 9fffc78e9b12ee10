//! Repository for the `combinations` table.
//!
//! The "deployed rows are locked" invariant is enforced here: every
//! mutating query carries a `status <> 'deployed'` guard, and the claim
//! used by the deployment orchestrator flips status atomically so two
//! concurrent deploy calls can never both submit the same combination.

use adcraft_core::combo::ComboTuple;
use adcraft_core::types::DbId;
use sqlx::PgPool;

use crate::models::combination::{BulkDeleteResult, Combination, NewCombination};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ad_set_id, asset_id, hook_id, headline_id, body_id, \
    description_id, cta_text_id, cta_type, score_hook, score_alignment, score_fit, \
    score_clarity, score_match, score_overall, predicted_engagement, status, \
    external_ad_id, deploy_error, created_at, updated_at";

/// Result of a single-row mutation that may hit the deployed-row lock.
#[derive(Debug)]
pub enum MutationOutcome<T> {
    Applied(T),
    /// The row exists but is deployed and locked against modification.
    Locked,
    NotFound,
}

/// Provides CRUD and lifecycle operations for combinations.
pub struct CombinationRepo;

impl CombinationRepo {
    /// Insert a batch of freshly generated combinations in one transaction,
    /// returning the created rows in input order.
    ///
    /// All rows begin in status `pending`. The `uq_combinations_tuple`
    /// index is the last line of defence against duplicate tuples; callers
    /// are expected to have de-duplicated against [`existing_tuples`]
    /// under the ad set's write lock first.
    ///
    /// [`existing_tuples`]: Self::existing_tuples
    pub async fn create_many(
        pool: &PgPool,
        ad_set_id: DbId,
        rows: &[NewCombination],
    ) -> Result<Vec<Combination>, sqlx::Error> {
        let query = format!(
            "INSERT INTO combinations
                (ad_set_id, asset_id, hook_id, headline_id, body_id, description_id,
                 cta_text_id, cta_type, score_hook, score_alignment, score_fit,
                 score_clarity, score_match, score_overall, predicted_engagement)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut created = Vec::with_capacity(rows.len());
        for row in rows {
            let combination = sqlx::query_as::<_, Combination>(&query)
                .bind(ad_set_id)
                .bind(row.tuple.asset_id)
                .bind(row.tuple.hook_id)
                .bind(row.tuple.headline_id)
                .bind(row.tuple.body_id)
                .bind(row.tuple.description_id)
                .bind(row.tuple.cta_text_id)
                .bind(&row.tuple.cta_type)
                .bind(row.scores.hook)
                .bind(row.scores.alignment)
                .bind(row.scores.fit)
                .bind(row.scores.clarity)
                .bind(row.scores.matching)
                .bind(row.scores.overall)
                .bind(row.predicted_engagement)
                .fetch_one(&mut *tx)
                .await?;
            created.push(combination);
        }
        tx.commit().await?;
        Ok(created)
    }

    /// Find a combination by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Combination>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM combinations WHERE id = $1");
        sqlx::query_as::<_, Combination>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all combinations for an ad set, best scoring first.
    pub async fn list_by_adset(
        pool: &PgPool,
        ad_set_id: DbId,
    ) -> Result<Vec<Combination>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM combinations
             WHERE ad_set_id = $1
             ORDER BY score_overall DESC, id ASC"
        );
        sqlx::query_as::<_, Combination>(&query)
            .bind(ad_set_id)
            .fetch_all(pool)
            .await
    }

    /// All tuples currently present for an ad set, in any status.
    /// Used by the generator for de-duplication.
    pub async fn existing_tuples(
        pool: &PgPool,
        ad_set_id: DbId,
    ) -> Result<Vec<ComboTuple>, sqlx::Error> {
        let rows: Vec<(DbId, Option<DbId>, DbId, DbId, DbId, DbId, String)> = sqlx::query_as(
            "SELECT asset_id, hook_id, headline_id, body_id, description_id,
                    cta_text_id, cta_type
             FROM combinations WHERE ad_set_id = $1",
        )
        .bind(ad_set_id)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(asset_id, hook_id, headline_id, body_id, description_id, cta_text_id, cta_type)| {
                    ComboTuple {
                        asset_id,
                        hook_id,
                        headline_id,
                        body_id,
                        description_id,
                        cta_text_id,
                        cta_type,
                    }
                },
            )
            .collect())
    }

    /// Delete one combination unless it is deployed.
    pub async fn delete(
        pool: &PgPool,
        ad_set_id: DbId,
        id: DbId,
    ) -> Result<MutationOutcome<()>, sqlx::Error> {
        let deleted: Option<(DbId,)> = sqlx::query_as(
            "DELETE FROM combinations
             WHERE id = $1 AND ad_set_id = $2 AND status <> 'deployed'
             RETURNING id",
        )
        .bind(id)
        .bind(ad_set_id)
        .fetch_optional(pool)
        .await?;

        if deleted.is_some() {
            return Ok(MutationOutcome::Applied(()));
        }
        Self::classify_miss(pool, ad_set_id, id).await
    }

    /// Delete a batch of combinations. Deployed rows are skipped, not
    /// errors: the call reports counts for a mixed batch.
    pub async fn delete_many(
        pool: &PgPool,
        ad_set_id: DbId,
        ids: &[DbId],
    ) -> Result<BulkDeleteResult, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (locked,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM combinations
             WHERE id = ANY($1) AND ad_set_id = $2 AND status = 'deployed'",
        )
        .bind(ids)
        .bind(ad_set_id)
        .fetch_one(&mut *tx)
        .await?;

        let result = sqlx::query(
            "DELETE FROM combinations
             WHERE id = ANY($1) AND ad_set_id = $2 AND status <> 'deployed'",
        )
        .bind(ids)
        .bind(ad_set_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(BulkDeleteResult {
            deleted: result.rows_affected(),
            skipped: locked as u64,
        })
    }

    /// Change the CTA button type of one combination unless it is deployed.
    pub async fn update_cta_type(
        pool: &PgPool,
        ad_set_id: DbId,
        id: DbId,
        cta_type: &str,
    ) -> Result<MutationOutcome<Combination>, sqlx::Error> {
        let query = format!(
            "UPDATE combinations
             SET cta_type = $3, updated_at = now()
             WHERE id = $1 AND ad_set_id = $2 AND status <> 'deployed'
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Combination>(&query)
            .bind(id)
            .bind(ad_set_id)
            .bind(cta_type)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(row) => Ok(MutationOutcome::Applied(row)),
            None => match Self::classify_miss(pool, ad_set_id, id).await? {
                MutationOutcome::NotFound => Ok(MutationOutcome::NotFound),
                _ => Ok(MutationOutcome::Locked),
            },
        }
    }

    /// Atomically claim a combination for deployment by flipping its status
    /// to `deploying`. Returns `None` if the row is missing, already
    /// deployed, or currently being deployed by another call -- the caller
    /// must not submit it to the platform in that case.
    pub async fn claim_for_deploy(
        pool: &PgPool,
        ad_set_id: DbId,
        id: DbId,
    ) -> Result<Option<Combination>, sqlx::Error> {
        let query = format!(
            "UPDATE combinations
             SET status = 'deploying', deploy_error = NULL, updated_at = now()
             WHERE id = $1 AND ad_set_id = $2
               AND status NOT IN ('deployed', 'deploying')
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Combination>(&query)
            .bind(id)
            .bind(ad_set_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful deployment: terminal status plus the platform's
    /// ad identifier. Only valid from `deploying`.
    pub async fn mark_deployed(
        pool: &PgPool,
        id: DbId,
        external_ad_id: &str,
    ) -> Result<Option<Combination>, sqlx::Error> {
        let query = format!(
            "UPDATE combinations
             SET status = 'deployed', external_ad_id = $2, deploy_error = NULL,
                 updated_at = now()
             WHERE id = $1 AND status = 'deploying'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Combination>(&query)
            .bind(id)
            .bind(external_ad_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a failed deployment, retaining the platform's error message.
    /// Reverts the `deploying` claim so the combination can be retried.
    pub async fn mark_deploy_failed(
        pool: &PgPool,
        id: DbId,
        error: &str,
    ) -> Result<Option<Combination>, sqlx::Error> {
        let query = format!(
            "UPDATE combinations
             SET status = 'deploy_failed', deploy_error = $2, updated_at = now()
             WHERE id = $1 AND status = 'deploying'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Combination>(&query)
            .bind(id)
            .bind(error)
            .fetch_optional(pool)
            .await
    }

    /// Distinguish "row is deployed/locked" from "row does not exist" after
    /// a guarded mutation matched nothing.
    async fn classify_miss(
        pool: &PgPool,
        ad_set_id: DbId,
        id: DbId,
    ) -> Result<MutationOutcome<()>, sqlx::Error> {
        let exists: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM combinations WHERE id = $1 AND ad_set_id = $2",
        )
        .bind(id)
        .bind(ad_set_id)
        .fetch_optional(pool)
        .await?;

        Ok(if exists.is_some() {
            MutationOutcome::Locked
        } else {
            MutationOutcome::NotFound
        })
    }
}
