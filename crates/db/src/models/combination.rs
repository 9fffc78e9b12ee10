//! Combination entity model, lifecycle status, and DTOs.

use adcraft_core::combo::ComboTuple;
use adcraft_core::scoring::CombinationScores;
use adcraft_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle status of a combination. Mirrors the `combination_status`
/// Postgres enum. `Deployed` is terminal: deployed rows are locked against
/// deletion, CTA edits, and re-deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "combination_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CombinationStatus {
    Pending,
    Selected,
    Deploying,
    Deployed,
    DeployFailed,
}

/// A row from the `combinations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Combination {
    pub id: DbId,
    pub ad_set_id: DbId,
    pub asset_id: DbId,
    pub hook_id: Option<DbId>,
    pub headline_id: DbId,
    pub body_id: DbId,
    pub description_id: DbId,
    pub cta_text_id: DbId,
    pub cta_type: String,
    pub score_hook: i16,
    pub score_alignment: i16,
    pub score_fit: i16,
    pub score_clarity: i16,
    pub score_match: i16,
    pub score_overall: i16,
    pub predicted_engagement: f32,
    pub status: CombinationStatus,
    /// Identifier assigned by the ad platform once deployed.
    pub external_ad_id: Option<String>,
    /// Platform error message from the last failed deployment, if any.
    pub deploy_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Combination {
    /// The tuple identity of this combination, for de-duplication.
    pub fn tuple(&self) -> ComboTuple {
        ComboTuple {
            asset_id: self.asset_id,
            hook_id: self.hook_id,
            headline_id: self.headline_id,
            body_id: self.body_id,
            description_id: self.description_id,
            cta_text_id: self.cta_text_id,
            cta_type: self.cta_type.clone(),
        }
    }
}

/// Insert payload for one freshly generated and scored combination.
#[derive(Debug, Clone)]
pub struct NewCombination {
    pub tuple: ComboTuple,
    pub scores: CombinationScores,
    pub predicted_engagement: f32,
}

/// Outcome counts of a bulk delete over a mixed batch.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BulkDeleteResult {
    /// Rows actually removed.
    pub deleted: u64,
    /// Rows skipped because they are deployed (locked).
    pub skipped: u64,
}
