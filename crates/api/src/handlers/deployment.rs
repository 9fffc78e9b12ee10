//! Handlers for the `/deployment` resource.

use adcraft_core::types::DbId;
use adcraft_pipeline::{DeployRequest, DeploySummary};
use adcraft_platform::ActivationState;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of one deploy call.
#[derive(Debug, Deserialize)]
pub struct DeployBody {
    pub ad_account_id: String,
    pub adset_id: DbId,
    pub combination_ids: Vec<DbId>,
    /// Whether created ads start serving (`active`) or sit `paused`.
    pub status: ActivationState,
}

/// POST /api/v1/deployment/deploy
///
/// Submit a batch of combinations to the ad platform. Individual platform
/// failures are reported per item; only an unknown or unlinked ad set
/// fails the whole call.
pub async fn deploy(
    State(state): State<AppState>,
    Json(body): Json<DeployBody>,
) -> AppResult<Json<DataResponse<DeploySummary>>> {
    let summary = state
        .deploy_orchestrator
        .deploy(DeployRequest {
            ad_account_id: body.ad_account_id,
            ad_set_id: body.adset_id,
            combination_ids: body.combination_ids,
            activation: body.status,
        })
        .await?;
    Ok(Json(DataResponse { data: summary }))
}
