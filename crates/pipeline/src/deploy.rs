//! The deployment orchestrator.
//!
//! Takes a batch of combination ids, claims each one exactly once, submits
//! the claimed ones to the ad platform under bounded concurrency, and
//! records per-item outcomes. One platform failure never aborts the batch;
//! only a bad ad set reference fails the whole call.

use std::collections::HashMap;
use std::sync::Arc;

use adcraft_core::error::CoreError;
use adcraft_core::types::DbId;
use adcraft_db::models::combination::Combination;
use adcraft_db::models::fragment::Fragment;
use adcraft_db::repositories::{AdSetRepo, CombinationRepo, FragmentRepo};
use adcraft_platform::{ActivationState, AdPlatform, CreativeSpec};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Default bound on concurrent platform calls per deploy batch.
pub const DEFAULT_DEPLOY_CONCURRENCY: usize = 4;

/// Failure reason recorded when an internal error aborts the batch with
/// claims still open.
const ABORT_REASON: &str = "deployment aborted by internal error";

/// One deployment request.
#[derive(Debug, Clone)]
pub struct DeployRequest {
    /// The platform ad account to create ads under. Always explicit,
    /// never ambient session state.
    pub ad_account_id: String,
    pub ad_set_id: DbId,
    pub combination_ids: Vec<DbId>,
    /// Applied uniformly to every item in the batch.
    pub activation: ActivationState,
}

/// Per-combination deployment outcome.
#[derive(Debug, Clone, Serialize)]
pub struct DeployItem {
    pub combination_id: DbId,
    pub success: bool,
    pub external_ad_id: Option<String>,
    pub error: Option<String>,
}

/// Aggregate result of one deploy call.
#[derive(Debug, Clone, Serialize)]
pub struct DeploySummary {
    pub deployed: u64,
    pub failed: u64,
    pub per_item: Vec<DeployItem>,
}

/// Whole-call failures. Per-item failures are data in [`DeploySummary`].
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Orchestrates ad deployment batches. Shared behind an `Arc`.
pub struct DeployOrchestrator {
    pool: PgPool,
    platform: Arc<dyn AdPlatform>,
    concurrency: usize,
}

impl DeployOrchestrator {
    pub fn new(pool: PgPool, platform: Arc<dyn AdPlatform>, concurrency: usize) -> Self {
        Self {
            pool,
            platform,
            concurrency: concurrency.max(1),
        }
    }

    /// Deploy a batch of combinations. Returns per-item outcomes in the
    /// order the ids were supplied.
    pub async fn deploy(&self, request: DeployRequest) -> Result<DeploySummary, DeployError> {
        let ad_set = AdSetRepo::find_by_id(&self.pool, request.ad_set_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "AdSet",
                id: request.ad_set_id,
            })?;
        let adset_external_id = ad_set.external_id.ok_or_else(|| {
            CoreError::Validation(format!(
                "Ad set {} is not linked to the ad platform",
                request.ad_set_id
            ))
        })?;

        tracing::info!(
            ad_set_id = request.ad_set_id,
            batch = request.combination_ids.len(),
            account = %request.ad_account_id,
            "Starting deployment batch"
        );

        let mut per_item: Vec<Option<DeployItem>> = vec![None; request.combination_ids.len()];
        let mut claimed: Vec<(usize, Combination, CreativeSpec)> = Vec::new();

        // Claim phase: flip each id to `deploying` exactly once and resolve
        // its creative. Unclaimable or unresolvable ids become failed items
        // without ever reaching the platform.
        for (index, &id) in request.combination_ids.iter().enumerate() {
            let combination =
                match CombinationRepo::claim_for_deploy(&self.pool, request.ad_set_id, id).await {
                    Ok(Some(c)) => c,
                    Ok(None) => {
                        per_item[index] = Some(DeployItem {
                            combination_id: id,
                            success: false,
                            external_ad_id: None,
                            error: Some(
                                "not deployable: missing, already deployed, or deploy in progress"
                                    .to_string(),
                            ),
                        });
                        continue;
                    }
                    Err(e) => {
                        let held: Vec<DbId> = claimed.iter().map(|(_, c, _)| c.id).collect();
                        self.release_claims(&held, ABORT_REASON).await;
                        return Err(e.into());
                    }
                };

            match self.resolve_creative(&combination, &adset_external_id).await {
                Ok(spec) => claimed.push((index, combination, spec)),
                Err(message) => {
                    if let Err(e) =
                        CombinationRepo::mark_deploy_failed(&self.pool, id, &message).await
                    {
                        let mut held: Vec<DbId> = claimed.iter().map(|(_, c, _)| c.id).collect();
                        held.push(id);
                        self.release_claims(&held, ABORT_REASON).await;
                        return Err(e.into());
                    }
                    per_item[index] = Some(DeployItem {
                        combination_id: id,
                        success: false,
                        external_ad_id: None,
                        error: Some(message),
                    });
                }
            }
        }

        // Submission phase: independent platform calls, bounded, failures
        // isolated per item.
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut pending: Vec<(usize, DbId)> = claimed.iter().map(|(i, c, _)| (*i, c.id)).collect();
        let mut set = JoinSet::new();
        for (index, combination, spec) in claimed {
            let platform = Arc::clone(&self.platform);
            let semaphore = Arc::clone(&semaphore);
            let account = request.ad_account_id.clone();
            let activation = request.activation;
            set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        index,
                        combination.id,
                        Err("deployment pool closed".to_string()),
                    );
                };
                let result = platform
                    .create_ad(&account, &spec, activation)
                    .await
                    .map_err(|e| e.to_string());
                (index, combination.id, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            let (index, id, result) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    // A panicked submission task never reports back; its
                    // row is reverted from `pending` after this loop.
                    tracing::error!(error = %e, "Deployment task panicked");
                    continue;
                }
            };
            pending.retain(|&(_, pid)| pid != id);
            let item = match result {
                Ok(external_ad_id) => {
                    match CombinationRepo::mark_deployed(&self.pool, id, &external_ad_id).await {
                        Ok(_) => DeployItem {
                            combination_id: id,
                            success: true,
                            external_ad_id: Some(external_ad_id),
                            error: None,
                        },
                        Err(e) => {
                            let mut held: Vec<DbId> =
                                pending.iter().map(|&(_, pid)| pid).collect();
                            held.push(id);
                            self.release_claims(&held, ABORT_REASON).await;
                            return Err(e.into());
                        }
                    }
                }
                Err(message) => {
                    tracing::warn!(combination_id = id, error = %message, "Deployment failed");
                    match CombinationRepo::mark_deploy_failed(&self.pool, id, &message).await {
                        Ok(_) => DeployItem {
                            combination_id: id,
                            success: false,
                            external_ad_id: None,
                            error: Some(message),
                        },
                        Err(e) => {
                            let mut held: Vec<DbId> =
                                pending.iter().map(|&(_, pid)| pid).collect();
                            held.push(id);
                            self.release_claims(&held, ABORT_REASON).await;
                            return Err(e.into());
                        }
                    }
                }
            };
            per_item[index] = Some(item);
        }

        // Rows whose submission task panicked are still claimed. Revert
        // them so the combinations stay retryable.
        for (index, id) in pending {
            self.release_claims(&[id], "deployment task failed unexpectedly")
                .await;
            per_item[index] = Some(DeployItem {
                combination_id: id,
                success: false,
                external_ad_id: None,
                error: Some("deployment task failed unexpectedly".to_string()),
            });
        }

        let per_item: Vec<DeployItem> = per_item
            .into_iter()
            .zip(&request.combination_ids)
            .map(|(item, &id)| {
                item.unwrap_or(DeployItem {
                    combination_id: id,
                    success: false,
                    external_ad_id: None,
                    error: Some("deployment task failed unexpectedly".to_string()),
                })
            })
            .collect();

        let deployed = per_item.iter().filter(|i| i.success).count() as u64;
        let failed = per_item.len() as u64 - deployed;
        tracing::info!(
            ad_set_id = request.ad_set_id,
            deployed,
            failed,
            "Deployment batch finished"
        );
        Ok(DeploySummary {
            deployed,
            failed,
            per_item,
        })
    }

    /// Best-effort revert of claims that never reached a terminal state.
    /// `deploy_failed` is retryable; a row stuck in `deploying` is not.
    async fn release_claims(&self, ids: &[DbId], reason: &str) {
        for &id in ids {
            if let Err(e) = CombinationRepo::mark_deploy_failed(&self.pool, id, reason).await {
                tracing::error!(
                    combination_id = id,
                    error = %e,
                    "Failed to release deploy claim"
                );
            }
        }
    }

    /// Load the combination's fragments and assemble the platform creative.
    /// A dangling fragment reference is that item's failure, not ours.
    async fn resolve_creative(
        &self,
        combination: &Combination,
        adset_external_id: &str,
    ) -> Result<CreativeSpec, String> {
        let mut ids = vec![
            combination.asset_id,
            combination.headline_id,
            combination.body_id,
            combination.description_id,
            combination.cta_text_id,
        ];
        if let Some(hook_id) = combination.hook_id {
            ids.push(hook_id);
        }

        let fragments = FragmentRepo::find_many(&self.pool, &ids)
            .await
            .map_err(|e| format!("cannot load fragments: {e}"))?;
        let by_id: HashMap<DbId, &Fragment> = fragments.iter().map(|f| (f.id, f)).collect();

        let content = |id: DbId, what: &str| -> Result<String, String> {
            by_id
                .get(&id)
                .map(|f| f.content.clone())
                .ok_or_else(|| format!("{what} fragment {id} no longer exists"))
        };

        Ok(CreativeSpec {
            asset_path: content(combination.asset_id, "asset")?,
            hook: match combination.hook_id {
                Some(id) => Some(content(id, "hook")?),
                None => None,
            },
            headline: content(combination.headline_id, "headline")?,
            body: content(combination.body_id, "body")?,
            description: content(combination.description_id, "description")?,
            cta_text: content(combination.cta_text_id, "cta_text")?,
            cta_type: combination.cta_type.clone(),
            adset_external_id: adset_external_id.to_string(),
        })
    }
}
