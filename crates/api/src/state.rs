use std::sync::Arc;

use adcraft_pipeline::{DeployOrchestrator, VariantPipeline};

use crate::config::ServerConfig;
use crate::locks::AdsetLocks;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: adcraft_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Per-ad-set write locks for combination generation.
    pub locks: Arc<AdsetLocks>,
    /// Variant generation pipeline (generative-image API).
    pub variant_pipeline: Arc<VariantPipeline>,
    /// Deployment orchestrator (ad platform API).
    pub deploy_orchestrator: Arc<DeployOrchestrator>,
}
