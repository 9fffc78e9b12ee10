//! Asynchronous orchestration: the variant generation pipeline and the
//! deployment orchestrator.
//!
//! Both components fan out to external APIs under bounded concurrency and
//! turn per-item failures into structured results instead of aborting the
//! batch.

pub mod deploy;
pub mod events;
pub mod variant;

pub use deploy::{DeployError, DeployItem, DeployOrchestrator, DeployRequest, DeploySummary};
pub use events::VariantEvent;
pub use variant::{VariantPipeline, VariantRequest};
