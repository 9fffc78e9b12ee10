//! Typed event protocol for variant generation jobs.
//!
//! The stream is the only way a caller observes a job. Events advance
//! monotonically: `Analyzing` -> `Analyzed` -> interleaved `Processing` and
//! per-slot terminal events (in resolution order, not slot order) -> one
//! final `Done`. A fatal analysis failure short-circuits to `Error`.

use adcraft_db::models::fragment::Fragment;
use serde::Serialize;

/// One event in a variant generation job's stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VariantEvent {
    /// Phase 1 started: the source asset is being analyzed.
    Analyzing,

    /// Phase 1 finished; all slot prompts are grounded on this description.
    Analyzed { description: String },

    /// `progress` of `total` slots have resolved.
    Processing { progress: u32, total: u32 },

    /// A slot produced and persisted a new asset fragment.
    SlotComplete { slot: u32, asset: Fragment },

    /// A slot failed; the job continues with the remaining slots.
    SlotError { slot: u32, message: String },

    /// All slots resolved. Lists every persisted asset and every slot
    /// error message, in resolution order.
    Done {
        assets: Vec<Fragment>,
        errors: Vec<String>,
    },

    /// The job failed as a whole (analysis failure). Terminal.
    Error { message: String },
}
