use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A supplied fragment id does not exist, belongs to another ad set,
    /// or is of a different kind than the axis it was supplied for.
    #[error("Invalid fragment reference: {0}")]
    InvalidFragmentReference(String),

    /// The requested cartesian product exceeds the generation ceiling.
    /// Callers must narrow their selection; nothing is truncated silently.
    #[error("Combination limit exceeded: selection would produce {requested} combinations (max {max})")]
    CombinationLimitExceeded { requested: u64, max: u64 },

    /// The combination has been deployed and can no longer be deleted,
    /// edited, or re-deployed.
    #[error("Combination {id} is deployed and locked against modification")]
    CombinationLocked { id: DbId },
}
