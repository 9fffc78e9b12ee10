//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod ad_set_repo;
pub mod combination_repo;
pub mod fragment_repo;

pub use ad_set_repo::AdSetRepo;
pub use combination_repo::{CombinationRepo, MutationOutcome};
pub use fragment_repo::FragmentRepo;
