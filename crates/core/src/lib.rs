//! Pure domain logic for the ad creative engine.
//!
//! Zero internal dependencies and no I/O: fragment taxonomy, the CTA type
//! catalogue, combination expansion, and the scoring heuristics all live
//! here so they can be exercised without a database or network.

pub mod combo;
pub mod cta;
pub mod error;
pub mod fragment;
pub mod scoring;
pub mod types;
