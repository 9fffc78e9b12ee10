//! Combination expansion: cartesian product of creative fragment axes.
//!
//! The generator is a pure function over already-validated fragment ids.
//! Reference validation (ids exist, belong to the ad set, match the axis
//! kind) happens in the API layer against the fragment store; persistence
//! and tuple uniqueness are enforced again by the repository's unique index.

use std::collections::HashSet;

use crate::cta::DEFAULT_CTA_TYPE;
use crate::error::CoreError;
use crate::types::DbId;

/// Hard ceiling on combinations produced by a single generate call.
///
/// A selection whose product exceeds this fails with
/// [`CoreError::CombinationLimitExceeded`] before anything is created.
pub const MAX_GENERATED_COMBINATIONS: u64 = 2_000;

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

/// Resolved fragment ids for each axis of the product.
///
/// Mandatory axes (asset, headline, body, description, CTA text) must be
/// non-empty. Hook and CTA type are optional axes: an empty list collapses
/// the axis to a single "absent" (respectively default) choice instead of
/// zeroing out the product.
#[derive(Debug, Clone, Default)]
pub struct ExpansionAxes {
    pub assets: Vec<DbId>,
    pub hooks: Vec<DbId>,
    pub headlines: Vec<DbId>,
    pub bodies: Vec<DbId>,
    pub descriptions: Vec<DbId>,
    pub cta_texts: Vec<DbId>,
    pub cta_types: Vec<String>,
}

impl ExpansionAxes {
    /// Size of the cartesian product, with optional axes counted as
    /// `max(len, 1)`. Saturates instead of overflowing.
    pub fn product_size(&self) -> u64 {
        let opt = |len: usize| len.max(1) as u64;
        (self.assets.len() as u64)
            .saturating_mul(opt(self.hooks.len()))
            .saturating_mul(self.headlines.len() as u64)
            .saturating_mul(self.bodies.len() as u64)
            .saturating_mul(self.descriptions.len() as u64)
            .saturating_mul(self.cta_texts.len() as u64)
            .saturating_mul(opt(self.cta_types.len()))
    }
}

// ---------------------------------------------------------------------------
// Tuples
// ---------------------------------------------------------------------------

/// The identity of one combination within an ad set.
///
/// Two combinations with equal tuples are the same ad; the repository
/// enforces this with a unique index and the generator skips tuples that
/// already exist in any status.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComboTuple {
    pub asset_id: DbId,
    pub hook_id: Option<DbId>,
    pub headline_id: DbId,
    pub body_id: DbId,
    pub description_id: DbId,
    pub cta_text_id: DbId,
    pub cta_type: String,
}

/// Result of one expansion pass.
#[derive(Debug)]
pub struct Expansion {
    /// Tuples not previously present for the ad set, in product order.
    pub created: Vec<ComboTuple>,
    /// Number of product entries skipped because the tuple already existed.
    pub skipped: usize,
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Expand the axes into all concrete combinations, skipping tuples already
/// present in `existing`.
///
/// Fails with [`CoreError::Validation`] if a mandatory axis is empty and
/// with [`CoreError::CombinationLimitExceeded`] if the product would exceed
/// [`MAX_GENERATED_COMBINATIONS`]. Duplicate ids within one axis are
/// collapsed before expansion so they cannot multiply the product.
pub fn expand(axes: &ExpansionAxes, existing: &HashSet<ComboTuple>) -> Result<Expansion, CoreError> {
    let assets = dedup_ids(&axes.assets);
    let hooks = dedup_ids(&axes.hooks);
    let headlines = dedup_ids(&axes.headlines);
    let bodies = dedup_ids(&axes.bodies);
    let descriptions = dedup_ids(&axes.descriptions);
    let cta_texts = dedup_ids(&axes.cta_texts);
    let mut seen_types = HashSet::new();
    let cta_types: Vec<String> = axes
        .cta_types
        .iter()
        .filter(|t| seen_types.insert(t.as_str().to_owned()))
        .cloned()
        .collect();

    require_non_empty("asset", &assets)?;
    require_non_empty("headline", &headlines)?;
    require_non_empty("body", &bodies)?;
    require_non_empty("description", &descriptions)?;
    require_non_empty("cta_text", &cta_texts)?;

    let deduped = ExpansionAxes {
        assets: assets.clone(),
        hooks: hooks.clone(),
        headlines: headlines.clone(),
        bodies: bodies.clone(),
        descriptions: descriptions.clone(),
        cta_texts: cta_texts.clone(),
        cta_types: cta_types.clone(),
    };
    let requested = deduped.product_size();
    if requested > MAX_GENERATED_COMBINATIONS {
        return Err(CoreError::CombinationLimitExceeded {
            requested,
            max: MAX_GENERATED_COMBINATIONS,
        });
    }

    // Optional axes collapse to a single choice rather than emptying the
    // product.
    let hook_choices: Vec<Option<DbId>> = if hooks.is_empty() {
        vec![None]
    } else {
        hooks.iter().copied().map(Some).collect()
    };
    let cta_type_choices: Vec<&str> = if cta_types.is_empty() {
        vec![DEFAULT_CTA_TYPE]
    } else {
        cta_types.iter().map(String::as_str).collect()
    };

    let mut created = Vec::new();
    let mut skipped = 0usize;
    for &asset_id in &assets {
        for &hook_id in &hook_choices {
            for &headline_id in &headlines {
                for &body_id in &bodies {
                    for &description_id in &descriptions {
                        for &cta_text_id in &cta_texts {
                            for &cta_type in &cta_type_choices {
                                let tuple = ComboTuple {
                                    asset_id,
                                    hook_id,
                                    headline_id,
                                    body_id,
                                    description_id,
                                    cta_text_id,
                                    cta_type: cta_type.to_string(),
                                };
                                if existing.contains(&tuple) {
                                    skipped += 1;
                                } else {
                                    created.push(tuple);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(Expansion { created, skipped })
}

/// Collapse duplicate ids while preserving first-seen order.
fn dedup_ids(ids: &[DbId]) -> Vec<DbId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn require_non_empty(axis: &str, ids: &[DbId]) -> Result<(), CoreError> {
    if ids.is_empty() {
        Err(CoreError::Validation(format!(
            "Cannot generate combinations: no {axis} fragments available for this ad set"
        )))
    } else {
        Ok(())
    }
}
