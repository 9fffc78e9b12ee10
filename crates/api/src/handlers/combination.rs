//! Handlers for the `/ad-sets/{adset_id}/combinations` resource.
//!
//! The generate handler owns the orchestration the core crate stays pure
//! of: resolving axis selections against the fragment store, serializing
//! writers per ad set, de-duplicating against persisted tuples, scoring,
//! and persisting the batch.

use std::collections::{HashMap, HashSet};

use adcraft_core::combo::{self, ComboTuple, ExpansionAxes};
use adcraft_core::cta::validate_cta_type;
use adcraft_core::error::CoreError;
use adcraft_core::fragment::{FragmentKind, KIND_ASSET};
use adcraft_core::scoring::{self, AssetInfo, ScoringInput};
use adcraft_core::types::DbId;
use adcraft_db::models::combination::{BulkDeleteResult, Combination, NewCombination};
use adcraft_db::models::fragment::Fragment;
use adcraft_db::repositories::{CombinationRepo, FragmentRepo, MutationOutcome};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::fragment::ensure_adset_exists;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Axis selections for one generate call. Every field is optional; an
/// omitted or empty axis means "use all fragments of that kind" (for CTA
/// types: the default type only).
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub assets: Vec<DbId>,
    #[serde(default)]
    pub hooks: Vec<DbId>,
    #[serde(default)]
    pub headlines: Vec<DbId>,
    #[serde(default)]
    pub bodies: Vec<DbId>,
    #[serde(default)]
    pub descriptions: Vec<DbId>,
    #[serde(default)]
    pub cta_texts: Vec<DbId>,
    #[serde(default)]
    pub cta_types: Vec<String>,
}

/// Result of one generate call.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// Newly created combinations, in product order.
    pub combinations: Vec<Combination>,
    pub created: usize,
    /// Product entries skipped because the tuple already existed.
    pub skipped: usize,
    /// Working-set default for immediate bulk action: all created ids.
    pub selected_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub combination_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCtaTypeRequest {
    pub cta_type: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/ad-sets/{adset_id}/combinations
///
/// List the ad set's combinations, best scoring first.
pub async fn list(
    State(state): State<AppState>,
    Path(adset_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Combination>>>> {
    ensure_adset_exists(&state, adset_id).await?;
    let combinations = CombinationRepo::list_by_adset(&state.pool, adset_id).await?;
    Ok(Json(DataResponse { data: combinations }))
}

/// POST /api/v1/ad-sets/{adset_id}/combinations/generate
///
/// Expand the selected axes into scored combinations. Returns 422 when a
/// referenced fragment is invalid or the product exceeds the generation
/// ceiling; nothing is persisted in either case.
pub async fn generate(
    State(state): State<AppState>,
    Path(adset_id): Path<DbId>,
    Json(request): Json<GenerateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<GenerateResponse>>)> {
    ensure_adset_exists(&state, adset_id).await?;

    for cta_type in &request.cta_types {
        validate_cta_type(cta_type)?;
    }

    // Serialize generate calls per ad set: dedup reads the persisted
    // tuple set before inserting.
    let _write_guard = state.locks.acquire(adset_id).await;

    let (axes, fragments) = resolve_axes(&state, adset_id, &request).await?;

    let existing: HashSet<ComboTuple> = CombinationRepo::existing_tuples(&state.pool, adset_id)
        .await?
        .into_iter()
        .collect();
    let expansion = combo::expand(&axes, &existing)?;

    let mut rows = Vec::with_capacity(expansion.created.len());
    for tuple in &expansion.created {
        let scores = score_tuple(tuple, &fragments)?;
        let predicted_engagement = scoring::predicted_engagement(scores.overall);
        rows.push(NewCombination {
            tuple: tuple.clone(),
            scores,
            predicted_engagement,
        });
    }

    let combinations = CombinationRepo::create_many(&state.pool, adset_id, &rows).await?;
    tracing::info!(
        adset_id,
        created = combinations.len(),
        skipped = expansion.skipped,
        "Generated combinations"
    );

    let selected_ids: Vec<DbId> = combinations.iter().map(|c| c.id).collect();
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: GenerateResponse {
                created: combinations.len(),
                skipped: expansion.skipped,
                selected_ids,
                combinations,
            },
        }),
    ))
}

/// PUT /api/v1/ad-sets/{adset_id}/combinations/{id}
///
/// Change the CTA button type of one combination. Returns 409 if the
/// combination is deployed.
pub async fn update_cta_type(
    State(state): State<AppState>,
    Path((adset_id, id)): Path<(DbId, DbId)>,
    Json(request): Json<UpdateCtaTypeRequest>,
) -> AppResult<Json<DataResponse<Combination>>> {
    validate_cta_type(&request.cta_type)?;

    match CombinationRepo::update_cta_type(&state.pool, adset_id, id, &request.cta_type).await? {
        MutationOutcome::Applied(combination) => Ok(Json(DataResponse { data: combination })),
        MutationOutcome::Locked => Err(AppError::Core(CoreError::CombinationLocked { id })),
        MutationOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Combination",
            id,
        })),
    }
}

/// DELETE /api/v1/ad-sets/{adset_id}/combinations/{id}
///
/// Delete one combination. Returns 409 if it is deployed.
pub async fn delete(
    State(state): State<AppState>,
    Path((adset_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    match CombinationRepo::delete(&state.pool, adset_id, id).await? {
        MutationOutcome::Applied(()) => Ok(StatusCode::NO_CONTENT),
        MutationOutcome::Locked => Err(AppError::Core(CoreError::CombinationLocked { id })),
        MutationOutcome::NotFound => Err(AppError::Core(CoreError::NotFound {
            entity: "Combination",
            id,
        })),
    }
}

/// POST /api/v1/ad-sets/{adset_id}/combinations/bulk-delete
///
/// Delete a batch of combinations. Deployed rows are skipped and counted,
/// not errors.
pub async fn bulk_delete(
    State(state): State<AppState>,
    Path(adset_id): Path<DbId>,
    Json(request): Json<BulkDeleteRequest>,
) -> AppResult<Json<DataResponse<BulkDeleteResult>>> {
    ensure_adset_exists(&state, adset_id).await?;
    let result =
        CombinationRepo::delete_many(&state.pool, adset_id, &request.combination_ids).await?;
    tracing::info!(
        adset_id,
        deleted = result.deleted,
        skipped = result.skipped,
        "Bulk deleted combinations"
    );
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Axis resolution and scoring
// ---------------------------------------------------------------------------

/// Resolve the request's axis selections into concrete fragment ids plus a
/// lookup map for scoring.
///
/// An empty axis selects every fragment of that kind in the ad set.
/// Explicit ids must exist, belong to this ad set, and be of the axis's
/// kind; anything else is an invalid fragment reference (422).
async fn resolve_axes(
    state: &AppState,
    adset_id: DbId,
    request: &GenerateRequest,
) -> AppResult<(ExpansionAxes, HashMap<DbId, Fragment>)> {
    let mut fragments: HashMap<DbId, Fragment> = HashMap::new();
    let pool = &state.pool;

    // Written out per axis; each call validates against its own kind.
    let assets = resolve_axis(pool, adset_id, FragmentKind::Asset, &request.assets).await?;
    let hooks = resolve_axis(pool, adset_id, FragmentKind::Hook, &request.hooks).await?;
    let headlines =
        resolve_axis(pool, adset_id, FragmentKind::Headline, &request.headlines).await?;
    let bodies = resolve_axis(pool, adset_id, FragmentKind::Body, &request.bodies).await?;
    let descriptions =
        resolve_axis(pool, adset_id, FragmentKind::Description, &request.descriptions).await?;
    let cta_texts = resolve_axis(pool, adset_id, FragmentKind::CtaText, &request.cta_texts).await?;

    for axis in [&assets, &hooks, &headlines, &bodies, &descriptions, &cta_texts] {
        for fragment in axis {
            fragments.insert(fragment.id, fragment.clone());
        }
    }

    let ids = |axis: &[Fragment]| axis.iter().map(|f| f.id).collect::<Vec<DbId>>();
    let axes = ExpansionAxes {
        assets: ids(&assets),
        hooks: ids(&hooks),
        headlines: ids(&headlines),
        bodies: ids(&bodies),
        descriptions: ids(&descriptions),
        cta_texts: ids(&cta_texts),
        cta_types: request.cta_types.clone(),
    };
    Ok((axes, fragments))
}

/// Resolve one axis: load all fragments of the kind when unconstrained,
/// validate the explicit ids otherwise.
async fn resolve_axis(
    pool: &adcraft_db::DbPool,
    adset_id: DbId,
    kind: FragmentKind,
    selected: &[DbId],
) -> AppResult<Vec<Fragment>> {
    if selected.is_empty() {
        return Ok(FragmentRepo::list_by_adset_and_kind(pool, adset_id, kind.as_str()).await?);
    }

    let loaded = FragmentRepo::find_many(pool, selected).await?;
    let by_id: HashMap<DbId, Fragment> = loaded.into_iter().map(|f| (f.id, f)).collect();

    let mut fragments = Vec::with_capacity(selected.len());
    for &id in selected {
        let fragment = by_id.get(&id).ok_or_else(|| {
            CoreError::InvalidFragmentReference(format!(
                "{kind} fragment {id} does not exist"
            ))
        })?;
        if fragment.ad_set_id != adset_id {
            return Err(CoreError::InvalidFragmentReference(format!(
                "{kind} fragment {id} belongs to another ad set"
            ))
            .into());
        }
        if fragment.kind != kind.as_str() {
            return Err(CoreError::InvalidFragmentReference(format!(
                "fragment {id} is a {}, not a {kind}",
                fragment.kind
            ))
            .into());
        }
        fragments.push(fragment.clone());
    }
    Ok(fragments)
}

/// Score one tuple against the loaded fragment map.
fn score_tuple(
    tuple: &ComboTuple,
    fragments: &HashMap<DbId, Fragment>,
) -> AppResult<adcraft_core::scoring::CombinationScores> {
    let get = |id: DbId| {
        fragments.get(&id).ok_or_else(|| {
            AppError::InternalError(format!("fragment {id} missing from scoring context"))
        })
    };

    let asset = get(tuple.asset_id)?;
    debug_assert_eq!(asset.kind, KIND_ASSET);
    let hook = match tuple.hook_id {
        Some(id) => Some(get(id)?.content.as_str()),
        None => None,
    };

    let input = ScoringInput {
        asset: AssetInfo {
            media_kind: asset.media_kind.as_deref(),
            width: asset.width,
            height: asset.height,
        },
        hook,
        headline: &get(tuple.headline_id)?.content,
        body: &get(tuple.body_id)?.content,
        description: &get(tuple.description_id)?.content,
        cta_text: &get(tuple.cta_text_id)?.content,
        cta_type: &tuple.cta_type,
    };
    Ok(scoring::score_combination(&input))
}
