//! Handlers for the `/ad-sets/{adset_id}/fragments` resource.

use adcraft_core::error::CoreError;
use adcraft_core::fragment::FragmentKind;
use adcraft_core::types::DbId;
use adcraft_db::models::fragment::Fragment;
use adcraft_db::repositories::{AdSetRepo, FragmentRepo};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the fragment listing endpoint.
#[derive(Debug, Deserialize)]
pub struct FragmentQuery {
    /// Optional kind filter (e.g. "asset", "headline").
    pub kind: Option<String>,
}

/// GET /api/v1/ad-sets/{adset_id}/fragments
///
/// List the ad set's creative fragments, newest first, optionally filtered
/// by kind.
pub async fn list(
    State(state): State<AppState>,
    Path(adset_id): Path<DbId>,
    Query(params): Query<FragmentQuery>,
) -> AppResult<Json<DataResponse<Vec<Fragment>>>> {
    ensure_adset_exists(&state, adset_id).await?;

    let fragments = match params.kind.as_deref() {
        Some(kind) => {
            let kind = FragmentKind::parse(kind)?;
            FragmentRepo::list_by_adset_and_kind(&state.pool, adset_id, kind.as_str()).await?
        }
        None => FragmentRepo::list_by_adset(&state.pool, adset_id).await?,
    };
    Ok(Json(DataResponse { data: fragments }))
}

/// Fail with 404 unless the ad set exists.
pub(crate) async fn ensure_adset_exists(state: &AppState, adset_id: DbId) -> AppResult<()> {
    AdSetRepo::find_by_id(&state.pool, adset_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "AdSet",
            id: adset_id,
        })?;
    Ok(())
}
