//! Handler for the `/ad-sets/{adset_id}/variants/generate` stream.
//!
//! Starts a variant generation job and exposes its event channel as a
//! server-sent-event stream. Closing the connection drops the receiver,
//! which is the pipeline's cancellation signal.

use std::convert::Infallible;
use std::time::Duration;

use adcraft_core::error::CoreError;
use adcraft_core::fragment::{KIND_ASSET, MEDIA_IMAGE};
use adcraft_core::types::DbId;
use adcraft_db::repositories::FragmentRepo;
use adcraft_pipeline::variant::MAX_VARIANTS_PER_JOB;
use adcraft_pipeline::{VariantEvent, VariantRequest};
use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use futures::StreamExt;
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::AppResult;
use crate::handlers::fragment::ensure_adset_exists;
use crate::state::AppState;

/// Body of one variant generation call.
#[derive(Debug, Deserialize)]
pub struct VariantBody {
    /// The asset fragment to derive variants from.
    pub source_fragment_id: DbId,
    /// Number of variants (1..=10).
    pub count: u32,
    /// Free-text generation instructions.
    #[serde(default)]
    pub instructions: String,
}

/// POST /api/v1/ad-sets/{adset_id}/variants/generate
///
/// Validate the request, start the job, and stream its events as SSE.
/// Validation failures are ordinary HTTP errors; once the stream is open,
/// all failures arrive as events.
pub async fn generate(
    State(state): State<AppState>,
    Path(adset_id): Path<DbId>,
    Json(body): Json<VariantBody>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    ensure_adset_exists(&state, adset_id).await?;

    if body.count == 0 || body.count > MAX_VARIANTS_PER_JOB {
        return Err(CoreError::Validation(format!(
            "count must be between 1 and {MAX_VARIANTS_PER_JOB}"
        ))
        .into());
    }

    let source = FragmentRepo::find_by_id(&state.pool, body.source_fragment_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Fragment",
            id: body.source_fragment_id,
        })?;
    if source.ad_set_id != adset_id {
        return Err(CoreError::InvalidFragmentReference(format!(
            "fragment {} belongs to another ad set",
            source.id
        ))
        .into());
    }
    if source.kind != KIND_ASSET {
        return Err(CoreError::InvalidFragmentReference(format!(
            "fragment {} is a {}, not an asset",
            source.id, source.kind
        ))
        .into());
    }
    if source.media_kind.as_deref() != Some(MEDIA_IMAGE) {
        return Err(CoreError::Validation(format!(
            "fragment {} is not an image asset; variants require an image source",
            source.id
        ))
        .into());
    }

    let rx = state.variant_pipeline.start(VariantRequest {
        ad_set_id: adset_id,
        source,
        count: body.count,
        instructions: body.instructions,
    });

    let stream = ReceiverStream::new(rx).map(|event: VariantEvent| {
        Ok(Event::default()
            .json_data(&event)
            .unwrap_or_else(|e| Event::default().comment(format!("serialization error: {e}"))))
    });
    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}
