//! The variant generation pipeline.
//!
//! One job = one source asset, N requested variants. Phase 1 analyzes the
//! source once; a Phase 1 failure is fatal to the job. Phase 2 runs N
//! independent generation calls under a bounded semaphore, each with its
//! own timeout, and streams typed events as slots resolve.
//!
//! Disconnect handling: the caller observes the job through the returned
//! receiver. When the receiver is dropped, event sends fail, the job's
//! cancellation token fires, slots that have not started are skipped, and
//! in-flight calls finish detached with their results discarded.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use adcraft_core::fragment::{KIND_ASSET, MEDIA_IMAGE};
use adcraft_core::types::DbId;
use adcraft_db::models::fragment::{CreateFragment, Fragment};
use adcraft_db::repositories::FragmentRepo;
use adcraft_genai::GenerativeClient;
use sqlx::PgPool;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::events::VariantEvent;

/// Maximum variants a single job may request.
pub const MAX_VARIANTS_PER_JOB: u32 = 10;

/// Default bound on concurrent generation calls per job.
pub const DEFAULT_GENERATION_CONCURRENCY: usize = 3;

/// Default per-slot timeout for one generation call.
pub const DEFAULT_SLOT_TIMEOUT: Duration = Duration::from_secs(120);

/// One variant generation request.
#[derive(Debug, Clone)]
pub struct VariantRequest {
    pub ad_set_id: DbId,
    /// The source asset fragment, already resolved and kind-checked by the
    /// caller.
    pub source: Fragment,
    /// Number of variants to produce (1..=[`MAX_VARIANTS_PER_JOB`]).
    pub count: u32,
    /// Free-text generation instructions from the caller.
    pub instructions: String,
}

/// Orchestrates variant generation jobs. Cheap to clone behind an `Arc`;
/// one instance is shared by all requests.
pub struct VariantPipeline {
    pool: PgPool,
    genai: Arc<dyn GenerativeClient>,
    /// Root directory for stored assets; generated files land under
    /// `generated/`.
    storage_root: PathBuf,
    concurrency: usize,
    slot_timeout: Duration,
}

/// Outcome of one slot's generation call, before persistence.
struct SlotResult {
    slot: u32,
    result: Result<Vec<u8>, String>,
}

impl VariantPipeline {
    pub fn new(
        pool: PgPool,
        genai: Arc<dyn GenerativeClient>,
        storage_root: PathBuf,
        concurrency: usize,
        slot_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            genai,
            storage_root,
            concurrency: concurrency.max(1),
            slot_timeout,
        }
    }

    /// Start a job and return its event stream. The job runs detached; it
    /// stops early only if the receiver is dropped before Phase 1 ends or
    /// between slot resolutions.
    pub fn start(self: &Arc<Self>, request: VariantRequest) -> mpsc::Receiver<VariantEvent> {
        let (tx, rx) = mpsc::channel(32);
        let pipeline = Arc::clone(self);
        tokio::spawn(async move {
            pipeline.run(request, tx).await;
        });
        rx
    }

    async fn run(&self, request: VariantRequest, tx: mpsc::Sender<VariantEvent>) {
        let total = request.count;
        tracing::info!(
            ad_set_id = request.ad_set_id,
            source_id = request.source.id,
            count = total,
            "Starting variant generation job"
        );

        if !emit(&tx, VariantEvent::Analyzing).await {
            return;
        }

        // Phase 1: ground all prompts on one analysis of the source.
        let source_path = self.storage_root.join(&request.source.content);
        let source_bytes = match tokio::fs::read(&source_path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = emit(
                    &tx,
                    VariantEvent::Error {
                        message: format!("Analysis failed: cannot read source asset: {e}"),
                    },
                )
                .await;
                return;
            }
        };
        let description = match self.genai.analyze_image(&source_bytes).await {
            Ok(description) => description,
            Err(e) => {
                tracing::warn!(source_id = request.source.id, error = %e, "Source analysis failed");
                let _ = emit(
                    &tx,
                    VariantEvent::Error {
                        message: format!("Analysis failed: {e}"),
                    },
                )
                .await;
                return;
            }
        };

        if !emit(
            &tx,
            VariantEvent::Analyzed {
                description: description.clone(),
            },
        )
        .await
        {
            return;
        }

        // Phase 2: N independent generation calls, bounded, each with its
        // own timeout. Slot tasks run detached so dropping the job never
        // cancels an in-flight external call (its cost is already spent);
        // the token only stops slots that have not started.
        let cancel = CancellationToken::new();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let (slot_tx, mut slot_rx) = mpsc::unbounded_channel::<SlotResult>();
        let source_bytes = Arc::new(source_bytes);

        for slot in 0..total {
            let genai = Arc::clone(&self.genai);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let slot_tx = slot_tx.clone();
            let source_bytes = Arc::clone(&source_bytes);
            let prompt = build_variant_prompt(&description, &request.instructions, slot);
            let slot_timeout = self.slot_timeout;

            tokio::spawn(async move {
                // Closed semaphore cannot happen; treat it as cancellation.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                if cancel.is_cancelled() {
                    return;
                }
                let result = match tokio::time::timeout(
                    slot_timeout,
                    genai.generate_image(&prompt, Some(&source_bytes)),
                )
                .await
                {
                    Ok(Ok(bytes)) => Ok(bytes),
                    Ok(Err(e)) => Err(e.to_string()),
                    Err(_) => Err(format!(
                        "generation timed out after {}s",
                        slot_timeout.as_secs()
                    )),
                };
                let _ = slot_tx.send(SlotResult { slot, result });
            });
        }
        drop(slot_tx);

        let mut assets: Vec<Fragment> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        let mut resolved: u32 = 0;

        while let Some(SlotResult { slot, result }) = slot_rx.recv().await {
            resolved += 1;
            if !emit(
                &tx,
                VariantEvent::Processing {
                    progress: resolved,
                    total,
                },
            )
            .await
            {
                cancel.cancel();
                return;
            }

            let event = match result {
                Ok(bytes) => match self.persist_variant(&request, &bytes).await {
                    Ok(asset) => {
                        assets.push(asset.clone());
                        VariantEvent::SlotComplete { slot, asset }
                    }
                    Err(message) => {
                        errors.push(message.clone());
                        VariantEvent::SlotError { slot, message }
                    }
                },
                Err(message) => {
                    tracing::warn!(slot, error = %message, "Variant slot failed");
                    errors.push(message.clone());
                    VariantEvent::SlotError { slot, message }
                }
            };
            if !emit(&tx, event).await {
                cancel.cancel();
                return;
            }
        }

        tracing::info!(
            ad_set_id = request.ad_set_id,
            generated = assets.len(),
            failed = errors.len(),
            "Variant generation job finished"
        );
        let _ = emit(&tx, VariantEvent::Done { assets, errors }).await;
    }

    /// Write the generated bytes to storage and record the new asset
    /// fragment. Any failure is reported as that slot's error.
    async fn persist_variant(
        &self,
        request: &VariantRequest,
        bytes: &[u8],
    ) -> Result<Fragment, String> {
        let relative = format!("generated/{}.png", uuid::Uuid::new_v4());
        let path = self.storage_root.join(&relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("cannot create storage directory: {e}"))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| format!("cannot write generated asset: {e}"))?;

        let (width, height) = probe_dimensions(bytes);
        FragmentRepo::create(
            &self.pool,
            &CreateFragment {
                ad_set_id: request.ad_set_id,
                kind: KIND_ASSET.to_string(),
                content: relative,
                media_kind: Some(MEDIA_IMAGE.to_string()),
                width,
                height,
                generated_by_ai: Some(true),
            },
        )
        .await
        .map_err(|e| format!("cannot record generated asset: {e}"))
    }
}

/// Send an event, reporting whether the consumer is still listening.
async fn emit(tx: &mpsc::Sender<VariantEvent>, event: VariantEvent) -> bool {
    tx.send(event).await.is_ok()
}

/// Build the per-slot generation prompt from the analysis and the caller's
/// instructions. The slot index nudges the provider toward distinct takes.
fn build_variant_prompt(description: &str, instructions: &str, slot: u32) -> String {
    let instructions = instructions.trim();
    if instructions.is_empty() {
        format!("{description}\n\nProduce variation {} of this image.", slot + 1)
    } else {
        format!(
            "{description}\n\nInstructions: {instructions}\n\nProduce variation {} of this image.",
            slot + 1
        )
    }
}

/// Header-only dimension probe; generated payloads that fail to parse just
/// get no dimensions recorded.
fn probe_dimensions(bytes: &[u8]) -> (Option<i32>, Option<i32>) {
    let reader = image::ImageReader::new(std::io::Cursor::new(bytes));
    match reader.with_guessed_format().and_then(|r| {
        r.into_dimensions()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }) {
        Ok((w, h)) => (i32::try_from(w).ok(), i32::try_from(h).ok()),
        Err(_) => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_includes_analysis_and_instructions() {
        let prompt = build_variant_prompt("A beach at sunset", "make it rainy", 2);
        assert!(prompt.contains("A beach at sunset"));
        assert!(prompt.contains("make it rainy"));
        assert!(prompt.contains("variation 3"));
    }

    #[test]
    fn prompt_without_instructions_still_grounded() {
        let prompt = build_variant_prompt("A beach at sunset", "   ", 0);
        assert!(prompt.contains("A beach at sunset"));
        assert!(!prompt.contains("Instructions:"));
    }

    #[test]
    fn unparseable_bytes_probe_to_none() {
        assert_eq!(probe_dimensions(b"not an image"), (None, None));
    }
}
