//! Integration tests for the variant generation pipeline, using a stub
//! generative client so slot outcomes are deterministic.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adcraft_db::models::ad_set::CreateAdSet;
use adcraft_db::models::fragment::{CreateFragment, Fragment};
use adcraft_db::repositories::{AdSetRepo, FragmentRepo};
use adcraft_genai::{GenAiApiError, GenerativeClient};
use adcraft_pipeline::{VariantEvent, VariantPipeline, VariantRequest};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Stub client
// ---------------------------------------------------------------------------

/// Stub behaving deterministically per slot: prompts for the listed
/// variation numbers fail, everything else succeeds.
struct StubGenAi {
    analysis: Result<String, String>,
    failing_variations: Vec<u32>,
    /// Per-call artificial latency, for timeout tests.
    latency: Duration,
    calls: AtomicU32,
}

impl StubGenAi {
    fn succeeding() -> Self {
        Self {
            analysis: Ok("a red sneaker on a white background".to_string()),
            failing_variations: Vec::new(),
            latency: Duration::ZERO,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeClient for StubGenAi {
    async fn analyze_image(&self, _image: &[u8]) -> Result<String, GenAiApiError> {
        self.analysis
            .clone()
            .map_err(|m| GenAiApiError::ContentPolicy(m))
    }

    async fn generate_image(
        &self,
        prompt: &str,
        _source: Option<&[u8]>,
    ) -> Result<Vec<u8>, GenAiApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let failing = self
            .failing_variations
            .iter()
            .any(|v| prompt.contains(&format!("variation {v} ")));
        if failing {
            Err(GenAiApiError::RateLimited("slow down".to_string()))
        } else {
            Ok(b"fake-png-bytes".to_vec())
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_source(pool: &PgPool, storage_root: &std::path::Path) -> (i64, Fragment) {
    let ad_set = AdSetRepo::create(
        pool,
        &CreateAdSet {
            name: "variants".into(),
            external_id: None,
        },
    )
    .await
    .unwrap();

    std::fs::create_dir_all(storage_root.join("uploads")).unwrap();
    std::fs::write(storage_root.join("uploads/source.png"), b"source-bytes").unwrap();

    let source = FragmentRepo::create(
        pool,
        &CreateFragment {
            ad_set_id: ad_set.id,
            kind: "asset".into(),
            content: "uploads/source.png".into(),
            media_kind: Some("image".into()),
            width: Some(800),
            height: Some(800),
            generated_by_ai: None,
        },
    )
    .await
    .unwrap();
    (ad_set.id, source)
}

fn pipeline(
    pool: PgPool,
    stub: Arc<StubGenAi>,
    storage_root: std::path::PathBuf,
    timeout: Duration,
) -> Arc<VariantPipeline> {
    Arc::new(VariantPipeline::new(pool, stub, storage_root, 2, timeout))
}

async fn collect_events(mut rx: tokio::sync::mpsc::Receiver<VariantEvent>) -> Vec<VariantEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn partial_failure_reaches_done_with_counts(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let (ad_set_id, source) = seed_source(&pool, storage.path()).await;

    let stub = Arc::new(StubGenAi {
        failing_variations: vec![2, 4],
        ..StubGenAi::succeeding()
    });
    let pipeline = pipeline(
        pool.clone(),
        Arc::clone(&stub),
        storage.path().to_path_buf(),
        Duration::from_secs(5),
    );

    let rx = pipeline.start(VariantRequest {
        ad_set_id,
        source,
        count: 5,
        instructions: "different colorways".into(),
    });
    let events = collect_events(rx).await;

    assert!(matches!(events[0], VariantEvent::Analyzing));
    assert!(matches!(events[1], VariantEvent::Analyzed { .. }));

    let completes = events
        .iter()
        .filter(|e| matches!(e, VariantEvent::SlotComplete { .. }))
        .count();
    let slot_errors = events
        .iter()
        .filter(|e| matches!(e, VariantEvent::SlotError { .. }))
        .count();
    let processing = events
        .iter()
        .filter(|e| matches!(e, VariantEvent::Processing { .. }))
        .count();
    assert_eq!(completes, 3);
    assert_eq!(slot_errors, 2);
    assert_eq!(processing, 5);

    let Some(VariantEvent::Done { assets, errors }) = events.last() else {
        panic!("expected final Done event, got {:?}", events.last());
    };
    assert_eq!(assets.len(), 3);
    assert_eq!(errors.len(), 2);

    // The three successful slots were persisted as AI-generated assets.
    let fragments = FragmentRepo::list_by_adset(&pool, ad_set_id).await.unwrap();
    let generated: Vec<_> = fragments.iter().filter(|f| f.generated_by_ai).collect();
    assert_eq!(generated.len(), 3);
    assert!(generated.iter().all(|f| f.kind == "asset"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn processing_progress_is_monotonic(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let (ad_set_id, source) = seed_source(&pool, storage.path()).await;

    let stub = Arc::new(StubGenAi::succeeding());
    let pipeline = pipeline(
        pool.clone(),
        stub,
        storage.path().to_path_buf(),
        Duration::from_secs(5),
    );
    let rx = pipeline.start(VariantRequest {
        ad_set_id,
        source,
        count: 4,
        instructions: String::new(),
    });
    let events = collect_events(rx).await;

    let mut last = 0;
    for event in &events {
        if let VariantEvent::Processing { progress, total } = event {
            assert_eq!(*total, 4);
            assert_eq!(*progress, last + 1, "progress must advance by one");
            last = *progress;
        }
    }
    assert_eq!(last, 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn analysis_failure_is_fatal(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let (ad_set_id, source) = seed_source(&pool, storage.path()).await;

    let stub = Arc::new(StubGenAi {
        analysis: Err("image violates policy".to_string()),
        ..StubGenAi::succeeding()
    });
    let pipeline = pipeline(
        pool.clone(),
        Arc::clone(&stub),
        storage.path().to_path_buf(),
        Duration::from_secs(5),
    );
    let rx = pipeline.start(VariantRequest {
        ad_set_id,
        source,
        count: 3,
        instructions: String::new(),
    });
    let events = collect_events(rx).await;

    assert!(matches!(events[0], VariantEvent::Analyzing));
    let Some(VariantEvent::Error { message }) = events.last() else {
        panic!("expected terminal Error event");
    };
    assert!(message.contains("Analysis failed"));
    assert_eq!(events.len(), 2, "no slot events after a fatal analysis");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn slot_timeout_is_isolated(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let (ad_set_id, source) = seed_source(&pool, storage.path()).await;

    // Every call sleeps past the 50ms budget: timeouts must surface as
    // slot errors and the job must still reach Done.
    let stub = Arc::new(StubGenAi {
        latency: Duration::from_millis(200),
        ..StubGenAi::succeeding()
    });
    let pipeline = pipeline(
        pool.clone(),
        stub,
        storage.path().to_path_buf(),
        Duration::from_millis(50),
    );
    let rx = pipeline.start(VariantRequest {
        ad_set_id,
        source,
        count: 2,
        instructions: String::new(),
    });
    let events = collect_events(rx).await;

    let timeouts = events
        .iter()
        .filter(
            |e| matches!(e, VariantEvent::SlotError { message, .. } if message.contains("timed out")),
        )
        .count();
    assert_eq!(timeouts, 2);
    let Some(VariantEvent::Done { assets, errors }) = events.last() else {
        panic!("expected Done despite timeouts");
    };
    assert!(assets.is_empty());
    assert_eq!(errors.len(), 2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn dropped_consumer_discards_results(pool: PgPool) {
    let storage = tempfile::tempdir().unwrap();
    let (ad_set_id, source) = seed_source(&pool, storage.path()).await;

    let stub = Arc::new(StubGenAi {
        latency: Duration::from_millis(50),
        ..StubGenAi::succeeding()
    });
    let pipeline = pipeline(
        pool.clone(),
        Arc::clone(&stub),
        storage.path().to_path_buf(),
        Duration::from_secs(5),
    );
    let mut rx = pipeline.start(VariantRequest {
        ad_set_id,
        source,
        count: 3,
        instructions: String::new(),
    });

    // Consume Phase 1 events, then walk away.
    assert!(matches!(rx.recv().await, Some(VariantEvent::Analyzing)));
    assert!(matches!(rx.recv().await, Some(VariantEvent::Analyzed { .. })));
    drop(rx);

    // Give in-flight slots time to finish. Their results must be
    // discarded: nothing new is persisted once the consumer is gone.
    tokio::time::sleep(Duration::from_millis(400)).await;
    let fragments = FragmentRepo::list_by_adset(&pool, ad_set_id).await.unwrap();
    assert_eq!(
        fragments.len(),
        1,
        "only the source asset should exist after disconnect"
    );
}
