use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use adcraft_api::config::ServerConfig;
use adcraft_api::locks::AdsetLocks;
use adcraft_api::router::build_app_router;
use adcraft_api::state::AppState;
use adcraft_genai::{GenAiApiError, GenerativeClient};
use adcraft_pipeline::{DeployOrchestrator, VariantPipeline};
use adcraft_platform::{ActivationState, AdPlatform, AdPlatformError, CreativeSpec};
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config(storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        storage_root,
        genai_api_url: "http://localhost:0".to_string(),
        genai_api_key: String::new(),
        platform_api_url: "http://localhost:0".to_string(),
        platform_access_token: String::new(),
        deploy_concurrency: 2,
        generation_concurrency: 2,
        slot_timeout: Duration::from_secs(5),
    }
}

/// A generative client that always succeeds with canned output.
pub struct HappyGenAi;

#[async_trait::async_trait]
impl GenerativeClient for HappyGenAi {
    async fn analyze_image(&self, _image: &[u8]) -> Result<String, GenAiApiError> {
        Ok("a product photo on a plain background".to_string())
    }

    async fn generate_image(
        &self,
        _prompt: &str,
        _source: Option<&[u8]>,
    ) -> Result<Vec<u8>, GenAiApiError> {
        Ok(b"generated-bytes".to_vec())
    }
}

/// An ad platform that always succeeds with a synthetic ad id.
pub struct HappyPlatform;

#[async_trait::async_trait]
impl AdPlatform for HappyPlatform {
    async fn create_ad(
        &self,
        ad_account_id: &str,
        _spec: &CreativeSpec,
        _activation: ActivationState,
    ) -> Result<String, AdPlatformError> {
        Ok(format!("{ad_account_id}/ads/1"))
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and always-succeeding external API stubs.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack (CORS, request ID, timeout, tracing,
/// panic recovery) that production uses.
#[allow(dead_code)]
pub fn build_test_app(pool: PgPool, storage_root: PathBuf) -> Router {
    build_test_app_with(pool, storage_root, Arc::new(HappyGenAi), Arc::new(HappyPlatform))
}

/// Like [`build_test_app`] but with caller-provided external API clients.
pub fn build_test_app_with(
    pool: PgPool,
    storage_root: PathBuf,
    genai: Arc<dyn GenerativeClient>,
    platform: Arc<dyn AdPlatform>,
) -> Router {
    let config = test_config(storage_root);

    let variant_pipeline = Arc::new(VariantPipeline::new(
        pool.clone(),
        genai,
        config.storage_root.clone(),
        config.generation_concurrency,
        config.slot_timeout,
    ));
    let deploy_orchestrator = Arc::new(DeployOrchestrator::new(
        pool.clone(),
        platform,
        config.deploy_concurrency,
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        locks: Arc::new(AdsetLocks::new()),
        variant_pipeline,
        deploy_orchestrator,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

#[allow(dead_code)]
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[allow(dead_code)]
pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("DELETE")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        panic!(
            "response body is not JSON ({e}): {}",
            String::from_utf8_lossy(&bytes)
        )
    })
}

/// Collect a response body as text (for SSE streams, which end when the
/// job's event channel closes).
#[allow(dead_code)]
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).into_owned()
}
