use std::path::PathBuf;
use std::time::Duration;

use adcraft_pipeline::deploy::DEFAULT_DEPLOY_CONCURRENCY;
use adcraft_pipeline::variant::{DEFAULT_GENERATION_CONCURRENCY, DEFAULT_SLOT_TIMEOUT};

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Does not apply to
    /// the variant event stream, which outlives ordinary requests.
    pub request_timeout_secs: u64,
    /// Root directory for stored creative assets (default: `./storage`).
    pub storage_root: PathBuf,
    /// Base URL of the generative-image API.
    pub genai_api_url: String,
    /// API key for the generative-image API.
    pub genai_api_key: String,
    /// Base URL of the ad platform's marketing API.
    pub platform_api_url: String,
    /// Access token for the ad platform.
    pub platform_access_token: String,
    /// Concurrent platform calls per deploy batch.
    pub deploy_concurrency: usize,
    /// Concurrent generation calls per variant job.
    pub generation_concurrency: usize,
    /// Per-slot timeout for one generation call.
    pub slot_timeout: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                     |
    /// |---------------------------|-----------------------------|
    /// | `HOST`                    | `0.0.0.0`                   |
    /// | `PORT`                    | `3000`                      |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`     |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                        |
    /// | `STORAGE_ROOT`            | `./storage`                 |
    /// | `GENAI_API_URL`           | `https://api.openai.com`    |
    /// | `GENAI_API_KEY`           | (empty)                     |
    /// | `PLATFORM_API_URL`        | `https://graph.facebook.com/v19.0` |
    /// | `PLATFORM_ACCESS_TOKEN`   | (empty)                     |
    /// | `DEPLOY_CONCURRENCY`      | `4`                         |
    /// | `GENERATION_CONCURRENCY`  | `3`                         |
    /// | `SLOT_TIMEOUT_SECS`       | `120`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage_root =
            PathBuf::from(std::env::var("STORAGE_ROOT").unwrap_or_else(|_| "./storage".into()));

        let genai_api_url =
            std::env::var("GENAI_API_URL").unwrap_or_else(|_| "https://api.openai.com".into());
        let genai_api_key = std::env::var("GENAI_API_KEY").unwrap_or_default();

        let platform_api_url = std::env::var("PLATFORM_API_URL")
            .unwrap_or_else(|_| "https://graph.facebook.com/v19.0".into());
        let platform_access_token = std::env::var("PLATFORM_ACCESS_TOKEN").unwrap_or_default();

        let deploy_concurrency: usize = std::env::var("DEPLOY_CONCURRENCY")
            .unwrap_or_else(|_| DEFAULT_DEPLOY_CONCURRENCY.to_string())
            .parse()
            .expect("DEPLOY_CONCURRENCY must be a valid usize");

        let generation_concurrency: usize = std::env::var("GENERATION_CONCURRENCY")
            .unwrap_or_else(|_| DEFAULT_GENERATION_CONCURRENCY.to_string())
            .parse()
            .expect("GENERATION_CONCURRENCY must be a valid usize");

        let slot_timeout_secs: u64 = std::env::var("SLOT_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_SLOT_TIMEOUT.as_secs().to_string())
            .parse()
            .expect("SLOT_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage_root,
            genai_api_url,
            genai_api_key,
            platform_api_url,
            platform_access_token,
            deploy_concurrency,
            generation_concurrency,
            slot_timeout: Duration::from_secs(slot_timeout_secs),
        }
    }
}
