//! HTTP implementation of the generative API client.
//!
//! Wraps the provider's `/v1/images/analyze` and `/v1/images/generate`
//! endpoints. Image payloads travel as base64 in JSON bodies. Rate-limit
//! and content-policy rejections are surfaced as distinct variants so the
//! pipeline can report them per slot; no retries happen at this layer.

use base64::prelude::{Engine, BASE64_STANDARD};
use serde::Deserialize;

use crate::GenerativeClient;

/// HTTP client for the generative image/text provider.
pub struct GenAiApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the generative API layer.
#[derive(Debug, thiserror::Error)]
pub enum GenAiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider rejected the call for exceeding its rate limits.
    #[error("Rate limited by generative API: {0}")]
    RateLimited(String),

    /// The provider refused the prompt or source image on policy grounds.
    #[error("Content policy rejection: {0}")]
    ContentPolicy(String),

    /// Any other non-2xx response.
    #[error("Generative API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Provider error message, or raw body if unparseable.
        message: String,
    },

    /// The response was 2xx but its body did not match the contract.
    #[error("Malformed response from generative API: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    /// Natural-language description of the image content.
    description: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    /// Base64-encoded PNG bytes.
    image: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: String,
}

impl GenAiApi {
    /// Create a new API client.
    ///
    /// * `api_url` - base URL, e.g. `https://api.generative.example`.
    /// * `api_key` - bearer token for the provider.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Map a non-success response to the error taxonomy.
    async fn classify_failure(response: reqwest::Response) -> GenAiApiError {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());

        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .ok();

        if status == 429 {
            return GenAiApiError::RateLimited(message.map(|m| m.message).unwrap_or(body));
        }
        match message {
            Some(detail) if detail.code.as_deref() == Some("content_policy_violation") => {
                GenAiApiError::ContentPolicy(detail.message)
            }
            Some(detail) => GenAiApiError::Api {
                status,
                message: detail.message,
            },
            None => GenAiApiError::Api {
                status,
                message: body,
            },
        }
    }
}

#[async_trait::async_trait]
impl GenerativeClient for GenAiApi {
    async fn analyze_image(&self, image: &[u8]) -> Result<String, GenAiApiError> {
        let body = serde_json::json!({
            "image": BASE64_STANDARD.encode(image),
        });

        let response = self
            .client
            .post(format!("{}/v1/images/analyze", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }
        let parsed: AnalyzeResponse = response.json().await?;
        Ok(parsed.description)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        source: Option<&[u8]>,
    ) -> Result<Vec<u8>, GenAiApiError> {
        let mut body = serde_json::json!({
            "prompt": prompt,
            "output_format": "png",
        });
        if let Some(bytes) = source {
            body["source_image"] = serde_json::Value::from(BASE64_STANDARD.encode(bytes));
        }

        let response = self
            .client
            .post(format!("{}/v1/images/generate", self.api_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::classify_failure(response).await);
        }
        let parsed: GenerateResponse = response.json().await?;
        BASE64_STANDARD
            .decode(parsed.image.as_bytes())
            .map_err(|e| GenAiApiError::Malformed(format!("image payload is not valid base64: {e}")))
    }
}
