//! HTTP implementation of the ad platform client.
//!
//! Wraps `POST /{api_version}/{ad_account_id}/ads`. Platform failures keep
//! their human-readable message so the orchestrator can persist it on the
//! combination record.

use serde::Deserialize;

use crate::{ActivationState, AdPlatform, CreativeSpec};

/// HTTP client for the advertising platform's marketing API.
pub struct AdPlatformApi {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

/// Errors from the ad platform API layer.
#[derive(Debug, thiserror::Error)]
pub enum AdPlatformError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The platform rejected the ad; the message is what its API returned.
    #[error("Ad platform error ({status}): {message}")]
    Platform {
        /// HTTP status code.
        status: u16,
        /// Platform error message, or raw body if unparseable.
        message: String,
    },
}

#[derive(Debug, Deserialize)]
struct CreateAdResponse {
    /// Platform-assigned ad identifier.
    id: String,
}

#[derive(Debug, Deserialize)]
struct PlatformErrorBody {
    error: PlatformErrorDetail,
}

#[derive(Debug, Deserialize)]
struct PlatformErrorDetail {
    message: String,
}

impl AdPlatformApi {
    /// Create a new API client.
    ///
    /// * `api_url` - base URL including version, e.g.
    ///   `https://graph.facebook.com/v21.0`.
    /// * `access_token` - marketing API access token.
    pub fn new(api_url: String, access_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            access_token,
        }
    }
}

#[async_trait::async_trait]
impl AdPlatform for AdPlatformApi {
    async fn create_ad(
        &self,
        ad_account_id: &str,
        spec: &CreativeSpec,
        activation: ActivationState,
    ) -> Result<String, AdPlatformError> {
        let body = serde_json::json!({
            "adset_id": spec.adset_external_id,
            "status": activation.as_platform_status(),
            "creative": {
                "asset": spec.asset_path,
                "hook": spec.hook,
                "headline": spec.headline,
                "body": spec.body,
                "description": spec.description,
                "call_to_action": {
                    "type": spec.cta_type,
                    "value": { "text": spec.cta_text },
                },
            },
            "access_token": self.access_token,
        });

        let response = self
            .client
            .post(format!("{}/{}/ads", self.api_url, ad_account_id))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let message = serde_json::from_str::<PlatformErrorBody>(&raw)
                .map(|b| b.error.message)
                .unwrap_or(raw);
            return Err(AdPlatformError::Platform {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: CreateAdResponse = response.json().await?;
        tracing::debug!(ad_id = %parsed.id, account = %ad_account_id, "Created platform ad");
        Ok(parsed.id)
    }
}
