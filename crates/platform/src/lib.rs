//! REST client for the external advertising platform.
//!
//! The deployment orchestrator consumes the [`AdPlatform`] trait; the
//! [`api::AdPlatformApi`] implementation wraps the platform's ad-creation
//! endpoint with [`reqwest`]. The ad account is always passed explicitly
//! per call -- there is no ambient "active account" state.

pub mod api;

use serde::Serialize;

pub use api::{AdPlatformApi, AdPlatformError};

/// Whether a newly created ad starts serving immediately or sits paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationState {
    Active,
    Paused,
}

impl ActivationState {
    /// The platform's wire value for the ad status field.
    pub fn as_platform_status(&self) -> &'static str {
        match self {
            ActivationState::Active => "ACTIVE",
            ActivationState::Paused => "PAUSED",
        }
    }
}

/// The fully resolved creative content for one ad.
#[derive(Debug, Clone, Serialize)]
pub struct CreativeSpec {
    /// Storage path or URL of the image/video asset.
    pub asset_path: String,
    pub hook: Option<String>,
    pub headline: String,
    pub body: String,
    pub description: String,
    pub cta_text: String,
    /// Platform button type, e.g. `LEARN_MORE`.
    pub cta_type: String,
    /// External id of the ad set the ad belongs to on the platform.
    pub adset_external_id: String,
}

/// The single platform operation this engine performs.
#[async_trait::async_trait]
pub trait AdPlatform: Send + Sync {
    /// Create one ad under the given account. Returns the platform's ad
    /// identifier on success.
    async fn create_ad(
        &self,
        ad_account_id: &str,
        spec: &CreativeSpec,
        activation: ActivationState,
    ) -> Result<String, AdPlatformError>;
}
