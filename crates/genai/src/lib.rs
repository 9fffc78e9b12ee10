//! REST client for the generative image/text API.
//!
//! Provides the [`GenerativeClient`] trait consumed by the variant
//! generation pipeline, plus the HTTP implementation wrapping the
//! provider's analyze/generate endpoints with [`reqwest`].

pub mod api;

pub use api::{GenAiApi, GenAiApiError};

/// The two generative operations the engine needs.
///
/// A trait seam so the pipeline can be tested with an in-memory stub
/// instead of the real provider.
#[async_trait::async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Analyze an image and return a textual content description used to
    /// ground variation prompts.
    async fn analyze_image(&self, image: &[u8]) -> Result<String, GenAiApiError>;

    /// Generate an image from a prompt, optionally conditioned on a source
    /// image. Returns the raw image bytes.
    async fn generate_image(
        &self,
        prompt: &str,
        source: Option<&[u8]>,
    ) -> Result<Vec<u8>, GenAiApiError>;
}
