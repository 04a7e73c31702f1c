//! Generation provider trait and request/result types

use medusa_core::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use crate::poller::{self, CancelToken, JobHandle, PollOptions, PollStatus};

/// The target generation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Image,
    Video,
}

impl Modality {
    /// Maximum enhanced-prompt length in characters for this modality
    pub fn max_chars(&self) -> usize {
        match self {
            Modality::Image => 300,
            Modality::Video => 200,
        }
    }

    /// Maximum sentence count accepted in a raw video description
    pub fn max_sentences(&self) -> Option<usize> {
        match self {
            Modality::Image => None,
            Modality::Video => Some(4),
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Image => write!(f, "image"),
            Modality::Video => write!(f, "video"),
        }
    }
}

/// A request to generate an asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The (already enhanced) prompt to submit
    pub prompt: String,
    /// Kind of asset to generate
    pub modality: Modality,
    /// Vendor model id (e.g. "flux-1.1-pro-ultra")
    #[serde(default)]
    pub model: Option<String>,
    /// Reference image URL for image-to-video or structural conditioning
    #[serde(default)]
    pub reference_image_url: Option<String>,
    /// Aspect ratio key (e.g. "1:1", "16:9")
    #[serde(default)]
    pub aspect_ratio: Option<String>,
    /// Random seed for reproducibility, where the vendor supports it
    #[serde(default)]
    pub seed: Option<u64>,
}

/// The result of a successful generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResult {
    /// URL of the generated asset, as returned by the vendor
    pub asset_url: String,
    /// The prompt that was submitted
    pub prompt_used: String,
    /// Provider name
    pub provider: String,
    /// Wall-clock generation time in seconds
    pub duration_secs: f64,
    /// Any provider-specific metadata
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Status returned by a provider health check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    Available,
    Unavailable(String),
    NoApiKey,
}

/// Trait implemented by each generation provider (Replicate, Luma, Mock)
pub trait GenerationProvider: Send {
    /// Provider name (e.g. "replicate", "luma", "mock")
    fn name(&self) -> &str;

    /// Modalities this provider can generate
    fn supported_modalities(&self) -> Vec<Modality>;

    /// Check if the provider is available (API key set, service reachable)
    fn health_check(&self) -> Result<ProviderStatus>;

    /// Submit a generation job to the vendor, returning its handle
    fn submit(&self, request: &GenerateRequest) -> Result<JobHandle>;

    /// Fetch the current status of a submitted job
    fn poll(&self, job_id: &str) -> Result<PollStatus>;

    /// Submit and poll to completion in one blocking call
    fn generate(
        &self,
        request: &GenerateRequest,
        options: &PollOptions,
        cancel: &CancelToken,
    ) -> Result<GenerateResult> {
        let start = Instant::now();

        let asset_url = poller::run_to_completion(
            || self.submit(request),
            |id| self.poll(id),
            options,
            cancel,
        )?;

        Ok(GenerateResult {
            asset_url,
            prompt_used: request.prompt.clone(),
            provider: self.name().to_string(),
            duration_secs: start.elapsed().as_secs_f64(),
            metadata: HashMap::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modality_budgets() {
        assert_eq!(Modality::Image.max_chars(), 300);
        assert_eq!(Modality::Video.max_chars(), 200);
        assert_eq!(Modality::Video.max_sentences(), Some(4));
        assert_eq!(Modality::Image.max_sentences(), None);
    }

    #[test]
    fn test_modality_display() {
        assert_eq!(Modality::Image.to_string(), "image");
        assert_eq!(Modality::Video.to_string(), "video");
    }
}
