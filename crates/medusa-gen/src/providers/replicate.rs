//! Replicate image-prediction provider
//!
//! Submits predictions to the Replicate API and polls them to completion.
//! Predictions are asynchronous: a create call returns an id, and the
//! status endpoint reports `starting`/`processing` until a terminal
//! `succeeded`/`failed`/`canceled` marker.

use crate::config::MedusaConfig;
use crate::poller::{JobHandle, PollStatus};
use crate::provider::*;
use crate::quality::optimal_quality_settings;
use medusa_core::{MedusaError, Result};
use std::time::Duration;

const DEFAULT_REPLICATE_URL: &str = "https://api.replicate.com/v1/predictions";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Replicate provider for AI image generation
pub struct ReplicateProvider {
    api_key: String,
    api_url: String,
}

impl ReplicateProvider {
    /// Create a new ReplicateProvider from config
    pub fn from_config(config: &MedusaConfig) -> Result<Self> {
        let api_key = config
            .api_key("replicate")
            .ok_or_else(|| {
                MedusaError::Config(
                    "Replicate API key not configured. Set MEDUSA_REPLICATE_API_KEY or add to .medusa/config.toml".to_string(),
                )
            })?
            .to_string();

        let api_url = config
            .api_url("replicate")
            .unwrap_or(DEFAULT_REPLICATE_URL)
            .to_string();

        Ok(Self { api_key, api_url })
    }

    fn post_json_with_retry(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .post(url)
                .header("Authorization", &format!("Token {}", self.api_key))
                .header("Content-Type", "application/json")
                .send_json(payload);

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        MedusaError::Provider(format!(
                            "Failed to parse Replicate response: {}",
                            e
                        ))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(MedusaError::Provider(format!(
                        "Replicate API request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(MedusaError::Provider(
            "Replicate API request failed after retries".to_string(),
        ))
    }

    fn get_json_with_retry(&self, url: &str) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .get(url)
                .header("Authorization", &format!("Token {}", self.api_key))
                .call();

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        MedusaError::Provider(format!("Failed to parse poll response: {}", e))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(MedusaError::Provider(format!(
                        "Replicate poll failed: {}",
                        e
                    )));
                }
            }
        }

        Err(MedusaError::Provider(
            "Replicate poll failed after retries".to_string(),
        ))
    }
}

/// Shape the model-specific input parameters for a prediction.
///
/// FLUX variants share a base parameter set; structural-conditioning models
/// additionally take the reference image. Anything else gets the generic
/// diffusion defaults.
pub fn model_inputs(request: &GenerateRequest) -> serde_json::Value {
    let model = request.model.as_deref().unwrap_or_default();
    let aspect_ratio = request.aspect_ratio.as_deref().unwrap_or("1:1");

    if model.contains("flux") {
        let mut payload = serde_json::json!({
            "prompt": request.prompt,
            "raw": false,
            "aspect_ratio": aspect_ratio,
            "output_format": "jpg",
            "safety_tolerance": 2
        });
        if model.contains("flux-1.1-pro-ultra") {
            payload["quality"] = serde_json::json!("ultra");
        }
        if model.contains("flux-canny") || model.contains("flux-depth") {
            if let Some(ref image) = request.reference_image_url {
                payload["image"] = serde_json::json!(image);
            }
        }
        if let Some(seed) = request.seed {
            payload["seed"] = serde_json::json!(seed);
        }
        return payload;
    }

    let settings = optimal_quality_settings(aspect_ratio);
    let mut payload = serde_json::json!({
        "prompt": request.prompt,
        "num_outputs": 1,
        "guidance_scale": 7.5,
        "num_inference_steps": 50,
        "width": settings.width,
        "height": settings.height
    });
    if let Some(seed) = request.seed {
        payload["seed"] = serde_json::json!(seed);
    }
    payload
}

/// Parse a prediction-create response into a job handle
pub fn parse_prediction_create(response: &serde_json::Value) -> Result<JobHandle> {
    response
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(JobHandle::new)
        .ok_or_else(|| {
            MedusaError::Creation(format!(
                "Unexpected Replicate create response: {}",
                serde_json::to_string(response).unwrap_or_default()
            ))
        })
}

/// Parse a prediction-status response into a normalized poll status.
///
/// `output` may be a plain URL string or a list of URLs; the first element
/// is used when it is a list.
pub fn parse_prediction_status(response: &serde_json::Value) -> PollStatus {
    let status = response
        .get("status")
        .and_then(|s| s.as_str())
        .unwrap_or("unknown");

    match status {
        "succeeded" => {
            let asset_url = match response.get("output") {
                Some(serde_json::Value::String(url)) => Some(url.clone()),
                Some(serde_json::Value::Array(urls)) => urls
                    .first()
                    .and_then(|u| u.as_str())
                    .map(|s| s.to_string()),
                _ => None,
            };
            PollStatus::Completed { asset_url }
        }
        "failed" | "canceled" => PollStatus::Failed {
            reason: response
                .get("error")
                .and_then(|e| e.as_str())
                .map(|s| s.to_string()),
        },
        _ => PollStatus::InProgress,
    }
}

impl GenerationProvider for ReplicateProvider {
    fn name(&self) -> &str {
        "replicate"
    }

    fn supported_modalities(&self) -> Vec<Modality> {
        vec![Modality::Image]
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if self.api_key.is_empty() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn submit(&self, request: &GenerateRequest) -> Result<JobHandle> {
        let mut payload = serde_json::json!({
            "input": model_inputs(request)
        });
        if let Some(ref model) = request.model {
            payload["model"] = serde_json::json!(model);
        }

        let response = self.post_json_with_retry(&self.api_url, &payload)?;
        parse_prediction_create(&response)
    }

    fn poll(&self, job_id: &str) -> Result<PollStatus> {
        let url = format!("{}/{}", self.api_url, job_id);
        let response = self.get_json_with_retry(&url)?;
        Ok(parse_prediction_status(&response))
    }
}

fn build_agent() -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .build();
    config.into()
}

fn is_retryable_error(e: &ureq::Error) -> bool {
    match e {
        ureq::Error::Timeout(_)
        | ureq::Error::Io(_)
        | ureq::Error::ConnectionFailed
        | ureq::Error::HostNotFound => true,
        ureq::Error::StatusCode(code) => matches!(code, 429 | 500 | 502 | 503 | 504),
        _ => false,
    }
}

fn sleep_backoff(attempt: usize) {
    let delay_ms = RETRY_BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    std::thread::sleep(Duration::from_millis(delay_ms));
}
