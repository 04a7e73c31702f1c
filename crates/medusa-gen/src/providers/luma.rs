//! Luma Dream Machine video provider
//!
//! Drives the Dream Machine generations API. A generation is created from a
//! text prompt and optionally an image keyframe, then polled while the
//! service reports `queued`/`dreaming`/`processing`.

use crate::config::MedusaConfig;
use crate::poller::{JobHandle, PollStatus};
use crate::provider::*;
use medusa_core::{MedusaError, Result};
use std::time::Duration;

const DEFAULT_LUMA_URL: &str = "https://api.lumalabs.ai/dream-machine/v1/generations";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Luma Dream Machine provider for AI video generation
pub struct LumaProvider {
    api_key: String,
    api_url: String,
}

impl LumaProvider {
    /// Create a new LumaProvider from config
    pub fn from_config(config: &MedusaConfig) -> Result<Self> {
        let api_key = config
            .api_key("luma")
            .ok_or_else(|| {
                MedusaError::Config(
                    "Luma API key not configured. Set MEDUSA_LUMA_API_KEY or add to .medusa/config.toml".to_string(),
                )
            })?
            .to_string();

        let api_url = config
            .api_url("luma")
            .unwrap_or(DEFAULT_LUMA_URL)
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
                .header("Authorization", &format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .send_json(payload);

            match response {
                Ok(mut ok) => {
                    return ok.body_mut().read_json().map_err(|e| {
                        MedusaError::Provider(format!("Failed to parse Luma response: {}", e))
                    });
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(MedusaError::Provider(format!(
                        "Luma API request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(MedusaError::Provider(
            "Luma API request failed after retries".to_string(),
        ))
    }

    fn get_json_with_retry(&self, url: &str) -> Result<serde_json::Value> {
        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .get(url)
                .header("Authorization", &format!("Bearer {}", self.api_key))
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
                    return Err(MedusaError::Provider(format!("Luma poll failed: {}", e)));
                }
            }
        }

        Err(MedusaError::Provider(
            "Luma poll failed after retries".to_string(),
        ))
    }
}

/// Build the generation request body.
///
/// A reference image becomes the first keyframe so the video starts from it.
/// Inline `data:` URLs are dropped because the API only accepts hosted URLs.
pub fn generation_payload(request: &GenerateRequest) -> serde_json::Value {
    let mut payload = serde_json::json!({
        "prompt": request.prompt,
        "aspect_ratio": request.aspect_ratio.as_deref().unwrap_or("16:9"),
        "loop": true
    });

    if let Some(ref image_url) = request.reference_image_url {
        if !image_url.starts_with("data:") {
            payload["keyframes"] = serde_json::json!({
                "frame0": {
                    "type": "image",
                    "url": image_url
                }
            });
        }
    }

    payload
}

/// Parse a generation-create response into a job handle
pub fn parse_generation_create(response: &serde_json::Value) -> Result<JobHandle> {
    response
        .get("id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(JobHandle::new)
        .ok_or_else(|| {
            MedusaError::Creation(format!(
                "Unexpected Luma create response: {}",
                serde_json::to_string(response).unwrap_or_default()
            ))
        })
}

/// Parse a generation-status response into a normalized poll status
pub fn parse_generation_status(response: &serde_json::Value) -> PollStatus {
    let state = response
        .get("state")
        .and_then(|s| s.as_str())
        .unwrap_or("unknown");

    match state {
        "completed" => PollStatus::Completed {
            asset_url: response
                .get("assets")
                .and_then(|a| a.get("video"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        },
        "failed" => PollStatus::Failed {
            reason: response
                .get("failure_reason")
                .and_then(|r| r.as_str())
                .map(|s| s.to_string()),
        },
        _ => PollStatus::InProgress,
    }
}

impl GenerationProvider for LumaProvider {
    fn name(&self) -> &str {
        "luma"
    }

    fn supported_modalities(&self) -> Vec<Modality> {
        vec![Modality::Video]
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        if self.api_key.is_empty() {
            return Ok(ProviderStatus::NoApiKey);
        }
        Ok(ProviderStatus::Available)
    }

    fn submit(&self, request: &GenerateRequest) -> Result<JobHandle> {
        let payload = generation_payload(request);
        let response = self.post_json_with_retry(&self.api_url, &payload)?;
        parse_generation_create(&response)
    }

    fn poll(&self, job_id: &str) -> Result<PollStatus> {
        let url = format!("{}/{}", self.api_url, job_id);
        let response = self.get_json_with_retry(&url)?;
        Ok(parse_generation_status(&response))
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

#[cfg(test)]
mod tests {
    use super::*;

    fn video_request(image_url: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            prompt: "a forest at dawn".to_string(),
            modality: Modality::Video,
            model: None,
            reference_image_url: image_url.map(|s| s.to_string()),
            aspect_ratio: None,
            seed: None,
        }
    }

    #[test]
    fn test_payload_defaults() {
        let payload = generation_payload(&video_request(None));
        assert_eq!(payload["prompt"], "a forest at dawn");
        assert_eq!(payload["aspect_ratio"], "16:9");
        assert_eq!(payload["loop"], true);
        assert!(payload.get("keyframes").is_none());
    }

    #[test]
    fn test_payload_includes_image_keyframe() {
        let payload = generation_payload(&video_request(Some("https://example.com/frame.jpg")));
        assert_eq!(
            payload["keyframes"]["frame0"]["url"],
            "https://example.com/frame.jpg"
        );
        assert_eq!(payload["keyframes"]["frame0"]["type"], "image");
    }

    #[test]
    fn test_payload_drops_data_urls() {
        let payload = generation_payload(&video_request(Some("data:image/png;base64,AAAA")));
        assert!(payload.get("keyframes").is_none());
    }

    #[test]
    fn test_parse_create_response() {
        let json = serde_json::json!({"id": "gen-xyz", "state": "queued"});
        assert_eq!(parse_generation_create(&json).unwrap().id, "gen-xyz");
    }

    #[test]
    fn test_parse_create_response_without_id() {
        let json = serde_json::json!({"detail": "rate limited"});
        assert!(matches!(
            parse_generation_create(&json),
            Err(MedusaError::Creation(_))
        ));
    }

    #[test]
    fn test_parse_status_in_progress_states() {
        for state in ["queued", "dreaming", "processing"] {
            let json = serde_json::json!({"state": state});
            assert_eq!(parse_generation_status(&json), PollStatus::InProgress);
        }
    }

    #[test]
    fn test_parse_status_completed() {
        let json = serde_json::json!({
            "state": "completed",
            "assets": {"video": "https://storage.lumalabs.ai/out.mp4"}
        });
        assert_eq!(
            parse_generation_status(&json),
            PollStatus::Completed {
                asset_url: Some("https://storage.lumalabs.ai/out.mp4".to_string())
            }
        );
    }

    #[test]
    fn test_parse_status_completed_without_video() {
        let json = serde_json::json!({"state": "completed", "assets": {}});
        assert_eq!(
            parse_generation_status(&json),
            PollStatus::Completed { asset_url: None }
        );
    }

    #[test]
    fn test_parse_status_failed() {
        let json = serde_json::json!({"state": "failed", "failure_reason": "prompt rejected"});
        assert_eq!(
            parse_generation_status(&json),
            PollStatus::Failed {
                reason: Some("prompt rejected".to_string())
            }
        );

        let json = serde_json::json!({"state": "failed"});
        assert_eq!(
            parse_generation_status(&json),
            PollStatus::Failed { reason: None }
        );
    }
}
