//! OpenAI chat-completion backend for prompt refinement

use crate::config::MedusaConfig;
use crate::refine::LanguageModel;
use medusa_core::{MedusaError, Result};
use std::time::Duration;

const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const REFINEMENT_MODEL: &str = "gpt-4";
const REFINEMENT_TEMPERATURE: f64 = 0.7;
const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// OpenAI chat-completion client
pub struct OpenAiModel {
    api_key: String,
    api_url: String,
}

impl OpenAiModel {
    /// Create a new OpenAiModel from config
    pub fn from_config(config: &MedusaConfig) -> Result<Self> {
        let api_key = config
            .api_key("openai")
            .ok_or_else(|| {
                MedusaError::Config(
                    "OpenAI API key not configured. Set MEDUSA_OPENAI_API_KEY or add to .medusa/config.toml".to_string(),
                )
            })?
            .to_string();

        let api_url = config
            .api_url("openai")
            .unwrap_or(DEFAULT_OPENAI_URL)
            .to_string();

        Ok(Self { api_key, api_url })
    }
}

/// Extract the assistant message from a chat-completion response
pub fn parse_completion(response: &serde_json::Value) -> Result<String> {
    response
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| {
            MedusaError::Provider(format!(
                "Unexpected completion response: {}",
                serde_json::to_string(response).unwrap_or_default()
            ))
        })
}

impl LanguageModel for OpenAiModel {
    fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let payload = serde_json::json!({
            "model": REFINEMENT_MODEL,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "max_tokens": max_tokens,
            "temperature": REFINEMENT_TEMPERATURE
        });

        for attempt in 0..MAX_RETRIES {
            let agent = build_agent();
            let response = agent
                .post(&self.api_url)
                .header("Authorization", &format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .send_json(&payload);

            match response {
                Ok(mut ok) => {
                    let body: serde_json::Value = ok.body_mut().read_json().map_err(|e| {
                        MedusaError::Provider(format!("Failed to parse OpenAI response: {}", e))
                    })?;
                    return parse_completion(&body);
                }
                Err(e) => {
                    if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                        sleep_backoff(attempt);
                        continue;
                    }
                    return Err(MedusaError::Provider(format!(
                        "OpenAI API request failed: {}",
                        e
                    )));
                }
            }
        }

        Err(MedusaError::Provider(
            "OpenAI API request failed after retries".to_string(),
        ))
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
