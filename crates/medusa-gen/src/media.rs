//! Asset download and content-type helpers

use medusa_core::{ContentHash, MedusaError, Result};
use std::path::Path;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: usize = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Guess a MIME type from a URL or file path extension
pub fn content_type_for(path: &str) -> &'static str {
    let lower = path.to_ascii_lowercase();
    // strip query strings so "out.jpg?token=x" still matches
    let lower = lower.split('?').next().unwrap_or_default();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else if lower.ends_with(".mp4") {
        "video/mp4"
    } else if lower.ends_with(".webm") {
        "video/webm"
    } else {
        "application/octet-stream"
    }
}

/// Download a generated asset to disk and return its content hash.
///
/// `mock://` URLs are satisfied locally with a placeholder image so the
/// full pipeline can run without network access or API keys.
pub fn download_asset(url: &str, output_path: &Path) -> Result<ContentHash> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if url.starts_with("mock://") {
        crate::providers::mock::write_placeholder_png(output_path, 512, 512)?;
        return Ok(ContentHash::from_file(output_path)?);
    }

    let bytes = download_bytes_with_retry(url)?;
    std::fs::write(output_path, &bytes)?;
    Ok(ContentHash::from_bytes(&bytes))
}

fn download_bytes_with_retry(url: &str) -> Result<Vec<u8>> {
    for attempt in 0..MAX_RETRIES {
        let agent = build_agent();
        let response = agent.get(url).call();

        match response {
            Ok(ok) => {
                let mut reader = ok.into_body().into_reader();
                let mut bytes = Vec::new();
                std::io::Read::read_to_end(&mut reader, &mut bytes).map_err(|e| {
                    MedusaError::Provider(format!("Failed to read asset data: {}", e))
                })?;
                return Ok(bytes);
            }
            Err(e) => {
                if attempt + 1 < MAX_RETRIES && is_retryable_error(&e) {
                    sleep_backoff(attempt);
                    continue;
                }
                return Err(MedusaError::Provider(format!(
                    "Failed to download asset: {}",
                    e
                )));
            }
        }
    }

    Err(MedusaError::Provider(
        "Asset download failed after retries".to_string(),
    ))
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
