//! Mock provider for testing and offline development
//!
//! Returns `mock://` asset URLs without network access. Poll responses can
//! be scripted to exercise the full job lifecycle; by default every job
//! completes on the first poll.

use crate::poller::{JobHandle, PollStatus};
use crate::provider::*;
use medusa_core::Result;
use std::path::Path;
use std::sync::Mutex;

/// Mock provider, completes instantly unless scripted otherwise
pub struct MockProvider {
    scripted: Mutex<Vec<PollStatus>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(Vec::new()),
        }
    }

    /// Queue poll responses to be returned in order. Once the script is
    /// exhausted, polls fall back to instant completion.
    pub fn with_script(responses: Vec<PollStatus>) -> Self {
        let mut reversed = responses;
        reversed.reverse();
        Self {
            scripted: Mutex::new(reversed),
        }
    }

    fn next_status(&self, job_id: &str) -> PollStatus {
        let mut scripted = match self.scripted.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        scripted.pop().unwrap_or(PollStatus::Completed {
            asset_url: Some(format!("mock://assets/{}", job_id)),
        })
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn supported_modalities(&self) -> Vec<Modality> {
        vec![Modality::Image, Modality::Video]
    }

    fn health_check(&self) -> Result<ProviderStatus> {
        Ok(ProviderStatus::Available)
    }

    fn submit(&self, _request: &GenerateRequest) -> Result<JobHandle> {
        Ok(JobHandle::new(&format!("mock-{}", uuid::Uuid::new_v4())))
    }

    fn poll(&self, job_id: &str) -> Result<PollStatus> {
        Ok(self.next_status(job_id))
    }
}

/// Write a solid-color placeholder PNG for mock asset downloads
pub fn write_placeholder_png(path: &Path, width: u32, height: u32) -> Result<()> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([120, 90, 200, 255]));
    img.save(path)
        .map_err(|e| medusa_core::MedusaError::Provider(format!("Failed to write PNG: {}", e)))?;
    Ok(())
}
