//! Generation provider implementations

pub mod luma;
pub mod mock;
pub mod openai;
pub mod replicate;

pub use luma::LumaProvider;
pub use mock::MockProvider;
pub use openai::OpenAiModel;
pub use replicate::ReplicateProvider;

use crate::config::MedusaConfig;
use crate::provider::GenerationProvider;
use medusa_core::{MedusaError, Result};

/// Create a provider by name
pub fn create_provider(
    name: &str,
    config: &MedusaConfig,
) -> Result<Box<dyn GenerationProvider>> {
    match name {
        "replicate" => Ok(Box::new(ReplicateProvider::from_config(config)?)),
        "luma" => Ok(Box::new(LumaProvider::from_config(config)?)),
        "mock" => Ok(Box::new(MockProvider::new())),
        other => Err(MedusaError::Config(format!(
            "Unknown provider '{}'. Available: {}",
            other,
            available_providers().join(", ")
        ))),
    }
}

/// Names of all registered providers
pub fn available_providers() -> Vec<&'static str> {
    vec!["replicate", "luma", "mock"]
}
