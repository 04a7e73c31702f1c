//! Error types for Medusa

use thiserror::Error;

/// The main error type for Medusa operations
#[derive(Debug, Error)]
pub enum MedusaError {
    /// Input rejected before any vendor call was made
    #[error("Validation error: {0}")]
    Validation(String),

    /// Vendor job-creation call failed or returned no id
    #[error("Job creation failed: {0}")]
    Creation(String),

    /// Vendor explicitly reported a failed generation
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Vendor reported success but omitted the expected asset field
    #[error("Generation completed but no asset was returned: {0}")]
    MissingAsset(String),

    /// Polling budget exhausted while the job remained non-terminal
    #[error("Generation timed out after {attempts} poll attempts")]
    Timeout { attempts: u32 },

    /// Poll aborted via a cancellation token
    #[error("Generation cancelled")]
    Cancelled,

    /// Transport failure or malformed vendor response
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

/// Result type alias for Medusa operations
pub type Result<T> = std::result::Result<T, MedusaError>;

impl From<toml::de::Error> for MedusaError {
    fn from(err: toml::de::Error) -> Self {
        MedusaError::TomlParse(err.to_string())
    }
}
