//! Medusa Gen - prompt enhancement and async generation pipeline
//!
//! Provides a pluggable provider framework for generating images and videos
//! via vendor APIs (Replicate predictions, Luma Dream Machine), a catalog-driven
//! prompt enhancer, a language-model prompt refiner, and a bounded poll loop
//! for asynchronous generation jobs.

pub mod catalog;
pub mod config;
pub mod enhance;
pub mod history;
pub mod job;
pub mod media;
pub mod poller;
pub mod provider;
pub mod providers;
pub mod quality;
pub mod refine;

pub use catalog::PhraseCatalogs;
pub use config::MedusaConfig;
pub use enhance::{
    ClockPicker, EnhancementRequest, EnhancementResult, IndexPicker, PromptBreakdown,
    PromptEnhancer, SubjectType,
};
pub use history::{HistoryEntry, SessionHistory};
pub use job::{GenerationJob, JobState};
pub use poller::{run_to_completion, CancelToken, JobHandle, PollOptions, PollStatus};
pub use provider::{
    GenerateRequest, GenerateResult, GenerationProvider, Modality, ProviderStatus,
};
pub use quality::{optimal_quality_settings, QualitySettings};
pub use refine::{LanguageModel, PromptRefiner};
