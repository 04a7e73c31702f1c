//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `MEDUSA_{PROVIDER}_API_KEY`
//! 2. Project-local: `.medusa/config.toml`
//! 3. Global: `~/.medusa/config.toml`

use medusa_core::{MedusaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::poller::PollOptions;
use crate::provider::Modality;

/// Provider-specific configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Poll interval override in seconds
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    /// Poll attempt budget override
    #[serde(default)]
    pub poll_max_attempts: Option<u32>,
}

fn default_true() -> bool {
    true
}

/// Generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_image_provider")]
    pub default_image_provider: String,
    #[serde(default = "default_video_provider")]
    pub default_video_provider: String,
    /// Default poll interval in seconds (most conservative observed value)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Default poll attempt budget
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            default_image_provider: default_image_provider(),
            default_video_provider: default_video_provider(),
            poll_interval_secs: default_poll_interval_secs(),
            poll_max_attempts: default_poll_max_attempts(),
        }
    }
}

fn default_image_provider() -> String {
    "replicate".to_string()
}
fn default_video_provider() -> String {
    "luma".to_string()
}
fn default_poll_interval_secs() -> u64 {
    15
}
fn default_poll_max_attempts() -> u32 {
    30
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedusaConfigFile {
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Resolved configuration with environment variable overrides applied
#[derive(Debug, Clone, Default)]
pub struct MedusaConfig {
    pub providers: HashMap<String, ProviderConfig>,
    pub generation: GenerationConfig,
}

impl MedusaConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut config = MedusaConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                Self::merge_into(&mut config, global);
            }
        }

        let local_path = PathBuf::from(".medusa/config.toml");
        if local_path.exists() {
            let local = Self::load_file(&local_path)?;
            Self::merge_into(&mut config, local);
        }

        Self::apply_env_overrides(&mut config);

        Ok(MedusaConfig {
            providers: config.providers,
            generation: config.generation,
        })
    }

    /// Load config from a specific file path only (for testing)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        Self::apply_env_overrides(&mut config);
        Ok(MedusaConfig {
            providers: config.providers,
            generation: config.generation,
        })
    }

    /// Get API key for a provider
    pub fn api_key(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_key.as_deref())
    }

    /// Get API URL for a provider (or its default)
    pub fn api_url(&self, provider_name: &str) -> Option<&str> {
        self.providers
            .get(provider_name)
            .and_then(|p| p.api_url.as_deref())
    }

    /// Check if a provider is enabled
    pub fn is_enabled(&self, provider_name: &str) -> bool {
        self.providers
            .get(provider_name)
            .map(|p| p.enabled)
            .unwrap_or(true)
    }

    /// Get the default provider name for a modality
    pub fn default_provider(&self, modality: Modality) -> &str {
        match modality {
            Modality::Image => &self.generation.default_image_provider,
            Modality::Video => &self.generation.default_video_provider,
        }
    }

    /// Resolve poll options for a provider, applying per-provider overrides
    /// over the generation defaults
    pub fn poll_options(&self, provider_name: &str) -> PollOptions {
        let provider = self.providers.get(provider_name);
        let interval_secs = provider
            .and_then(|p| p.poll_interval_secs)
            .unwrap_or(self.generation.poll_interval_secs);
        let max_attempts = provider
            .and_then(|p| p.poll_max_attempts)
            .unwrap_or(self.generation.poll_max_attempts);
        PollOptions {
            max_attempts,
            interval: Duration::from_secs(interval_secs),
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".medusa").join("config.toml"))
    }

    fn load_file(path: &Path) -> Result<MedusaConfigFile> {
        let content = std::fs::read_to_string(path)?;
        let config: MedusaConfigFile = toml::from_str(&content).map_err(|e| {
            MedusaError::Config(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    fn merge_into(base: &mut MedusaConfigFile, overlay: MedusaConfigFile) {
        for (name, provider) in overlay.providers {
            let entry = base.providers.entry(name).or_default();
            if provider.api_key.is_some() {
                entry.api_key = provider.api_key;
            }
            if provider.api_url.is_some() {
                entry.api_url = provider.api_url;
            }
            if provider.poll_interval_secs.is_some() {
                entry.poll_interval_secs = provider.poll_interval_secs;
            }
            if provider.poll_max_attempts.is_some() {
                entry.poll_max_attempts = provider.poll_max_attempts;
            }
            entry.enabled = provider.enabled;
        }

        if overlay.generation.default_image_provider != default_image_provider() {
            base.generation.default_image_provider = overlay.generation.default_image_provider;
        }
        if overlay.generation.default_video_provider != default_video_provider() {
            base.generation.default_video_provider = overlay.generation.default_video_provider;
        }
        if overlay.generation.poll_interval_secs != default_poll_interval_secs() {
            base.generation.poll_interval_secs = overlay.generation.poll_interval_secs;
        }
        if overlay.generation.poll_max_attempts != default_poll_max_attempts() {
            base.generation.poll_max_attempts = overlay.generation.poll_max_attempts;
        }
    }

    fn apply_env_overrides(config: &mut MedusaConfigFile) {
        let provider_names = ["replicate", "luma", "openai"];
        for name in &provider_names {
            let env_key = format!("MEDUSA_{}_API_KEY", name.to_uppercase());
            if let Ok(key) = std::env::var(&env_key) {
                let entry = config.providers.entry(name.to_string()).or_default();
                entry.api_key = Some(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_config(content: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("medusa_config_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_config_from_file() {
        std::env::remove_var("MEDUSA_REPLICATE_API_KEY");

        let config_str = r#"
[providers.replicate]
api_key = "r8_test_key"
api_url = "https://api.example.com/v1/predictions"
poll_interval_secs = 2

[providers.luma]
api_key = "luma_test"
enabled = false

[generation]
default_image_provider = "replicate"
poll_max_attempts = 45
"#;
        let path = temp_config(config_str);
        let config = MedusaConfig::load_from_file(&path).unwrap();

        assert!(config.is_enabled("replicate"));
        assert!(!config.is_enabled("luma"));
        assert_eq!(
            config.api_url("replicate"),
            Some("https://api.example.com/v1/predictions")
        );
        assert_eq!(config.generation.poll_max_attempts, 45);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_env_var_override() {
        let config_str = r#"
[providers.luma]
api_key = "file-key"
"#;
        let path = temp_config(config_str);

        std::env::set_var("MEDUSA_LUMA_API_KEY", "env-key-override");
        let config = MedusaConfig::load_from_file(&path).unwrap();
        assert_eq!(config.api_key("luma"), Some("env-key-override"));
        std::env::remove_var("MEDUSA_LUMA_API_KEY");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_default_providers_per_modality() {
        let config = MedusaConfig::default();
        assert_eq!(config.default_provider(Modality::Image), "replicate");
        assert_eq!(config.default_provider(Modality::Video), "luma");
    }

    #[test]
    fn test_conservative_poll_defaults() {
        let config = MedusaConfig::default();
        let options = config.poll_options("replicate");
        assert_eq!(options.max_attempts, 30);
        assert_eq!(options.interval, Duration::from_secs(15));
    }

    #[test]
    fn test_provider_poll_override_beats_defaults() {
        let config_str = r#"
[providers.replicate]
poll_interval_secs = 1
poll_max_attempts = 10
"#;
        let path = temp_config(config_str);
        let config = MedusaConfig::load_from_file(&path).unwrap();

        let options = config.poll_options("replicate");
        assert_eq!(options.interval, Duration::from_secs(1));
        assert_eq!(options.max_attempts, 10);

        // Unconfigured providers fall back to generation defaults
        let fallback = config.poll_options("luma");
        assert_eq!(fallback.interval, Duration::from_secs(15));
        assert_eq!(fallback.max_attempts, 30);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_missing_provider_returns_none() {
        let config = MedusaConfig::default();
        assert_eq!(config.api_key("nonexistent"), None);
        assert!(config.is_enabled("nonexistent"));
    }
}
