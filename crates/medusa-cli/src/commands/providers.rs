//! Providers command

use anyhow::Result;
use medusa_gen::providers::{available_providers, create_provider};
use medusa_gen::{MedusaConfig, ProviderStatus};

pub fn run() -> Result<()> {
    let config = MedusaConfig::load().unwrap_or_default();

    println!("Providers:");
    for name in available_providers() {
        match create_provider(name, &config) {
            Ok(provider) => {
                let modalities: Vec<String> = provider
                    .supported_modalities()
                    .iter()
                    .map(|m| m.to_string())
                    .collect();
                let status = match provider.health_check() {
                    Ok(ProviderStatus::Available) => "available".to_string(),
                    Ok(ProviderStatus::NoApiKey) => "no API key".to_string(),
                    Ok(ProviderStatus::Unavailable(reason)) => {
                        format!("unavailable: {}", reason)
                    }
                    Err(e) => format!("error: {}", e),
                };
                println!("  {} [{}] - {}", name, modalities.join(", "), status);
            }
            Err(_) => {
                println!("  {} - not configured", name);
            }
        }
    }

    Ok(())
}
