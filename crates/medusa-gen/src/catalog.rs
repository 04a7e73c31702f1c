//! Phrase catalogs for the prompt enhancer
//!
//! Catalogs define the fixed vocabulary the enhancer draws from: camera
//! movements, atmospheric elements, subject framings, technical quality,
//! lighting, and mood phrases. They are immutable data handed to the
//! enhancer at construction, so tests can substitute deterministic sets.

use medusa_core::{MedusaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// The complete phrase vocabulary used during enhancement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseCatalogs {
    /// Camera-movement phrases prepended to video descriptions
    #[serde(default)]
    pub camera_movements: Vec<String>,
    /// Atmospheric-element phrases for synthesized atmosphere sentences
    #[serde(default)]
    pub atmospheric_elements: Vec<String>,
    /// Framing phrases for character subjects
    #[serde(default)]
    pub character_framings: Vec<String>,
    /// Framing phrases for landscape subjects
    #[serde(default)]
    pub landscape_framings: Vec<String>,
    /// Framing phrases for object subjects
    #[serde(default)]
    pub object_framings: Vec<String>,
    /// Technical quality phrases for the image technical layer
    #[serde(default)]
    pub technical_quality: Vec<String>,
    /// Studio-lighting phrases for the image enhancement layer
    #[serde(default)]
    pub studio_lighting: Vec<String>,
    /// Mood phrases for the image enhancement layer
    #[serde(default)]
    pub moods: Vec<String>,
    /// Model-specific quality suffixes keyed by model id
    #[serde(default)]
    pub model_enhancers: HashMap<String, String>,
}

/// TOML file wrapper
#[derive(Debug, Deserialize)]
struct CatalogFile {
    catalogs: PhraseCatalogs,
}

impl Default for PhraseCatalogs {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        let mut model_enhancers = HashMap::new();
        model_enhancers.insert(
            "flux-pro-ultra".to_string(),
            "professional photography, sharp focus, masterpiece quality".to_string(),
        );
        model_enhancers.insert(
            "flux-dev".to_string(),
            "experimental style, innovative composition".to_string(),
        );
        model_enhancers.insert(
            "recraft-v3".to_string(),
            "artistic rendering, refined details".to_string(),
        );
        model_enhancers.insert(
            "stable-diffusion-3".to_string(),
            "masterpiece, best quality, highly detailed".to_string(),
        );

        Self {
            camera_movements: strings(&[
                "Slow dolly shot",
                "Sweeping aerial shot",
                "Handheld tracking shot",
                "Static wide shot",
                "Gentle panning shot",
            ]),
            atmospheric_elements: strings(&[
                "Drifting fog",
                "Soft volumetric light",
                "Floating dust particles",
                "Shimmering haze",
                "A low ambient glow",
            ]),
            character_framings: strings(&[
                "close-up portrait",
                "full-body shot",
                "three-quarter view",
                "over-the-shoulder framing",
                "centered hero pose",
            ]),
            landscape_framings: strings(&[
                "ultra wide-angle vista",
                "panoramic view",
                "aerial perspective",
                "low-horizon composition",
                "layered depth framing",
            ]),
            object_framings: strings(&[
                "studio product shot",
                "macro close-up",
                "isometric view",
                "centered composition",
                "shallow depth of field",
            ]),
            technical_quality: strings(&[
                "8k uhd",
                "sharp focus",
                "high resolution",
                "intricate detail",
                "professional grade",
            ]),
            studio_lighting: strings(&[
                "cinematic lighting",
                "soft studio lighting",
                "dramatic rim lighting",
                "volumetric lighting",
                "golden hour backlight",
            ]),
            moods: strings(&[
                "serene mood",
                "dramatic mood",
                "mysterious mood",
                "energetic mood",
                "melancholic mood",
            ]),
            model_enhancers,
        }
    }
}

impl PhraseCatalogs {
    /// Load catalogs from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: CatalogFile = toml::from_str(&content).map_err(|e| {
            MedusaError::Config(format!(
                "Failed to parse catalog file {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(file.catalogs)
    }

    /// Framing phrases for a subject type
    pub fn framings_for(&self, subject: crate::enhance::SubjectType) -> &[String] {
        match subject {
            crate::enhance::SubjectType::Character => &self.character_framings,
            crate::enhance::SubjectType::Landscape => &self.landscape_framings,
            crate::enhance::SubjectType::Object => &self.object_framings,
        }
    }

    /// Model-specific quality suffix, if one is registered for the model id
    pub fn model_enhancer(&self, model_id: &str) -> Option<&str> {
        self.model_enhancers.get(model_id).map(|s| s.as_str())
    }
}
