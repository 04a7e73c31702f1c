//! Catalog-driven prompt enhancement
//!
//! Transforms a terse user description into a richer prompt tuned for the
//! chosen modality. Video prompts get a camera-movement lead-in and a
//! synthesized atmosphere sentence; image prompts are built in three layers
//! (core, technical, enhancement) joined by the literal `BREAK` separator
//! that downstream diffusion providers use to delimit semantic segments.

use serde::{Deserialize, Serialize};

use crate::catalog::PhraseCatalogs;
use crate::provider::Modality;

/// Input to the enhancer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementRequest {
    /// Raw user description (required, non-empty)
    pub raw_description: String,
    /// Target generation type
    pub modality: Modality,
    /// Style name drawn from the style catalog
    #[serde(default)]
    pub style: Option<String>,
    /// Genre influence (e.g. "fantasy", "horror")
    #[serde(default)]
    pub genre: Option<String>,
    /// Movie to draw inspiration from
    #[serde(default)]
    pub movie_reference: Option<String>,
    /// Book to draw inspiration from
    #[serde(default)]
    pub book_reference: Option<String>,
    /// Vendor model id, used to pick a model-specific quality suffix
    #[serde(default)]
    pub model: Option<String>,
}

impl EnhancementRequest {
    /// A minimal request with just a description and modality
    pub fn new(raw_description: impl Into<String>, modality: Modality) -> Self {
        Self {
            raw_description: raw_description.into(),
            modality,
            style: None,
            genre: None,
            movie_reference: None,
            book_reference: None,
            model: None,
        }
    }
}

/// The layered breakdown of a successful enhancement
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptBreakdown {
    pub core_elements: Vec<String>,
    pub technical_choices: Vec<String>,
    pub enhancement_details: Vec<String>,
}

/// Output of the enhancer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub is_valid: bool,
    /// Present iff `is_valid`
    #[serde(default)]
    pub enhanced_prompt: Option<String>,
    /// Present iff `is_valid`
    #[serde(default)]
    pub breakdown: Option<PromptBreakdown>,
    /// Present iff not `is_valid`
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl EnhancementResult {
    fn invalid(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            enhanced_prompt: None,
            breakdown: None,
            errors: Some(errors),
        }
    }
}

/// Subject classification for image prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Character,
    Landscape,
    Object,
}

/// Ordered classification rules, evaluated top to bottom. First match wins;
/// no match falls through to `Object`.
const SUBJECT_RULES: &[(&[&str], SubjectType)] = &[
    (&["person", "character"], SubjectType::Character),
    (&["landscape", "scene"], SubjectType::Landscape),
];

/// Classify the subject of a description by ordered keyword rules
pub fn classify_subject(description: &str) -> SubjectType {
    let lower = description.to_lowercase();
    for (keywords, subject) in SUBJECT_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *subject;
        }
    }
    SubjectType::Object
}

/// Source of random indices for phrase selection.
///
/// Injected so tests can script the exact sequence of picks; production
/// callers use [`ClockPicker`].
pub trait IndexPicker {
    /// Return an index in `0..bound`. `bound` is always non-zero.
    fn pick(&mut self, bound: usize) -> usize;
}

/// Unseeded xorshift picker over clock entropy. Determinism is neither
/// guaranteed nor required.
pub struct ClockPicker {
    state: u64,
}

impl ClockPicker {
    pub fn new() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos() as u64 ^ d.as_secs())
            .unwrap_or(0x9e37_79b9);
        Self {
            state: nanos | 1,
        }
    }
}

impl Default for ClockPicker {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexPicker for ClockPicker {
    fn pick(&mut self, bound: usize) -> usize {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state % bound as u64) as usize
    }
}

/// The prompt enhancer
pub struct PromptEnhancer {
    catalogs: PhraseCatalogs,
}

impl PromptEnhancer {
    /// Create an enhancer with the given catalogs
    pub fn new(catalogs: PhraseCatalogs) -> Self {
        Self { catalogs }
    }

    /// Create an enhancer with the built-in default catalogs
    pub fn with_defaults() -> Self {
        Self::new(PhraseCatalogs::default())
    }

    /// Enhance a raw description into a structured prompt.
    ///
    /// Pure over its inputs plus the injected randomness source; never
    /// performs I/O.
    pub fn enhance(
        &self,
        request: &EnhancementRequest,
        picker: &mut dyn IndexPicker,
    ) -> EnhancementResult {
        let description = request.raw_description.trim();
        if description.is_empty() {
            return EnhancementResult::invalid(vec!["Description is required".to_string()]);
        }

        match request.modality {
            Modality::Video => self.enhance_video(description, request, picker),
            Modality::Image => self.enhance_image(description, request, picker),
        }
    }

    fn enhance_video(
        &self,
        description: &str,
        request: &EnhancementRequest,
        picker: &mut dyn IndexPicker,
    ) -> EnhancementResult {
        let sentences = split_sentences(description);

        // Punctuation-only input survives the non-empty check but yields no
        // sentence segments.
        if sentences.is_empty() {
            return EnhancementResult::invalid(vec![
                "Description contains no sentence content".to_string(),
            ]);
        }

        if let Some(max) = request.modality.max_sentences() {
            if sentences.len() > max {
                return EnhancementResult::invalid(vec![format!(
                    "Video descriptions are limited to {} sentences, got {}",
                    max,
                    sentences.len()
                )]);
            }
        }

        let mut breakdown = PromptBreakdown::default();
        let mut result_sentences = Vec::with_capacity(sentences.len() + 1);

        // Lead the first sentence with a camera movement unless the user
        // already specified a shot.
        let first = &sentences[0];
        if first.to_lowercase().contains("shot") {
            result_sentences.push(first.clone());
        } else if let Some(movement) = choose(picker, &self.catalogs.camera_movements) {
            breakdown.technical_choices.push(movement.to_string());
            result_sentences.push(format!("{}, {}", movement, lowercase_first(first)));
        } else {
            result_sentences.push(first.clone());
        }

        result_sentences.extend(sentences.iter().skip(1).cloned());

        // Synthesize an atmosphere sentence unless one is already present.
        if !description.to_lowercase().contains("atmosphere") {
            if let Some(element) = choose(picker, &self.catalogs.atmospheric_elements) {
                let tone = request.genre.as_deref().unwrap_or("compelling");
                let sentence = format!("{} enhancing the {} atmosphere", element, tone);
                breakdown.enhancement_details.push(sentence.clone());
                result_sentences.push(sentence);
            }
        }

        breakdown.core_elements = result_sentences.clone();

        let prompt = format!("{}.", result_sentences.join(". "));
        let prompt = truncate_to_budget(&prompt, request.modality);

        EnhancementResult {
            is_valid: true,
            enhanced_prompt: Some(prompt),
            breakdown: Some(breakdown),
            errors: None,
        }
    }

    fn enhance_image(
        &self,
        description: &str,
        request: &EnhancementRequest,
        picker: &mut dyn IndexPicker,
    ) -> EnhancementResult {
        let subject = classify_subject(description);

        // Core layer: leading tokens of the description plus a framing phrase
        let mut core: Vec<String> = description
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .take(3)
            .map(|t| t.to_string())
            .collect();
        if let Some(framing) = choose(picker, self.catalogs.framings_for(subject)) {
            core.push(framing.to_string());
        }

        // Technical layer: style, a quality phrase, genre theming, and any
        // model-specific suffix
        let mut technical = vec![request
            .style
            .clone()
            .unwrap_or_else(|| "highly detailed".to_string())];
        if let Some(quality) = choose(picker, &self.catalogs.technical_quality) {
            technical.push(quality.to_string());
        }
        if let Some(ref genre) = request.genre {
            technical.push(format!("{} themed", genre));
        }
        if let Some(suffix) = request
            .model
            .as_deref()
            .and_then(|m| self.catalogs.model_enhancer(m))
        {
            technical.push(suffix.to_string());
        }

        // Enhancement layer: lighting, mood, and references
        let mut enhancement = Vec::new();
        if let Some(lighting) = choose(picker, &self.catalogs.studio_lighting) {
            enhancement.push(lighting.to_string());
        }
        if let Some(mood) = choose(picker, &self.catalogs.moods) {
            enhancement.push(mood.to_string());
        }
        if let Some(ref movie) = request.movie_reference {
            enhancement.push(format!("inspired by {}", movie));
        }
        if let Some(ref book) = request.book_reference {
            enhancement.push(format!("in the style of {}", book));
        }

        let prompt = format!(
            "{} BREAK {} BREAK {}",
            core.join(", "),
            technical.join(", "),
            enhancement.join(", ")
        );
        let prompt = truncate_to_budget(&prompt, request.modality);

        EnhancementResult {
            is_valid: true,
            enhanced_prompt: Some(prompt),
            breakdown: Some(PromptBreakdown {
                core_elements: core,
                technical_choices: technical,
                enhancement_details: enhancement,
            }),
            errors: None,
        }
    }
}

/// Split a description into sentence-like segments on `.` `!` `?`,
/// discarding empty segments.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Hard-cut a prompt at the modality's maximum character count, no ellipsis.
pub fn truncate_to_budget(text: &str, modality: Modality) -> String {
    let max = modality.max_chars();
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

fn choose<'a>(picker: &mut dyn IndexPicker, phrases: &'a [String]) -> Option<&'a str> {
    if phrases.is_empty() {
        return None;
    }
    Some(phrases[picker.pick(phrases.len())].as_str())
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
