//! Language-model prompt refinement
//!
//! Takes a locally enhanced prompt and asks a language model to rework it
//! using a fixed guideline document, then cleans and truncates the response
//! to the modality's budget. The model is behind a trait so tests can stub
//! the vendor.

use medusa_core::Result;

use crate::enhance::truncate_to_budget;
use crate::provider::Modality;

/// Guideline document fed to the language model as the system prompt
pub const PROMPT_GUIDE: &str = "\
You are an expert at enhancing generation prompts.
Your task is to maintain the core essence of the base prompt while subtly incorporating:

1. Technical Quality:
- Resolution markers (4K, ultra-detailed, high-resolution)
- Lighting descriptors (dramatic, ambient, volumetric)
- Quality enhancers (masterful, photorealistic, intricate detail)

2. Context Integration:
- Use genre to inform mood and atmosphere
- Draw inspiration from movie/book references without directly copying
- Apply artistic style as a subtle enhancement layer

3. Guidelines:
- Keep the original prompt's main subject and action as the core focus
- Add technical and quality terms naturally within the flow
- Maintain coherence and avoid conflicting descriptors
- Ensure the final prompt remains clear and focused";

const MAX_COMPLETION_TOKENS: u32 = 300;

/// A chat-completion style language model
pub trait LanguageModel {
    /// Complete a system + user prompt pair, returning the raw model text
    fn complete(&self, system_prompt: &str, user_prompt: &str, max_tokens: u32)
        -> Result<String>;
}

/// Refines enhanced prompts through a language model
pub struct PromptRefiner<'a> {
    model: &'a dyn LanguageModel,
}

impl<'a> PromptRefiner<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model }
    }

    /// Refine an enhanced prompt, cleaning the model output and hard-cutting
    /// it to the modality's maximum length.
    pub fn refine(&self, enhanced_prompt: &str, modality: Modality) -> Result<String> {
        let user_prompt = format!(
            "Enhance this {} generation prompt while maintaining its core essence:\n\n\"{}\"",
            modality, enhanced_prompt
        );

        let raw = self
            .model
            .complete(PROMPT_GUIDE, &user_prompt, MAX_COMPLETION_TOKENS)?;
        let cleaned = clean_model_output(&raw);
        Ok(truncate_to_budget(&cleaned, modality))
    }
}

/// Strip markdown artifacts the model tends to wrap its answer in: code
/// fences, bracketed asides, quotes, and hard newlines.
fn clean_model_output(raw: &str) -> String {
    // Drop fenced code blocks (keep text outside the fences)
    let mut text = String::with_capacity(raw.len());
    for (i, segment) in raw.split("```").enumerate() {
        if i % 2 == 0 {
            text.push_str(segment);
        }
    }

    // Drop bracketed fragments and quote characters, fold newlines to spaces
    let mut cleaned = String::with_capacity(text.len());
    let mut bracket_depth = 0usize;
    for c in text.chars() {
        match c {
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '"' | '\'' => {}
            '\n' | '\r' if bracket_depth == 0 => cleaned.push(' '),
            _ if bracket_depth == 0 => cleaned.push(c),
            _ => {}
        }
    }

    // Collapse runs of whitespace left behind by the removals
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubModel {
        response: String,
    }

    impl LanguageModel for StubModel {
        fn complete(&self, _system: &str, _user: &str, _max_tokens: u32) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    #[test]
    fn test_refine_cleans_and_returns_text() {
        let model = StubModel {
            response: "\"A majestic cat,\nultra-detailed\"".to_string(),
        };
        let refined = PromptRefiner::new(&model)
            .refine("a cat", Modality::Image)
            .unwrap();
        assert_eq!(refined, "A majestic cat, ultra-detailed");
    }

    #[test]
    fn test_refine_strips_code_fences_and_brackets() {
        let model = StubModel {
            response: "Before ```ignored``` after [note to self] done".to_string(),
        };
        let refined = PromptRefiner::new(&model)
            .refine("a cat", Modality::Image)
            .unwrap();
        assert_eq!(refined, "Before after done");
    }

    #[test]
    fn test_refine_truncates_to_modality_budget() {
        let model = StubModel {
            response: "word ".repeat(200),
        };
        let refined = PromptRefiner::new(&model)
            .refine("a storm", Modality::Video)
            .unwrap();
        assert!(refined.chars().count() <= Modality::Video.max_chars());
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean_model_output("a   b\n\nc"), "a b c");
    }
}
