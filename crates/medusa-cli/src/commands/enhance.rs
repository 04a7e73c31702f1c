//! Enhance command

use super::parse_modality;
use anyhow::Result;
use medusa_gen::{ClockPicker, EnhancementRequest, PromptEnhancer};

pub struct EnhanceArgs {
    pub prompt: String,
    pub modality: String,
    pub genre: Option<String>,
    pub style: Option<String>,
    pub movie: Option<String>,
    pub book: Option<String>,
    pub model: Option<String>,
    pub breakdown: bool,
    pub format: String,
}

pub fn run(args: EnhanceArgs) -> Result<()> {
    let modality = parse_modality(&args.modality)?;

    let mut request = EnhancementRequest::new(&args.prompt, modality);
    request.genre = args.genre;
    request.style = args.style;
    request.movie_reference = args.movie;
    request.book_reference = args.book;
    request.model = args.model;

    let enhancer = PromptEnhancer::with_defaults();
    let result = enhancer.enhance(&request, &mut ClockPicker::new());

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.is_valid {
        for error in result.errors.unwrap_or_default() {
            eprintln!("Error: {}", error);
        }
        anyhow::bail!("Prompt enhancement failed");
    }

    let enhanced = result
        .enhanced_prompt
        .ok_or_else(|| anyhow::anyhow!("Enhancement produced no prompt"))?;

    println!("{}", enhanced);

    if args.breakdown {
        if let Some(breakdown) = result.breakdown {
            println!();
            println!("Core elements:");
            for item in &breakdown.core_elements {
                println!("  - {}", item);
            }
            println!("Technical choices:");
            for item in &breakdown.technical_choices {
                println!("  - {}", item);
            }
            println!("Enhancement details:");
            for item in &breakdown.enhancement_details {
                println!("  - {}", item);
            }
        }
    }

    Ok(())
}
