//! Generate command

use super::parse_modality;
use anyhow::Result;
use medusa_gen::providers::{create_provider, OpenAiModel};
use medusa_gen::{
    media, ClockPicker, EnhancementRequest, GenerateRequest, MedusaConfig, Modality,
    PromptEnhancer, PromptRefiner, SessionHistory,
};
use std::path::{Path, PathBuf};

pub struct GenerateArgs {
    pub prompt: String,
    pub modality: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub genre: Option<String>,
    pub style: Option<String>,
    pub movie: Option<String>,
    pub book: Option<String>,
    pub aspect_ratio: Option<String>,
    pub image: Option<String>,
    pub seed: Option<u64>,
    pub raw: bool,
    pub refine: bool,
    pub max_attempts: Option<u32>,
    pub interval_secs: Option<u64>,
    pub count: u32,
    pub output: Option<String>,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let modality = parse_modality(&args.modality)?;
    let config = MedusaConfig::load().unwrap_or_default();

    let prompt = if args.raw {
        args.prompt.clone()
    } else {
        enhance_prompt(&args, modality)?
    };

    let prompt = if args.refine {
        let model = OpenAiModel::from_config(&config)?;
        let refiner = PromptRefiner::new(&model);
        refiner.refine(&prompt, modality)?
    } else {
        prompt
    };

    let provider_name = args
        .provider
        .clone()
        .unwrap_or_else(|| config.default_provider(modality).to_string());
    let provider = create_provider(&provider_name, &config)?;

    if !provider.supported_modalities().contains(&modality) {
        anyhow::bail!(
            "Provider '{}' does not support {} generation",
            provider_name,
            modality
        );
    }

    let request = GenerateRequest {
        prompt: prompt.clone(),
        modality,
        model: args.model.clone(),
        reference_image_url: args.image.clone(),
        aspect_ratio: args.aspect_ratio.clone(),
        seed: args.seed,
    };

    let options = resolve_poll_options(&config, &provider_name, &args);
    let cancel = medusa_gen::CancelToken::new();
    let mut history = SessionHistory::new();

    println!("Generating {} via {}...", modality, provider_name);
    println!("  Prompt: {}", prompt);

    for i in 0..args.count.max(1) {
        let result = provider.generate(&request, &options, &cancel)?;

        println!("  Asset: {}", result.asset_url);
        println!("  Done in {:.1}s", result.duration_secs);

        if let Some(ref output) = args.output {
            let path = output_path_for(output, i, args.count);
            let hash = media::download_asset(&result.asset_url, &path)?;
            println!(
                "  Downloaded: {} ({}) [{}]",
                path.display(),
                media::content_type_for(&result.asset_url),
                hash
            );
        }

        history.record(&result, modality);
    }

    if args.count > 1 {
        println!();
        println!("Session history ({} generations):", history.len());
        for entry in history.recent(args.count as usize) {
            println!("  {} {} {}", entry.timestamp, entry.provider, entry.asset_url);
        }
    }

    Ok(())
}

fn enhance_prompt(args: &GenerateArgs, modality: Modality) -> Result<String> {
    let mut request = EnhancementRequest::new(&args.prompt, modality);
    request.genre = args.genre.clone();
    request.style = args.style.clone();
    request.movie_reference = args.movie.clone();
    request.book_reference = args.book.clone();
    request.model = args.model.clone();

    let enhancer = PromptEnhancer::with_defaults();
    let result = enhancer.enhance(&request, &mut ClockPicker::new());

    if !result.is_valid {
        let errors = result.errors.unwrap_or_default().join("; ");
        anyhow::bail!("Prompt enhancement failed: {}", errors);
    }

    result
        .enhanced_prompt
        .ok_or_else(|| anyhow::anyhow!("Enhancement produced no prompt"))
}

fn resolve_poll_options(
    config: &MedusaConfig,
    provider_name: &str,
    args: &GenerateArgs,
) -> medusa_gen::PollOptions {
    let mut options = config.poll_options(provider_name);
    if let Some(max_attempts) = args.max_attempts {
        options.max_attempts = max_attempts;
    }
    if let Some(secs) = args.interval_secs {
        options.interval = std::time::Duration::from_secs(secs);
    }
    options
}

fn output_path_for(output: &str, index: u32, count: u32) -> PathBuf {
    let path = Path::new(output);
    if count <= 1 {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset");
    let ext = path.extension().and_then(|s| s.to_str());
    let file_name = match ext {
        Some(ext) => format!("{}_{}.{}", stem, index + 1, ext),
        None => format!("{}_{}", stem, index + 1),
    };
    path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args(prompt: &str) -> GenerateArgs {
        GenerateArgs {
            prompt: prompt.to_string(),
            modality: "image".to_string(),
            provider: None,
            model: None,
            genre: None,
            style: None,
            movie: None,
            book: None,
            aspect_ratio: None,
            image: None,
            seed: None,
            raw: false,
            refine: false,
            max_attempts: None,
            interval_secs: None,
            count: 1,
            output: None,
        }
    }

    #[test]
    fn test_movie_and_book_reach_the_enhancer() {
        let mut args = base_args("a city street");
        args.movie = Some("Blade Runner".to_string());
        args.book = Some("Neuromancer".to_string());
        let prompt = enhance_prompt(&args, Modality::Image).unwrap();
        assert!(prompt.contains("inspired by Blade Runner"));
        assert!(prompt.contains("in the style of Neuromancer"));
    }

    #[test]
    fn test_poll_flags_override_config() {
        let config = MedusaConfig::default();
        let mut args = base_args("a cat");
        args.max_attempts = Some(5);
        args.interval_secs = Some(2);
        let options = resolve_poll_options(&config, "replicate", &args);
        assert_eq!(options.max_attempts, 5);
        assert_eq!(options.interval, std::time::Duration::from_secs(2));

        // Without the flags, config defaults apply
        let defaults = resolve_poll_options(&config, "replicate", &base_args("a cat"));
        assert_eq!(defaults.max_attempts, 30);
        assert_eq!(defaults.interval, std::time::Duration::from_secs(15));
    }

    #[test]
    fn test_output_path_single() {
        assert_eq!(output_path_for("out.png", 0, 1), PathBuf::from("out.png"));
    }

    #[test]
    fn test_output_path_numbered() {
        assert_eq!(
            output_path_for("out.png", 1, 3),
            PathBuf::from("out_2.png")
        );
        assert_eq!(output_path_for("out", 0, 2), PathBuf::from("out_1"));
    }
}
