//! Medusa CLI - Command-line interface for AI image and video generation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{enhance, generate, providers};

#[derive(Parser)]
#[command(name = "medusa")]
#[command(about = "Prompt enhancement and AI image/video generation", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enhance a prompt without generating anything
    Enhance {
        /// The prompt to enhance
        prompt: String,

        /// Target modality (image or video)
        #[arg(long, default_value = "image")]
        modality: String,

        /// Genre hint (e.g. sci-fi, horror, fantasy)
        #[arg(long)]
        genre: Option<String>,

        /// Visual style descriptor
        #[arg(long)]
        style: Option<String>,

        /// Reference movie for visual inspiration
        #[arg(long)]
        movie: Option<String>,

        /// Reference book for stylistic inspiration
        #[arg(long)]
        book: Option<String>,

        /// Target model id (adds model-specific trigger phrases)
        #[arg(long)]
        model: Option<String>,

        /// Show the layered breakdown alongside the prompt
        #[arg(long)]
        breakdown: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Generate an image or video from a prompt
    Generate {
        /// The prompt to generate from
        prompt: String,

        /// Target modality (image or video)
        #[arg(long, default_value = "image")]
        modality: String,

        /// Provider override (replicate, luma, mock)
        #[arg(long)]
        provider: Option<String>,

        /// Model id for providers that accept one
        #[arg(long)]
        model: Option<String>,

        /// Genre hint for enhancement
        #[arg(long)]
        genre: Option<String>,

        /// Visual style descriptor for enhancement
        #[arg(long)]
        style: Option<String>,

        /// Reference movie for visual inspiration
        #[arg(long)]
        movie: Option<String>,

        /// Reference book for stylistic inspiration
        #[arg(long)]
        book: Option<String>,

        /// Aspect ratio (e.g. 16:9, 1:1, 9:16)
        #[arg(long)]
        aspect_ratio: Option<String>,

        /// Reference image URL (video keyframe or structural conditioning)
        #[arg(long)]
        image: Option<String>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Skip prompt enhancement and send the prompt as-is
        #[arg(long)]
        raw: bool,

        /// Refine the enhanced prompt through a language model
        #[arg(long)]
        refine: bool,

        /// Override the poll attempt budget for this invocation
        #[arg(long)]
        max_attempts: Option<u32>,

        /// Override the poll interval in seconds for this invocation
        #[arg(long)]
        interval_secs: Option<u64>,

        /// Number of generations to run
        #[arg(long, default_value = "1")]
        count: u32,

        /// Download the result to this path
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List providers and their availability
    Providers,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Enhance {
            prompt,
            modality,
            genre,
            style,
            movie,
            book,
            model,
            breakdown,
            format,
        } => enhance::run(enhance::EnhanceArgs {
            prompt,
            modality,
            genre,
            style,
            movie,
            book,
            model,
            breakdown,
            format,
        }),
        Commands::Generate {
            prompt,
            modality,
            provider,
            model,
            genre,
            style,
            movie,
            book,
            aspect_ratio,
            image,
            seed,
            raw,
            refine,
            max_attempts,
            interval_secs,
            count,
            output,
        } => generate::run(generate::GenerateArgs {
            prompt,
            modality,
            provider,
            model,
            genre,
            style,
            movie,
            book,
            aspect_ratio,
            image,
            seed,
            raw,
            refine,
            max_attempts,
            interval_secs,
            count,
            output,
        }),
        Commands::Providers => providers::run(),
    }
}
