//! CLI command implementations

pub mod enhance;
pub mod generate;
pub mod providers;

use anyhow::Result;
use medusa_gen::Modality;

pub fn parse_modality(s: &str) -> Result<Modality> {
    match s {
        "image" => Ok(Modality::Image),
        "video" => Ok(Modality::Video),
        _ => anyhow::bail!("Unknown modality '{}'. Use: image, video", s),
    }
}
