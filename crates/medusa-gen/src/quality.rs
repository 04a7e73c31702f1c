//! Aspect-ratio quality presets
//!
//! Maps the aspect ratios exposed in the UI to the pixel dimensions and
//! quality setting each vendor handles best.

use serde::{Deserialize, Serialize};

/// Resolved dimensions and quality for an aspect ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitySettings {
    pub width: u32,
    pub height: u32,
    pub recommended_quality: u8,
}

/// Optimal settings for a given aspect-ratio key. Unknown keys fall back to
/// the square default.
pub fn optimal_quality_settings(aspect_ratio: &str) -> QualitySettings {
    let (width, height, recommended_quality) = match aspect_ratio {
        "1:1" => (1024, 1024, 100),
        "3:4" => (896, 1152, 95),
        "2:3" => (832, 1216, 95),
        "9:16" => (768, 1344, 90),
        "4:3" => (1152, 896, 95),
        "3:2" => (1216, 832, 95),
        "16:9" => (1440, 810, 90),
        _ => (1024, 1024, 90),
    };
    QualitySettings {
        width,
        height,
        recommended_quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_is_full_quality() {
        let settings = optimal_quality_settings("1:1");
        assert_eq!(settings.width, 1024);
        assert_eq!(settings.height, 1024);
        assert_eq!(settings.recommended_quality, 100);
    }

    #[test]
    fn test_widescreen_dimensions() {
        let settings = optimal_quality_settings("16:9");
        assert_eq!((settings.width, settings.height), (1440, 810));
    }

    #[test]
    fn test_unknown_ratio_falls_back_to_square() {
        let settings = optimal_quality_settings("7:5");
        assert_eq!((settings.width, settings.height), (1024, 1024));
        assert_eq!(settings.recommended_quality, 90);
    }

    #[test]
    fn test_portrait_ratios_are_taller_than_wide() {
        for ratio in ["3:4", "2:3", "9:16"] {
            let s = optimal_quality_settings(ratio);
            assert!(s.height > s.width, "{} should be portrait", ratio);
        }
    }
}
