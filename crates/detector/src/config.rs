//! Detector configuration
//!
//! All backend-tuned constants live here so deployments can adjust them
//! without code changes (optionally via a YAML file, see
//! [`DetectorConfig::from_yaml`]). The defaults were tuned against sample
//! chat screenshots and are not authoritative for every UI style.

use crate::error::{DetectError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the detection pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Fraction of the image width covered by each margin message zone
    #[serde(default = "default_block_percentile")]
    pub block_percentile: f32,

    /// Confidence cutoff for the "correspondence" decision (inclusive)
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Vertical merge tolerance, as a multiple of the mean block height
    #[serde(default = "default_vertical_tolerance")]
    pub vertical_tolerance: f32,

    /// Horizontal merge tolerance, as a multiple of the mean block width
    #[serde(default = "default_horizontal_tolerance")]
    pub horizontal_tolerance: f32,

    /// Sentence count at which the sentence-count metric saturates at 1.0
    #[serde(default = "default_sentence_count_cap")]
    pub sentence_count_cap: usize,

    /// Per-channel color levels used when quantizing for color-region zones
    #[serde(default = "default_quantization_levels")]
    pub quantization_levels: u32,

    /// Minimum fraction of the image a color region must cover
    #[serde(default = "default_min_area_fraction")]
    pub min_area_fraction: f32,

    /// Maximum fraction of the image a color region may cover (rejects the
    /// page background)
    #[serde(default = "default_max_area_fraction")]
    pub max_area_fraction: f32,

    /// Minimum fraction of its own bounding box a color region must fill
    #[serde(default = "default_min_fill_ratio")]
    pub min_fill_ratio: f32,

    /// Tesseract language codes (e.g., "eng", "eng+fra")
    #[serde(default = "default_tesseract_language")]
    pub tesseract_language: String,

    /// Tesseract page segmentation mode
    #[serde(default = "default_tesseract_psm")]
    pub tesseract_psm: u32,
}

fn default_block_percentile() -> f32 {
    0.18
}

fn default_threshold() -> f32 {
    0.7
}

fn default_vertical_tolerance() -> f32 {
    0.6
}

fn default_horizontal_tolerance() -> f32 {
    1.0
}

fn default_sentence_count_cap() -> usize {
    20
}

fn default_quantization_levels() -> u32 {
    16
}

fn default_min_area_fraction() -> f32 {
    0.01
}

fn default_max_area_fraction() -> f32 {
    0.45
}

fn default_min_fill_ratio() -> f32 {
    0.5
}

fn default_tesseract_language() -> String {
    "eng".to_string()
}

fn default_tesseract_psm() -> u32 {
    3 // PSM_AUTO
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            block_percentile: default_block_percentile(),
            threshold: default_threshold(),
            vertical_tolerance: default_vertical_tolerance(),
            horizontal_tolerance: default_horizontal_tolerance(),
            sentence_count_cap: default_sentence_count_cap(),
            quantization_levels: default_quantization_levels(),
            min_area_fraction: default_min_area_fraction(),
            max_area_fraction: default_max_area_fraction(),
            min_fill_ratio: default_min_fill_ratio(),
            tesseract_language: default_tesseract_language(),
            tesseract_psm: default_tesseract_psm(),
        }
    }
}

impl DetectorConfig {
    /// Load configuration from a YAML file and validate it
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed, or fails
    /// validation.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that all fields are within their documented ranges
    ///
    /// # Errors
    /// Returns `DetectError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(self.block_percentile > 0.0 && self.block_percentile < 1.0) {
            return Err(DetectError::InvalidConfig(format!(
                "block_percentile must be in (0, 1), got {}",
                self.block_percentile
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(DetectError::InvalidConfig(format!(
                "threshold must be in [0, 1], got {}",
                self.threshold
            )));
        }
        if self.vertical_tolerance <= 0.0 || self.horizontal_tolerance <= 0.0 {
            return Err(DetectError::InvalidConfig(format!(
                "merge tolerances must be positive, got vertical {} / horizontal {}",
                self.vertical_tolerance, self.horizontal_tolerance
            )));
        }
        if self.sentence_count_cap == 0 {
            return Err(DetectError::InvalidConfig(
                "sentence_count_cap must be at least 1".to_string(),
            ));
        }
        if !(2..=256).contains(&self.quantization_levels) {
            return Err(DetectError::InvalidConfig(format!(
                "quantization_levels must be in [2, 256], got {}",
                self.quantization_levels
            )));
        }
        if !(0.0..=1.0).contains(&self.min_area_fraction)
            || !(0.0..=1.0).contains(&self.max_area_fraction)
            || self.min_area_fraction >= self.max_area_fraction
        {
            return Err(DetectError::InvalidConfig(format!(
                "area fractions must satisfy 0 <= min < max <= 1, got min {} / max {}",
                self.min_area_fraction, self.max_area_fraction
            )));
        }
        if !(self.min_fill_ratio > 0.0 && self.min_fill_ratio <= 1.0) {
            return Err(DetectError::InvalidConfig(format!(
                "min_fill_ratio must be in (0, 1], got {}",
                self.min_fill_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_default_config_is_valid() {
        let config = DetectorConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.block_percentile - 0.18).abs() < 1e-6);
        assert!((config.threshold - 0.7).abs() < 1e-6);
        assert_eq!(config.tesseract_language, "eng");
        assert_eq!(config.tesseract_psm, 3);
    }

    #[test]
    fn test_validate_rejects_out_of_range_fields() {
        let mut config = DetectorConfig {
            block_percentile: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = DetectorConfig {
            threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = DetectorConfig {
            min_area_fraction: 0.5,
            max_area_fraction: 0.4,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = DetectorConfig {
            quantization_levels: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_yaml_applies_defaults_for_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "threshold: 0.5\nblock_percentile: 0.25").expect("write");

        let config = DetectorConfig::from_yaml(file.path()).expect("load");
        assert!((config.threshold - 0.5).abs() < 1e-6);
        assert!((config.block_percentile - 0.25).abs() < 1e-6);
        // Unspecified fields keep their defaults
        assert_eq!(config.sentence_count_cap, 20);
        assert_eq!(config.tesseract_language, "eng");
    }

    #[test]
    fn test_from_yaml_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "block_percentile: 1.2").expect("write");
        assert!(DetectorConfig::from_yaml(file.path()).is_err());
    }
}
