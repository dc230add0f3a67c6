//! CLI command implementations

pub mod batch;
pub mod detect;

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use correspondence_detector::{cloud, tesseract, DetectorConfig, OcrInput};
use std::path::Path;

/// Which OCR backend to run for an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// No OCR; zones from color-region detection
    None,
    /// An already-retrieved cloud OCR response loaded from JSON
    Cloud,
    /// The tesseract binary invoked as a subprocess
    Local,
}

/// Build the detector configuration from an optional YAML file plus
/// command-line overrides
pub fn build_config(
    config_path: Option<&Path>,
    threshold: Option<f32>,
    block_percentile: Option<f32>,
) -> Result<DetectorConfig> {
    let mut config = match config_path {
        Some(path) => DetectorConfig::from_yaml(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DetectorConfig::default(),
    };

    if let Some(threshold) = threshold {
        config.threshold = threshold;
    }
    if let Some(percentile) = block_percentile {
        config.block_percentile = percentile;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Resolve the OCR input for one image
pub fn resolve_input(
    backend: BackendArg,
    image_path: &Path,
    ocr_json: Option<&Path>,
    config: &DetectorConfig,
) -> Result<OcrInput> {
    match backend {
        BackendArg::None => Ok(OcrInput::None),
        BackendArg::Cloud => {
            let path = ocr_json.context(
                "--backend cloud requires --ocr-json pointing at a saved OCR response",
            )?;
            let response = cloud::load_response(path)
                .with_context(|| format!("Failed to load OCR response from {}", path.display()))?;
            Ok(OcrInput::Cloud(response))
        }
        BackendArg::Local => {
            let words = tesseract::run_tesseract(image_path, config)
                .with_context(|| format!("Tesseract failed on {}", image_path.display()))?;
            Ok(OcrInput::Local(words))
        }
    }
}
