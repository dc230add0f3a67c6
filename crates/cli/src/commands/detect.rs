//! Single-image detection command

use super::{build_config, resolve_input, BackendArg};
use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use correspondence_detector::{DetectionReport, Detector};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// Output format for a single-image report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DetectFormat {
    /// Human-readable summary
    Text,
    /// The full report as pretty-printed JSON
    Json,
}

#[derive(Args)]
pub struct DetectCommand {
    /// Input image path
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// OCR backend to use
    #[arg(short, long, value_enum, default_value = "none")]
    backend: BackendArg,

    /// Saved cloud OCR response (required with --backend cloud)
    #[arg(long)]
    ocr_json: Option<PathBuf>,

    /// Confidence cutoff override
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Message-zone width override, as a fraction of image width
    #[arg(long)]
    block_percentile: Option<f32>,

    /// Optional YAML config file with tunable constants
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: DetectFormat,

    /// Write the full JSON report to this file
    #[arg(long)]
    report_file: Option<PathBuf>,
}

impl DetectCommand {
    pub fn execute(self) -> Result<()> {
        let config = build_config(
            self.config.as_deref(),
            self.threshold,
            self.block_percentile,
        )?;
        let detector = Detector::new(config)?;

        let image = image::open(&self.image)
            .with_context(|| format!("Failed to open image {}", self.image.display()))?
            .to_rgb8();

        let backend_start = Instant::now();
        let input = resolve_input(
            self.backend,
            &self.image,
            self.ocr_json.as_deref(),
            detector.config(),
        )?;
        let backend_elapsed = backend_start.elapsed();

        let report = detector
            .detect(&image, input)
            .with_context(|| format!("Detection failed for {}", self.image.display()))?;

        if let Some(path) = &self.report_file {
            let json = serde_json::to_string_pretty(&report)?;
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report written to {}", path.display());
        }

        match self.format {
            DetectFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            DetectFormat::Text => {
                print_text_report(&report, detector.config().threshold, backend_elapsed);
            }
        }
        Ok(())
    }
}

fn print_text_report(
    report: &DetectionReport,
    threshold: f32,
    backend_elapsed: std::time::Duration,
) {
    println!(
        "{}. Confidence: {:.2} at threshold {:.2}",
        report.decision, report.confidence, threshold
    );
    println!(
        "Backend: {} ({} blocks, {} sentences, {} zones)",
        report.backend,
        report.blocks.len(),
        report.sentences.len(),
        report.zones.len()
    );
    println!(
        "Timing: backend {:.3}s, normalize {:.3}s, assemble {:.3}s, zones {:.3}s, score {:.3}s, total {:.3}s",
        backend_elapsed.as_secs_f64(),
        report.timings.normalize.as_secs_f64(),
        report.timings.assemble.as_secs_f64(),
        report.timings.zones.as_secs_f64(),
        report.timings.score.as_secs_f64(),
        report.timings.total.as_secs_f64()
    );
    for warning in &report.warnings {
        println!("Warning: {warning}");
    }
    if let Some(text) = &report.full_text {
        println!("Recognized text:\n{text}");
    }
}
