//! Batch detection command - many images in parallel

use super::{build_config, resolve_input, BackendArg};
use anyhow::Result;
use clap::{Args, ValueEnum};
use correspondence_common::Decision;
use correspondence_detector::Detector;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Output format for batch results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BatchFormat {
    /// One human-readable line per image plus a summary
    Text,
    /// One JSON object per line, no summary
    Jsonl,
}

#[derive(Args)]
pub struct BatchCommand {
    /// Input image paths
    #[arg(value_name = "IMAGES", required = true)]
    inputs: Vec<PathBuf>,

    /// OCR backend to use for every image
    #[arg(short, long, value_enum, default_value = "none")]
    backend: BackendArg,

    /// Directory of saved cloud OCR responses, one `<image-stem>.json` per
    /// image (required with --backend cloud)
    #[arg(long)]
    ocr_json_dir: Option<PathBuf>,

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
    format: BatchFormat,
}

impl BatchCommand {
    pub fn execute(self) -> Result<()> {
        let config = build_config(
            self.config.as_deref(),
            self.threshold,
            self.block_percentile,
        )?;
        let detector = Detector::new(config)?;

        let valid_inputs: Vec<PathBuf> = self
            .inputs
            .iter()
            .filter(|path| {
                if path.exists() {
                    true
                } else {
                    warn!("Skipping non-existent file: {}", path.display());
                    false
                }
            })
            .cloned()
            .collect();

        if valid_inputs.is_empty() {
            anyhow::bail!("No valid input files found");
        }

        info!(
            "Processing {} images via {:?} backend",
            valid_inputs.len(),
            self.backend
        );

        let correspondence = AtomicUsize::new(0);
        let failed = AtomicUsize::new(0);
        let output_jsonl = self.format == BatchFormat::Jsonl;
        let started = Instant::now();

        // The detector is read-only, so invocations share it freely
        valid_inputs.par_iter().for_each(|path| {
            match self.process_one(&detector, path) {
                Ok((decision, confidence, elapsed_secs)) => {
                    if decision == Decision::Correspondence {
                        correspondence.fetch_add(1, Ordering::SeqCst);
                    }
                    if output_jsonl {
                        println!(
                            "{}",
                            serde_json::json!({
                                "type": "success",
                                "file": path.display().to_string(),
                                "decision": decision.to_string(),
                                "confidence": confidence,
                                "elapsed_secs": elapsed_secs,
                            })
                        );
                    } else {
                        println!(
                            "{}: {} (confidence {:.2}, {:.3}s)",
                            path.display(),
                            decision,
                            confidence,
                            elapsed_secs
                        );
                    }
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::SeqCst);
                    if output_jsonl {
                        println!(
                            "{}",
                            serde_json::json!({
                                "type": "error",
                                "file": path.display().to_string(),
                                "error": format!("{e:#}"),
                            })
                        );
                    } else {
                        println!("{}: ERROR: {e:#}", path.display());
                    }
                }
            }
        });

        let failed = failed.load(Ordering::SeqCst);
        let correspondence = correspondence.load(Ordering::SeqCst);
        let processed = valid_inputs.len() - failed;
        if !output_jsonl {
            println!(
                "\nProcessed {} images in {:.2}s: {} correspondence, {} other, {} failed",
                valid_inputs.len(),
                started.elapsed().as_secs_f64(),
                correspondence,
                processed - correspondence,
                failed
            );
        }
        Ok(())
    }

    fn process_one(&self, detector: &Detector, path: &PathBuf) -> Result<(Decision, f32, f64)> {
        use anyhow::Context as _;

        let started = Instant::now();
        let image = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?
            .to_rgb8();

        let ocr_json = match (&self.ocr_json_dir, self.backend) {
            (Some(dir), BackendArg::Cloud) => {
                let stem = path
                    .file_stem()
                    .context("Image path has no file name")?
                    .to_string_lossy();
                Some(dir.join(format!("{stem}.json")))
            }
            _ => None,
        };

        let input = resolve_input(self.backend, path, ocr_json.as_deref(), detector.config())?;
        let report = detector.detect(&image, input)?;
        Ok((
            report.decision,
            report.confidence,
            started.elapsed().as_secs_f64(),
        ))
    }
}
