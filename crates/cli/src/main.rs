//! Correspondence Detect CLI
//!
//! Command-line interface for the correspondence-screenshot detector.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::batch::BatchCommand;
use commands::detect::DetectCommand;

#[derive(Parser)]
#[command(
    name = "correspondence-detect",
    version,
    about = "Decide whether an image is a screenshot of a text conversation",
    long_about = "Classifies images as correspondence (chat screenshot) or not, using\n\
                  text-region geometry from an OCR backend or color analysis of the raster.\n\n\
                  Backends:\n  \
                  - none:  no OCR; zones come from color-region detection\n  \
                  - cloud: an already-retrieved cloud OCR response (JSON file)\n  \
                  - local: the tesseract binary, invoked as a subprocess",
    after_help = "EXAMPLES:\n  \
                  # Single image, no OCR\n  \
                  correspondence-detect detect screenshot.png\n\n  \
                  # Single image against a saved cloud OCR response\n  \
                  correspondence-detect detect --backend cloud --ocr-json response.json screenshot.png\n\n  \
                  # Single image via local Tesseract, JSON report to a file\n  \
                  correspondence-detect detect --backend local --format json --report-file report.json screenshot.png\n\n  \
                  # Many images in parallel\n  \
                  correspondence-detect batch --backend local --format jsonl *.png"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single image
    Detect(DetectCommand),

    /// Classify multiple images in parallel
    Batch(BatchCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match cli.command {
        Commands::Detect(cmd) => cmd.execute(),
        Commands::Batch(cmd) => cmd.execute(),
    }
}
