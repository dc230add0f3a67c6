//! Detection pipeline
//!
//! Runs the forward-only flow: raw backend payload → normalized blocks →
//! assembled sentences → zone membership → confidence → decision. Each
//! invocation is independent and holds no state, so a caller may run many
//! pipelines concurrently against one shared read-only config.

use crate::assemble::{assemble, compute_metrics};
use crate::cloud::CloudOcrResponse;
use crate::config::DetectorConfig;
use crate::error::{DetectError, Result};
use crate::normalize::{normalize_cloud, normalize_local, NormalizedBlocks};
use crate::score::{decide, score_cloud, score_local, score_no_ocr};
use crate::tesseract::LocalWord;
use crate::zones::{color_region_zones, percentile_zones};
use correspondence_common::{Block, Decision, Sentence, Zone};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The OCR result (or its absence) for one image, already resolved by the
/// caller's backend adapter
#[derive(Debug, Clone)]
pub enum OcrInput {
    /// No OCR available; zones come from color analysis of the raster
    None,
    /// An already-retrieved cloud OCR response
    Cloud(CloudOcrResponse),
    /// Word records from a local Tesseract run
    Local(Vec<LocalWord>),
}

/// Which backend produced the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    NoOcr,
    CloudOcr,
    LocalOcr,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::NoOcr => write!(f, "no-ocr"),
            BackendKind::CloudOcr => write!(f, "cloud-ocr"),
            BackendKind::LocalOcr => write!(f, "local-ocr"),
        }
    }
}

/// Per-stage elapsed time, returned as an explicit diagnostic value rather
/// than printed as a side effect
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StageTimings {
    #[serde(with = "duration_secs")]
    pub normalize: Duration,
    #[serde(with = "duration_secs")]
    pub assemble: Duration,
    #[serde(with = "duration_secs")]
    pub zones: Duration,
    #[serde(with = "duration_secs")]
    pub score: Duration,
    #[serde(with = "duration_secs")]
    pub total: Duration,
}

/// Serialize `Duration` fields as fractional seconds
pub mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        if !secs.is_finite() || secs < 0.0 {
            return Err(serde::de::Error::custom("duration must be non-negative"));
        }
        Ok(Duration::from_secs_f64(secs))
    }
}

/// Everything a rendering or logging collaborator needs about one image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Confidence in [0, 1], rounded to two decimals
    pub confidence: f32,
    pub decision: Decision,
    pub backend: BackendKind,
    pub timings: StageTimings,
    /// Normalized leaf blocks, in the backend's reading order
    pub blocks: Vec<Block>,
    pub sentences: Vec<Sentence>,
    pub zones: Vec<Zone>,
    /// One entry per malformed block dropped during normalization
    pub warnings: Vec<String>,
    /// Recognized text when OCR ran
    pub full_text: Option<String>,
}

/// Correspondence-screenshot detector
///
/// Holds only the validated configuration; `detect` may be called from many
/// threads at once.
#[derive(Debug, Clone)]
pub struct Detector {
    config: DetectorConfig,
}

impl Detector {
    /// Create a detector with a validated configuration
    ///
    /// # Errors
    /// Returns `DetectError::InvalidConfig` if any field is out of range.
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Classify one image
    ///
    /// # Errors
    /// Returns `DetectError::InvalidImage` for an empty image and
    /// `DetectError::Backend` when a cloud payload carries an error object.
    pub fn detect(&self, image: &RgbImage, input: OcrInput) -> Result<DetectionReport> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DetectError::InvalidImage(format!(
                "image dimensions must be non-zero (got {width}x{height})"
            )));
        }

        let started = Instant::now();
        let report = match input {
            OcrInput::Cloud(response) => self.detect_cloud(&response, width, height, started)?,
            OcrInput::Local(words) => self.detect_local(&words, width, height, started),
            OcrInput::None => self.detect_no_ocr(image, width, height, started),
        };

        info!(
            "Image {}x{} via {}: confidence {:.2} -> {}",
            width, height, report.backend, report.confidence, report.decision
        );
        Ok(report)
    }

    fn detect_cloud(
        &self,
        response: &CloudOcrResponse,
        width: u32,
        height: u32,
        started: Instant,
    ) -> Result<DetectionReport> {
        let annotation = response.check()?;

        let mut timings = StageTimings::default();
        let stage = Instant::now();
        let NormalizedBlocks { blocks, warnings } = normalize_cloud(annotation, width, height);
        timings.normalize = stage.elapsed();

        let stage = Instant::now();
        let sentences = assemble(&blocks, &self.config);
        timings.assemble = stage.elapsed();

        let stage = Instant::now();
        let zones = percentile_zones(self.config.block_percentile, width, height);
        timings.zones = stage.elapsed();

        let stage = Instant::now();
        let confidence = score_cloud(&sentences, &zones);
        timings.score = stage.elapsed();
        timings.total = started.elapsed();

        let full_text = annotation.full_text.clone().or_else(|| {
            (!sentences.is_empty()).then(|| {
                sentences
                    .iter()
                    .map(Sentence::text)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        });

        debug!(
            "Cloud path: {} blocks, {} sentences, {} dropped",
            blocks.len(),
            sentences.len(),
            warnings.len()
        );
        Ok(DetectionReport {
            confidence,
            decision: decide(confidence, self.config.threshold),
            backend: BackendKind::CloudOcr,
            timings,
            blocks,
            sentences,
            zones,
            warnings,
            full_text,
        })
    }

    fn detect_local(
        &self,
        words: &[LocalWord],
        width: u32,
        height: u32,
        started: Instant,
    ) -> DetectionReport {
        let mut timings = StageTimings::default();
        let stage = Instant::now();
        let NormalizedBlocks { blocks, warnings } = normalize_local(words, width, height);
        timings.normalize = stage.elapsed();

        let stage = Instant::now();
        let sentences = assemble(&blocks, &self.config);
        let metrics = compute_metrics(&blocks, &sentences, &self.config);
        timings.assemble = stage.elapsed();

        let stage = Instant::now();
        let zones = percentile_zones(self.config.block_percentile, width, height);
        timings.zones = stage.elapsed();

        let stage = Instant::now();
        let confidence = score_local(&blocks, &zones, metrics);
        timings.score = stage.elapsed();
        timings.total = started.elapsed();

        let full_text = (!sentences.is_empty()).then(|| {
            sentences
                .iter()
                .map(Sentence::text)
                .collect::<Vec<_>>()
                .join("\n")
        });

        debug!(
            "Local path: {} blocks, {} sentences, mean confidence {:.2}",
            blocks.len(),
            sentences.len(),
            metrics.mean_word_confidence
        );
        DetectionReport {
            confidence,
            decision: decide(confidence, self.config.threshold),
            backend: BackendKind::LocalOcr,
            timings,
            blocks,
            sentences,
            zones,
            warnings,
            full_text,
        }
    }

    fn detect_no_ocr(
        &self,
        image: &RgbImage,
        width: u32,
        height: u32,
        started: Instant,
    ) -> DetectionReport {
        let mut timings = StageTimings::default();

        let stage = Instant::now();
        let zones = color_region_zones(image, &self.config);
        timings.zones = stage.elapsed();

        let stage = Instant::now();
        let confidence = score_no_ocr(&zones, width, height);
        timings.score = stage.elapsed();
        timings.total = started.elapsed();

        debug!("No-OCR path: {} color-region zones", zones.len());
        DetectionReport {
            confidence,
            decision: decide(confidence, self.config.threshold),
            backend: BackendKind::NoOcr,
            timings,
            blocks: Vec::new(),
            sentences: Vec::new(),
            zones,
            warnings: Vec::new(),
            full_text: None,
        }
    }
}
