//! Correspondence-screenshot detection
//!
//! Decides whether an image is a screenshot of a text conversation by
//! measuring how much of its detected text falls inside "message zones":
//! the margin bands where chat UIs place bubbles, or color regions that
//! look like bubble backgrounds when no OCR is available.
//!
//! Three interchangeable inputs feed one pipeline: an already-retrieved
//! cloud OCR payload, word records from a local Tesseract run, or nothing
//! at all. The pipeline normalizes the payload into blocks, assembles
//! blocks into sentences, builds zones, and scores zone containment into a
//! confidence in [0, 1] compared against a configured threshold.
//!
//! # Example
//! ```no_run
//! use correspondence_detector::{Detector, DetectorConfig, OcrInput};
//! use image::RgbImage;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = Detector::new(DetectorConfig::default())?;
//! let image = image::open("screenshot.png")?.to_rgb8();
//!
//! let report = detector.detect(&image, OcrInput::None)?;
//! println!("{}: confidence {:.2}", report.decision, report.confidence);
//! # Ok(())
//! # }
//! ```

pub mod assemble;
pub mod cloud;
pub mod config;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod score;
pub mod tesseract;
pub mod zones;

pub use cloud::CloudOcrResponse;
pub use config::DetectorConfig;
pub use error::{DetectError, Result};
pub use pipeline::{BackendKind, DetectionReport, Detector, OcrInput, StageTimings};
pub use tesseract::LocalWord;

pub use correspondence_common::{
    Block, BlockLevel, BoundingBox, Decision, Sentence, Zone, ZoneKind,
};
