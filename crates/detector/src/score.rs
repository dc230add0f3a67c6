//! Zone-confidence scoring and the decision function
//!
//! Every path returns a confidence clamped to [0, 1] and rounded to two
//! decimal places, monotone in "more zone-contained text means higher
//! confidence".

use crate::assemble::OcrMetrics;
use crate::zones::point_in_zones;
use correspondence_common::{Block, Decision, Sentence, Zone};

/// Weight of the mean word confidence in the local-OCR score
pub const WORD_CONFIDENCE_WEIGHT: f32 = 0.30;
/// Weight of the sentence-count metric in the local-OCR score
pub const SENTENCE_COUNT_WEIGHT: f32 = 0.05;
/// Weight of the blocks-in-zone fraction in the local-OCR score
pub const BLOCKS_IN_ZONE_WEIGHT: f32 = 0.07;

/// Clamp to [0, 1] and round to two decimals
#[must_use]
pub fn finalize(confidence: f32) -> f32 {
    (confidence.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

/// Fraction of sentences whose bbox centroid lies inside any zone
///
/// Defined as 0 when there are no sentences.
#[must_use]
pub fn score_cloud(sentences: &[Sentence], zones: &[Zone]) -> f32 {
    if sentences.is_empty() {
        return 0.0;
    }
    let inside = sentences
        .iter()
        .filter(|s| {
            let (x, y) = s.bbox.centroid();
            point_in_zones(zones, x, y)
        })
        .count();
    finalize(inside as f32 / sentences.len() as f32)
}

/// Weighted blend of OCR quality and zone containment
///
/// The weights are fixed design constants reproduced exactly for
/// compatibility with deployed thresholds.
#[must_use]
pub fn score_local(blocks: &[Block], zones: &[Zone], metrics: OcrMetrics) -> f32 {
    let in_zone = if blocks.is_empty() {
        0.0
    } else {
        let inside = blocks
            .iter()
            .filter(|b| {
                let (x, y) = b.bbox.centroid();
                point_in_zones(zones, x, y)
            })
            .count();
        inside as f32 / blocks.len() as f32
    };

    let raw = WORD_CONFIDENCE_WEIGHT * metrics.mean_word_confidence
        + SENTENCE_COUNT_WEIGHT * metrics.sentence_count_metric
        + BLOCKS_IN_ZONE_WEIGHT * in_zone;
    finalize(raw.min(1.0))
}

/// Fraction of the image area covered by color-region zone bounding boxes
#[must_use]
pub fn score_no_ocr(zones: &[Zone], width: u32, height: u32) -> f32 {
    let image_area = u64::from(width) * u64::from(height);
    if image_area == 0 {
        return 0.0;
    }
    let covered: u64 = zones.iter().map(|z| z.bbox.area()).sum();
    finalize(covered as f32 / image_area as f32)
}

/// Apply the threshold to a confidence
///
/// A tie at equality resolves to correspondence (inclusive bound).
#[must_use]
pub fn decide(confidence: f32, threshold: f32) -> Decision {
    if confidence >= threshold {
        Decision::Correspondence
    } else {
        Decision::NotCorrespondence
    }
}
