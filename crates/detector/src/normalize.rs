//! Block normalizer
//!
//! Converts each backend's raw OCR payload into a common sequence of
//! axis-aligned [`Block`] records. Ordering always equals the backend's
//! native reading order (top-to-bottom, left-to-right); nothing is
//! re-sorted. Blocks with degenerate geometry are dropped with a warning,
//! never fatal for the image.

use crate::cloud::TextAnnotation;
use crate::tesseract::LocalWord;
use correspondence_common::{Block, BlockLevel, BoundingBox};
use tracing::warn;

/// Normalizer output: the surviving blocks plus one warning per dropped
/// malformed block
#[derive(Debug, Default)]
pub struct NormalizedBlocks {
    pub blocks: Vec<Block>,
    pub warnings: Vec<String>,
}

impl NormalizedBlocks {
    fn drop_block(&mut self, reason: String) {
        warn!("Dropping malformed OCR block: {}", reason);
        self.warnings.push(reason);
    }
}

/// Normalize a cloud OCR annotation into line-level blocks
///
/// The cloud payload delivers geometry as 4-vertex polygons; the box is
/// spanned by vertices 0 and 2. Per-line confidence is not reported by this
/// backend, so `confidence` is absent.
#[must_use]
pub fn normalize_cloud(annotation: &TextAnnotation, width: u32, height: u32) -> NormalizedBlocks {
    let mut out = NormalizedBlocks::default();

    for block in &annotation.blocks {
        for line in &block.lines {
            let Some(polygon) = &line.bounding_box else {
                out.drop_block(format!("line '{}' has no bounding box", line.text));
                continue;
            };
            let vertices: Vec<(i64, i64)> =
                polygon.vertices.iter().map(|v| (v.x, v.y)).collect();

            let bbox = match BoundingBox::from_polygon(&vertices)
                .and_then(|b| b.clamp_to(width, height))
            {
                Ok(bbox) => bbox,
                Err(e) => {
                    out.drop_block(format!("line '{}': {}", line.text, e));
                    continue;
                }
            };

            out.blocks.push(Block {
                bbox,
                text: line.text.clone(),
                confidence: None,
                level: BlockLevel::Line,
            });
        }
    }
    out
}

/// Normalize Tesseract word records into word-level blocks
///
/// Structural rows and blank text are skipped silently (they are not
/// malformed, just not words). Confidence is mapped from the backend's
/// 0-100 scale to [0, 1].
#[must_use]
pub fn normalize_local(words: &[LocalWord], width: u32, height: u32) -> NormalizedBlocks {
    let mut out = NormalizedBlocks::default();

    for word in words {
        if !word.is_word() {
            continue;
        }
        let bbox = match BoundingBox::from_xywh(word.x, word.y, word.width, word.height)
            .and_then(|b| b.clamp_to(width, height))
        {
            Ok(bbox) => bbox,
            Err(e) => {
                out.drop_block(format!("word '{}': {}", word.text.trim(), e));
                continue;
            }
        };

        out.blocks.push(Block {
            bbox,
            text: word.text.trim().to_string(),
            confidence: Some((word.confidence / 100.0).clamp(0.0, 1.0)),
            level: BlockLevel::Word,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::CloudOcrResponse;

    fn annotation_from(json: &str) -> TextAnnotation {
        let response: CloudOcrResponse = serde_json::from_str(json).expect("parse");
        response.check().expect("no backend error").clone()
    }

    #[test]
    fn test_normalize_cloud_keeps_reading_order() {
        let json = r#"{"result": {"textAnnotation": {"blocks": [
            {"lines": [
                {"boundingBox": {"vertices": [{"x":"10","y":"10"},{"x":"100","y":"10"},{"x":"100","y":"30"},{"x":"10","y":"30"}]}, "text": "first"},
                {"boundingBox": {"vertices": [{"x":"10","y":"40"},{"x":"100","y":"40"},{"x":"100","y":"60"},{"x":"10","y":"60"}]}, "text": "second"}
            ]}
        ]}}}"#;
        let out = normalize_cloud(&annotation_from(json), 640, 480);

        assert!(out.warnings.is_empty());
        assert_eq!(out.blocks.len(), 2);
        assert_eq!(out.blocks[0].text, "first");
        assert_eq!(out.blocks[1].text, "second");
        assert_eq!(out.blocks[0].level, BlockLevel::Line);
        assert_eq!(out.blocks[0].confidence, None);
        assert_eq!(
            out.blocks[0].bbox,
            BoundingBox::from_corners(10, 10, 100, 30).unwrap()
        );
    }

    #[test]
    fn test_normalize_cloud_drops_degenerate_polygon() {
        // Second line's vertices are in reverse order, giving a negative extent
        let json = r#"{"result": {"textAnnotation": {"blocks": [
            {"lines": [
                {"boundingBox": {"vertices": [{"x":"10","y":"10"},{"x":"100","y":"10"},{"x":"100","y":"30"},{"x":"10","y":"30"}]}, "text": "good"},
                {"boundingBox": {"vertices": [{"x":"100","y":"30"},{"x":"100","y":"10"},{"x":"10","y":"10"},{"x":"10","y":"30"}]}, "text": "bad"}
            ]}
        ]}}}"#;
        let out = normalize_cloud(&annotation_from(json), 640, 480);

        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.blocks[0].text, "good");
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("bad"));
    }

    #[test]
    fn test_normalize_cloud_drops_missing_geometry() {
        let json = r#"{"result": {"textAnnotation": {"blocks": [
            {"lines": [{"text": "floating"}]}
        ]}}}"#;
        let out = normalize_cloud(&annotation_from(json), 640, 480);
        assert!(out.blocks.is_empty());
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_normalize_local_maps_confidence_scale() {
        let words = vec![
            LocalWord {
                level: 5,
                x: 10,
                y: 10,
                width: 50,
                height: 20,
                confidence: 96.0,
                text: "hello".to_string(),
            },
            // Structural row, skipped without a warning
            LocalWord {
                level: 2,
                x: 0,
                y: 0,
                width: 640,
                height: 480,
                confidence: -1.0,
                text: String::new(),
            },
        ];
        let out = normalize_local(&words, 640, 480);

        assert!(out.warnings.is_empty());
        assert_eq!(out.blocks.len(), 1);
        assert_eq!(out.blocks[0].level, BlockLevel::Word);
        assert!((out.blocks[0].confidence.unwrap() - 0.96).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_local_drops_bad_geometry() {
        let words = vec![
            LocalWord {
                level: 5,
                x: 10,
                y: 10,
                width: 0,
                height: 20,
                confidence: 80.0,
                text: "flat".to_string(),
            },
            // Entirely outside the image
            LocalWord {
                level: 5,
                x: 700,
                y: 10,
                width: 30,
                height: 20,
                confidence: 80.0,
                text: "gone".to_string(),
            },
        ];
        let out = normalize_local(&words, 640, 480);

        assert!(out.blocks.is_empty());
        assert_eq!(out.warnings.len(), 2);
    }
}
