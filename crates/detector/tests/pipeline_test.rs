//! End-to-end tests for the detection pipeline

use correspondence_detector::{
    BackendKind, CloudOcrResponse, Decision, DetectorConfig, Detector, LocalWord, OcrInput,
};
use image::{Rgb, RgbImage};

fn detector() -> Detector {
    Detector::new(DetectorConfig::default()).expect("default config is valid")
}

/// A chat-like cloud payload: three lines hugging the margins of a 720x1280
/// screenshot plus one centered header line
fn chat_response() -> CloudOcrResponse {
    let line = |x0: i64, y0: i64, x1: i64, y1: i64, text: &str| {
        serde_json::json!({
            "boundingBox": {"vertices": [
                {"x": x0.to_string(), "y": y0.to_string()},
                {"x": x1.to_string(), "y": y0.to_string()},
                {"x": x1.to_string(), "y": y1.to_string()},
                {"x": x0.to_string(), "y": y1.to_string()}
            ]},
            "text": text
        })
    };
    let payload = serde_json::json!({
        "result": {"textAnnotation": {
            "fullText": "Chat\nhey\nhi there\nsee you at 8",
            "blocks": [
                {"lines": [line(300, 20, 420, 50, "Chat")]},
                {"lines": [line(20, 200, 120, 240, "hey")]},
                {"lines": [line(600, 320, 700, 360, "hi there")]},
                {"lines": [line(10, 500, 130, 540, "see you at 8")]}
            ]
        }}
    });
    serde_json::from_value(payload).expect("valid payload")
}

#[test]
fn test_cloud_path_scores_margin_text() {
    let image = RgbImage::new(720, 1280);
    let report = detector()
        .detect(&image, OcrInput::Cloud(chat_response()))
        .expect("detection succeeds");

    assert_eq!(report.backend, BackendKind::CloudOcr);
    assert_eq!(report.blocks.len(), 4);
    assert_eq!(report.sentences.len(), 4);
    assert_eq!(report.zones.len(), 2);
    // Three of four sentence centroids sit in the margin bands
    assert!((report.confidence - 0.75).abs() < 1e-6);
    assert_eq!(report.decision, Decision::Correspondence);
    assert_eq!(
        report.full_text.as_deref(),
        Some("Chat\nhey\nhi there\nsee you at 8")
    );
    assert!(report.warnings.is_empty());
    assert!(report.timings.total >= report.timings.score);
}

#[test]
fn test_cloud_path_drops_degenerate_blocks_and_continues() {
    let payload = serde_json::json!({
        "result": {"textAnnotation": {"blocks": [{"lines": [
            {
                "boundingBox": {"vertices": [
                    {"x": "20", "y": "200"}, {"x": "120", "y": "200"},
                    {"x": "120", "y": "240"}, {"x": "20", "y": "240"}
                ]},
                "text": "good"
            },
            {
                // Reversed vertex order yields a negative extent
                "boundingBox": {"vertices": [
                    {"x": "120", "y": "240"}, {"x": "120", "y": "200"},
                    {"x": "20", "y": "200"}, {"x": "20", "y": "240"}
                ]},
                "text": "bad"
            }
        ]}]}}
    });
    let response: CloudOcrResponse = serde_json::from_value(payload).unwrap();

    let image = RgbImage::new(720, 1280);
    let report = detector()
        .detect(&image, OcrInput::Cloud(response))
        .expect("malformed block is not fatal");

    assert_eq!(report.blocks.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    // The surviving margin sentence still scores
    assert!((report.confidence - 1.0).abs() < 1e-6);
}

#[test]
fn test_empty_ocr_result_is_not_correspondence() {
    let response: CloudOcrResponse =
        serde_json::from_str(r#"{"result": {"textAnnotation": {"blocks": []}}}"#).unwrap();

    let image = RgbImage::new(720, 1280);
    for threshold in [0.1, 0.5, 0.9] {
        let config = DetectorConfig {
            threshold,
            ..Default::default()
        };
        let report = Detector::new(config)
            .unwrap()
            .detect(&image, OcrInput::Cloud(response.clone()))
            .expect("empty result is not an error");

        assert_eq!(report.confidence, 0.0);
        assert_eq!(report.decision, Decision::NotCorrespondence);
        assert!(report.full_text.is_none());
    }
}

#[test]
fn test_local_path_blends_confidence_and_zones() {
    let word = |x: i64, y: i64, text: &str| LocalWord {
        level: 5,
        x,
        y,
        width: 60,
        height: 24,
        confidence: 90.0,
        text: text.to_string(),
    };
    // All words sit inside the left margin band of a 720-wide image
    let words = vec![
        word(10, 200, "hey"),
        word(10, 300, "how"),
        word(72, 301, "are"),
        word(10, 400, "you"),
    ];

    let image = RgbImage::new(720, 1280);
    let report = detector()
        .detect(&image, OcrInput::Local(words))
        .expect("detection succeeds");

    assert_eq!(report.backend, BackendKind::LocalOcr);
    assert_eq!(report.blocks.len(), 4);
    assert_eq!(report.sentences.len(), 3);
    // 0.30 * 0.90 + 0.05 * (3 / 20) + 0.07 * 1.0, rounded to 2 decimals
    assert!((report.confidence - 0.35).abs() < 1e-6);
    assert_eq!(report.decision, Decision::NotCorrespondence);
    assert_eq!(report.full_text.as_deref(), Some("hey\nhow are\nyou"));
}

#[test]
fn test_no_ocr_path_measures_bubble_coverage() {
    let mut image = RgbImage::from_pixel(200, 400, Rgb([255, 255, 255]));
    // Two bubble-like rectangles: 80x60 and 80x80 on 200x400
    for (x0, y0, x1, y1, color) in [
        (8u32, 40u32, 88u32, 100u32, Rgb([0u8, 120, 215])),
        (112, 160, 192, 240, Rgb([229, 229, 229])),
    ] {
        for y in y0..y1 {
            for x in x0..x1 {
                image.put_pixel(x, y, color);
            }
        }
    }

    let report = detector()
        .detect(&image, OcrInput::None)
        .expect("detection succeeds");

    assert_eq!(report.backend, BackendKind::NoOcr);
    assert_eq!(report.zones.len(), 2);
    assert!(report.blocks.is_empty());
    // (80*60 + 80*80) / (200*400) = 0.14
    assert!((report.confidence - 0.14).abs() < 1e-6);
    assert_eq!(report.decision, Decision::NotCorrespondence);
}

#[test]
fn test_decision_tie_resolves_to_correspondence() {
    // A payload whose single sentence sits in a zone scores exactly 1.0
    let config = DetectorConfig {
        threshold: 1.0,
        ..Default::default()
    };
    let payload = serde_json::json!({
        "result": {"textAnnotation": {"blocks": [{"lines": [{
            "boundingBox": {"vertices": [
                {"x": "10", "y": "100"}, {"x": "100", "y": "100"},
                {"x": "100", "y": "140"}, {"x": "10", "y": "140"}
            ]},
            "text": "hello"
        }]}]}}
    });
    let response: CloudOcrResponse = serde_json::from_value(payload).unwrap();

    let image = RgbImage::new(720, 1280);
    let report = Detector::new(config)
        .unwrap()
        .detect(&image, OcrInput::Cloud(response))
        .expect("detection succeeds");

    assert_eq!(report.confidence, 1.0);
    assert_eq!(report.decision, Decision::Correspondence);
}

#[test]
fn test_report_round_trips_through_json() {
    let image = RgbImage::new(720, 1280);
    let report = detector()
        .detect(&image, OcrInput::Cloud(chat_response()))
        .expect("detection succeeds");

    let json = serde_json::to_string(&report).expect("serialize");
    let back: correspondence_detector::DetectionReport =
        serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.confidence, report.confidence);
    assert_eq!(back.decision, report.decision);
    assert_eq!(back.sentences.len(), report.sentences.len());
}
