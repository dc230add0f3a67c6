//! Local OCR via the Tesseract binary
//!
//! Runs `tesseract <image> stdout --psm N -l <lang> tsv` as a subprocess and
//! parses the TSV table into word records. No bindings are linked; the
//! binary just has to be on `PATH`.

use crate::config::DetectorConfig;
use crate::error::{DetectError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Tesseract page-iterator level for words in TSV output
const WORD_LEVEL: u32 = 5;

/// One row of Tesseract's TSV output
///
/// Confidence keeps the backend's 0-100 scale here; the normalizer maps it
/// to [0, 1]. Structural rows (page/block/paragraph/line) carry confidence
/// -1 and no text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalWord {
    pub level: u32,
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
    pub confidence: f32,
    pub text: String,
}

impl LocalWord {
    /// Whether this row is an actual recognized word
    #[must_use]
    pub fn is_word(&self) -> bool {
        self.level == WORD_LEVEL && self.confidence >= 0.0 && !self.text.trim().is_empty()
    }
}

/// Parse Tesseract TSV output into word records
///
/// The header row and rows that do not have the expected 12 columns are
/// skipped. Structural rows are kept (callers filter with
/// [`LocalWord::is_word`]) so block counts can be diagnosed if needed.
#[must_use]
pub fn parse_tsv(tsv: &str) -> Vec<LocalWord> {
    let mut words = Vec::new();
    for (index, line) in tsv.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 12 {
            debug!("Skipping TSV row {} with {} columns", index, fields.len());
            continue;
        }
        if fields[0] == "level" {
            continue; // header
        }

        let parsed = (|| -> Option<LocalWord> {
            Some(LocalWord {
                level: fields[0].parse().ok()?,
                x: fields[6].parse().ok()?,
                y: fields[7].parse().ok()?,
                width: fields[8].parse().ok()?,
                height: fields[9].parse().ok()?,
                confidence: fields[10].parse().ok()?,
                text: fields[11].to_string(),
            })
        })();

        match parsed {
            Some(word) => words.push(word),
            None => debug!("Skipping unparsable TSV row {}: {}", index, line),
        }
    }
    words
}

/// Run the Tesseract binary on an image file and parse its TSV output
///
/// # Errors
/// Returns `DetectError::Backend` if the binary cannot be spawned or exits
/// with a non-zero status.
pub fn run_tesseract(image_path: &Path, config: &DetectorConfig) -> Result<Vec<LocalWord>> {
    let output = Command::new("tesseract")
        .arg(image_path)
        .arg("stdout")
        .arg("--psm")
        .arg(config.tesseract_psm.to_string())
        .arg("-l")
        .arg(&config.tesseract_language)
        .arg("tsv")
        .output()
        .map_err(|e| {
            DetectError::Backend(format!(
                "failed to invoke tesseract (is it installed and on PATH?): {e}"
            ))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DetectError::Backend(format!(
            "tesseract exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let words = parse_tsv(&stdout);
    debug!(
        "Tesseract produced {} TSV rows for {}",
        words.len(),
        image_path.display()
    );
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_TSV: &str = "\
level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
2\t1\t1\t0\t0\t0\t24\t30\t200\t28\t-1\t
4\t1\t1\t1\t1\t0\t24\t30\t200\t28\t-1\t
5\t1\t1\t1\t1\t1\t24\t30\t60\t28\t96.06\thello
5\t1\t1\t1\t1\t2\t96\t31\t80\t26\t91.4\tthere
5\t1\t1\t1\t1\t3\t190\t31\t20\t26\t52.0\t ";

    #[test]
    fn test_parse_tsv_keeps_all_rows() {
        let words = parse_tsv(SAMPLE_TSV);
        assert_eq!(words.len(), 6);
        assert_eq!(words[3].text, "hello");
        assert_eq!(words[3].x, 24);
        assert_eq!(words[3].width, 60);
        assert!((words[3].confidence - 96.06).abs() < 1e-3);
    }

    #[test]
    fn test_is_word_filters_structural_and_blank_rows() {
        let words = parse_tsv(SAMPLE_TSV);
        let real: Vec<&LocalWord> = words.iter().filter(|w| w.is_word()).collect();
        // Page/block/line rows have conf -1; the last row has blank text
        assert_eq!(real.len(), 2);
        assert_eq!(real[0].text, "hello");
        assert_eq!(real[1].text, "there");
    }

    #[test]
    fn test_parse_tsv_skips_malformed_rows() {
        let tsv = "5\t1\t1\t1\t1\t1\tnot_a_number\t30\t60\t28\t96.0\thello\n\
                   too\tfew\tcolumns";
        assert!(parse_tsv(tsv).is_empty());
    }

    #[test]
    fn test_run_tesseract_failure_is_backend_error() {
        // Either the binary is missing (spawn fails) or it exits non-zero on
        // a nonexistent input file; both surface as a backend error
        let result = run_tesseract(
            Path::new("/nonexistent-dir/missing.png"),
            &DetectorConfig::default(),
        );
        assert!(matches!(result, Err(DetectError::Backend(_))));
    }
}
