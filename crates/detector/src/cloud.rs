//! Cloud OCR payload
//!
//! Serde types for the cloud OCR response shape
//! (`result` → `textAnnotation` → `blocks` → `lines`, polygon vertices with
//! string-typed integer coordinates, optional top-level `error` object).
//! Credential handling and the HTTP call itself are the caller's concern;
//! this module consumes an already-retrieved payload.

use crate::error::{DetectError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Top-level cloud OCR response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudOcrResponse {
    #[serde(default)]
    pub result: Option<CloudResult>,
    /// Present when the backend rejected the request
    #[serde(default)]
    pub error: Option<CloudError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudResult {
    #[serde(rename = "textAnnotation")]
    pub text_annotation: TextAnnotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextAnnotation {
    #[serde(default)]
    pub blocks: Vec<CloudBlock>,
    /// Backend-provided concatenation of all recognized text
    #[serde(rename = "fullText", default)]
    pub full_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudBlock {
    #[serde(rename = "boundingBox", default)]
    pub bounding_box: Option<Polygon>,
    #[serde(default)]
    pub lines: Vec<CloudLine>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudLine {
    #[serde(rename = "boundingBox", default)]
    pub bounding_box: Option<Polygon>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

/// Polygon vertex; the backend serializes coordinates as strings and omits
/// fields that are zero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    #[serde(default, deserialize_with = "de_coord")]
    pub x: i64,
    #[serde(default, deserialize_with = "de_coord")]
    pub y: i64,
}

/// Accept both `"42"` and `42` for a coordinate
fn de_coord<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StrOrInt {
        Str(String),
        Int(i64),
    }

    match StrOrInt::deserialize(deserializer)? {
        StrOrInt::Int(v) => Ok(v),
        StrOrInt::Str(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}

impl CloudOcrResponse {
    /// Reject responses that carry a backend error or no annotation at all
    ///
    /// # Errors
    /// Returns `DetectError::Backend` describing the failure.
    pub fn check(&self) -> Result<&TextAnnotation> {
        if let Some(error) = &self.error {
            let code = error
                .code
                .map(|c| format!(" (code {c})"))
                .unwrap_or_default();
            return Err(DetectError::Backend(format!("{}{}", error.message, code)));
        }
        match &self.result {
            Some(result) => Ok(&result.text_annotation),
            None => Err(DetectError::Backend(
                "response carries neither a result nor an error".to_string(),
            )),
        }
    }
}

/// Load an already-retrieved cloud OCR response from a JSON file
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid JSON for the
/// expected response shape.
pub fn load_response(path: &Path) -> Result<CloudOcrResponse> {
    let contents = std::fs::read_to_string(path)?;
    let response: CloudOcrResponse = serde_json::from_str(&contents)?;
    Ok(response)
}
