//! Common types for correspondence-screenshot detection
//!
//! Shared geometry and domain types used by the detection pipeline:
//! axis-aligned bounding boxes, normalized text blocks, assembled
//! sentences, message zones, and the binary decision label.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Geometry errors
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Degenerate bounding box: ({x0}, {y0})-({x1}, {y1})")]
    DegenerateBox { x0: i64, y0: i64, x1: i64, y1: i64 },

    #[error("Bounding box ({x0}, {y0})-({x1}, {y1}) lies outside the {width}x{height} image")]
    OutsideImage {
        x0: u32,
        y0: u32,
        x1: u32,
        y1: u32,
        width: u32,
        height: u32,
    },

    #[error("Polygon has {0} vertices (need at least 3)")]
    TooFewVertices(usize),
}

/// Axis-aligned rectangle in pixel coordinates
///
/// Invariant: `x0 < x1` and `y0 < y1`. Constructors reject degenerate
/// geometry instead of normalizing it silently, so a box that exists is
/// always usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl BoundingBox {
    /// Create a box from two corner points
    ///
    /// Coordinates left of or above the image origin are clamped to 0.
    ///
    /// # Errors
    /// Returns `GeometryError::DegenerateBox` if the corners do not span a
    /// positive width and height after clamping.
    pub fn from_corners(x0: i64, y0: i64, x1: i64, y1: i64) -> Result<Self, GeometryError> {
        // Clamp before the degeneracy check: a span that lies entirely at
        // negative coordinates collapses to zero width or height
        let (cx0, cy0, cx1, cy1) = (x0.max(0), y0.max(0), x1.max(0), y1.max(0));
        if cx1 <= cx0 || cy1 <= cy0 {
            return Err(GeometryError::DegenerateBox { x0, y0, x1, y1 });
        }
        Ok(Self {
            x0: cx0 as u32,
            y0: cy0 as u32,
            x1: cx1 as u32,
            y1: cy1 as u32,
        })
    }

    /// Create a box from an origin and extent
    ///
    /// # Errors
    /// Returns `GeometryError::DegenerateBox` for non-positive width or height.
    pub fn from_xywh(x: i64, y: i64, width: i64, height: i64) -> Result<Self, GeometryError> {
        Self::from_corners(x, y, x + width, y + height)
    }

    /// Derive the axis-aligned box from a quadrilateral's vertices
    ///
    /// Vertices are assumed to arrive in clockwise order starting at the
    /// top-left, so the box is spanned by vertex 0 and vertex 2. A payload
    /// that violates the ordering yields a negative extent and is rejected
    /// as degenerate.
    ///
    /// # Errors
    /// Returns `GeometryError::TooFewVertices` if fewer than 3 vertices are
    /// given, or `GeometryError::DegenerateBox` if vertex 2 does not lie
    /// below-right of vertex 0.
    pub fn from_polygon(vertices: &[(i64, i64)]) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        let (x0, y0) = vertices[0];
        let (x1, y1) = vertices[2];
        Self::from_corners(x0, y0, x1, y1)
    }

    /// Intersect the box with the image rectangle
    ///
    /// # Errors
    /// Returns `GeometryError::OutsideImage` if nothing of the box remains
    /// inside the image.
    pub fn clamp_to(&self, width: u32, height: u32) -> Result<Self, GeometryError> {
        let x1 = self.x1.min(width);
        let y1 = self.y1.min(height);
        if self.x0 >= x1 || self.y0 >= y1 {
            return Err(GeometryError::OutsideImage {
                x0: self.x0,
                y0: self.y0,
                x1: self.x1,
                y1: self.y1,
                width,
                height,
            });
        }
        Ok(Self {
            x0: self.x0,
            y0: self.y0,
            x1,
            y1,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Center point of the box
    #[must_use]
    pub fn centroid(&self) -> (f32, f32) {
        (
            (self.x0 + self.x1) as f32 / 2.0,
            (self.y0 + self.y1) as f32 / 2.0,
        )
    }

    /// Whether a point lies inside the box (inclusive of the top-left edge)
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x0 as f32 && x < self.x1 as f32 && y >= self.y0 as f32 && y < self.y1 as f32
    }

    /// Smallest box enclosing both boxes
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Granularity of a normalized text block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockLevel {
    Word,
    Line,
    Block,
}

/// A leaf-level unit of recognized text
///
/// Produced by the block normalizer from a backend's raw payload; the
/// sequence keeps the backend's native reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub bbox: BoundingBox,
    pub text: String,
    /// Recognition confidence in [0, 1]; absent for backends that do not
    /// report per-block confidence
    pub confidence: Option<f32>,
    pub level: BlockLevel,
}

/// A textual group of spatially adjacent blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Minimal enclosing rectangle of the member blocks
    pub bbox: BoundingBox,
    /// Member blocks in the backend's native reading order
    pub blocks: Vec<Block>,
}

impl Sentence {
    /// Joined text of the member blocks
    #[must_use]
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a message zone was constructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    /// Margin band derived from a percentile split of the image width
    PercentileBand,
    /// Near-uniform color region detected in the raster
    ColorRegion,
}

/// A candidate message-column region of the image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub bbox: BoundingBox,
    pub kind: ZoneKind,
}

/// Binary classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Correspondence,
    NotCorrespondence,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Correspondence => write!(f, "correspondence"),
            Decision::NotCorrespondence => write!(f, "not correspondence"),
        }
    }
}
