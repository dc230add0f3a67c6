//! Sentence assembler
//!
//! Groups normalized leaf blocks into sentences by spatial proximity. Two
//! blocks join the same sentence (transitively) when their vertical centers
//! are within a tolerance proportional to their mean height and their
//! horizontal gap is within a tolerance proportional to their mean width.
//! The grouping runs over a union-find, so the partition is independent of
//! input order.

use crate::config::DetectorConfig;
use correspondence_common::{Block, Sentence};
use tracing::debug;

/// Pre-normalized OCR quality metrics consumed by the local-OCR scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcrMetrics {
    /// Mean block confidence in [0, 1]; 0.0 when no block reports one
    pub mean_word_confidence: f32,
    /// Sentence count divided by the configured cap, clamped to [0, 1]
    pub sentence_count_metric: f32,
}

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            let root = self.find(self.parent[i]);
            self.parent[i] = root;
        }
        self.parent[i]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// Whether two blocks are close enough to belong to one sentence
fn adjacent(a: &Block, b: &Block, config: &DetectorConfig) -> bool {
    let (_, cy_a) = a.bbox.centroid();
    let (_, cy_b) = b.bbox.centroid();
    let mean_height = (a.bbox.height() + b.bbox.height()) as f32 / 2.0;
    if (cy_a - cy_b).abs() > config.vertical_tolerance * mean_height {
        return false;
    }

    // Gap is negative when the blocks overlap horizontally
    let gap = i64::from(a.bbox.x0.max(b.bbox.x0)) - i64::from(a.bbox.x1.min(b.bbox.x1));
    let mean_width = (a.bbox.width() + b.bbox.width()) as f32 / 2.0;
    gap as f32 <= config.horizontal_tolerance * mean_width
}

/// Assemble blocks into sentences
///
/// Member blocks keep the backend's native order; sentences appear in order
/// of their first member block.
#[must_use]
pub fn assemble(blocks: &[Block], config: &DetectorConfig) -> Vec<Sentence> {
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut uf = UnionFind::new(blocks.len());
    for i in 0..blocks.len() {
        for j in (i + 1)..blocks.len() {
            if adjacent(&blocks[i], &blocks[j], config) {
                uf.union(i, j);
            }
        }
    }

    // Bucket members by root, in first-appearance order
    let mut sentences: Vec<Sentence> = Vec::new();
    let mut root_to_sentence: Vec<Option<usize>> = vec![None; blocks.len()];
    for (i, block) in blocks.iter().enumerate() {
        let root = uf.find(i);
        match root_to_sentence[root] {
            Some(s) => {
                sentences[s].bbox = sentences[s].bbox.union(&block.bbox);
                sentences[s].blocks.push(block.clone());
            }
            None => {
                root_to_sentence[root] = Some(sentences.len());
                sentences.push(Sentence {
                    bbox: block.bbox,
                    blocks: vec![block.clone()],
                });
            }
        }
    }

    debug!(
        "Assembled {} blocks into {} sentences",
        blocks.len(),
        sentences.len()
    );
    sentences
}

/// Compute the scorer's pre-normalized metrics for an assembled image
#[must_use]
pub fn compute_metrics(
    blocks: &[Block],
    sentences: &[Sentence],
    config: &DetectorConfig,
) -> OcrMetrics {
    let confidences: Vec<f32> = blocks.iter().filter_map(|b| b.confidence).collect();
    let mean_word_confidence = if confidences.is_empty() {
        0.0
    } else {
        confidences.iter().sum::<f32>() / confidences.len() as f32
    };

    let sentence_count_metric =
        (sentences.len() as f32 / config.sentence_count_cap as f32).min(1.0);

    OcrMetrics {
        mean_word_confidence,
        sentence_count_metric,
    }
}
