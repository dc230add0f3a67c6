//! Message-zone construction
//!
//! Chat UIs place message bubbles near the left and right margins, so text
//! central to the image (captions, headers) is treated as
//! non-conversational. Two construction modes:
//!
//! - **Percentile bands** (OCR paths): two mirror-image margin bands whose
//!   width is a configured fraction of the image width.
//! - **Color regions** (no-OCR path): connected regions of near-uniform
//!   quantized color in the raster, filtered by area and fill ratio, as
//!   candidate chat-bubble backgrounds.

use crate::config::DetectorConfig;
use correspondence_common::{BoundingBox, Zone, ZoneKind};
use image::RgbImage;
use tracing::debug;

/// Build the two margin bands for a `block_percentile` p
///
/// Left band = [0, p*W] x [0, H]; right band starts at W minus the left
/// band's end, so the two are exact mirror images with equal area.
#[must_use]
pub fn percentile_zones(block_percentile: f32, width: u32, height: u32) -> Vec<Zone> {
    let band =
        ((block_percentile * width as f32).round() as u32).clamp(1, width.saturating_sub(1).max(1));

    let left = BoundingBox {
        x0: 0,
        y0: 0,
        x1: band,
        y1: height,
    };
    let right = BoundingBox {
        x0: width - band,
        y0: 0,
        x1: width,
        y1: height,
    };

    vec![
        Zone {
            bbox: left,
            kind: ZoneKind::PercentileBand,
        },
        Zone {
            bbox: right,
            kind: ZoneKind::PercentileBand,
        },
    ]
}

/// Whether a point falls inside any of the zones
#[must_use]
pub fn point_in_zones(zones: &[Zone], x: f32, y: f32) -> bool {
    zones.iter().any(|z| z.bbox.contains_point(x, y))
}

/// Detect candidate chat-bubble regions directly from the raster
///
/// Pixels are quantized per channel, then 4-connected components of equal
/// quantized color are grown by flood fill. A component survives when its
/// pixel count covers between `min_area_fraction` and `max_area_fraction`
/// of the image (the upper bound rejects the page background) and fills at
/// least `min_fill_ratio` of its own bounding box (keeps rectangular-ish
/// regions).
#[must_use]
pub fn color_region_zones(image: &RgbImage, config: &DetectorConfig) -> Vec<Zone> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let total_pixels = u64::from(width) * u64::from(height);
    let min_pixels = (config.min_area_fraction as f64 * total_pixels as f64) as u64;
    let max_pixels = (config.max_area_fraction as f64 * total_pixels as f64) as u64;
    let step = (256 / config.quantization_levels).max(1);

    // Quantized color key per pixel
    let quantize = |x: u32, y: u32| -> u32 {
        let p = image.get_pixel(x, y);
        let r = u32::from(p[0]) / step;
        let g = u32::from(p[1]) / step;
        let b = u32::from(p[2]) / step;
        (r << 16) | (g << 8) | b
    };

    let mut visited = vec![false; width as usize * height as usize];
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;
    let mut zones = Vec::new();
    let mut stack: Vec<(u32, u32)> = Vec::new();

    for start_y in 0..height {
        for start_x in 0..width {
            if visited[index(start_x, start_y)] {
                continue;
            }
            let key = quantize(start_x, start_y);

            // Flood fill one component
            let mut count: u64 = 0;
            let (mut min_x, mut min_y, mut max_x, mut max_y) =
                (start_x, start_y, start_x, start_y);
            visited[index(start_x, start_y)] = true;
            stack.push((start_x, start_y));

            while let Some((x, y)) = stack.pop() {
                count += 1;
                min_x = min_x.min(x);
                min_y = min_y.min(y);
                max_x = max_x.max(x);
                max_y = max_y.max(y);

                let mut visit = |nx: u32, ny: u32, stack: &mut Vec<(u32, u32)>| {
                    let i = index(nx, ny);
                    if !visited[i] && quantize(nx, ny) == key {
                        visited[i] = true;
                        stack.push((nx, ny));
                    }
                };
                if x > 0 {
                    visit(x - 1, y, &mut stack);
                }
                if x + 1 < width {
                    visit(x + 1, y, &mut stack);
                }
                if y > 0 {
                    visit(x, y - 1, &mut stack);
                }
                if y + 1 < height {
                    visit(x, y + 1, &mut stack);
                }
            }

            if count < min_pixels.max(1) || count > max_pixels {
                continue;
            }
            let bbox = BoundingBox {
                x0: min_x,
                y0: min_y,
                x1: max_x + 1,
                y1: max_y + 1,
            };
            let fill_ratio = count as f64 / bbox.area() as f64;
            if fill_ratio < f64::from(config.min_fill_ratio) {
                continue;
            }

            debug!(
                "Color region at ({}, {})-({}, {}): {} px, fill {:.2}",
                bbox.x0, bbox.y0, bbox.x1, bbox.y1, count, fill_ratio
            );
            zones.push(Zone {
                bbox,
                kind: ZoneKind::ColorRegion,
            });
        }
    }

    zones
}
