//! Candidate extraction on the 8-bit rendition of the working map.
//!
//! Pipeline: min-max normalization -> bilateral smoothing -> fixed binary
//! threshold -> median-adaptive Canny -> external contours -> convex hulls.

use bactscan_core::{min_area_rect, HeightMap, RotatedRect};
use image::{GrayImage, Luma};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::edges::canny;
use imageproc::filter::bilateral_filter;
use imageproc::geometry::convex_hull;
use imageproc::point::Point;
use imageproc::stats::histogram;
use nalgebra::Point2;

use crate::params::ExtractParams;
use crate::preview::draw_outline;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smallest hysteresis threshold handed to Canny.
///
/// Canny runs on the binarized image, whose median is 0, 127.5 or 255, so
/// the median thresholds are either `(0, 0)` or at least `(63, 191)` for the
/// default sigma. The floor therefore only replaces the zero pair of a
/// background-dominated frame, where `canny`'s inclusive hysteresis would
/// otherwise keep the faint gradients of its own pre-blur tails. True steps
/// score in the hundreds.
const MIN_EDGE_STRENGTH: f32 = 32.0;

/// Raw detection candidate: a convex outline plus its oriented box.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
    /// Convex hull vertices in pixel coordinates (`x` = column, `y` = row).
    pub hull: Vec<Point2<f64>>,
    pub rect: RotatedRect,
    /// Major-axis orientation (radians), see [`RotatedRect::major_axis_angle`].
    pub angle: f64,
}

impl Candidate {
    /// Build a candidate from an already convex outline.
    pub fn from_hull(hull: Vec<Point2<f64>>) -> Option<Self> {
        let rect = min_area_rect(&hull)?;
        Some(Self {
            angle: rect.major_axis_angle(),
            hull,
            rect,
        })
    }
}

/// Output of [`extract_candidates`].
#[derive(Clone, Debug)]
pub struct Extraction {
    pub candidates: Vec<Candidate>,
    /// Normalized 8-bit rendition of the working map.
    pub normalized: GrayImage,
    /// `normalized` with every candidate outline drawn in white.
    pub contours_preview: GrayImage,
}

/// Min-max normalize `map` to the full 8-bit range. A flat map becomes black.
pub fn normalize_to_u8(map: &HeightMap) -> GrayImage {
    let (rows, cols) = map.shape();
    let lo = map.finite_min().unwrap_or(0.0);
    let hi = map.finite_max().unwrap_or(0.0);
    let range = hi - lo;
    let scale = if range > 0.0 && range.is_finite() {
        255.0 / range
    } else {
        0.0
    };
    GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let v = map.get(y as usize, x as usize);
        let n = if v.is_finite() { (v - lo) * scale } else { 0.0 };
        Luma([n.round().clamp(0.0, 255.0) as u8])
    })
}

/// Bilateral smoothing followed by the fixed binary threshold (strictly
/// above `binary_threshold` becomes 255).
pub fn binary_mask(normalized: &GrayImage, params: &ExtractParams) -> GrayImage {
    let smoothed = bilateral_filter(
        normalized,
        params.bilateral_diameter,
        params.sigma_color,
        params.sigma_space,
    );
    threshold(&smoothed, params.binary_threshold, ThresholdType::Binary)
}

/// Median intensity (mean of the two middle values for even pixel counts).
pub fn median_intensity(img: &GrayImage) -> f32 {
    let n = img.as_raw().len();
    if n == 0 {
        return 0.0;
    }
    let hist = histogram(img);
    let nth = |k: usize| -> f32 {
        let mut seen = 0usize;
        for (value, &count) in hist.channels[0].iter().enumerate() {
            seen += count as usize;
            if seen > k {
                return value as f32;
            }
        }
        255.0
    };
    if n % 2 == 1 {
        nth(n / 2)
    } else {
        0.5 * (nth(n / 2 - 1) + nth(n / 2))
    }
}

/// Canny hysteresis thresholds `(1 ± sigma) * median`, clamped to `[0, 255]`
/// and truncated to whole intensities.
pub fn auto_canny_thresholds(img: &GrayImage, sigma: f32) -> (f32, f32) {
    let v = median_intensity(img);
    let lower = ((1.0 - sigma) * v).max(0.0).trunc();
    let upper = ((1.0 + sigma) * v).min(255.0).trunc();
    (lower, upper)
}

/// Canny edge map with median-adaptive thresholds.
pub fn auto_canny(img: &GrayImage, sigma: f32) -> GrayImage {
    let (lower, upper) = auto_canny_thresholds(img, sigma);
    let low = lower.max(MIN_EDGE_STRENGTH);
    let high = upper.max(low);
    canny(img, low, high)
}

/// Run the extraction stage on the working map.
///
/// Zero contours is a valid outcome and yields an empty candidate list.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(map, params), fields(rows = map.rows(), cols = map.cols()))
)]
pub fn extract_candidates(map: &HeightMap, params: &ExtractParams) -> Extraction {
    let normalized = normalize_to_u8(map);
    let binary = binary_mask(&normalized, params);
    let edges = auto_canny(&binary, params.canny_sigma);

    let mut candidates = Vec::new();
    for contour in find_contours::<i32>(&edges) {
        if !matches!(contour.border_type, BorderType::Outer) || contour.parent.is_some() {
            continue;
        }
        let hull: Vec<Point<i32>> = convex_hull(contour.points.as_slice());
        let hull: Vec<Point2<f64>> = hull
            .iter()
            .map(|p| Point2::new(p.x as f64, p.y as f64))
            .collect();
        if let Some(candidate) = Candidate::from_hull(hull) {
            candidates.push(candidate);
        }
    }
    log::debug!("extracted {} candidate outlines", candidates.len());

    let mut contours_preview = normalized.clone();
    for c in &candidates {
        draw_outline(&mut contours_preview, &c.hull);
    }

    Extraction {
        candidates,
        normalized,
        contours_preview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rect_map(rows: usize, cols: usize, r0: usize, r1: usize, c0: usize, c1: usize) -> HeightMap {
        HeightMap::from_fn(rows, cols, |r, c| {
            if (r0..r1).contains(&r) && (c0..c1).contains(&c) {
                5.0e-7
            } else {
                0.0
            }
        })
    }

    #[test]
    fn normalize_spans_full_range() {
        let m = HeightMap::from_fn(1, 3, |_, c| c as f64 * 2.0);
        let img = normalize_to_u8(&m);
        assert_eq!(img.as_raw(), &[0, 128, 255]);
    }

    #[test]
    fn normalize_flat_map_is_black() {
        let img = normalize_to_u8(&HeightMap::filled(4, 4, 1.0));
        assert!(img.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn binary_mask_keeps_a_sharp_step() {
        let img = GrayImage::from_fn(20, 20, |x, _| Luma([if x < 10 { 0 } else { 255 }]));
        let out = binary_mask(&img, &ExtractParams::default());
        assert_eq!(out.get_pixel(9, 10)[0], 0);
        assert_eq!(out.get_pixel(10, 10)[0], 255);
    }

    #[test]
    fn binary_mask_threshold_is_strict() {
        let params = ExtractParams {
            binary_threshold: 100,
            ..ExtractParams::default()
        };
        let at = binary_mask(&GrayImage::from_pixel(5, 5, Luma([100])), &params);
        assert!(at.as_raw().iter().all(|&v| v == 0));
        let above = binary_mask(&GrayImage::from_pixel(5, 5, Luma([101])), &params);
        assert!(above.as_raw().iter().all(|&v| v == 255));
    }

    #[test]
    fn median_and_thresholds() {
        let img = GrayImage::from_raw(2, 2, vec![10, 20, 30, 200]).unwrap();
        assert_abs_diff_eq!(median_intensity(&img), 25.0);
        let (lo, hi) = auto_canny_thresholds(&img, 0.5);
        assert_eq!((lo, hi), (12.0, 37.0));

        let bright = GrayImage::from_pixel(3, 3, Luma([250]));
        assert_eq!(auto_canny_thresholds(&bright, 0.5), (125.0, 255.0));
    }

    #[test]
    fn sparse_binary_frame_keeps_only_the_step_edges() {
        let img = GrayImage::from_fn(40, 40, |x, y| {
            let inside = (10..30).contains(&x) && (15..25).contains(&y);
            Luma([if inside { 255 } else { 0 }])
        });
        assert_eq!(auto_canny_thresholds(&img, 0.5), (0.0, 0.0));

        let edges = auto_canny(&img, 0.5);
        let near_step = |x: u32, y: u32| {
            let outer = (8..32).contains(&x) && (13..27).contains(&y);
            let inner = (12..28).contains(&x) && (17..23).contains(&y);
            outer && !inner
        };
        let mut count = 0;
        for (x, y, p) in edges.enumerate_pixels() {
            if p[0] == 255 {
                count += 1;
                assert!(near_step(x, y), "stray edge at ({x}, {y})");
            }
        }
        assert!(count >= 40, "only {count} edge pixels");
    }

    #[test]
    fn flat_map_has_no_candidates() {
        let ex = extract_candidates(&HeightMap::zeros(40, 40), &ExtractParams::default());
        assert!(ex.candidates.is_empty());
        assert_eq!(ex.contours_preview.dimensions(), (40, 40));
    }

    #[test]
    fn single_block_yields_single_oriented_candidate() {
        let map = rect_map(60, 80, 26, 34, 20, 50);
        let ex = extract_candidates(&map, &ExtractParams::default());
        assert_eq!(ex.candidates.len(), 1);

        let c = &ex.candidates[0];
        assert!((c.rect.long_side() - 30.0).abs() <= 3.0, "{:?}", c.rect);
        assert!((c.rect.short_side() - 8.0).abs() <= 3.0, "{:?}", c.rect);
        // horizontal object: major axis along x
        assert!(c.angle.sin().abs() < 0.2);
    }

    #[test]
    fn separate_blocks_yield_separate_candidates() {
        let a = rect_map(60, 100, 10, 18, 10, 40);
        let b = rect_map(60, 100, 40, 48, 55, 85);
        let map = a.zip_with(&b, f64::max).unwrap();
        let ex = extract_candidates(&map, &ExtractParams::default());
        assert_eq!(ex.candidates.len(), 2);
    }
}
