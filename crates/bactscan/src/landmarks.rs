//! Measurement points and region of interest for one accepted object.

use bactscan_core::{min_enclosing_circle, polygon_moments};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel window (`x` = column, `y` = row of the top-left corner).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Roi {
    /// Shrink every side by `by` pixels. Extents never go negative and
    /// coordinates saturate instead of wrapping.
    pub fn inset(&self, by: i32) -> Roi {
        let twice = by.saturating_mul(2);
        Roi {
            x: self.x.saturating_add(by),
            y: self.y.saturating_add(by),
            width: self.width.saturating_sub(twice).max(0),
            height: self.height.saturating_sub(twice).max(0),
        }
    }

    /// Intersection with a `rows x cols` map, as half-open
    /// `(x0, x1, y0, y1)` pixel ranges.
    pub fn clip(&self, rows: usize, cols: usize) -> (usize, usize, usize, usize) {
        let clamp = |v: i32, hi: usize| v.clamp(0, hi as i32) as usize;
        let x0 = clamp(self.x, cols);
        let x1 = clamp(self.x.saturating_add(self.width), cols).max(x0);
        let y0 = clamp(self.y, rows);
        let y1 = clamp(self.y.saturating_add(self.height), rows).max(y0);
        (x0, x1, y0, y1)
    }
}

/// Canonical points of one object, in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Landmarks {
    pub center: Point2<i32>,
    pub top: Point2<i32>,
    pub bottom: Point2<i32>,
    /// Minimum enclosing circle radius (pixels).
    pub radius: f64,
    /// ROI half-size before clamping (pixels).
    pub half_size: f64,
    pub roi: Roi,
}

/// Place the ideal `2s x 2s` box around `center`, cut the extent at the far
/// map edge, then clamp the origin to the map.
///
/// The order matters: a box hanging over the near edge keeps the extent
/// computed from its unclamped origin.
pub fn region_of_interest(center: Point2<i32>, half_size: f64, rows: usize, cols: usize) -> Roi {
    let extent = |origin: f64, dim: f64| -> i32 {
        if origin + 2.0 * half_size <= dim {
            (2.0 * half_size) as i32
        } else {
            (dim - origin.abs()) as i32
        }
    };
    let box_x = center.x as f64 - half_size;
    let box_y = center.y as f64 - half_size;
    let width = extent(box_x, cols as f64);
    let height = extent(box_y, rows as f64);
    let clamp_origin = |v: f64| if v > 0.0 { v as i32 } else { 0 };

    Roi {
        x: clamp_origin(box_x),
        y: clamp_origin(box_y),
        width,
        height,
    }
}

/// Centroid, major-axis endpoints and ROI of a convex outline.
///
/// `angle` is the major-axis orientation in radians. Returns `None` for a
/// zero-area hull.
pub fn compute_landmarks(
    hull: &[Point2<f64>],
    angle: f64,
    rows: usize,
    cols: usize,
    roi_scale: f64,
) -> Option<Landmarks> {
    let centroid = polygon_moments(hull).centroid()?;
    let circle = min_enclosing_circle(hull)?;

    let center = Point2::new(centroid.x as i32, centroid.y as i32);
    let half = circle.radius / 2.0;
    let (vx, vy) = (angle.cos() * half, angle.sin() * half);
    let (cx, cy) = (center.x as f64, center.y as f64);
    let top = Point2::new((cx + vx) as i32, (cy + vy) as i32);
    let bottom = Point2::new((cx - vx) as i32, (cy - vy) as i32);

    let half_size = (roi_scale * circle.radius).min(rows.min(cols) as f64 / 2.0);
    let roi = region_of_interest(center, half_size, rows, cols);

    Some(Landmarks {
        center,
        top,
        bottom,
        radius: circle.radius,
        half_size,
        roi,
    })
}
