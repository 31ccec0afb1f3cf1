//! Closed-polygon helpers: moments, signed distance and rasterization.
//!
//! Polygons are given as vertex lists in pixel coordinates (`x` = column,
//! `y` = row); the closing edge from the last vertex back to the first is
//! implicit.

use nalgebra::Point2;

/// Raw spatial moments of a polygon's enclosed area.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    /// Area centroid, or `None` for a zero-area polygon.
    pub fn centroid(&self) -> Option<Point2<f64>> {
        if self.m00.abs() <= f64::EPSILON || !self.m00.is_finite() {
            return None;
        }
        Some(Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Area moments via Green's theorem. Orientation-independent: the moments
/// are sign-corrected so that `m00` is never negative.
pub fn polygon_moments(poly: &[Point2<f64>]) -> PolygonMoments {
    let n = poly.len();
    if n < 3 {
        return PolygonMoments::default();
    }

    let mut a = 0.0;
    let mut mx = 0.0;
    let mut my = 0.0;
    for i in 0..n {
        let p = poly[i];
        let q = poly[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        mx += (p.x + q.x) * cross;
        my += (p.y + q.y) * cross;
    }

    let sign = if a < 0.0 { -1.0 } else { 1.0 };
    PolygonMoments {
        m00: sign * a / 2.0,
        m10: sign * mx / 6.0,
        m01: sign * my / 6.0,
    }
}

#[inline]
fn segment_dist2(p: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    let ab = b - a;
    let ap = p - a;
    let len2 = ab.norm_squared();
    let t = if len2 > 0.0 {
        (ap.dot(&ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (ap - ab * t).norm_squared()
}

/// Signed distance from `p` to the polygon boundary.
///
/// Positive inside, negative outside, zero on an edge; the magnitude is the
/// Euclidean distance to the nearest edge. Polygons with fewer than three
/// vertices have no interior, so every point is outside.
pub fn signed_distance(poly: &[Point2<f64>], p: Point2<f64>) -> f64 {
    let n = poly.len();
    if n == 0 {
        return f64::NEG_INFINITY;
    }

    let mut min_d2 = f64::INFINITY;
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = poly[j];
        let b = poly[i];
        min_d2 = min_d2.min(segment_dist2(p, a, b));
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    let d = min_d2.sqrt();
    if d == 0.0 {
        0.0
    } else if inside && n >= 3 {
        d
    } else {
        -d
    }
}

/// Rasterize the polygon interior, boundary included, into a row-major
/// `height x width` mask.
///
/// A pixel is set when its center is inside the polygon or within half a
/// pixel of an edge, which matches a filled drawing of the outline.
pub fn polygon_mask(poly: &[Point2<f64>], width: usize, height: usize) -> Vec<bool> {
    let mut mask = vec![false; width * height];
    if poly.is_empty() || width == 0 || height == 0 {
        return mask;
    }

    let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
    let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in poly {
        x0 = x0.min(p.x);
        y0 = y0.min(p.y);
        x1 = x1.max(p.x);
        y1 = y1.max(p.y);
    }

    let clamp_lo = |v: f64, hi: usize| (v - 1.0).floor().clamp(0.0, hi as f64) as usize;
    let clamp_hi = |v: f64, hi: usize| (v + 1.0).ceil().clamp(0.0, hi as f64) as usize;
    let (cx0, cx1) = (clamp_lo(x0, width - 1), clamp_hi(x1, width - 1));
    let (cy0, cy1) = (clamp_lo(y0, height - 1), clamp_hi(y1, height - 1));

    for y in cy0..=cy1 {
        for x in cx0..=cx1 {
            let d = signed_distance(poly, Point2::new(x as f64, y as f64));
            if d >= -0.5 {
                mask[y * width + x] = true;
            }
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn square(x0: f64, y0: f64, side: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(x0, y0),
            Point2::new(x0 + side, y0),
            Point2::new(x0 + side, y0 + side),
            Point2::new(x0, y0 + side),
        ]
    }

    #[test]
    fn moments_of_square_are_orientation_independent() {
        let mut sq = square(2.0, 4.0, 6.0);
        let cw = polygon_moments(&sq);
        sq.reverse();
        let ccw = polygon_moments(&sq);

        assert_abs_diff_eq!(cw.m00, 36.0, epsilon = 1e-12);
        assert_eq!(cw, ccw);
        let c = cw.centroid().unwrap();
        assert_abs_diff_eq!(c.x, 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 7.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_polygons_have_no_centroid() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(4.0, 0.0)];
        assert!(polygon_moments(&line).centroid().is_none());

        let collinear = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(4.0, 4.0),
        ];
        assert!(polygon_moments(&collinear).centroid().is_none());
    }

    #[test]
    fn signed_distance_sign_convention() {
        let sq = square(0.0, 0.0, 10.0);
        assert_abs_diff_eq!(signed_distance(&sq, Point2::new(5.0, 5.0)), 5.0);
        assert_abs_diff_eq!(signed_distance(&sq, Point2::new(2.0, 5.0)), 2.0);
        assert_abs_diff_eq!(signed_distance(&sq, Point2::new(13.0, 5.0)), -3.0);
        assert_abs_diff_eq!(signed_distance(&sq, Point2::new(0.0, 5.0)), 0.0);
    }

    #[test]
    fn signed_distance_to_single_point_is_negative() {
        let pt = vec![Point2::new(1.0, 1.0)];
        assert_abs_diff_eq!(signed_distance(&pt, Point2::new(4.0, 5.0)), -5.0);
    }

    #[test]
    fn mask_covers_interior_and_boundary() {
        let sq = square(2.0, 3.0, 4.0);
        let mask = polygon_mask(&sq, 10, 10);
        let count = mask.iter().filter(|&&m| m).count();
        assert_eq!(count, 25);
        assert!(mask[3 * 10 + 2]);
        assert!(mask[7 * 10 + 6]);
        assert!(!mask[8 * 10 + 6]);
    }

    #[test]
    fn mask_is_clipped_to_image_bounds() {
        let sq = square(-3.0, -3.0, 5.0);
        let mask = polygon_mask(&sq, 4, 4);
        assert!(mask[0]);
        assert!(mask[2 * 4 + 2]);
        assert!(!mask[3 * 4 + 3]);
    }
}
