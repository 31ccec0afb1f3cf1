//! Oriented bounding boxes for hull outlines.

use nalgebra::{Point2, Vector2};

/// Oriented rectangle: center, side lengths and the angle (degrees, in
/// `[-90, 0)`) between the image x-axis and the `width` side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RotatedRect {
    pub center: Point2<f64>,
    pub width: f64,
    pub height: f64,
    pub angle_deg: f64,
}

impl RotatedRect {
    #[inline]
    pub fn short_side(&self) -> f64 {
        self.width.min(self.height)
    }

    #[inline]
    pub fn long_side(&self) -> f64 {
        self.width.max(self.height)
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Direction of the long side in radians, reported as `90 + angle` when
    /// the `height` side is the longer one and `180 + angle` otherwise.
    pub fn major_axis_angle(&self) -> f64 {
        let deg = if self.height > self.width {
            90.0 + self.angle_deg
        } else {
            180.0 + self.angle_deg
        };
        deg.to_radians()
    }
}

/// Minimum-area bounding rectangle of a convex polygon (rotating calipers).
///
/// `hull` must be convex and ordered; feeding a non-convex polygon yields a
/// valid bounding rectangle that may not be minimal. Returns `None` for an
/// empty input.
pub fn min_area_rect(hull: &[Point2<f64>]) -> Option<RotatedRect> {
    let first = *hull.first()?;
    let n = hull.len();

    let mut best: Option<(f64, Vector2<f64>, [f64; 4])> = None; // (area, u, [min_u, max_u, min_v, max_v])
    for i in 0..n {
        let edge = hull[(i + 1) % n] - hull[i];
        let len = edge.norm();
        if len <= f64::EPSILON {
            continue;
        }
        let u = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let mut ext = [
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        ];
        for p in hull {
            let pu = p.coords.dot(&u);
            let pv = p.coords.dot(&v);
            ext[0] = ext[0].min(pu);
            ext[1] = ext[1].max(pu);
            ext[2] = ext[2].min(pv);
            ext[3] = ext[3].max(pv);
        }
        let area = (ext[1] - ext[0]) * (ext[3] - ext[2]);
        if best.map_or(true, |(a, _, _)| area < a) {
            best = Some((area, u, ext));
        }
    }

    let Some((_, u, ext)) = best else {
        // Every vertex coincides: a zero-size rectangle at that point.
        return Some(RotatedRect {
            center: first,
            width: 0.0,
            height: 0.0,
            angle_deg: -90.0,
        });
    };

    let v = Vector2::new(-u.y, u.x);
    let center = u * (0.5 * (ext[0] + ext[1])) + v * (0.5 * (ext[2] + ext[3]));
    let (width, height, angle_deg) = normalize_angle(
        ext[1] - ext[0],
        ext[3] - ext[2],
        u.y.atan2(u.x).to_degrees(),
    );

    Some(RotatedRect {
        center: Point2::from(center),
        width,
        height,
        angle_deg,
    })
}

/// Rotate the side labelling in 90° steps until the angle lies in `[-90, 0)`.
fn normalize_angle(mut width: f64, mut height: f64, mut angle: f64) -> (f64, f64, f64) {
    while angle >= 0.0 {
        angle -= 90.0;
        std::mem::swap(&mut width, &mut height);
    }
    while angle < -90.0 {
        angle += 90.0;
        std::mem::swap(&mut width, &mut height);
    }
    (width, height, angle)
}
