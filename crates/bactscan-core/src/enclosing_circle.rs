//! Smallest circle enclosing a point set (Welzl).

use nalgebra::Point2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl Circle {
    #[inline]
    fn contains(&self, p: &Point2<f64>) -> bool {
        (p - self.center).norm() <= self.radius * (1.0 + 1e-12) + 1e-9
    }

    fn from_pair(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            center: nalgebra::center(&a, &b),
            radius: 0.5 * (b - a).norm(),
        }
    }

    fn from_triple(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Self {
        let ab = b - a;
        let ac = c - a;
        let d = 2.0 * (ab.x * ac.y - ab.y * ac.x);
        if d.abs() <= 1e-12 {
            // Collinear: the widest pair spans the other point.
            let candidates = [Self::from_pair(a, b), Self::from_pair(a, c), Self::from_pair(b, c)];
            return candidates
                .into_iter()
                .max_by(|l, r| l.radius.total_cmp(&r.radius))
                .unwrap_or(Self::from_pair(a, b));
        }
        let ab2 = ab.norm_squared();
        let ac2 = ac.norm_squared();
        let ux = (ac.y * ab2 - ab.y * ac2) / d;
        let uy = (ab.x * ac2 - ac.x * ab2) / d;
        let center = Point2::new(a.x + ux, a.y + uy);
        Self {
            center,
            radius: (a - center).norm(),
        }
    }
}

/// Smallest circle enclosing all `points` (incremental Welzl construction).
///
/// Deterministic for a given point order. Returns `None` for an empty input.
pub fn min_enclosing_circle(points: &[Point2<f64>]) -> Option<Circle> {
    let first = *points.first()?;
    let mut circle = Circle {
        center: first,
        radius: 0.0,
    };

    for i in 1..points.len() {
        let p = points[i];
        if circle.contains(&p) {
            continue;
        }
        circle = Circle {
            center: p,
            radius: 0.0,
        };
        for j in 0..i {
            let q = points[j];
            if circle.contains(&q) {
                continue;
            }
            circle = Circle::from_pair(p, q);
            for &r in &points[..j] {
                if !circle.contains(&r) {
                    circle = Circle::from_triple(p, q, r);
                }
            }
        }
    }
    Some(circle)
}
