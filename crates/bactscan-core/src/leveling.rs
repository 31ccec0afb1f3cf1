//! Surface leveling: NaN repair, least-squares plane removal and row
//! de-striping for raster-scanned topography.

use crate::HeightMap;
use nalgebra::{Matrix3, Vector3};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Relative singular-value cutoff for the normal-equation pseudo-inverse.
const PINV_RCOND: f64 = 1e-15;

/// Best-fit plane `z = offset + row_slope * row + col_slope * col`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlaneFit {
    pub offset: f64,
    pub row_slope: f64,
    pub col_slope: f64,
}

impl PlaneFit {
    #[inline]
    pub fn eval(&self, row: usize, col: usize) -> f64 {
        self.offset + self.row_slope * row as f64 + self.col_slope * col as f64
    }
}

/// Replace every non-finite sample with the mean of the finite ones.
///
/// A map without any finite sample becomes all zeros.
pub fn fill_non_finite(map: &HeightMap) -> HeightMap {
    let fill = map.finite_mean().unwrap_or(0.0);
    map.map(|v| if v.is_finite() { v } else { fill })
}

/// Least-squares plane over all finite samples.
///
/// Solves the normal equations of the design matrix `[1, row, col]` with a
/// pseudo-inverse, so degenerate grids (a single row or column) yield the
/// minimum-norm solution instead of failing.
pub fn fit_plane(map: &HeightMap) -> PlaneFit {
    let mut n = 0.0;
    let (mut sr, mut sc, mut srr, mut src, mut scc) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let (mut sz, mut srz, mut scz) = (0.0, 0.0, 0.0);

    for r in 0..map.rows() {
        let rf = r as f64;
        for (c, &z) in map.row(r).iter().enumerate() {
            if !z.is_finite() {
                continue;
            }
            let cf = c as f64;
            n += 1.0;
            sr += rf;
            sc += cf;
            srr += rf * rf;
            src += rf * cf;
            scc += cf * cf;
            sz += z;
            srz += rf * z;
            scz += cf * z;
        }
    }

    let xtx = Matrix3::new(n, sr, sc, sr, srr, src, sc, src, scc);
    let xty = Vector3::new(sz, srz, scz);
    let eps = PINV_RCOND * xtx.norm();
    let theta = match xtx.pseudo_inverse(eps) {
        Ok(inv) => inv * xty,
        Err(_) => Vector3::zeros(),
    };

    PlaneFit {
        offset: theta[0],
        row_slope: theta[1],
        col_slope: theta[2],
    }
}

/// Remove non-finite samples and the best-fit plane from `map`.
///
/// The input is not modified. A constant map levels to exact zeros.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(map), fields(rows = map.rows(), cols = map.cols()))
)]
pub fn level_plane(map: &HeightMap) -> HeightMap {
    let filled = fill_non_finite(map);
    let (Some(lo), Some(hi)) = (filled.finite_min(), filled.finite_max()) else {
        return filled;
    };
    if lo == hi {
        return HeightMap::zeros(map.rows(), map.cols());
    }

    let plane = fit_plane(&filled);
    log::trace!(
        "plane fit: offset={:.3e} row_slope={:.3e} col_slope={:.3e}",
        plane.offset,
        plane.row_slope,
        plane.col_slope
    );
    HeightMap::from_fn(map.rows(), map.cols(), |r, c| {
        filled.get(r, c) - plane.eval(r, c)
    })
}

/// Align each row to the previous one by removing the median row-to-row step.
///
/// Rows are processed top to bottom against the already corrected previous
/// row, which cancels constant per-line offsets of raster scans.
pub fn destripe_rows(map: &HeightMap) -> HeightMap {
    let mut out = map.clone();
    let mut diffs = Vec::with_capacity(map.cols());
    for r in 1..out.rows() {
        diffs.clear();
        let (prev, cur) = (out.row(r - 1), out.row(r));
        diffs.extend(cur.iter().zip(prev).map(|(a, b)| a - b));
        let Some(step) = median(&mut diffs) else {
            continue;
        };
        for v in out.row_mut(r) {
            *v -= step;
        }
    }
    out
}

/// Median of `values` (mean of the two middle samples for even lengths).
///
/// Reorders `values` in place.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some(0.5 * (values[mid - 1] + values[mid]))
    }
}
