//! Background reference point search around an accepted object.

use bactscan_core::{signed_distance, HeightMap};
use nalgebra::Point2;

use crate::landmarks::Roi;

/// Row-major mask of samples strictly below `threshold`.
pub fn background_mask(map: &HeightMap, threshold: f64) -> Vec<bool> {
    map.data().iter().map(|&v| v < threshold).collect()
}

/// Integer offsets `(dx, dy)` with `dx² + dy² <= radius²`.
pub fn disk_offsets(radius: i32) -> Vec<(i32, i32)> {
    let r = radius.max(0);
    let r2 = i64::from(r) * i64::from(r);
    let mut out = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if i64::from(dx) * i64::from(dx) + i64::from(dy) * i64::from(dy) <= r2 {
                out.push((dx, dy));
            }
        }
    }
    out
}

/// True when every in-map pixel of the disk around `(x, y)` is background.
fn disk_is_clear(
    mask: &[bool],
    rows: usize,
    cols: usize,
    x: usize,
    y: usize,
    disk: &[(i32, i32)],
) -> bool {
    disk.iter().all(|&(dx, dy)| {
        let sx = x as i64 + dx as i64;
        let sy = y as i64 + dy as i64;
        if sx < 0 || sy < 0 || sx >= cols as i64 || sy >= rows as i64 {
            return true;
        }
        mask[sy as usize * cols + sx as usize]
    })
}

/// Find the reference point for one object.
///
/// The ROI is shrunk by `corona_px` on every side; inside it, a pixel
/// qualifies when its whole disk of radius `corona_px` is background. Among
/// the qualifying pixels the one with the largest signed distance to `hull`
/// wins, the first one in row-major order on ties.
pub fn find_reference(
    map: &HeightMap,
    background: &[bool],
    roi: Roi,
    corona_px: i32,
    hull: &[Point2<f64>],
) -> Option<Point2<i32>> {
    let (rows, cols) = map.shape();
    let (x0, x1, y0, y1) = roi.inset(corona_px).clip(rows, cols);
    if x0 == x1 || y0 == y1 {
        log::debug!("corona of {corona_px} px leaves nothing of {roi:?}");
        return None;
    }
    let disk = disk_offsets(corona_px);

    let mut best: Option<(f64, Point2<i32>)> = None;
    for y in y0..y1 {
        for x in x0..x1 {
            if !background[y * cols + x] || !disk_is_clear(background, rows, cols, x, y, &disk) {
                continue;
            }
            let d = signed_distance(hull, Point2::new(x as f64, y as f64));
            if best.is_none_or(|(bd, _)| d > bd) {
                best = Some((d, Point2::new(x as i32, y as i32)));
            }
        }
    }

    if best.is_none() {
        log::debug!("no background disk of radius {corona_px} px inside {roi:?}");
    }
    best.map(|(_, p)| p)
}
