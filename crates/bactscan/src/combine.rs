//! Merge topography and error channels into one leveled working map.

use bactscan_core::{destripe_rows, level_plane, HeightMap};

use crate::DetectError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Leveled, de-striped and clipped working map.
#[derive(Clone, Debug, PartialEq)]
pub struct CombinedMap {
    pub map: HeightMap,
    /// Peak height of the map before clipping (meters).
    pub top: f64,
}

/// Combine the topography and auxiliary channels of one frame.
///
/// Both inputs are leveled, merged with an element-wise minimum, leveled
/// again, de-striped row by row, shifted so the minimum is zero and finally
/// clipped at `height_ceiling`. The inputs are never modified.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(topography, auxiliary), fields(rows = topography.rows(), cols = topography.cols()))
)]
pub fn combine_maps(
    topography: &HeightMap,
    auxiliary: &HeightMap,
    height_ceiling: f64,
) -> Result<CombinedMap, DetectError> {
    if topography.shape() != auxiliary.shape() {
        return Err(DetectError::ShapeMismatch {
            topography: topography.shape(),
            auxiliary: auxiliary.shape(),
        });
    }
    if topography.is_empty() {
        return Err(DetectError::EmptyMap);
    }

    let z = level_plane(topography);
    let r = level_plane(auxiliary);
    let merged = z
        .zip_with(&r, f64::min)
        .map_err(|_| DetectError::ShapeMismatch {
            topography: topography.shape(),
            auxiliary: auxiliary.shape(),
        })?;

    let leveled = destripe_rows(&level_plane(&merged));
    let floor = leveled.finite_min().unwrap_or(0.0);
    let shifted = leveled.map(|v| v - floor);
    let top = shifted.finite_max().unwrap_or(0.0);
    let map = shifted.map(|v| v.min(height_ceiling));

    log::debug!(
        "combined {}x{} map: top={:.3e} m, ceiling={:.3e} m",
        map.rows(),
        map.cols(),
        top,
        height_ceiling
    );

    Ok(CombinedMap { map, top })
}
