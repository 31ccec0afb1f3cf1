//! Core types and numerics for AFM bacterium detection.
//!
//! Height grids, surface leveling and polygon geometry. Image codecs and
//! contour tracing live in `bactscan`.

mod enclosing_circle;
mod heightmap;
mod leveling;
mod logger;
mod polygon;
mod rotated_rect;

pub use enclosing_circle::{min_enclosing_circle, Circle};
pub use heightmap::{HeightMap, HeightMapError};
pub use leveling::{destripe_rows, fill_non_finite, fit_plane, level_plane, median, PlaneFit};
pub use polygon::{polygon_mask, polygon_moments, signed_distance, PolygonMoments};
pub use rotated_rect::{min_area_rect, RotatedRect};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level};
