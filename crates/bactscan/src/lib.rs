//! Rod-shaped bacterium detection on AFM height maps.
//!
//! One call per scanned frame:
//! - merge the topography and auxiliary channels into a leveled working map,
//! - extract convex outlines from an 8-bit rendition of it,
//! - gate them by physical length, width and peak height,
//! - compute center/top/bottom points and a background reference point
//!   for follow-up spectroscopy.
//!
//! ```no_run
//! use bactscan::{detect_bacteria, DetectorParams, SizeConstraints};
//! use bactscan_core::HeightMap;
//!
//! let z = HeightMap::zeros(151, 151);
//! let aux = HeightMap::zeros(151, 151);
//! let params = DetectorParams::new(15.0 / 151.0, 0.65e-6, SizeConstraints::default());
//! let res = detect_bacteria(&z, &aux, &params)?;
//! for obj in &res.objects {
//!     println!("{} at {:?}", obj.name, obj.points.center);
//! }
//! # Ok::<(), bactscan::DetectError>(())
//! ```
//!
//! Numerics that do not depend on image processing live in `bactscan-core`.

pub mod blobs;
pub mod combine;
mod detector;
mod error;
pub mod filter;
pub mod io;
pub mod landmarks;
mod params;
pub mod preview;
pub mod reference;
mod result;
mod stage;

pub use detector::{detect_bacteria, object_name, BacteriaDetector};
pub use error::DetectError;
pub use io::{DetectReport, IoError, ScanDetectConfig, ScanGeometryConfig};
pub use landmarks::Roi;
pub use params::{Bounds, DetectorParams, ExtractParams, SizeConstraints, HEIGHT_UNIT};
pub use result::{
    DetectedObject, DetectionResult, LandmarkSet, MeasurementPreview, PreviewImages,
};
pub use stage::{ScanFrame, StageObject, StagePoints};
