/// Precondition failures of a detection call.
///
/// Empty results (no object, no reference point) are not errors; they are
/// reported through [`crate::DetectionResult`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("topography {topography:?} and auxiliary {auxiliary:?} maps differ in shape")]
    ShapeMismatch {
        topography: (usize, usize),
        auxiliary: (usize, usize),
    },
    #[error("height map is empty")]
    EmptyMap,
    #[error("pixel ratio must be finite and positive (got {0})")]
    InvalidRatio(f64),
    #[error("height ceiling must be finite and positive (got {0})")]
    InvalidCeiling(f64),
    #[error("invalid size constraint `{name}`: {reason}")]
    InvalidConstraint { name: &'static str, reason: String },
    #[error("invalid extraction parameters: {0}")]
    InvalidExtractParams(String),
}
