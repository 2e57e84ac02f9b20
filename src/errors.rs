//! Validation errors

use crate::float_types::Real;
use nalgebra::Point3;

/// All the possible validation issues we might encounter while accepting
/// polygon input. Boolean operations themselves never fail for well-formed
/// input; degenerate fragments are dropped silently instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// (TooFewPoints) A polygon has fewer than the minimal #points
    #[error("(TooFewPoints) A polygon needs at least three vertices, got {0}")]
    TooFewPoints(usize),
    /// (InvalidCoordinate) The coordinate has a NaN or infinite
    #[error("(InvalidCoordinate) The coordinate ({0}) has a NaN or infinite")]
    InvalidCoordinate(Point3<Real>),
    /// (DegeneratePlane) The first three vertices are collinear
    #[error("(DegeneratePlane) The vertices near {0} do not define a plane")]
    DegeneratePlane(Point3<Real>),
}
