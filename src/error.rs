//! Error types for scene construction.
//!
//! The intersection and scatter paths are hot loops and never report errors;
//! everything below is detected at construction boundaries.

use thiserror::Error;

/// Errors raised while assembling geometry, materials or rays.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    /// Geometry that cannot be intersected meaningfully, e.g. a sphere with
    /// zero radius, a plane with a zero normal, or a parallelogram whose
    /// edge vectors are parallel.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Material parameters outside their documented domain, e.g. an index of
    /// refraction that is not positive or a negative emission channel.
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// A ray constructed with a zero-length direction vector.
    #[error("degenerate ray: direction has zero length")]
    DegenerateRay,
}
