//! Ray representation for 3D ray tracing.
//!
//! A ray is defined as r(t) = origin + t * direction, representing a semi-infinite
//! line in 3D space used for intersection testing.

use glam::DVec3;

use crate::error::RenderError;

/// Ray in 3D space defined by origin and direction.
///
/// Mathematical representation: r(t) = origin + t * direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    ///
    /// This is the camera position for primary rays or a surface point for
    /// secondary rays.
    pub origin: DVec3,

    /// Direction vector of the ray.
    ///
    /// Not required to be normalized, but must be non-zero.
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray with origin and direction.
    ///
    /// Callers must guarantee a non-zero direction; the scatter policies in
    /// [`crate::material`] and the camera ray generation uphold this. Use
    /// [`Ray::try_new`] for directions of unknown provenance.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        debug_assert!(direction.length_squared() > 0.0, "ray direction is zero");
        Self { origin, direction }
    }

    /// Create a ray, rejecting a zero-length direction.
    pub fn try_new(origin: DVec3, direction: DVec3) -> Result<Self, RenderError> {
        if direction.length_squared() == 0.0 {
            return Err(RenderError::DegenerateRay);
        }
        Ok(Self { origin, direction })
    }

    /// Compute a point at parameter t along the ray.
    ///
    /// Returns r(t) = origin + t * direction.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + t * self.direction
    }
}
