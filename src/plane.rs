//! Infinite plane primitive.

use glam::DVec3;

use crate::error::RenderError;
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Rays closer to parallel than this against a plane report no hit.
const PARALLEL_EPSILON: f64 = 1e-6;

/// Infinite plane through an anchor point, defined by `(P - anchor) . n = 0`.
#[derive(Debug, Clone)]
pub struct Plane {
    point: DVec3,
    normal: DVec3,
    material: MaterialType,
}

impl Plane {
    /// Create a new plane. The normal is normalized at construction; a zero
    /// normal is rejected.
    pub fn new(point: DVec3, normal: DVec3, material: MaterialType) -> Result<Self, RenderError> {
        if normal.length_squared() == 0.0 {
            return Err(RenderError::InvalidGeometry(
                "plane normal must be non-zero".into(),
            ));
        }
        Ok(Self {
            point,
            normal: normal.normalize(),
            material,
        })
    }
}

impl Hittable for Plane {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = r.direction.dot(self.normal);

        // Denominator close to 0 => ray is parallel to the plane
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        // (origin + t*dir - point) . normal = 0
        let t = (self.point - r.origin).dot(self.normal) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        Some(HitRecord::new(r, r.at(t), t, self.normal, self.material))
    }
}
