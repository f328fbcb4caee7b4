//! Sphere primitive for ray tracing.
//!
//! Implements efficient ray-sphere intersection using an optimized quadratic formula.

use glam::DVec3;

use crate::error::RenderError;
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Sphere primitive defined by center, radius, and material.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: DVec3,
    radius: f64,
    material: MaterialType,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// The radius is signed: a negative radius leaves the surface geometry
    /// unchanged but inverts the outward normal, which models hollow
    /// interiors (e.g. the inner shell of a glass sphere). Zero is rejected.
    pub fn new(center: DVec3, radius: f64, material: MaterialType) -> Result<Self, RenderError> {
        if radius == 0.0 {
            return Err(RenderError::InvalidGeometry(
                "sphere radius must be non-zero".into(),
            ));
        }
        Ok(Self {
            center,
            radius,
            material,
        })
    }
}

impl Hittable for Sphere {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        // Vector from ray origin to sphere center
        let oc = self.center - r.origin;

        // Optimized quadratic equation coefficients
        let a = r.direction.length_squared();
        let h = r.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root that lies in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.contains(root) {
            root = (h + sqrtd) / a;
            if !ray_t.contains(root) {
                return None;
            }
        }

        let p = r.at(root);
        // Division by the signed radius flips the normal for negative radii.
        let outward_normal = (p - self.center) / self.radius;
        Some(HitRecord::new(r, p, root, outward_normal, self.material))
    }
}
