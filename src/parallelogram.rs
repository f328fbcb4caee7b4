//! Parallelogram primitive.
//!
//! A parallelogram is the set of points `Q + alpha*u + beta*v` with
//! `alpha, beta` in [0, 1].

use glam::DVec3;

use crate::error::RenderError;
use crate::hittable::{HitRecord, Hittable};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Rays closer to parallel than this against the supporting plane miss.
const PARALLEL_EPSILON: f64 = 1e-8;

/// Parallelogram defined by an anchor vertex `Q` and two edge vectors.
#[derive(Debug, Clone)]
pub struct Parallelogram {
    q: DVec3,
    u: DVec3,
    v: DVec3,
    material: MaterialType,

    // Constants precomputed at construction for the intersection test.
    normal: DVec3,
    d: f64,
    w: DVec3,
}

impl Parallelogram {
    /// Create a new parallelogram. Parallel (or zero) edge vectors span no
    /// area and are rejected.
    pub fn new(
        q: DVec3,
        u: DVec3,
        v: DVec3,
        material: MaterialType,
    ) -> Result<Self, RenderError> {
        let n = u.cross(v);
        if n.length_squared() < 1e-12 {
            return Err(RenderError::InvalidGeometry(
                "parallelogram edge vectors must not be parallel".into(),
            ));
        }

        let normal = n.normalize();
        Ok(Self {
            q,
            u,
            v,
            material,
            normal,
            // Plane equation constant: normal . Q = D
            d: normal.dot(q),
            // w maps a planar offset to its (alpha, beta) coordinates
            w: n / n.dot(n),
        })
    }
}

impl Hittable for Parallelogram {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let denom = self.normal.dot(r.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = (self.d - self.normal.dot(r.origin)) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        // Express the planar hit point as Q + alpha*u + beta*v and check that
        // it falls inside the parallelogram.
        let intersection = r.at(t);
        let planar_hitpt = intersection - self.q;
        let alpha = self.w.dot(planar_hitpt.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar_hitpt));

        if !(0.0..=1.0).contains(&alpha) || !(0.0..=1.0).contains(&beta) {
            return None;
        }

        Some(HitRecord::new(r, intersection, t, self.normal, self.material))
    }
}
