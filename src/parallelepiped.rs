//! Parallelepiped primitive, an aggregate of six parallelogram faces.

use glam::DVec3;

use crate::error::RenderError;
use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::interval::Interval;
use crate::material::MaterialType;
use crate::parallelogram::Parallelogram;
use crate::ray::Ray;

/// Closed hexahedron spanned by three edge vectors from an origin vertex.
///
/// Intersection delegates to the contained face list, so the nearest face in
/// the query interval wins exactly as it would for six free-standing
/// parallelograms.
pub struct Parallelepiped {
    faces: HittableList,
}

impl Parallelepiped {
    /// Create a new parallelepiped from an origin vertex and edges `u`, `v`,
    /// `w`. Each face pair shares one edge pair; a pair of parallel edges is
    /// rejected by the face constructors.
    pub fn new(
        origin: DVec3,
        u: DVec3,
        v: DVec3,
        w: DVec3,
        material: MaterialType,
    ) -> Result<Self, RenderError> {
        let mut faces = HittableList::new();
        faces.add(Box::new(Parallelogram::new(origin, u, v, material)?));
        faces.add(Box::new(Parallelogram::new(origin + w, u, v, material)?));
        faces.add(Box::new(Parallelogram::new(origin + v, u, w, material)?));
        faces.add(Box::new(Parallelogram::new(origin, u, w, material)?));
        faces.add(Box::new(Parallelogram::new(origin + u, v, w, material)?));
        faces.add(Box::new(Parallelogram::new(origin, v, w, material)?));
        Ok(Self { faces })
    }
}

impl Hittable for Parallelepiped {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        self.faces.hit(r, ray_t)
    }
}
