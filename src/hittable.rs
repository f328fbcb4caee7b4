//! Ray-object intersection system.
//!
//! Defines the Hittable trait for geometric primitives and HitRecord for
//! storing intersection data.

use glam::DVec3;

use crate::interval::Interval;
use crate::material::MaterialType;
use crate::ray::Ray;

/// Ray-object intersection information.
///
/// Contains intersection point, surface normal, distance, and material data
/// needed for shading calculations.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord {
    /// Point where the ray intersects the object
    pub p: DVec3,
    /// Surface normal at the intersection point (unit vector, always opposing
    /// the incident ray)
    pub normal: DVec3,
    /// Ray parameter at the intersection point
    pub t: f64,
    /// True if ray hits the front face, false if hits the back face
    pub front_face: bool,
    /// Material of the object at the hit point
    pub material: MaterialType,
}

impl HitRecord {
    /// Build a hit record, orienting the stored normal against the ray.
    ///
    /// `outward_normal` must be unit length. A hit is on the front face when
    /// the ray direction and the outward normal point in opposite directions;
    /// on back-face hits the stored normal is flipped so materials can always
    /// assume it opposes the incident ray.
    pub fn new(r: &Ray, p: DVec3, t: f64, outward_normal: DVec3, material: MaterialType) -> Self {
        let front_face = r.direction.dot(outward_normal) < 0.0;
        Self {
            p,
            normal: if front_face { outward_normal } else { -outward_normal },
            t,
            front_face,
            material,
        }
    }
}

/// Trait for objects that can be intersected by rays.
///
/// Core abstraction for geometric primitives. Must be thread-safe
/// (Sync + Send) so worker threads can share the scene immutably.
pub trait Hittable: Sync + Send {
    /// Test for ray intersection within the given parameter range.
    ///
    /// Returns the nearest intersection with `t` inside `ray_t`, or `None`.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord>;
}

/// Collection of objects forming a scene.
///
/// Uses linear search for intersection testing. Supports polymorphic
/// objects through Box<dyn Hittable>.
#[derive(Default)]
pub struct HittableList {
    objects: Vec<Box<dyn Hittable>>,
}

impl HittableList {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Number of top-level objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the scene holds no objects. Rendering an empty scene is legal:
    /// every ray reports the background radiance.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Hittable for HittableList {
    /// Return the hit with the smallest `t` among all members.
    ///
    /// The search interval shrinks to the closest hit found so far. The upper
    /// bound stays inclusive, so when two primitives intersect at exactly the
    /// same `t` the one added later wins. Correctness does not depend on
    /// object order, but this tie-break is observable.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<HitRecord> {
        let mut closest_so_far = ray_t.max;
        let mut hit_anything = None;

        for object in &self.objects {
            if let Some(rec) = object.hit(r, Interval::new(ray_t.min, closest_so_far)) {
                closest_so_far = rec.t;
                hit_anything = Some(rec);
            }
        }

        hit_anything
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialType;
    use crate::sphere::Sphere;

    fn gray() -> MaterialType {
        MaterialType::lambertian(DVec3::splat(0.5))
    }

    #[test]
    fn empty_scene_never_hits() {
        let world = HittableList::new();
        let r = Ray::new(DVec3::ZERO, DVec3::Z);
        assert!(world.is_empty());
        assert!(world.hit(&r, Interval::new(1e-3, f64::INFINITY)).is_none());
    }

    #[test]
    fn nearest_hit_wins_regardless_of_insertion_order() {
        let near = Sphere::new(DVec3::new(0.0, 0.0, -2.0), 0.5, gray()).unwrap();
        let far = Sphere::new(DVec3::new(0.0, 0.0, -5.0), 0.5, gray()).unwrap();

        for (a, b) in [(near.clone(), far.clone()), (far, near)] {
            let mut world = HittableList::new();
            world.add(Box::new(a));
            world.add(Box::new(b));
            let r = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
            let rec = world.hit(&r, Interval::new(1e-3, f64::INFINITY)).unwrap();
            assert!((rec.t - 1.5).abs() < 1e-12);
        }
    }

    #[test]
    fn equal_t_tie_resolves_to_later_object() {
        let red = MaterialType::lambertian(DVec3::new(1.0, 0.0, 0.0));
        let blue = MaterialType::lambertian(DVec3::new(0.0, 0.0, 1.0));
        let mut world = HittableList::new();
        world.add(Box::new(
            Sphere::new(DVec3::new(0.0, 0.0, -2.0), 0.5, red).unwrap(),
        ));
        world.add(Box::new(
            Sphere::new(DVec3::new(0.0, 0.0, -2.0), 0.5, blue).unwrap(),
        ));

        let r = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let rec = world.hit(&r, Interval::new(1e-3, f64::INFINITY)).unwrap();
        match rec.material {
            MaterialType::Lambertian { albedo } => assert_eq!(albedo, DVec3::new(0.0, 0.0, 1.0)),
            _ => panic!("unexpected material"),
        }
    }

    #[test]
    fn stored_normal_opposes_incident_ray() {
        let mut world = HittableList::new();
        world.add(Box::new(
            Sphere::new(DVec3::new(0.0, 0.0, -2.0), 0.5, gray()).unwrap(),
        ));
        let r = Ray::new(DVec3::ZERO, DVec3::new(0.0, 0.0, -1.0));
        let rec = world.hit(&r, Interval::new(1e-3, f64::INFINITY)).unwrap();
        assert!((rec.normal.length() - 1.0).abs() < 1e-9);
        assert!(r.direction.dot(rec.normal) <= 0.0);
        assert!(rec.t >= 1e-3);
    }
}
