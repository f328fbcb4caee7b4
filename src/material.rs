//! Material system for ray tracing.
//!
//! Implements four material types: Lambertian (diffuse), Metal (specular),
//! Dielectric (transparent), and Emissive (light source).

use glam::DVec3;

use crate::error::RenderError;
use crate::hittable::HitRecord;
use crate::random;
use crate::ray::Ray;

/// RGB radiance/reflectance triple in linear space.
pub type Color = DVec3;

/// Surface response of a scene object.
///
/// Each variant answers two questions: how much light the surface emits at a
/// point, and how an incoming ray scatters off it (if at all).
#[derive(Debug, Clone, Copy)]
pub enum MaterialType {
    /// Lambertian diffuse material for matte surfaces.
    Lambertian {
        /// Surface color/reflectance.
        albedo: Color,
    },

    /// Metallic material with specular reflection.
    Metal {
        /// Metal color.
        albedo: Color,
        /// Surface roughness (0.0 = mirror, 1.0 = rough), clamped at
        /// construction.
        fuzz: f64,
    },

    /// Dielectric (transparent) material with refraction.
    Dielectric {
        /// Index of refraction (1.0 = air, 1.5 = glass, etc.).
        refraction_index: f64,
    },

    /// Light-emitting material. Absorbs every incoming ray.
    Emissive {
        /// Emitted radiance. Channels may exceed 1 (HDR light sources).
        radiance: Color,
    },
}

impl MaterialType {
    /// Diffuse material with the given albedo.
    ///
    /// Albedo channels are accepted as given; values above 1 amplify rather
    /// than attenuate and are the caller's responsibility.
    pub fn lambertian(albedo: Color) -> Self {
        MaterialType::Lambertian { albedo }
    }

    /// Metallic material; fuzz is clamped to [0, 1].
    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        MaterialType::Metal {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    /// Dielectric material; the index of refraction must be positive.
    pub fn dielectric(refraction_index: f64) -> Result<Self, RenderError> {
        if refraction_index <= 0.0 {
            return Err(RenderError::InvalidMaterial(format!(
                "index of refraction must be positive, got {refraction_index}"
            )));
        }
        Ok(MaterialType::Dielectric { refraction_index })
    }

    /// Emissive material; all radiance channels must be non-negative.
    pub fn emissive(radiance: Color) -> Result<Self, RenderError> {
        if radiance.min_element() < 0.0 {
            return Err(RenderError::InvalidMaterial(format!(
                "emission must be non-negative, got {radiance}"
            )));
        }
        Ok(MaterialType::Emissive { radiance })
    }

    /// Radiance emitted by the surface at a point.
    ///
    /// Black for everything but `Emissive`.
    pub fn emit(&self, _p: DVec3) -> Color {
        match self {
            MaterialType::Emissive { radiance } => *radiance,
            _ => Color::ZERO,
        }
    }

    /// Compute ray scattering for this material.
    ///
    /// Returns the attenuation color and the scattered ray, or `None` when
    /// the incoming ray is absorbed.
    pub fn scatter(&self, r_in: &Ray, rec: &HitRecord) -> Option<(Color, Ray)> {
        match self {
            MaterialType::Lambertian { albedo } => scatter_lambertian(*albedo, rec),
            MaterialType::Metal { albedo, fuzz } => scatter_metal(*albedo, *fuzz, r_in, rec),
            MaterialType::Dielectric { refraction_index } => {
                scatter_dielectric(*refraction_index, r_in, rec)
            }
            MaterialType::Emissive { .. } => None,
        }
    }
}

/// Lambertian diffuse scattering with cosine-weighted distribution.
fn scatter_lambertian(albedo: Color, rec: &HitRecord) -> Option<(Color, Ray)> {
    let mut scatter_direction = rec.normal + random::random_unit_vector();

    // Catch degenerate scatter direction (very close to zero)
    if scatter_direction.length_squared() < 1e-8 {
        scatter_direction = rec.normal;
    }

    Some((albedo, Ray::new(rec.p, scatter_direction)))
}

/// Metallic reflection with optional surface roughness.
///
/// The perturbation uses a sample *inside* the unit ball (not normalized), so
/// fuzzier metals stay biased toward the mirror direction.
fn scatter_metal(albedo: Color, fuzz: f64, r_in: &Ray, rec: &HitRecord) -> Option<(Color, Ray)> {
    let reflected = reflect(r_in.direction.normalize(), rec.normal);
    let direction = reflected + fuzz * random::random_in_unit_sphere();

    // A perturbed direction that points into the surface is absorbed.
    if direction.dot(rec.normal) <= 0.0 {
        return None;
    }
    Some((albedo, Ray::new(rec.p, direction)))
}

/// Dielectric scattering with reflection and refraction chosen by Schlick's
/// approximation of the Fresnel term.
fn scatter_dielectric(
    refraction_index: f64,
    r_in: &Ray,
    rec: &HitRecord,
) -> Option<(Color, Ray)> {
    let ri = if rec.front_face {
        1.0 / refraction_index
    } else {
        refraction_index
    };

    let unit_direction = r_in.direction.normalize();
    let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    let cannot_refract = ri * sin_theta > 1.0;

    let direction = if cannot_refract || reflectance(cos_theta, ri) > random::random_f64() {
        reflect(unit_direction, rec.normal)
    } else {
        refract(unit_direction, rec.normal, ri)
    };

    // Glass doesn't attenuate light
    Some((Color::ONE, Ray::new(rec.p, direction)))
}

/// Reflect a vector off a surface using the law of reflection.
fn reflect(v: DVec3, n: DVec3) -> DVec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through an interface using Snell's law.
fn refract(uv: DVec3, n: DVec3, etai_over_etat: f64) -> DVec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

/// Compute Fresnel reflectance using Schlick's approximation.
fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
    let r0 = (1.0 - refraction_index) / (1.0 + refraction_index);
    let r0 = r0 * r0;
    r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
}
