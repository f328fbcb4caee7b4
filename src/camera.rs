//! Camera model: an axis-aligned viewport in front of the eye point.

use glam::DVec3;

use crate::error::RenderError;
use crate::ray::Ray;

/// Caller-facing camera parameters, typically read from a scene description.
#[derive(Debug, Clone, Copy)]
pub struct CameraConfig {
    /// Eye position in world space.
    pub origin: DVec3,
    /// Distance from the eye to the viewport plane, along -z.
    pub focal_length: f64,
    /// World-space height of the viewport rectangle.
    pub viewport_height: f64,
    /// Width over height of the output image.
    pub aspect_ratio: f64,
}

/// Ray-generating camera with the viewport geometry precomputed.
///
/// The viewport is an axis-aligned rectangle in the plane
/// `z = origin.z - focal_length`, centered on the optical axis.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    origin: DVec3,
    horizontal: DVec3,
    vertical: DVec3,
    lower_left_corner: DVec3,
    aspect_ratio: f64,
}

impl Camera {
    /// Derive the viewport geometry from a configuration.
    ///
    /// Focal length, viewport height and aspect ratio must all be positive
    /// and finite; a zero focal length would place the viewport through the
    /// eye point and allow degenerate (zero-direction) camera rays.
    pub fn new(config: &CameraConfig) -> Result<Self, RenderError> {
        for (name, value) in [
            ("focal length", config.focal_length),
            ("viewport height", config.viewport_height),
            ("aspect ratio", config.aspect_ratio),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RenderError::InvalidGeometry(format!(
                    "camera {name} must be positive and finite, got {value}"
                )));
            }
        }

        let viewport_width = config.aspect_ratio * config.viewport_height;
        let horizontal = DVec3::new(viewport_width, 0.0, 0.0);
        let vertical = DVec3::new(0.0, config.viewport_height, 0.0);
        let lower_left_corner = config.origin
            - horizontal / 2.0
            - vertical / 2.0
            - DVec3::new(0.0, 0.0, config.focal_length);

        Ok(Self {
            origin: config.origin,
            horizontal,
            vertical,
            lower_left_corner,
            aspect_ratio: config.aspect_ratio,
        })
    }

    /// Ray through normalized viewport coordinates `(u, v)`, each in [0, 1],
    /// with `v = 0` at the bottom edge.
    pub fn ray_at(&self, u: f64, v: f64) -> Ray {
        Ray::new(
            self.origin,
            self.lower_left_corner + u * self.horizontal + v * self.vertical - self.origin,
        )
    }

    /// Width over height of the output image.
    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}
