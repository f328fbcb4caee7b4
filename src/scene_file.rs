//! XML scene description loader.
//!
//! Parses the declarative scene format into a renderable world plus camera
//! and background settings. Colors in the file are 8-bit and divided by 255
//! before the engine sees them; light intensities are HDR scalars and passed
//! through unscaled. The aspect ratio accepts a literal float or a fraction
//! such as `"16.0/9.0"`.
//!
//! ```xml
//! <scene>
//!   <global_settings>
//!     <background_color r="13" g="13" b="26"/>
//!   </global_settings>
//!   <camera>
//!     <position x="0" y="0" z="2"/>
//!     <focal_length value="1.0"/>
//!     <viewport_height value="2.0"/>
//!     <aspect_ratio value="16.0/9.0"/>
//!   </camera>
//!   <object type="sphere">
//!     <position x="0" y="0" z="-1"/>
//!     <radius value="0.5"/>
//!     <material type="glass">
//!       <ior value="1.5"/>
//!     </material>
//!   </object>
//! </scene>
//! ```

use std::fs;
use std::path::Path;

use glam::DVec3;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::camera::CameraConfig;
use crate::error::RenderError;
use crate::hittable::HittableList;
use crate::material::{Color, MaterialType};
use crate::parallelepiped::Parallelepiped;
use crate::parallelogram::Parallelogram;
use crate::plane::Plane;
use crate::sphere::Sphere;

/// Errors raised while loading a scene description.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("failed to read scene file: {0}")]
    Io(#[from] std::io::Error),
    /// The XML is not well-formed.
    #[error("malformed scene XML: {0}")]
    Xml(#[from] quick_xml::Error),
    /// A value could not be interpreted.
    #[error("malformed scene value: {0}")]
    Parse(String),
    /// A required element or attribute is absent.
    #[error("missing required scene field: {0}")]
    MissingField(&'static str),
    /// The described geometry or material is invalid.
    #[error(transparent)]
    Invalid(#[from] RenderError),
}

/// Everything the renderer needs, as read from a scene file.
pub struct SceneDescription {
    /// The renderable world.
    pub world: HittableList,
    /// Camera parameters.
    pub camera: CameraConfig,
    /// Background radiance for rays that miss every object.
    pub background: Color,
}

/// Load a scene description from a file.
pub fn load_scene<P: AsRef<Path>>(path: P) -> Result<SceneDescription, SceneError> {
    let xml = fs::read_to_string(path)?;
    parse_scene(&xml)
}

/// Parse a scene description from an XML string.
pub fn parse_scene(xml: &str) -> Result<SceneDescription, SceneError> {
    let mut reader = Reader::from_str(xml);

    let mut world = HittableList::new();
    // Faint ambient default, overridden by <background_color>.
    let mut background = Color::new(0.05, 0.05, 0.1);

    let mut in_camera = false;
    let mut in_global = false;
    let mut camera_seen = false;
    let mut camera_position: Option<DVec3> = None;
    let mut focal_length: Option<f64> = None;
    let mut viewport_height: Option<f64> = None;
    let mut aspect_ratio: Option<f64> = None;

    let mut object: Option<PendingObject> = None;
    let mut material: Option<PendingMaterial> = None;

    loop {
        let event = reader.read_event()?;
        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                let name = e.name();
                let name = name.as_ref();
                let self_closing = matches!(event, Event::Empty(_));
                match name {
                    b"scene" => {}
                    b"global_settings" => in_global = !self_closing,
                    b"camera" => {
                        camera_seen = true;
                        in_camera = !self_closing;
                    }
                    b"object" => {
                        let kind =
                            type_attr(e).ok_or(SceneError::MissingField("object type"))?;
                        let pending = PendingObject::new(kind);
                        if self_closing {
                            pending.finalize(&mut world)?;
                        } else {
                            object = Some(pending);
                        }
                    }
                    b"material" => {
                        let kind =
                            type_attr(e).ok_or(SceneError::MissingField("material type"))?;
                        let pending = PendingMaterial::new(kind);
                        if self_closing {
                            attach_material(pending.build()?, object.as_mut())?;
                        } else {
                            material = Some(pending);
                        }
                    }
                    _ => {
                        // Leaf property: dispatched by the innermost open element.
                        if let Some(mat) = material.as_mut() {
                            mat.set(name, e)?;
                        } else if let Some(obj) = object.as_mut() {
                            obj.set(name, e)?;
                        } else if in_camera {
                            match name {
                                b"position" => {
                                    camera_position = Some(vec3_attrs(e, "camera position")?)
                                }
                                b"focal_length" => {
                                    focal_length = Some(value_attr(e, "focal_length")?)
                                }
                                b"viewport_height" => {
                                    viewport_height = Some(value_attr(e, "viewport_height")?)
                                }
                                b"aspect_ratio" => {
                                    aspect_ratio =
                                        Some(parse_aspect(&raw_value_attr(e, "aspect_ratio")?)?)
                                }
                                _ => {}
                            }
                        } else if in_global && name == b"background_color" {
                            background = rgb8_attrs(e, "background_color")?;
                        }
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"camera" => in_camera = false,
                b"global_settings" => in_global = false,
                b"material" => {
                    if let Some(m) = material.take() {
                        attach_material(m.build()?, object.as_mut())?;
                    }
                }
                b"object" => {
                    if let Some(obj) = object.take() {
                        obj.finalize(&mut world)?;
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    if !camera_seen {
        return Err(SceneError::MissingField("camera"));
    }
    let camera = CameraConfig {
        origin: camera_position.ok_or(SceneError::MissingField("camera position"))?,
        focal_length: focal_length.ok_or(SceneError::MissingField("focal_length"))?,
        viewport_height: viewport_height.ok_or(SceneError::MissingField("viewport_height"))?,
        aspect_ratio: aspect_ratio.ok_or(SceneError::MissingField("aspect_ratio"))?,
    };

    Ok(SceneDescription {
        world,
        camera,
        background,
    })
}

fn attach_material(
    built: MaterialType,
    object: Option<&mut PendingObject>,
) -> Result<(), SceneError> {
    match object {
        Some(obj) => {
            obj.material = Some(built);
            Ok(())
        }
        None => Err(SceneError::Parse(
            "material element outside an object".into(),
        )),
    }
}

/// Geometry properties collected while inside an `<object>` element.
struct PendingObject {
    kind: String,
    position: Option<DVec3>,
    normal: Option<DVec3>,
    radius: Option<f64>,
    origin: Option<DVec3>,
    u: Option<DVec3>,
    v: Option<DVec3>,
    w: Option<DVec3>,
    material: Option<MaterialType>,
}

impl PendingObject {
    fn new(kind: String) -> Self {
        Self {
            kind,
            position: None,
            normal: None,
            radius: None,
            origin: None,
            u: None,
            v: None,
            w: None,
            material: None,
        }
    }

    fn set(&mut self, name: &[u8], e: &BytesStart) -> Result<(), SceneError> {
        match name {
            b"position" => self.position = Some(vec3_attrs(e, "position")?),
            b"normal" => self.normal = Some(vec3_attrs(e, "normal")?),
            b"radius" => self.radius = Some(value_attr(e, "radius")?),
            b"origin" => self.origin = Some(vec3_attrs(e, "origin")?),
            b"u" => self.u = Some(vec3_attrs(e, "u")?),
            b"v" => self.v = Some(vec3_attrs(e, "v")?),
            b"w" => self.w = Some(vec3_attrs(e, "w")?),
            _ => {}
        }
        Ok(())
    }

    fn finalize(self, world: &mut HittableList) -> Result<(), SceneError> {
        let material = self.material.ok_or(SceneError::MissingField("material"))?;
        match self.kind.as_str() {
            "sphere" => {
                let sphere = Sphere::new(
                    self.position.ok_or(SceneError::MissingField("sphere position"))?,
                    self.radius.ok_or(SceneError::MissingField("sphere radius"))?,
                    material,
                )?;
                world.add(Box::new(sphere));
            }
            "plane" => {
                let plane = Plane::new(
                    self.position.ok_or(SceneError::MissingField("plane position"))?,
                    self.normal.ok_or(SceneError::MissingField("plane normal"))?,
                    material,
                )?;
                world.add(Box::new(plane));
            }
            "parallelogram" => {
                let quad = Parallelogram::new(
                    self.origin
                        .ok_or(SceneError::MissingField("parallelogram origin"))?,
                    self.u.ok_or(SceneError::MissingField("parallelogram u"))?,
                    self.v.ok_or(SceneError::MissingField("parallelogram v"))?,
                    material,
                )?;
                world.add(Box::new(quad));
            }
            "parallelepiped" => {
                let solid = Parallelepiped::new(
                    self.origin
                        .ok_or(SceneError::MissingField("parallelepiped origin"))?,
                    self.u.ok_or(SceneError::MissingField("parallelepiped u"))?,
                    self.v.ok_or(SceneError::MissingField("parallelepiped v"))?,
                    self.w.ok_or(SceneError::MissingField("parallelepiped w"))?,
                    material,
                )?;
                world.add(Box::new(solid));
            }
            other => {
                return Err(SceneError::Parse(format!("unknown object type '{other}'")));
            }
        }
        Ok(())
    }
}

/// Material properties collected while inside a `<material>` element.
struct PendingMaterial {
    kind: String,
    color: Option<Color>,
    fuzz: Option<f64>,
    ior: Option<f64>,
    intensity: Option<f64>,
}

impl PendingMaterial {
    fn new(kind: String) -> Self {
        Self {
            kind,
            color: None,
            fuzz: None,
            ior: None,
            intensity: None,
        }
    }

    fn set(&mut self, name: &[u8], e: &BytesStart) -> Result<(), SceneError> {
        match name {
            b"color" => self.color = Some(rgb8_attrs(e, "material color")?),
            b"fuzz" => self.fuzz = Some(value_attr(e, "fuzz")?),
            b"ior" => self.ior = Some(value_attr(e, "ior")?),
            b"intensity" => self.intensity = Some(value_attr(e, "intensity")?),
            _ => {}
        }
        Ok(())
    }

    fn build(self) -> Result<MaterialType, SceneError> {
        match self.kind.as_str() {
            "matte" => Ok(MaterialType::lambertian(
                self.color.ok_or(SceneError::MissingField("matte color"))?,
            )),
            "metal" => Ok(MaterialType::metal(
                self.color.ok_or(SceneError::MissingField("metal color"))?,
                self.fuzz.ok_or(SceneError::MissingField("metal fuzz"))?,
            )),
            "glass" => Ok(MaterialType::dielectric(
                self.ior.ok_or(SceneError::MissingField("glass ior"))?,
            )?),
            "light" => {
                let intensity = self
                    .intensity
                    .ok_or(SceneError::MissingField("light intensity"))?;
                Ok(MaterialType::emissive(Color::splat(intensity))?)
            }
            other => Err(SceneError::Parse(format!(
                "unknown material type '{other}'"
            ))),
        }
    }
}

fn type_attr(e: &BytesStart) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"type" {
            return Some(attr.unescape_value().unwrap_or_default().to_string());
        }
    }
    None
}

fn parse_f64(text: &str, element: &str) -> Result<f64, SceneError> {
    text.trim()
        .parse()
        .map_err(|_| SceneError::Parse(format!("bad number '{text}' in {element}")))
}

fn raw_value_attr(e: &BytesStart, element: &str) -> Result<String, SceneError> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"value" {
            return Ok(attr.unescape_value().unwrap_or_default().to_string());
        }
    }
    Err(SceneError::Parse(format!(
        "{element} needs a value attribute"
    )))
}

fn value_attr(e: &BytesStart, element: &str) -> Result<f64, SceneError> {
    parse_f64(&raw_value_attr(e, element)?, element)
}

/// Aspect ratio as a literal float or a fraction like `"16.0/9.0"`.
fn parse_aspect(text: &str) -> Result<f64, SceneError> {
    match text.split_once('/') {
        Some((num, den)) => {
            let num = parse_f64(num, "aspect_ratio")?;
            let den = parse_f64(den, "aspect_ratio")?;
            if den == 0.0 {
                return Err(SceneError::Parse("aspect_ratio divides by zero".into()));
            }
            Ok(num / den)
        }
        None => parse_f64(text, "aspect_ratio"),
    }
}

fn vec3_attrs(e: &BytesStart, element: &str) -> Result<DVec3, SceneError> {
    let (mut x, mut y, mut z) = (None, None, None);
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().unwrap_or_default();
        match attr.key.as_ref() {
            b"x" => x = Some(parse_f64(&value, element)?),
            b"y" => y = Some(parse_f64(&value, element)?),
            b"z" => z = Some(parse_f64(&value, element)?),
            _ => {}
        }
    }
    match (x, y, z) {
        (Some(x), Some(y), Some(z)) => Ok(DVec3::new(x, y, z)),
        _ => Err(SceneError::Parse(format!(
            "{element} needs x, y and z attributes"
        ))),
    }
}

/// 8-bit color attributes, scaled into [0, 1].
fn rgb8_attrs(e: &BytesStart, element: &str) -> Result<Color, SceneError> {
    let (mut r, mut g, mut b) = (None, None, None);
    for attr in e.attributes().flatten() {
        let value = attr.unescape_value().unwrap_or_default();
        match attr.key.as_ref() {
            b"r" => r = Some(parse_f64(&value, element)?),
            b"g" => g = Some(parse_f64(&value, element)?),
            b"b" => b = Some(parse_f64(&value, element)?),
            _ => {}
        }
    }
    match (r, g, b) {
        (Some(r), Some(g), Some(b)) => Ok(Color::new(r, g, b) / 255.0),
        _ => Err(SceneError::Parse(format!(
            "{element} needs r, g and b attributes"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
        <scene>
          <!-- demo layout -->
          <global_settings>
            <background_color r="13" g="13" b="26"/>
          </global_settings>
          <camera id="main" type="pinhole">
            <position x="0" y="0" z="2"/>
            <focal_length value="1.0"/>
            <viewport_height value="2.0"/>
            <aspect_ratio value="16.0/9.0"/>
          </camera>
          <object id="ground" type="plane">
            <position x="0" y="-0.5" z="0"/>
            <normal x="0" y="1" z="0"/>
            <material type="matte">
              <color r="128" g="128" b="128"/>
            </material>
          </object>
          <object id="bulb" type="sphere">
            <position x="-1.8" y="2.2" z="1.5"/>
            <radius value="1.6"/>
            <material type="light">
              <intensity value="15"/>
            </material>
          </object>
          <object id="pillar" type="parallelepiped">
            <origin x="-2" y="-0.5" z="-1.5"/>
            <u x="1" y="0" z="0"/>
            <v x="0.2" y="1" z="0"/>
            <w x="0" y="0" z="1"/>
            <material type="matte">
              <color r="153" g="26" b="26"/>
            </material>
          </object>
        </scene>
    "#;

    #[test]
    fn full_scene_parses() {
        let scene = parse_scene(SCENE).unwrap();
        assert_eq!(scene.world.len(), 3);
        assert!((scene.camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-12);
        assert_eq!(scene.camera.origin, DVec3::new(0.0, 0.0, 2.0));
        assert_eq!(scene.camera.focal_length, 1.0);
        assert_eq!(scene.camera.viewport_height, 2.0);
        assert_eq!(scene.background, Color::new(13.0, 13.0, 26.0) / 255.0);
    }

    #[test]
    fn aspect_ratio_accepts_literal_and_fraction() {
        assert!((parse_aspect("1.5").unwrap() - 1.5).abs() < 1e-12);
        assert!((parse_aspect("16.0/9.0").unwrap() - 16.0 / 9.0).abs() < 1e-12);
        assert!(matches!(
            parse_aspect("16/0"),
            Err(SceneError::Parse(_))
        ));
        assert!(matches!(parse_aspect("wide"), Err(SceneError::Parse(_))));
    }

    #[test]
    fn materials_build_with_scaled_colors() {
        let mut matte = PendingMaterial::new("matte".into());
        matte.color = Some(Color::new(255.0, 0.0, 0.0) / 255.0);
        match matte.build().unwrap() {
            MaterialType::Lambertian { albedo } => {
                assert_eq!(albedo, Color::new(1.0, 0.0, 0.0))
            }
            _ => panic!("expected matte"),
        }

        // Light intensity is HDR and not divided by 255.
        let mut light = PendingMaterial::new("light".into());
        light.intensity = Some(15.0);
        match light.build().unwrap() {
            MaterialType::Emissive { radiance } => assert_eq!(radiance, Color::splat(15.0)),
            _ => panic!("expected light"),
        }
    }

    #[test]
    fn missing_material_is_reported() {
        let xml = r#"
            <scene>
              <camera>
                <position x="0" y="0" z="0"/>
                <focal_length value="1"/>
                <viewport_height value="2"/>
                <aspect_ratio value="1"/>
              </camera>
              <object type="sphere">
                <position x="0" y="0" z="-1"/>
                <radius value="0.5"/>
              </object>
            </scene>
        "#;
        assert!(matches!(
            parse_scene(xml),
            Err(SceneError::MissingField("material"))
        ));
    }

    #[test]
    fn unknown_object_type_is_reported() {
        let xml = r#"
            <scene>
              <camera>
                <position x="0" y="0" z="0"/>
                <focal_length value="1"/>
                <viewport_height value="2"/>
                <aspect_ratio value="1"/>
              </camera>
              <object type="torus">
                <material type="matte"><color r="1" g="2" b="3"/></material>
              </object>
            </scene>
        "#;
        assert!(matches!(parse_scene(xml), Err(SceneError::Parse(_))));
    }

    #[test]
    fn invalid_material_parameters_surface_as_errors() {
        let xml = r#"
            <scene>
              <camera>
                <position x="0" y="0" z="0"/>
                <focal_length value="1"/>
                <viewport_height value="2"/>
                <aspect_ratio value="1"/>
              </camera>
              <object type="sphere">
                <position x="0" y="0" z="-1"/>
                <radius value="0.5"/>
                <material type="glass"><ior value="-1.5"/></material>
              </object>
            </scene>
        "#;
        assert!(matches!(
            parse_scene(xml),
            Err(SceneError::Invalid(RenderError::InvalidMaterial(_)))
        ));
    }

    #[test]
    fn missing_camera_is_reported() {
        assert!(matches!(
            parse_scene("<scene></scene>"),
            Err(SceneError::MissingField("camera"))
        ));
    }
}
