//! Validating walk over a scene document.
//!
//! Every check short-circuits: the first missing element, missing or non-numeric
//! attribute, or rejected value aborts the parse with one message naming the element
//! it concerns. Surfaces live in [`crate::surface_parser`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::document::{self, CameraElement, LightElement, RgbElement, SceneElement, XyzElement};
use crate::geometry::{Color, Vec3f};
use crate::scene::{AmbientLight, Camera, Light, ParallelLight, PointLight, Scene, SceneError};

pub const DEFAULT_ASSETS_DIR: &str = "assets/objects";

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("XML load failed: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("{0}")]
    Structure(String),
    #[error("Camera values invalid: {0}")]
    Camera(#[source] SceneError),
    #[error("{0}")]
    Scene(#[from] SceneError),
    #[error("Mesh load/parse failed: {0}")]
    Mesh(String),
}

impl ParseError {
    pub(crate) fn structure(message: impl Into<String>) -> ParseError {
        ParseError::Structure(message.into())
    }
}

/// The child if present, or "Missing <child_name> inside <context>.".
pub(crate) fn required_child<'a, T>(
    child: &'a Option<T>,
    child_name: &str,
    context: &str,
) -> ParseResult<&'a T> {
    child.as_ref().ok_or_else(|| {
        ParseError::structure(format!("Missing <{}> inside <{}>.", child_name, context))
    })
}

/// Required child carrying `x`, `y`, `z` float attributes.
pub(crate) fn required_vec3_child(
    child: &Option<XyzElement>,
    child_name: &str,
    context: &str,
) -> ParseResult<Vec3f> {
    required_child(child, child_name, context)?
        .xyz()
        .ok_or_else(|| {
            ParseError::structure(format!(
                "Missing/invalid <{} x= y= z=> inside <{}>.",
                child_name, context
            ))
        })
}

/// Required child carrying `r`, `g`, `b` float attributes.
pub(crate) fn required_color_child(
    child: &Option<RgbElement>,
    child_name: &str,
    context: &str,
) -> ParseResult<Color> {
    required_child(child, child_name, context)?
        .rgb()
        .ok_or_else(|| {
            ParseError::structure(format!(
                "{}: <{}> must have r,g,b float attributes.",
                context, child_name
            ))
        })
}

/// Turns scene documents into [`Scene`]s. Mesh files are looked up in `assets_dir`.
#[derive(Clone, Debug)]
pub struct SceneParser {
    assets_dir: PathBuf,
}

impl Default for SceneParser {
    fn default() -> Self {
        SceneParser::new(DEFAULT_ASSETS_DIR)
    }
}

impl SceneParser {
    pub fn new(assets_dir: impl Into<PathBuf>) -> SceneParser {
        SceneParser {
            assets_dir: assets_dir.into(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn load_scene_from_file(&self, path: &Path) -> ParseResult<Scene> {
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("loaded scene document {}", path.display());
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> ParseResult<Scene> {
        let root = document::from_str(text)?;
        if root.tag != "scene" {
            return Err(ParseError::structure("Missing <scene> root element."));
        }
        self.parse_scene(&root.body)
    }

    fn parse_scene(&self, scene_el: &SceneElement) -> ParseResult<Scene> {
        let (output_file_name, background_color) = parse_basics(scene_el)?;
        let camera = parse_camera(required_child(&scene_el.camera, "camera", "scene")?)?;
        log::debug!("parsed camera: {}", camera);
        let mut scene = Scene::new(output_file_name, background_color, camera)?;
        if let Some(lights_el) = &scene_el.lights {
            for light_el in &lights_el.entries {
                let light = parse_light(&light_el.tag, &light_el.body, &scene)?;
                scene.add_light(light)?;
            }
        }
        if let Some(surfaces_el) = &scene_el.surfaces {
            self.parse_surfaces(surfaces_el, &mut scene)?;
        }
        log::debug!(
            "parsed scene with {} lights and {} surfaces",
            scene.lights().len(),
            scene.surfaces().len()
        );
        Ok(scene)
    }
}

fn parse_basics(scene_el: &SceneElement) -> ParseResult<(&str, Color)> {
    let output_file_name = scene_el
        .output_file
        .as_deref()
        .ok_or_else(|| ParseError::structure("Missing attribute output_file on <scene>."))?;
    if output_file_name.is_empty() {
        return Err(SceneError::EmptyOutputFileName.into());
    }
    let background = required_child(&scene_el.background_color, "background_color", "scene")?;
    let background_color = background.rgb().ok_or_else(|| {
        ParseError::structure("background_color must have r,g,b float attributes.")
    })?;
    Ok((output_file_name, background_color))
}

fn parse_camera(camera_el: &CameraElement) -> ParseResult<Camera> {
    let position = required_vec3_child(&camera_el.position, "position", "camera")?;
    let lookat = required_vec3_child(&camera_el.lookat, "lookat", "camera")?;
    let up = required_vec3_child(&camera_el.up, "up", "camera")?;

    let fov_el = required_child(&camera_el.horizontal_fov, "horizontal_fov", "camera")?;
    let fov_half_angle = document::parse_float(&fov_el.angle).ok_or_else(|| {
        ParseError::structure("Missing/invalid <horizontal_fov angle=> inside <camera>.")
    })?;

    let resolution_el = required_child(&camera_el.resolution, "resolution", "camera")?;
    let resolution = document::parse_int(&resolution_el.horizontal)
        .zip(document::parse_int(&resolution_el.vertical))
        .ok_or_else(|| {
            ParseError::structure(
                "Missing/invalid <resolution horizontal= vertical=> inside <camera>.",
            )
        })?;

    let bounces_el = required_child(&camera_el.max_bounces, "max_bounces", "camera")?;
    let max_bounces = document::parse_int(&bounces_el.n).ok_or_else(|| {
        ParseError::structure("Missing/invalid <max_bounces n=> inside <camera>.")
    })?;

    Camera::new(position, lookat, up, fov_half_angle, resolution, max_bounces)
        .map_err(ParseError::Camera)
}

fn parse_light(tag: &str, light_el: &LightElement, scene: &Scene) -> ParseResult<Light> {
    match tag {
        "ambient_light" => {
            if scene.ambient_light().is_some() {
                return Err(SceneError::DuplicateAmbientLight.into());
            }
            let color = required_color_child(&light_el.color, "color", tag)?;
            Ok(Light::Ambient(AmbientLight { color }))
        }
        "point_light" => {
            let color = required_color_child(&light_el.color, "color", tag)?;
            let position = required_vec3_child(&light_el.position, "position", tag)?;
            Ok(Light::Point(PointLight { color, position }))
        }
        "parallel_light" => {
            let color = required_color_child(&light_el.color, "color", tag)?;
            let direction = required_vec3_child(&light_el.direction, "direction", tag)?;
            Ok(Light::Parallel(ParallelLight::new(color, &direction)))
        }
        "spot_light" => Err(ParseError::structure("<spot_light> not supported yet.")),
        other => Err(ParseError::structure(format!(
            "Unknown light type <{}> inside <lights>.",
            other
        ))),
    }
}
