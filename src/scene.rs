use std::fmt;

use thiserror::Error;

use crate::geometry::{fmt_vec3, normalize_or_zero, Color, Fp, Vec3f};
use crate::transform::Transform;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("Scene output file name must not be empty")]
    EmptyOutputFileName,
    #[error("Camera FOV half-angle must be in (0, 180), got {0}")]
    FovOutOfRange(Fp),
    #[error("Camera resolution must be positive, got {0}x{1}")]
    NonPositiveResolution(i32, i32),
    #[error("max_bounces must be >= 0, got {0}")]
    NegativeMaxBounces(i32),
    #[error("Spot falloff must satisfy 0 <= alpha1 <= alpha2, got alpha1={0}, alpha2={1}")]
    SpotFalloff(Fp, Fp),
    #[error("Scene can have at most one ambient_light.")]
    DuplicateAmbientLight,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    position: Vec3f,
    lookat: Vec3f,
    up: Vec3f,
    horizontal_fov_half_angle: Fp,
    res_horizontal: u32,
    res_vertical: u32,
    max_bounces: u32,
}

impl Camera {
    /// `horizontal_fov_half_angle` is in degrees and must lie strictly inside (0, 180).
    pub fn new(
        position: Vec3f,
        lookat: Vec3f,
        up: Vec3f,
        horizontal_fov_half_angle: Fp,
        resolution: (i32, i32),
        max_bounces: i32,
    ) -> Result<Camera, SceneError> {
        if !(horizontal_fov_half_angle > 0.0 && horizontal_fov_half_angle < 180.0) {
            return Err(SceneError::FovOutOfRange(horizontal_fov_half_angle));
        }
        let (width, height) = resolution;
        let (Ok(res_horizontal), Ok(res_vertical)) = (u32::try_from(width), u32::try_from(height))
        else {
            return Err(SceneError::NonPositiveResolution(width, height));
        };
        if res_horizontal == 0 || res_vertical == 0 {
            return Err(SceneError::NonPositiveResolution(width, height));
        }
        let max_bounces =
            u32::try_from(max_bounces).map_err(|_| SceneError::NegativeMaxBounces(max_bounces))?;
        Ok(Camera {
            position,
            lookat,
            up,
            horizontal_fov_half_angle,
            res_horizontal,
            res_vertical,
            max_bounces,
        })
    }

    pub fn position(&self) -> &Vec3f {
        &self.position
    }

    pub fn lookat(&self) -> &Vec3f {
        &self.lookat
    }

    pub fn up(&self) -> &Vec3f {
        &self.up
    }

    pub fn horizontal_fov_half_angle(&self) -> Fp {
        self.horizontal_fov_half_angle
    }

    pub fn res_horizontal(&self) -> u32 {
        self.res_horizontal
    }

    pub fn res_vertical(&self) -> u32 {
        self.res_vertical
    }

    pub fn max_bounces(&self) -> u32 {
        self.max_bounces
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub position: Vec3f,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParallelLight {
    color: Color,
    direction: Vec3f,
}

impl ParallelLight {
    pub fn new(color: Color, direction: &Vec3f) -> ParallelLight {
        ParallelLight {
            color,
            direction: normalize_or_zero(direction),
        }
    }

    pub fn direction(&self) -> &Vec3f {
        &self.direction
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpotLight {
    color: Color,
    position: Vec3f,
    direction: Vec3f,
    alpha1: Fp,
    alpha2: Fp,
}

impl SpotLight {
    pub fn new(
        color: Color,
        position: Vec3f,
        direction: &Vec3f,
        alpha1: Fp,
        alpha2: Fp,
    ) -> Result<SpotLight, SceneError> {
        if !(alpha1 >= 0.0 && alpha2 >= 0.0 && alpha1 <= alpha2) {
            return Err(SceneError::SpotFalloff(alpha1, alpha2));
        }
        Ok(SpotLight {
            color,
            position,
            direction: normalize_or_zero(direction),
            alpha1,
            alpha2,
        })
    }

    pub fn position(&self) -> &Vec3f {
        &self.position
    }

    pub fn direction(&self) -> &Vec3f {
        &self.direction
    }

    pub fn alpha1(&self) -> Fp {
        self.alpha1
    }

    pub fn alpha2(&self) -> Fp {
        self.alpha2
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Point(PointLight),
    Parallel(ParallelLight),
    Spot(SpotLight),
}

impl Light {
    pub fn color(&self) -> &Color {
        match self {
            Light::Ambient(light) => &light.color,
            Light::Point(light) => &light.color,
            Light::Parallel(light) => &light.color,
            Light::Spot(light) => &light.color,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Phong {
    pub ka: Fp,
    pub kd: Fp,
    pub ks: Fp,
    pub exponent: Fp,
}

impl Default for Phong {
    fn default() -> Self {
        Phong {
            ka: 0.0,
            kd: 0.0,
            ks: 0.0,
            exponent: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MaterialKind {
    Solid,
    /// The texture file is only named here, loading it is left to the consumer.
    Textured { texture_name: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub kind: MaterialKind,
    pub color: Color,
    pub phong: Phong,
    pub reflectance: Fp,
    pub transmittance: Fp,
    pub ior: Fp,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            kind: MaterialKind::Solid,
            color: Color::new(1.0, 1.0, 1.0),
            phong: Phong::default(),
            reflectance: 0.0,
            transmittance: 0.0,
            ior: 1.0,
        }
    }
}

impl Material {
    pub fn is_textured(&self) -> bool {
        matches!(self.kind, MaterialKind::Textured { .. })
    }
}

/// One triangle of a mesh with per-vertex normals and texture coordinates.
/// UVs use `x` and `y`, `z` stays 0.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrianglePrimitive {
    pub vertices: [Vec3f; 3],
    pub normals: [Vec3f; 3],
    pub uvs: [Vec3f; 3],
}

#[derive(Clone, Debug, PartialEq)]
pub enum Shape3D {
    Sphere { center: Vec3f, radius: Fp },
    Mesh { triangles: Vec<TrianglePrimitive> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    pub shape: Shape3D,
    pub material: Material,
    pub transform: Transform,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    output_file_name: String,
    background_color: Color,
    camera: Camera,
    ambient_light: Option<AmbientLight>,
    lights: Vec<Light>,
    surfaces: Vec<Surface>,
}

impl Scene {
    pub fn new(
        output_file_name: &str,
        background_color: Color,
        camera: Camera,
    ) -> Result<Scene, SceneError> {
        if output_file_name.is_empty() {
            return Err(SceneError::EmptyOutputFileName);
        }
        Ok(Scene {
            output_file_name: output_file_name.to_string(),
            background_color,
            camera,
            ambient_light: None,
            lights: vec![],
            surfaces: vec![],
        })
    }

    pub fn output_file_name(&self) -> &str {
        &self.output_file_name
    }

    pub fn background_color(&self) -> &Color {
        &self.background_color
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn ambient_light(&self) -> Option<&AmbientLight> {
        self.ambient_light.as_ref()
    }

    /// Point, parallel and spot lights in the order they were added.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Ambient lights go to the single ambient slot, every other light is appended.
    pub fn add_light(&mut self, light: Light) -> Result<(), SceneError> {
        match light {
            Light::Ambient(ambient) => {
                if self.ambient_light.is_some() {
                    return Err(SceneError::DuplicateAmbientLight);
                }
                self.ambient_light = Some(ambient);
            }
            Light::Point(_) | Light::Parallel(_) | Light::Spot(_) => self.lights.push(light),
        }
        Ok(())
    }

    pub fn add_surface(&mut self, surface: Surface) {
        self.surfaces.push(surface);
    }
}

impl fmt::Display for Camera {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Camera{{pos={}, lookat={}, up={}, fov_half={}, res={}x{}, max_bounces={}}}",
            fmt_vec3(&self.position),
            fmt_vec3(&self.lookat),
            fmt_vec3(&self.up),
            self.horizontal_fov_half_angle,
            self.res_horizontal,
            self.res_vertical,
            self.max_bounces
        )
    }
}

impl fmt::Display for AmbientLight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AmbientLight{{color={}}}", fmt_vec3(&self.color))
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let color = fmt_vec3(self.color());
        match self {
            Light::Ambient(_) => write!(f, "AmbientLight{{color={}}}", color),
            Light::Point(light) => write!(
                f,
                "PointLight{{color={}, position={}}}",
                color,
                fmt_vec3(&light.position)
            ),
            Light::Parallel(light) => write!(
                f,
                "ParallelLight{{color={}, direction={}}}",
                color,
                fmt_vec3(&light.direction)
            ),
            Light::Spot(light) => write!(
                f,
                "SpotLight{{color={}, position={}, direction={}, alpha1={}, alpha2={}}}",
                color,
                fmt_vec3(&light.position),
                fmt_vec3(&light.direction),
                light.alpha1,
                light.alpha2
            ),
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MaterialKind::Solid => write!(f, "Solid{{color={}", fmt_vec3(&self.color))?,
            MaterialKind::Textured { texture_name } => {
                write!(f, "Textured{{texture={}", texture_name)?
            }
        }
        write!(
            f,
            ", phong=({}, {}, {}, {}), reflectance={}, transmittance={}, ior={}}}",
            self.phong.ka,
            self.phong.kd,
            self.phong.ks,
            self.phong.exponent,
            self.reflectance,
            self.transmittance,
            self.ior
        )
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape3D::Sphere { center, radius } => write!(
                f,
                "Sphere{{center={}, radius={}",
                fmt_vec3(center),
                radius
            )?,
            Shape3D::Mesh { triangles } => write!(f, "Mesh{{triangles={}", triangles.len())?,
        }
        let origin = self.transform.apply_point(&Vec3f::zeros());
        write!(
            f,
            ", material={}, origin={}}}",
            self.material,
            fmt_vec3(&origin)
        )
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scene{{output file name={}, background={}, camera={}, ambient=",
            self.output_file_name,
            fmt_vec3(&self.background_color),
            self.camera
        )?;
        match &self.ambient_light {
            Some(ambient) => write!(f, "{}", ambient)?,
            None => write!(f, "none")?,
        }
        write!(f, ", lights=[")?;
        for (i, light) in self.lights.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", light)?;
        }
        write!(f, "], surfaces=[")?;
        for (i, surface) in self.surfaces.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", surface)?;
        }
        write!(f, "]}}")
    }
}
