use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::document::{
    self, MaterialElement, SurfaceElement, SurfacesElement, Tagged, TransformsElement,
};
use crate::geometry::{Fp, Vec3f};
use crate::obj_parser::{parse_obj, ObjMeshData};
use crate::scene::{Material, MaterialKind, Phong, Scene, Shape3D, Surface, TrianglePrimitive};
use crate::scene_parser::{
    required_child, required_color_child, required_vec3_child, ParseError, ParseResult,
    SceneParser,
};
use crate::transform::Transform;

impl SceneParser {
    /// Surfaces are built in parallel, each mesh with its own ingestion state, and
    /// added in document order so the first failing element is the one reported.
    pub(crate) fn parse_surfaces(
        &self,
        surfaces_el: &SurfacesElement,
        scene: &mut Scene,
    ) -> ParseResult<()> {
        let parsed: Vec<ParseResult<Surface>> = surfaces_el
            .entries
            .par_iter()
            .map(|surface_el| self.parse_surface(surface_el))
            .collect();
        for surface in parsed {
            scene.add_surface(surface?);
        }
        Ok(())
    }

    fn parse_surface(&self, surface_el: &Tagged<SurfaceElement>) -> ParseResult<Surface> {
        let context = surface_el.tag.as_str();
        let body = &surface_el.body;
        let shape = match context {
            "sphere" => parse_sphere(body)?,
            "mesh" => self.parse_mesh(body)?,
            other => {
                return Err(ParseError::structure(format!(
                    "Unknown surface type <{}> inside <surfaces>.",
                    other
                )))
            }
        };
        Ok(Surface {
            shape,
            material: parse_material(body, context)?,
            transform: parse_transforms(body.transforms.as_ref(), context)?,
        })
    }

    fn parse_mesh(&self, mesh_el: &SurfaceElement) -> ParseResult<Shape3D> {
        let name = mesh_el
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ParseError::structure("<mesh> is missing attribute 'name'."))?;
        // Only the file name is used, directories in the reference are dropped.
        let file_name = Path::new(name).file_name().ok_or_else(|| {
            ParseError::structure("<mesh> attribute 'name' does not name a file.")
        })?;
        let obj_path = self.assets_dir().join(file_name);

        let obj_text = fs::read_to_string(&obj_path).map_err(|err| {
            ParseError::Mesh(format!("cannot read {}: {}", obj_path.display(), err))
        })?;
        let output = parse_obj(&obj_text);
        for warning in &output.warnings {
            log::warn!("{}: {}", obj_path.display(), warning);
        }
        let triangles = build_triangles(&output.mesh)?;
        log::debug!("{}: {} triangles", obj_path.display(), triangles.len());
        Ok(Shape3D::Mesh { triangles })
    }
}

fn parse_sphere(sphere_el: &SurfaceElement) -> ParseResult<Shape3D> {
    let radius = document::parse_float(&sphere_el.radius)
        .ok_or_else(|| ParseError::structure("<sphere> must have float attribute radius."))?;
    let center = required_vec3_child(&sphere_el.position, "position", "sphere")?;
    Ok(Shape3D::Sphere { center, radius })
}

fn required_float(
    value: &Option<String>,
    element: &str,
    attribute: &str,
    context: &str,
) -> ParseResult<Fp> {
    document::parse_float(value).ok_or_else(|| {
        ParseError::structure(format!(
            "<{}> must have float attribute {} inside <{}>.",
            element, attribute, context
        ))
    })
}

/// `material_solid` is used when a surface carries both material kinds.
fn parse_material(surface_el: &SurfaceElement, context: &str) -> ParseResult<Material> {
    let (material_context, material_el): (&str, &MaterialElement) =
        match (&surface_el.material_solid, &surface_el.material_textured) {
            (Some(solid), _) => ("material_solid", solid),
            (None, Some(textured)) => ("material_textured", textured),
            (None, None) => return Ok(Material::default()),
        };

    let mut material = Material::default();
    if material_context == "material_solid" {
        material.color = required_color_child(&material_el.color, "color", material_context)?;
    } else {
        let texture_name = required_child(&material_el.texture, "texture", material_context)?
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                ParseError::structure(format!(
                    "<texture> inside <{}> of <{}> is missing attribute 'name'.",
                    material_context, context
                ))
            })?;
        material.kind = MaterialKind::Textured {
            texture_name: texture_name.to_string(),
        };
    }

    let phong_el = required_child(&material_el.phong, "phong", material_context)?;
    material.phong = Phong {
        ka: required_float(&phong_el.ka, "phong", "ka", material_context)?,
        kd: required_float(&phong_el.kd, "phong", "kd", material_context)?,
        ks: required_float(&phong_el.ks, "phong", "ks", material_context)?,
        exponent: required_float(&phong_el.exponent, "phong", "exponent", material_context)?,
    };
    let reflectance_el = required_child(&material_el.reflectance, "reflectance", material_context)?;
    material.reflectance = required_float(&reflectance_el.r, "reflectance", "r", material_context)?;
    let transmittance_el =
        required_child(&material_el.transmittance, "transmittance", material_context)?;
    material.transmittance =
        required_float(&transmittance_el.t, "transmittance", "t", material_context)?;
    let refraction_el = required_child(&material_el.refraction, "refraction", material_context)?;
    material.ior = required_float(&refraction_el.iof, "refraction", "iof", material_context)?;
    Ok(material)
}

/// Applies the operations of `<transforms>` in document order.
fn parse_transforms(
    transforms_el: Option<&TransformsElement>,
    context: &str,
) -> ParseResult<Transform> {
    let mut transform = Transform::new();
    let Some(transforms_el) = transforms_el else {
        return Ok(transform);
    };
    for op_el in &transforms_el.entries {
        let name = op_el.tag.as_str();
        let vector = || {
            op_el.body.xyz().ok_or_else(|| {
                ParseError::structure(format!(
                    "<{}> inside <transforms> of <{}> must have x,y,z float attributes.",
                    name, context
                ))
            })
        };
        let theta = || required_float(&op_el.body.theta, name, "theta", "transforms");
        match name {
            "translate" => transform.translate(&vector()?),
            "scale" => transform.scale(&vector()?),
            "rotateX" => transform.rotate_x(theta()?),
            "rotateY" => transform.rotate_y(theta()?),
            "rotateZ" => transform.rotate_z(theta()?),
            other => {
                return Err(ParseError::structure(format!(
                    "Unknown transform <{}> inside <transforms>.",
                    other
                )))
            }
        }
    }
    Ok(transform)
}

fn vec3_at(values: &[Fp], start: usize) -> Vec3f {
    Vec3f::new(values[start], values[start + 1], values[start + 2])
}

fn uv_at(values: &[Fp], start: usize) -> Vec3f {
    Vec3f::new(values[start], values[start + 1], 0.0)
}

/// Regroups expanded OBJ arrays into triangles: 9 position floats, 9 normal floats
/// and 6 texcoord floats per triangle. Empty normal or texcoord arrays fall back to
/// (0, 1, 0) normals and (0, 0, 0) UVs.
pub fn build_triangles(data: &ObjMeshData) -> ParseResult<Vec<TrianglePrimitive>> {
    if data.position.len() % 9 != 0 {
        return Err(ParseError::Mesh(
            "OBJ expanded position array must be multiple of 9 floats (triangle).".to_string(),
        ));
    }
    let has_normals = !data.normal.is_empty();
    let has_uvs = !data.texcoord.is_empty();
    if has_normals && data.normal.len() != data.position.len() {
        return Err(ParseError::Mesh("OBJ normal array size mismatch.".to_string()));
    }
    let vertex_count = data.position.len() / 3;
    if has_uvs && data.texcoord.len() != vertex_count * 2 {
        return Err(ParseError::Mesh("OBJ texcoord array size mismatch.".to_string()));
    }

    let triangles = (0..data.position.len() / 9)
        .map(|triangle| {
            let p = triangle * 9;
            let t = triangle * 6;
            TrianglePrimitive {
                vertices: [
                    vec3_at(&data.position, p),
                    vec3_at(&data.position, p + 3),
                    vec3_at(&data.position, p + 6),
                ],
                normals: if has_normals {
                    [
                        vec3_at(&data.normal, p),
                        vec3_at(&data.normal, p + 3),
                        vec3_at(&data.normal, p + 6),
                    ]
                } else {
                    [Vec3f::y(); 3]
                },
                uvs: if has_uvs {
                    [
                        uv_at(&data.texcoord, t),
                        uv_at(&data.texcoord, t + 2),
                        uv_at(&data.texcoord, t + 4),
                    ]
                } else {
                    [Vec3f::zeros(); 3]
                },
            }
        })
        .collect();
    Ok(triangles)
}
