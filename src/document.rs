//! Serde view of a scene document, read with `quick_xml::de`.
//!
//! Attributes are kept as raw strings so the scene parser can tell a missing value from
//! a malformed one. Lists whose children are told apart by tag (`<lights>`,
//! `<surfaces>`, `<transforms>`) are read as [`Tagged`] entries in document order.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{EnumAccess, VariantAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::geometry::{Color, Fp, Vec3f};

/// An element whose tag name is kept next to its content.
#[derive(Debug)]
pub struct Tagged<T> {
    pub tag: String,
    pub body: T,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Tagged<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // quick-xml selects enum variants by tag name
        deserializer.deserialize_enum("Tagged", &[], TaggedVisitor(PhantomData))
    }
}

struct TaggedVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for TaggedVisitor<T> {
    type Value = Tagged<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an element")
    }

    fn visit_enum<A: EnumAccess<'de>>(self, data: A) -> Result<Tagged<T>, A::Error> {
        let (tag, content): (String, _) = data.variant()?;
        Ok(Tagged {
            tag,
            body: content.newtype_variant()?,
        })
    }
}

/// Reads the whole document; the root element may have any name.
pub fn from_str(text: &str) -> Result<Tagged<SceneElement>, quick_xml::DeError> {
    quick_xml::de::from_str(text)
}

/// `None` when the attribute is missing or not a number.
pub fn parse_float(value: &Option<String>) -> Option<Fp> {
    value.as_deref()?.trim().parse().ok()
}

/// `None` when the attribute is missing or not an integer.
pub fn parse_int(value: &Option<String>) -> Option<i32> {
    value.as_deref()?.trim().parse().ok()
}

fn parse_vec3(x: &Option<String>, y: &Option<String>, z: &Option<String>) -> Option<Vec3f> {
    Some(Vec3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}

#[derive(Debug, Deserialize)]
pub struct SceneElement {
    #[serde(rename = "@output_file")]
    pub output_file: Option<String>,
    pub background_color: Option<RgbElement>,
    pub camera: Option<CameraElement>,
    pub lights: Option<LightsElement>,
    pub surfaces: Option<SurfacesElement>,
}

#[derive(Debug, Deserialize)]
pub struct RgbElement {
    #[serde(rename = "@r")]
    r: Option<String>,
    #[serde(rename = "@g")]
    g: Option<String>,
    #[serde(rename = "@b")]
    b: Option<String>,
}

impl RgbElement {
    pub fn rgb(&self) -> Option<Color> {
        Some(Color::new(
            parse_float(&self.r)?,
            parse_float(&self.g)?,
            parse_float(&self.b)?,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct XyzElement {
    #[serde(rename = "@x")]
    x: Option<String>,
    #[serde(rename = "@y")]
    y: Option<String>,
    #[serde(rename = "@z")]
    z: Option<String>,
}

impl XyzElement {
    pub fn xyz(&self) -> Option<Vec3f> {
        parse_vec3(&self.x, &self.y, &self.z)
    }
}

#[derive(Debug, Deserialize)]
pub struct CameraElement {
    pub position: Option<XyzElement>,
    pub lookat: Option<XyzElement>,
    pub up: Option<XyzElement>,
    pub horizontal_fov: Option<FovElement>,
    pub resolution: Option<ResolutionElement>,
    pub max_bounces: Option<BouncesElement>,
}

#[derive(Debug, Deserialize)]
pub struct FovElement {
    #[serde(rename = "@angle")]
    pub angle: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolutionElement {
    #[serde(rename = "@horizontal")]
    pub horizontal: Option<String>,
    #[serde(rename = "@vertical")]
    pub vertical: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BouncesElement {
    #[serde(rename = "@n")]
    pub n: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LightsElement {
    #[serde(default, rename = "$value")]
    pub entries: Vec<Tagged<LightElement>>,
}

/// Children of every light kind; which ones are required depends on the tag.
#[derive(Debug, Deserialize)]
pub struct LightElement {
    pub color: Option<RgbElement>,
    pub position: Option<XyzElement>,
    pub direction: Option<XyzElement>,
}

#[derive(Debug, Deserialize)]
pub struct SurfacesElement {
    #[serde(default, rename = "$value")]
    pub entries: Vec<Tagged<SurfaceElement>>,
}

/// Attributes and children of `<sphere>` and `<mesh>`.
#[derive(Debug, Deserialize)]
pub struct SurfaceElement {
    #[serde(rename = "@radius")]
    pub radius: Option<String>,
    #[serde(rename = "@name")]
    pub name: Option<String>,
    pub position: Option<XyzElement>,
    pub material_solid: Option<MaterialElement>,
    pub material_textured: Option<MaterialElement>,
    pub transforms: Option<TransformsElement>,
}

#[derive(Debug, Deserialize)]
pub struct MaterialElement {
    pub color: Option<RgbElement>,
    pub texture: Option<TextureElement>,
    pub phong: Option<PhongElement>,
    pub reflectance: Option<ReflectanceElement>,
    pub transmittance: Option<TransmittanceElement>,
    pub refraction: Option<RefractionElement>,
}

#[derive(Debug, Deserialize)]
pub struct TextureElement {
    #[serde(rename = "@name")]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PhongElement {
    #[serde(rename = "@ka")]
    pub ka: Option<String>,
    #[serde(rename = "@kd")]
    pub kd: Option<String>,
    #[serde(rename = "@ks")]
    pub ks: Option<String>,
    #[serde(rename = "@exponent")]
    pub exponent: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReflectanceElement {
    #[serde(rename = "@r")]
    pub r: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransmittanceElement {
    #[serde(rename = "@t")]
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefractionElement {
    #[serde(rename = "@iof")]
    pub iof: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransformsElement {
    #[serde(default, rename = "$value")]
    pub entries: Vec<Tagged<TransformElement>>,
}

/// `translate` and `scale` read `x`, `y`, `z`; the rotations read `theta`.
#[derive(Debug, Deserialize)]
pub struct TransformElement {
    #[serde(rename = "@x")]
    x: Option<String>,
    #[serde(rename = "@y")]
    y: Option<String>,
    #[serde(rename = "@z")]
    z: Option<String>,
    #[serde(rename = "@theta")]
    pub theta: Option<String>,
}

impl TransformElement {
    pub fn xyz(&self) -> Option<Vec3f> {
        parse_vec3(&self.x, &self.y, &self.z)
    }
}
