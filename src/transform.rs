use crate::geometry::{
    affine_determinant, drop_w, inverse_affine, normal_matrix, point_to_homogeneous,
    vector_to_homogeneous, Fp, Mat3f, Mat4f, Vec3f, EPS,
};
use na::Vector3;

/// World placement of a surface.
///
/// Operations are appended on the right (`M = M * Op`), so the first operation a
/// scene lists is the one applied closest to the object. The inverse and the normal
/// matrix are recomputed after every operation and never go stale.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    matrix: Mat4f,
    inverse: Mat4f,
    normal_matrix: Mat3f,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            matrix: Mat4f::identity(),
            inverse: Mat4f::identity(),
            normal_matrix: Mat3f::identity(),
        }
    }
}

impl Transform {
    pub fn new() -> Transform {
        Transform::default()
    }

    pub fn translate(&mut self, t: &Vec3f) {
        self.append(Mat4f::new_translation(t));
    }

    pub fn scale(&mut self, s: &Vec3f) {
        self.append(Mat4f::new_nonuniform_scaling(s));
    }

    pub fn rotate_x(&mut self, degrees: Fp) {
        self.append(Mat4f::from_axis_angle(&Vector3::x_axis(), degrees.to_radians()));
    }

    pub fn rotate_y(&mut self, degrees: Fp) {
        self.append(Mat4f::from_axis_angle(&Vector3::y_axis(), degrees.to_radians()));
    }

    pub fn rotate_z(&mut self, degrees: Fp) {
        self.append(Mat4f::from_axis_angle(&Vector3::z_axis(), degrees.to_radians()));
    }

    pub fn matrix(&self) -> &Mat4f {
        &self.matrix
    }

    pub fn inverse(&self) -> &Mat4f {
        &self.inverse
    }

    pub fn normal_matrix(&self) -> &Mat3f {
        &self.normal_matrix
    }

    pub fn apply_point(&self, p: &Vec3f) -> Vec3f {
        drop_w(&(self.matrix * point_to_homogeneous(p)))
    }

    /// Directions ignore the translation part.
    pub fn apply_vector(&self, v: &Vec3f) -> Vec3f {
        drop_w(&(self.matrix * vector_to_homogeneous(v)))
    }

    /// Not renormalized.
    pub fn apply_normal(&self, n: &Vec3f) -> Vec3f {
        self.normal_matrix * n
    }

    fn append(&mut self, op: Mat4f) {
        self.matrix *= op;
        let det = affine_determinant(&self.matrix);
        if det.abs() < EPS {
            log::warn!(
                "transform became singular (det={}), inverse and normal matrix are undefined",
                det
            );
        }
        self.inverse = inverse_affine(&self.matrix);
        self.normal_matrix = normal_matrix(&self.inverse);
    }
}
