use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};

pub type Fp = f64;
pub type Vec3f = Vector3<Fp>;
pub type Vec4f = Vector4<Fp>;
pub type Mat3f = Matrix3<Fp>;
pub type Mat4f = Matrix4<Fp>;
pub type Color = Vec3f;

pub static EPS: Fp = 0.00001;

/// Unit vector in the direction of `v`, or the zero vector when `v` has no length.
pub fn normalize_or_zero(v: &Vec3f) -> Vec3f {
    v.try_normalize(0.0).unwrap_or_else(Vec3f::zeros)
}

pub fn point_to_homogeneous(p: &Vec3f) -> Vec4f {
    Vec4f::new(p.x, p.y, p.z, 1.0)
}

pub fn vector_to_homogeneous(v: &Vec3f) -> Vec4f {
    Vec4f::new(v.x, v.y, v.z, 0.0)
}

/// Drops `w` without dividing by it; affine transforms keep it at 0 or 1.
pub fn drop_w(v: &Vec4f) -> Vec3f {
    Vec3f::new(v.x, v.y, v.z)
}

pub fn upper_left_3x3(m: &Mat4f) -> Mat3f {
    Mat3f::from_fn(|row, col| m[(row, col)])
}

/// Determinant of the rotation/scale block of an affine matrix.
pub fn affine_determinant(m: &Mat4f) -> Fp {
    let (a00, a01, a02) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (a10, a11, a12) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (a20, a21, a22) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);
    a00 * (a11 * a22 - a12 * a21) - a01 * (a10 * a22 - a12 * a20)
        + a02 * (a10 * a21 - a11 * a20)
}

/// Inverse of an affine matrix (rotation/scale block plus translation).
///
/// The bottom row is assumed to be `[0, 0, 0, 1]` and is not read. The 3x3 block is
/// inverted through its adjugate; a singular block yields non-finite entries rather
/// than an error, so callers that care must check [`affine_determinant`] themselves.
pub fn inverse_affine(m: &Mat4f) -> Mat4f {
    let (a00, a01, a02) = (m[(0, 0)], m[(0, 1)], m[(0, 2)]);
    let (a10, a11, a12) = (m[(1, 0)], m[(1, 1)], m[(1, 2)]);
    let (a20, a21, a22) = (m[(2, 0)], m[(2, 1)], m[(2, 2)]);
    let inv_det = 1.0 / affine_determinant(m);

    let mut result = Mat4f::identity();
    result[(0, 0)] = (a11 * a22 - a12 * a21) * inv_det;
    result[(0, 1)] = -(a01 * a22 - a02 * a21) * inv_det;
    result[(0, 2)] = (a01 * a12 - a02 * a11) * inv_det;

    result[(1, 0)] = -(a10 * a22 - a12 * a20) * inv_det;
    result[(1, 1)] = (a00 * a22 - a02 * a20) * inv_det;
    result[(1, 2)] = -(a00 * a12 - a02 * a10) * inv_det;

    result[(2, 0)] = (a10 * a21 - a11 * a20) * inv_det;
    result[(2, 1)] = -(a00 * a21 - a01 * a20) * inv_det;
    result[(2, 2)] = (a00 * a11 - a01 * a10) * inv_det;

    // t' = -R^-1 * t
    let translation = Vec3f::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
    let new_translation = -(upper_left_3x3(&result) * translation);
    for row in 0..3 {
        result[(row, 3)] = new_translation[row];
    }
    result
}

/// Transpose of the inverse of the upper-left block, for carrying normals.
pub fn normal_matrix(inverse: &Mat4f) -> Mat3f {
    upper_left_3x3(inverse).transpose()
}

pub fn fmt_vec3(v: &Vec3f) -> String {
    format!("({}, {}, {})", v.x, v.y, v.z)
}
