//! 2D affine transforms for mapping a source image region into pipeline input space.
//!
//! All matrices are homogeneous 4x4 with the z axis left untouched, so they can
//! be handed to renderers and shaders unchanged.
//!
//! Composition uses the column-vector convention: in `compose(&[A, B, C])` the
//! rightmost matrix `C` is applied to a point first and `A` last.
//!
//! ```text
//! crop = T(offset) * S(scale) * T(0.5, 0.5) * Rz(angle) * T(-0.5, -0.5)
//! ```
//!
//! The rotation pivots about the center of the unit square, not the origin.

use nalgebra::{Matrix4, Rotation3, Vector2, Vector3, Vector4};

/// Pivot of `rotate_z_at_center`, in unit-square coordinates.
const UNIT_SQUARE_CENTER: f64 = 0.5;

/// Multiplies matrices left to right: `compose(&[a, b, c]) == a * b * c`.
///
/// Returns the identity for an empty slice.
pub fn compose(matrices: &[Matrix4<f64>]) -> Matrix4<f64> {
    matrices
        .iter()
        .fold(Matrix4::identity(), |acc, m| acc * m)
}

/// Translation by `(x, y, 0)`.
pub fn translation_2d(offset: &Vector2<f64>) -> Matrix4<f64> {
    Matrix4::new_translation(&Vector3::new(offset.x, offset.y, 0.0))
}

/// Non-uniform scaling by `(x, y, 1)`.
pub fn scaling_2d(scale: &Vector2<f64>) -> Matrix4<f64> {
    Matrix4::new_nonuniform_scaling(&Vector3::new(scale.x, scale.y, 1.0))
}

/// Counter-clockwise rotation about the Z axis through the origin.
pub fn rotation_z(angle: f64) -> Matrix4<f64> {
    Rotation3::from_axis_angle(&Vector3::z_axis(), angle).to_homogeneous()
}

/// Rotation about the Z axis pivoting at (0.5, 0.5).
pub fn rotate_z_at_center(angle: f64) -> Matrix4<f64> {
    let pivot = Vector2::new(UNIT_SQUARE_CENTER, UNIT_SQUARE_CENTER);
    compose(&[
        translation_2d(&pivot),
        rotation_z(angle),
        translation_2d(&-pivot),
    ])
}

/// Builds the crop matrix: rotate about the unit-square center, then scale,
/// then offset.
///
/// Any finite input is valid. NaN and infinities are not checked and
/// propagate into the result.
pub fn crop_matrix(angle: f64, scale: &Vector2<f64>, offset: &Vector2<f64>) -> Matrix4<f64> {
    compose(&[
        translation_2d(offset),
        scaling_2d(scale),
        rotate_z_at_center(angle),
    ])
}

/// Signed angle of a 2D vector, `atan2(y, x)`, in (-π, π].
///
/// The zero vector yields 0.
#[inline]
pub fn angle_2d(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

/// Applies an affine matrix to a point lying in the z = 0 plane.
pub fn transform_point_2d(m: &Matrix4<f64>, p: &Vector2<f64>) -> Vector2<f64> {
    let out = m * Vector4::new(p.x, p.y, 0.0, 1.0);
    Vector2::new(out.x, out.y)
}
