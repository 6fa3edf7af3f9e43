//! Rigid placement transforms for skeleton joints and bones.
//!
//! A `RigidTransform` is translation + rotation + non-uniform scale, no shear.
//! As a matrix it is `T * R * S`: scale in the local frame, rotate, then move
//! to the world position.
//!
//! Bone meshes are assumed to be unit-height and centered at the origin with
//! their long axis along +Y. Scaling Y by half the bone length and placing the
//! mesh at the midpoint makes it span both endpoints.

use std::f64::consts::PI;

use nalgebra::{Matrix3, Matrix4, Rotation3, Unit, UnitQuaternion, Vector3};
use serde::Deserialize;

/// Default edge length of a joint sphere.
pub const DEFAULT_JOINT_SIZE: f64 = 0.07;

/// Default radius of a bone capsule.
pub const DEFAULT_BONE_RADIUS: f64 = 0.03;

/// Column norms below this are treated as a collapsed axis when decomposing.
const DEGENERATE_SCALE: f64 = 1e-12;

/// Translation + rotation + per-axis scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
    pub scale: Vector3<f64>,
}

impl RigidTransform {
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Homogeneous matrix `T(position) * R(rotation) * S(scale)`.
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Decomposes a `T * R * S` matrix back into its parts.
    ///
    /// Scale is the norm of each column of the upper 3x3 block and rotation is
    /// taken from the normalized columns. A collapsed column (zero scale on
    /// that axis) contributes the corresponding identity column instead.
    /// Matrices with shear or reflection do not round-trip.
    pub fn from_matrix(mat: &Matrix4<f64>) -> Self {
        let rs = mat.fixed_view::<3, 3>(0, 0).into_owned();
        let position = Vector3::new(mat[(0, 3)], mat[(1, 3)], mat[(2, 3)]);

        let scale = Vector3::new(
            rs.column(0).norm(),
            rs.column(1).norm(),
            rs.column(2).norm(),
        );

        let mut rot = Matrix3::identity();
        for i in 0..3 {
            if scale[i] > DEGENERATE_SCALE {
                rot.set_column(i, &(rs.column(i) / scale[i]));
            }
        }

        let rot3 = Rotation3::from_matrix_unchecked(rot);
        Self {
            position,
            rotation: UnitQuaternion::from_rotation_matrix(&rot3),
            scale,
        }
    }

    /// Maps a point from the local frame into the world frame.
    pub fn transform_point(&self, p: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * self.scale.component_mul(p) + self.position
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Minimal rotation taking `from` onto the direction of `to`.
///
/// Antiparallel inputs have no unique minimal rotation; a half turn about an
/// axis perpendicular to `from` is returned. A zero input gives the identity.
pub fn from_to_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
        let mut axis = from.cross(&Vector3::x());
        if axis.norm_squared() < DEGENERATE_SCALE {
            axis = from.cross(&Vector3::z());
        }
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(axis), PI)
    })
}

/// Derives joint and bone placements from keypoint positions.
///
/// The sizes are purely visual and come from configuration, never from data.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RigidPoseBuilder {
    /// Uniform scale applied to every joint.
    pub joint_size: f64,
    /// Scale applied to the two non-length axes of every bone.
    pub bone_radius: f64,
}

impl RigidPoseBuilder {
    pub fn new(joint_size: f64, bone_radius: f64) -> Self {
        Self {
            joint_size,
            bone_radius,
        }
    }

    /// Joint placed at `p` with identity rotation and uniform `joint_size`.
    pub fn joint_transform(&self, p: &Vector3<f64>) -> RigidTransform {
        RigidTransform {
            position: *p,
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(self.joint_size),
        }
    }

    /// Bone spanning `p1` to `p2`.
    ///
    /// ```text
    /// center   = (p1 + p2) / 2
    /// rotation = minimal rotation +Y -> (p2 - p1)
    /// scale    = (radius, |p2 - p1| / 2, radius)
    /// ```
    ///
    /// `p1` and `p2` must differ. Coincident points leave the direction
    /// undefined; the result then has identity rotation and zero length,
    /// which callers should not rely on.
    pub fn bone_transform(&self, p1: &Vector3<f64>, p2: &Vector3<f64>) -> RigidTransform {
        let direction = p2 - p1;
        let length = direction.norm() / 2.0;
        let center = (p1 + p2) / 2.0;

        RigidTransform {
            position: center,
            rotation: from_to_rotation(&Vector3::y(), &direction),
            scale: Vector3::new(self.bone_radius, length, self.bone_radius),
        }
    }
}

impl Default for RigidPoseBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_JOINT_SIZE, DEFAULT_BONE_RADIUS)
    }
}

/// Joint transform with the default joint size.
pub fn joint_transform(p: &Vector3<f64>) -> RigidTransform {
    RigidPoseBuilder::default().joint_transform(p)
}

/// Bone transform with the default bone radius.
pub fn bone_transform(p1: &Vector3<f64>, p2: &Vector3<f64>) -> RigidTransform {
    RigidPoseBuilder::default().bone_transform(p1, p2)
}
