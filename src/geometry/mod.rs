//! Geometry utilities: crop matrices and rigid joint/bone placement.

pub mod affine;
pub mod rigid;

pub use affine::{angle_2d, compose, crop_matrix, rotate_z_at_center, transform_point_2d};
pub use rigid::{RigidPoseBuilder, RigidTransform, bone_transform, from_to_rotation, joint_transform};
