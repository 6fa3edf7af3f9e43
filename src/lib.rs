//! Hand skeleton geometry.
//!
//! Turns the 21 keypoints of a hand-pose estimator into joint and bone
//! placements, and builds the crop matrix that maps a source image region into
//! the estimator's input frame.

pub mod geometry;
pub mod io;
pub mod skeleton;

pub use geometry::{RigidPoseBuilder, RigidTransform, crop_matrix};
pub use skeleton::{KeypointProvider, SkeletonPose, SkeletonUpdater, TransformSink};
