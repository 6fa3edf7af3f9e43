//! Hand skeleton: topology, keypoint sources and the per-tick updater.

pub mod provider;
pub mod topology;
pub mod updater;

pub use provider::{KeypointFrame, KeypointProvider};
pub use topology::{BONE_COUNT, BONE_PAIRS, BonePair, Finger, KEYPOINT_COUNT};
pub use updater::{NodeHandle, SkeletonPose, SkeletonUpdater, TransformSink};
