//! File loaders at the crate boundary. The geometry and skeleton modules never
//! touch the filesystem.

pub mod recording;
pub mod style;

pub use recording::KeypointRecording;
pub use style::{load_pose_builder, pose_builder_from_reader};
