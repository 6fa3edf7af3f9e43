//! Keypoint sources consumed by the skeleton updater.

use nalgebra::Vector3;

use super::topology::KEYPOINT_COUNT;

/// Per-frame lookup of hand keypoints.
///
/// Only indices in `0..KEYPOINT_COUNT` are ever requested. Implementations own
/// their data; nothing here validates it.
pub trait KeypointProvider {
    fn keypoint(&self, index: usize) -> Vector3<f64>;
}

impl KeypointProvider for [Vector3<f64>; KEYPOINT_COUNT] {
    fn keypoint(&self, index: usize) -> Vector3<f64> {
        self[index]
    }
}

impl<P: KeypointProvider + ?Sized> KeypointProvider for &P {
    fn keypoint(&self, index: usize) -> Vector3<f64> {
        (**self).keypoint(index)
    }
}

/// One timestamped set of 21 keypoints.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointFrame {
    pub timestamp_ns: u64,
    pub points: [Vector3<f64>; KEYPOINT_COUNT],
}

impl KeypointFrame {
    pub fn new(timestamp_ns: u64, points: [Vector3<f64>; KEYPOINT_COUNT]) -> Self {
        Self {
            timestamp_ns,
            points,
        }
    }
}

impl KeypointProvider for KeypointFrame {
    fn keypoint(&self, index: usize) -> Vector3<f64> {
        self.points[index]
    }
}
