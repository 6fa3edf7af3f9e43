//! Per-tick skeleton update: keypoints in, joint and bone transforms out.
//!
//! Scene hierarchy addressed through `NodeHandle`:
//!     Hand/
//!         Joints/
//!             Joint {i}   - one per keypoint, carries a kinematic collider
//!         Bones/
//!             Bone {j}    - one per bone pair, visual only

use std::fmt;

use anyhow::{Result, bail};
use nalgebra::Vector3;
use tracing::debug;

use super::provider::KeypointProvider;
use super::topology::{BONE_PAIRS, BonePair, KEYPOINT_COUNT};
use crate::geometry::{RigidPoseBuilder, RigidTransform};

/// Identifies one renderable node of the hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeHandle {
    Joint(usize),
    Bone(usize),
}

impl NodeHandle {
    /// Scene path of the node, e.g. `Hand/Joints/Joint 3`.
    pub fn path(&self) -> String {
        match self {
            NodeHandle::Joint(i) => format!("Hand/Joints/Joint {}", i),
            NodeHandle::Bone(j) => format!("Hand/Bones/Bone {}", j),
        }
    }

    /// Joints are driven as kinematic bodies so they can push other objects;
    /// bones are visual only.
    pub fn is_kinematic_body(&self) -> bool {
        matches!(self, NodeHandle::Joint(_))
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Receiver for computed transforms (renderer, physics world, recorder...).
pub trait TransformSink {
    fn apply_transform(&mut self, handle: NodeHandle, transform: &RigidTransform);
}

/// Transforms produced by one update.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonPose {
    /// One per keypoint, in keypoint order.
    pub joints: Vec<RigidTransform>,
    /// One per bone pair, in table order.
    pub bones: Vec<RigidTransform>,
    /// Bones whose endpoints coincided this tick.
    pub degenerate_bones: usize,
}

impl SkeletonPose {
    /// All transforms with their handles, joints first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &RigidTransform)> {
        let joints = self
            .joints
            .iter()
            .enumerate()
            .map(|(i, xf)| (NodeHandle::Joint(i), xf));
        let bones = self
            .bones
            .iter()
            .enumerate()
            .map(|(j, xf)| (NodeHandle::Bone(j), xf));
        joints.chain(bones)
    }
}

/// Maps keypoints to joint and bone transforms for a fixed bone table.
#[derive(Debug, Clone)]
pub struct SkeletonUpdater {
    bone_pairs: Vec<BonePair>,
    builder: RigidPoseBuilder,
}

impl SkeletonUpdater {
    /// Creates an updater for a custom bone table.
    ///
    /// Every index must be a valid keypoint and each pair must join two
    /// different keypoints. Repeated pairs are allowed.
    pub fn new(bone_pairs: &[BonePair], builder: RigidPoseBuilder) -> Result<Self> {
        for (j, &(a, b)) in bone_pairs.iter().enumerate() {
            if a >= KEYPOINT_COUNT || b >= KEYPOINT_COUNT {
                bail!(
                    "Bone {} references keypoint ({}, {}) outside 0..{}",
                    j,
                    a,
                    b,
                    KEYPOINT_COUNT
                );
            }
            if a == b {
                bail!("Bone {} joins keypoint {} to itself", j, a);
            }
        }

        debug!(
            "Skeleton updater: {} bones, joint size {}, bone radius {}",
            bone_pairs.len(),
            builder.joint_size,
            builder.bone_radius
        );

        Ok(Self {
            bone_pairs: bone_pairs.to_vec(),
            builder,
        })
    }

    /// Updater for the standard hand table.
    pub fn hand(builder: RigidPoseBuilder) -> Self {
        Self {
            bone_pairs: BONE_PAIRS.to_vec(),
            builder,
        }
    }

    pub fn bone_pairs(&self) -> &[BonePair] {
        &self.bone_pairs
    }

    pub fn builder(&self) -> &RigidPoseBuilder {
        &self.builder
    }

    /// Computes every joint and bone transform for the current tick.
    ///
    /// Each keypoint is fetched from the provider exactly once, even when it
    /// appears in several bone pairs.
    pub fn update<P: KeypointProvider + ?Sized>(&self, provider: &P) -> SkeletonPose {
        let keypoints: [Vector3<f64>; KEYPOINT_COUNT] =
            std::array::from_fn(|i| provider.keypoint(i));

        let joints = keypoints
            .iter()
            .map(|p| self.builder.joint_transform(p))
            .collect();

        let mut degenerate_bones = 0;
        let bones = self
            .bone_pairs
            .iter()
            .map(|&(a, b)| {
                let (p1, p2) = (&keypoints[a], &keypoints[b]);
                if p1 == p2 {
                    degenerate_bones += 1;
                }
                self.builder.bone_transform(p1, p2)
            })
            .collect();

        if degenerate_bones > 0 {
            debug!(
                "{} of {} bones have coincident endpoints",
                degenerate_bones,
                self.bone_pairs.len()
            );
        }

        SkeletonPose {
            joints,
            bones,
            degenerate_bones,
        }
    }

    /// Pushes a computed pose to a sink, joints first.
    pub fn apply<S: TransformSink + ?Sized>(&self, pose: &SkeletonPose, sink: &mut S) {
        for (handle, xf) in pose.iter() {
            sink.apply_transform(handle, xf);
        }
    }

    /// `update` followed by `apply`.
    pub fn update_into<P, S>(&self, provider: &P, sink: &mut S) -> SkeletonPose
    where
        P: KeypointProvider + ?Sized,
        S: TransformSink + ?Sized,
    {
        let pose = self.update(provider);
        self.apply(&pose, sink);
        pose
    }
}

impl Default for SkeletonUpdater {
    fn default() -> Self {
        Self::hand(RigidPoseBuilder::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skeleton::topology::BONE_COUNT;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, UnitQuaternion};
    use std::cell::Cell;

    /// Synthetic hand: wrist at origin, each finger a straight ray of 4 points.
    fn synthetic_keypoints() -> [Vector3<f64>; KEYPOINT_COUNT] {
        std::array::from_fn(|i| {
            if i == 0 {
                return Vector3::zeros();
            }
            let finger = (i - 1) / 4;
            let segment = ((i - 1) % 4 + 1) as f64;
            let spread = finger as f64 * 0.3 - 0.6;
            Vector3::new(spread.sin() * segment * 0.1, spread.cos() * segment * 0.1, 0.01 * i as f64)
        })
    }

    struct CountingProvider {
        points: [Vector3<f64>; KEYPOINT_COUNT],
        calls: Cell<usize>,
    }

    impl KeypointProvider for CountingProvider {
        fn keypoint(&self, index: usize) -> Vector3<f64> {
            self.calls.set(self.calls.get() + 1);
            self.points[index]
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        applied: Vec<(NodeHandle, RigidTransform)>,
    }

    impl TransformSink for RecordingSink {
        fn apply_transform(&mut self, handle: NodeHandle, transform: &RigidTransform) {
            self.applied.push((handle, *transform));
        }
    }

    #[test]
    fn test_update_counts_and_order() {
        let points = synthetic_keypoints();
        let pose = SkeletonUpdater::default().update(&points);

        assert_eq!(pose.joints.len(), KEYPOINT_COUNT);
        assert_eq!(pose.bones.len(), BONE_COUNT);
        assert_eq!(pose.degenerate_bones, 0);

        for (i, joint) in pose.joints.iter().enumerate() {
            assert_eq!(joint.position, points[i]);
            assert_eq!(joint.rotation, UnitQuaternion::identity());
            assert_eq!(joint.scale, Vector3::repeat(0.07));
        }

        for (bone, &(a, b)) in pose.bones.iter().zip(BONE_PAIRS.iter()) {
            let (p1, p2) = (points[a], points[b]);
            assert_eq!(bone.position, (p1 + p2) / 2.0);
            assert_relative_eq!(bone.scale.y, (p2 - p1).norm() / 2.0, epsilon = 1e-12);

            let tip = bone.position + bone.rotation * Vector3::y() * bone.scale.y;
            assert_relative_eq!(tip, p2, epsilon = 1e-10);

            let mat = bone.to_matrix();
            let d = RigidTransform::from_matrix(&mat);
            let recomposed = Matrix4::new_translation(&d.position)
                * d.rotation.to_homogeneous()
                * Matrix4::new_nonuniform_scaling(&d.scale);
            assert_relative_eq!(recomposed, mat, epsilon = 1e-5);
        }

        // Duplicated thumb entry yields identical transforms
        assert_eq!(pose.bones[1], pose.bones[2]);
    }

    #[test]
    fn test_provider_queried_once_per_keypoint() {
        let provider = CountingProvider {
            points: synthetic_keypoints(),
            calls: Cell::new(0),
        };
        SkeletonUpdater::default().update(&provider);
        assert_eq!(provider.calls.get(), KEYPOINT_COUNT);
    }

    #[test]
    fn test_update_into_sink() {
        let points = synthetic_keypoints();
        let mut sink = RecordingSink::default();
        let pose = SkeletonUpdater::default().update_into(&points, &mut sink);

        assert_eq!(sink.applied.len(), KEYPOINT_COUNT + BONE_COUNT);
        assert_eq!(sink.applied[0].0, NodeHandle::Joint(0));
        assert_eq!(sink.applied[20].0, NodeHandle::Joint(20));
        assert_eq!(sink.applied[21].0, NodeHandle::Bone(0));
        assert_eq!(sink.applied[42].0, NodeHandle::Bone(21));
        assert_eq!(sink.applied[21].1, pose.bones[0]);
    }

    #[test]
    fn test_custom_builder_sizes() {
        let updater = SkeletonUpdater::hand(RigidPoseBuilder::new(0.1, 0.05));
        let pose = updater.update(&synthetic_keypoints());

        assert_eq!(pose.joints[3].scale, Vector3::repeat(0.1));
        assert_eq!(pose.bones[7].scale.x, 0.05);
        assert_eq!(pose.bones[7].scale.z, 0.05);
    }

    #[test]
    fn test_custom_table() {
        let pairs = [(0, 4), (0, 8), (0, 4)];
        let updater = SkeletonUpdater::new(&pairs, RigidPoseBuilder::default()).unwrap();
        let pose = updater.update(&synthetic_keypoints());

        assert_eq!(pose.joints.len(), KEYPOINT_COUNT);
        assert_eq!(pose.bones.len(), 3);
        assert_eq!(pose.bones[0], pose.bones[2]);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        let err = SkeletonUpdater::new(&[(0, 1), (3, 21)], RigidPoseBuilder::default())
            .unwrap_err();
        assert!(err.to_string().contains("Bone 1"));
    }

    #[test]
    fn test_new_rejects_self_loop() {
        assert!(SkeletonUpdater::new(&[(5, 5)], RigidPoseBuilder::default()).is_err());
    }

    #[test]
    fn test_new_accepts_standard_table() {
        let updater = SkeletonUpdater::new(&BONE_PAIRS, RigidPoseBuilder::default()).unwrap();
        assert_eq!(updater.bone_pairs(), &BONE_PAIRS[..]);
    }

    #[test]
    fn test_degenerate_bones_counted() {
        // Before the first detection every keypoint sits at the origin
        let points = [Vector3::zeros(); KEYPOINT_COUNT];
        let pose = SkeletonUpdater::default().update(&points);

        assert_eq!(pose.degenerate_bones, BONE_COUNT);
        for bone in &pose.bones {
            assert_eq!(bone.scale.y, 0.0);
            assert!(bone.position.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_node_handle_paths() {
        assert_eq!(NodeHandle::Joint(3).path(), "Hand/Joints/Joint 3");
        assert_eq!(NodeHandle::Bone(17).to_string(), "Hand/Bones/Bone 17");
        assert!(NodeHandle::Joint(0).is_kinematic_body());
        assert!(!NodeHandle::Bone(0).is_kinematic_body());
    }
}
