//! YAML configuration for joint and bone sizes.
//!
//! ```yaml
//! joint_size: 0.07
//! bone_radius: 0.03
//! ```
//!
//! Both keys are optional and fall back to the defaults.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::geometry::RigidPoseBuilder;

/// Loads joint/bone sizes from a YAML file.
pub fn load_pose_builder<P: AsRef<Path>>(path: P) -> Result<RigidPoseBuilder> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    pose_builder_from_reader(file).with_context(|| format!("Invalid style file {:?}", path))
}

/// Parses joint/bone sizes from YAML text.
pub fn pose_builder_from_reader<R: Read>(reader: R) -> Result<RigidPoseBuilder> {
    let builder: RigidPoseBuilder = serde_yaml::from_reader(reader)?;
    validate_size("joint_size", builder.joint_size)?;
    validate_size("bone_radius", builder.bone_radius)?;
    Ok(builder)
}

fn validate_size(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        bail!("{} must be a positive finite number, got {}", name, value);
    }
    Ok(())
}
