//! Recorded keypoint streams for offline replay.
//!
//! CSV layout, one frame per row, no header, `#` starts a comment line:
//! ```text
//! timestamp_ns, x0, y0, z0, x1, y1, z1, ..., x20, y20, z20
//! ```

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, StringRecord};
use nalgebra::Vector3;

use crate::skeleton::{KEYPOINT_COUNT, KeypointFrame};

/// Columns per row: timestamp plus xyz per keypoint.
const COLUMNS: usize = 1 + 3 * KEYPOINT_COUNT;

/// Ordered sequence of keypoint frames.
#[derive(Debug, Clone, Default)]
pub struct KeypointRecording {
    pub frames: Vec<KeypointFrame>,
}

impl KeypointRecording {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let rdr = reader_builder()
            .from_path(path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        read_frames(rdr).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        read_frames(reader_builder().from_reader(reader))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, idx: usize) -> Option<&KeypointFrame> {
        self.frames.get(idx)
    }

    /// Latest frame at or before `timestamp_ns`.
    pub fn frame_at(&self, timestamp_ns: u64) -> Option<&KeypointFrame> {
        let idx = self
            .frames
            .partition_point(|f| f.timestamp_ns <= timestamp_ns);
        idx.checked_sub(1).map(|i| &self.frames[i])
    }
}

fn reader_builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

fn read_frames<R: Read>(mut rdr: csv::Reader<R>) -> Result<KeypointRecording> {
    let mut frames: Vec<KeypointFrame> = Vec::new();
    for (row, rec) in rdr.records().enumerate() {
        let rec = rec?;
        let frame = parse_frame(&rec).with_context(|| format!("Row {}", row + 1))?;
        if let Some(prev) = frames.last() {
            if frame.timestamp_ns < prev.timestamp_ns {
                bail!(
                    "Row {}: timestamp {} goes backwards (previous {})",
                    row + 1,
                    frame.timestamp_ns,
                    prev.timestamp_ns
                );
            }
        }
        frames.push(frame);
    }
    Ok(KeypointRecording { frames })
}

fn parse_frame(rec: &StringRecord) -> Result<KeypointFrame> {
    if rec.len() != COLUMNS {
        bail!("Expected {} columns, got {}", COLUMNS, rec.len());
    }
    let timestamp_ns: u64 = rec[0].parse()?;

    let mut points = [Vector3::zeros(); KEYPOINT_COUNT];
    for (i, point) in points.iter_mut().enumerate() {
        let base = 1 + 3 * i;
        *point = Vector3::new(
            rec[base].parse()?,
            rec[base + 1].parse()?,
            rec[base + 2].parse()?,
        );
    }

    Ok(KeypointFrame::new(timestamp_ns, points))
}
