//! Hand skeleton topology: keypoint count and the fixed bone table.
//!
//! Keypoint layout (21 points):
//! ```text
//!   0        wrist
//!   1 -  4   thumb   (base -> tip)
//!   5 -  8   index
//!   9 - 12   middle
//!  13 - 16   ring
//!  17 - 20   pinky
//! ```

use std::ops::Range;

/// Number of keypoints produced per hand.
pub const KEYPOINT_COUNT: usize = 21;

/// Number of entries in `BONE_PAIRS`.
pub const BONE_COUNT: usize = 22;

/// Ordered pair of keypoint indices joined by one visualized segment.
pub type BonePair = (usize, usize);

/// Bone table in rendering order.
///
/// The thumb lists `(1, 2)` twice. The duplicate is kept so that bone indices
/// stay aligned with existing scene setups built from this table.
#[rustfmt::skip]
pub const BONE_PAIRS: [BonePair; BONE_COUNT] = [
    (0, 1), (1, 2), (1, 2), (2, 3), (3, 4),     // Thumb
    (5, 6), (6, 7), (7, 8),                     // Index finger
    (9, 10), (10, 11), (11, 12),                // Middle finger
    (13, 14), (14, 15), (15, 16),               // Ring finger
    (17, 18), (18, 19), (19, 20),               // Pinky
    (0, 17), (2, 5), (5, 9), (9, 13), (13, 17), // Palm
];

/// Contiguous groups of `BONE_PAIRS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
    Palm,
}

impl Finger {
    pub const ALL: [Finger; 6] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
        Finger::Palm,
    ];

    /// Range of `BONE_PAIRS` covered by this group.
    pub fn bone_range(self) -> Range<usize> {
        match self {
            Finger::Thumb => 0..5,
            Finger::Index => 5..8,
            Finger::Middle => 8..11,
            Finger::Ring => 11..14,
            Finger::Pinky => 14..17,
            Finger::Palm => 17..22,
        }
    }

    pub fn bones(self) -> &'static [BonePair] {
        &BONE_PAIRS[self.bone_range()]
    }

    /// Group that owns bone `index`, or `None` past the end of the table.
    pub fn of_bone(index: usize) -> Option<Finger> {
        Self::ALL
            .into_iter()
            .find(|f| f.bone_range().contains(&index))
    }
}
