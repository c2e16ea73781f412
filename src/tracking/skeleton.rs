//! Hand skeleton bone table
//!
//! Bone ids follow the common headset hand layout: wrist and forearm stub,
//! then thumb/index/middle/ring/pinky joints from root to tip, then the five
//! fingertips.

use super::pose_source::SkeletonProvider;
use crate::types::{BoneRange, Side};

/// Labels indexed by bone id
pub const HAND_BONE_LABELS: [&str; 24] = [
    "Hand_WristRoot",
    "Hand_ForearmStub",
    "Hand_Thumb0",
    "Hand_Thumb1",
    "Hand_Thumb2",
    "Hand_Thumb3",
    "Hand_Index1",
    "Hand_Index2",
    "Hand_Index3",
    "Hand_Middle1",
    "Hand_Middle2",
    "Hand_Middle3",
    "Hand_Ring1",
    "Hand_Ring2",
    "Hand_Ring3",
    "Hand_Pinky0",
    "Hand_Pinky1",
    "Hand_Pinky2",
    "Hand_Pinky3",
    "Hand_ThumbTip",
    "Hand_IndexTip",
    "Hand_MiddleTip",
    "Hand_RingTip",
    "Hand_PinkyTip",
];

/// Number of bones in a fully tracked hand
pub const FULL_HAND_BONES: u32 = HAND_BONE_LABELS.len() as u32;

/// Label for a bone id; ids past the table get a numbered label
pub fn hand_bone_label(index: u32) -> String {
    HAND_BONE_LABELS
        .get(index as usize)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Hand_Bone{}", index))
}

/// Bone ranges currently reported for both hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandSkeleton {
    ranges: [BoneRange; 2],
}

impl Default for HandSkeleton {
    fn default() -> Self {
        Self::full()
    }
}

impl HandSkeleton {
    /// Both hands fully tracked
    pub fn full() -> Self {
        Self::uniform(BoneRange::new(0, FULL_HAND_BONES))
    }

    /// No hand skeleton available (controllers only)
    pub fn none() -> Self {
        Self::uniform(BoneRange::empty())
    }

    /// Same range on both hands
    pub fn uniform(range: BoneRange) -> Self {
        Self {
            ranges: [range, range],
        }
    }

    /// Set the range reported for one hand
    pub fn with_range(mut self, side: Side, range: BoneRange) -> Self {
        self.ranges[side.index()] = range;
        self
    }
}

impl SkeletonProvider for HandSkeleton {
    fn bone_range(&self, side: Side) -> BoneRange {
        self.ranges[side.index()]
    }

    fn bone_label(&self, _side: Side, index: u32) -> String {
        hand_bone_label(index)
    }
}
