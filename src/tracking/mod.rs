//! Tracking module
//!
//! This module defines where poses come from: the [`PoseSource`] capability,
//! the hand skeleton bone table, and a synthetic source that generates
//! motion without hardware.

pub mod pose_source;
pub mod skeleton;
pub mod synthetic;

pub use pose_source::{PoseSource, SkeletonProvider};
pub use skeleton::{hand_bone_label, HandSkeleton, FULL_HAND_BONES, HAND_BONE_LABELS};
pub use synthetic::{EntityMotion, SyntheticPoseSource, WavePattern};
