//! PoseSource trait for a unified tracking interface
//!
//! This module provides the capability the recorder samples from: the
//! current pose of every fixed entity and skeletal bone, plus the skeleton's
//! bone range and labels. Real headset runtimes and the synthetic source used
//! for headless runs both implement it.

use crate::types::{BoneRange, EntityId, Pose, Side};

/// Skeleton capability of a hand-tracking provider
///
/// Bone ranges are read once per session when the schema is built, so the
/// reported count may differ between runs but not within one.
pub trait SkeletonProvider {
    /// Current `[start, end)` bone index range for one hand
    fn bone_range(&self, side: Side) -> BoneRange;

    /// Human-readable label of one bone (e.g. `Hand_Thumb0`)
    fn bone_label(&self, side: Side, index: u32) -> String;

    /// Total number of bones across both hands
    fn total_bones(&self) -> usize {
        Side::BOTH.iter().map(|s| self.bone_range(*s).len()).sum()
    }
}

/// Unified interface for pose providers
///
/// # Example
///
/// ```ignore
/// fn head_height(source: &dyn PoseSource) -> f32 {
///     source.current_pose(&EntityId::Head).position.y
/// }
/// ```
pub trait PoseSource: SkeletonProvider {
    /// Current world-space pose of an entity
    ///
    /// A hand whose tracking is lost reports the camera-rig rest position,
    /// which replay treats as the tracking-loss sentinel.
    fn current_pose(&self, entity: &EntityId) -> Pose;
}

impl<T: SkeletonProvider + ?Sized> SkeletonProvider for &T {
    fn bone_range(&self, side: Side) -> BoneRange {
        (**self).bone_range(side)
    }

    fn bone_label(&self, side: Side, index: u32) -> String {
        (**self).bone_label(side, index)
    }
}

impl<T: PoseSource + ?Sized> PoseSource for &T {
    fn current_pose(&self, entity: &EntityId) -> Pose {
        (**self).current_pose(entity)
    }
}
