//! Core data types for pose-replay
//!
//! This module contains the fundamental data structures shared by the
//! tracking, record, scene, and session layers.
//!
//! # Main Types
//!
//! - [`Pose`] - Position + orientation of one tracked entity at one tick
//! - [`Side`] - Left/right selector for hands, eyes, and skeletons
//! - [`EntityId`] - A trackable thing (head, hand, eye, task object, or bone)
//! - [`Role`] - How a schema entry is applied during replay
//! - [`BoneRange`] - Provider-reported `[start, end)` bone index range
//!
//! # Geometry
//!
//! Vectors and quaternions are the `nalgebra` types re-exported by
//! `rapier3d`, so poses can be handed to scene queries without conversion.
//! Orientations are stored as raw [`Quat`] values: recorded data is not
//! validated as unit length on read.

use rapier3d::na::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// 3D vector used for positions and directions
pub type Vec3 = Vector3<f32>;

/// Quaternion used for orientations (w, x, y, z)
pub type Quat = Quaternion<f32>;

/// Canonical forward axis (+Z), rotated by an eye orientation to get a gaze direction
pub fn forward() -> Vec3 {
    Vec3::z()
}

/// Convert a config triple into a vector
pub fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::new(v[0], v[1], v[2])
}

/// Position and orientation of one entity at one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World-space position
    pub position: Vec3,
    /// World-space orientation
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    /// Create a pose from position and orientation
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at the origin with identity orientation
    pub fn identity() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
        }
    }

    /// Pose at a position with identity orientation
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::identity(),
        }
    }

    /// The seven wire scalars: position x/y/z, orientation w/x/y/z
    pub fn to_fields(&self) -> [f32; 7] {
        let p = &self.position;
        let q = &self.orientation;
        [p.x, p.y, p.z, q.w, q.i, q.j, q.k]
    }

    /// Rebuild a pose from the seven wire scalars
    pub fn from_fields(f: [f32; 7]) -> Self {
        Self {
            position: Vec3::new(f[0], f[1], f[2]),
            orientation: Quat::new(f[3], f[4], f[5], f[6]),
        }
    }

    /// Direction the pose faces, or `None` for a degenerate orientation
    pub fn facing(&self) -> Option<Vec3> {
        UnitQuaternion::try_new(self.orientation, 1.0e-6).map(|q| q * forward())
    }
}

/// Left/right selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Left hand/eye/skeleton
    Left,
    /// Right hand/eye/skeleton
    Right,
}

impl Side {
    /// Both sides in wire order (left first)
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Lowercase prefix used in bone column names
    pub fn prefix(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    /// Array index (left = 0, right = 1)
    pub fn index(&self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A named, trackable thing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityId {
    /// The task object currently in play
    TaskObject,
    /// Head (camera) pose
    Head,
    /// Hand root pose
    Hand(Side),
    /// Eye gaze pose
    Eye(Side),
    /// One skeletal bone, by skeleton-relative index
    Bone { side: Side, index: u32 },
}

impl EntityId {
    /// Fixed entity name used in column headers; bones are named by the schema builder
    pub fn fixed_name(&self) -> Option<&'static str> {
        match self {
            EntityId::TaskObject => Some("shape"),
            EntityId::Head => Some("head"),
            EntityId::Hand(Side::Left) => Some("leftHand"),
            EntityId::Hand(Side::Right) => Some("rightHand"),
            EntityId::Eye(Side::Left) => Some("leftEye"),
            EntityId::Eye(Side::Right) => Some("rightEye"),
            EntityId::Bone { .. } => None,
        }
    }

    /// Replay role of this entity
    pub fn role(&self) -> Role {
        match self {
            EntityId::TaskObject => Role::ActiveObjectSlot,
            EntityId::Hand(side) => Role::TrackedHand(*side),
            EntityId::Eye(side) => Role::GazeRay(*side),
            EntityId::Head | EntityId::Bone { .. } => Role::Position,
        }
    }
}

/// How a decoded schema entry is applied to live targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Plain transform
    Position,
    /// Plain transform, hidden when the position equals the tracking-loss sentinel
    TrackedHand(Side),
    /// Reconstructed as a gaze ray from the head position
    GazeRay(Side),
    /// Task object, remapped onto the two-slot replay pool
    ActiveObjectSlot,
}

/// Provider-reported bone index range, inclusive start and exclusive end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoneRange {
    /// First bone index
    pub start: u32,
    /// One past the last bone index
    pub end: u32,
}

impl BoneRange {
    /// Create a range `[start, end)`
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Empty range (no hand present)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of bones in the range
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    /// True when no bones are in range
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Iterate bone indices in order
    pub fn iter(&self) -> std::ops::Range<u32> {
        self.start..self.end.max(self.start)
    }
}
