//! Synthetic pose source for headless runs and testing
//!
//! This module provides a pose source that can be used without a headset.
//! It generates head, hand, eye, bone, and task-object motion from
//! configurable wave patterns evaluated at the current session time.
//!
//! # Features
//!
//! - **Pattern-based motion**: Each position axis and the yaw angle follow a [`WavePattern`]
//! - **Configurable per-entity**: Each entity can have its own [`EntityMotion`]
//! - **Tracking loss**: A hand can be marked untracked and reports the sentinel position
//! - **Noise simulation**: Add configurable noise to generated positions
//!
//! # Example
//!
//! ```ignore
//! use pose_replay::tracking::synthetic::{SyntheticPoseSource, EntityMotion, WavePattern};
//!
//! let mut source = SyntheticPoseSource::new()
//!     .with_motion(EntityId::Head, EntityMotion::still(Vec3::new(0.0, 1.7, 0.0))
//!         .with_yaw(WavePattern::Sine { frequency: 0.2, amplitude: 0.5, offset: 0.0 }));
//!
//! source.set_time(Duration::from_secs_f32(1.5));
//! let head = source.current_pose(&EntityId::Head);
//! ```

use super::pose_source::{PoseSource, SkeletonProvider};
use super::skeleton::HandSkeleton;
use crate::types::{BoneRange, EntityId, Pose, Quat, Side, Vec3};
use rapier3d::na::{UnitQuaternion, Vector3};
use std::collections::HashMap;
use std::time::Duration;

/// Pattern for generating one scalar over time
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WavePattern {
    /// Constant value
    Constant(f32),
    /// Sine wave with frequency and amplitude
    Sine {
        frequency: f32,
        amplitude: f32,
        offset: f32,
    },
    /// Sawtooth wave
    Sawtooth { period: f32, amplitude: f32 },
    /// Square wave
    Square { period: f32, amplitude: f32 },
    /// Triangle wave
    Triangle { period: f32, amplitude: f32 },
}

impl Default for WavePattern {
    fn default() -> Self {
        WavePattern::Constant(0.0)
    }
}

impl WavePattern {
    /// Evaluate the pattern at `t` seconds
    pub fn value_at(&self, t: f32) -> f32 {
        match *self {
            WavePattern::Constant(v) => v,
            WavePattern::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin(),
            WavePattern::Sawtooth { period, amplitude } => {
                if period <= 0.0 {
                    return 0.0;
                }
                amplitude * ((t % period) / period)
            }
            WavePattern::Square { period, amplitude } => {
                if period <= 0.0 {
                    return amplitude;
                }
                if t % period < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
            WavePattern::Triangle { period, amplitude } => {
                if period <= 0.0 {
                    return -amplitude;
                }
                let t = t % period;
                let half = period / 2.0;
                if t < half {
                    amplitude * (2.0 * t / half - 1.0)
                } else {
                    amplitude * (1.0 - 2.0 * (t - half) / half)
                }
            }
        }
    }
}

/// Motion of one entity: a base position with per-axis offsets and a yaw angle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityMotion {
    /// Rest position
    pub base: Vec3,
    /// Offsets added to x, y, z
    pub offset: [WavePattern; 3],
    /// Rotation about +Y in radians
    pub yaw: WavePattern,
    /// Rotation about +X in radians (positive looks down)
    pub pitch: WavePattern,
}

impl EntityMotion {
    /// Motionless entity at a position, facing +Z
    pub fn still(base: Vec3) -> Self {
        Self {
            base,
            offset: [WavePattern::default(); 3],
            yaw: WavePattern::default(),
            pitch: WavePattern::default(),
        }
    }

    /// Set the offset pattern for one axis (0 = x, 1 = y, 2 = z)
    pub fn with_axis(mut self, axis: usize, pattern: WavePattern) -> Self {
        if let Some(slot) = self.offset.get_mut(axis) {
            *slot = pattern;
        }
        self
    }

    /// Set the yaw pattern
    pub fn with_yaw(mut self, pattern: WavePattern) -> Self {
        self.yaw = pattern;
        self
    }

    /// Set the pitch pattern
    pub fn with_pitch(mut self, pattern: WavePattern) -> Self {
        self.pitch = pattern;
        self
    }

    /// Pose at `t` seconds
    pub fn pose_at(&self, t: f32) -> Pose {
        let offset = Vec3::new(
            self.offset[0].value_at(t),
            self.offset[1].value_at(t),
            self.offset[2].value_at(t),
        );
        let yaw = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw.value_at(t));
        let pitch = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch.value_at(t));
        Pose::new(self.base + offset, (yaw * pitch).into_inner())
    }
}

/// Simple pseudo-random number generator (no external dependency)
fn rand_simple() -> f32 {
    use std::cell::Cell;
    thread_local! {
        static SEED: Cell<u64> = const { Cell::new(12345) };
    }
    SEED.with(|seed| {
        let mut s = seed.get();
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        seed.set(s);
        (s as f64 / u64::MAX as f64) as f32
    })
}

/// Distance between consecutive synthetic bones along the hand's forward axis
const BONE_SPACING: f32 = 0.01;

/// Pose source driven by wave patterns
///
/// Time does not advance on its own: the driver calls [`set_time`](Self::set_time)
/// each frame, so the generated motion is reproducible.
#[derive(Debug, Clone)]
pub struct SyntheticPoseSource {
    motions: HashMap<EntityId, EntityMotion>,
    skeleton: HandSkeleton,
    tracked: [bool; 2],
    sentinel: Vec3,
    noise_amplitude: f32,
    elapsed: f32,
}

impl Default for SyntheticPoseSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticPoseSource {
    /// Participant standing at the table, looking around and reaching
    pub fn new() -> Self {
        let head = EntityMotion::still(Vec3::new(0.0, 1.7, 0.0))
            .with_yaw(WavePattern::Sine {
                frequency: 0.1,
                amplitude: 0.6,
                offset: 0.0,
            })
            .with_pitch(WavePattern::Constant(0.3));
        let eye = head.with_pitch(WavePattern::Sine {
            frequency: 0.25,
            amplitude: 0.2,
            offset: 0.5,
        });
        let reach = WavePattern::Sine {
            frequency: 0.5,
            amplitude: 0.15,
            offset: 0.0,
        };

        let mut motions = HashMap::new();
        motions.insert(EntityId::Head, head);
        motions.insert(EntityId::Eye(Side::Left), eye);
        motions.insert(EntityId::Eye(Side::Right), eye);
        motions.insert(
            EntityId::Hand(Side::Left),
            EntityMotion::still(Vec3::new(-0.25, 1.2, 0.35)).with_axis(2, reach),
        );
        motions.insert(
            EntityId::Hand(Side::Right),
            EntityMotion::still(Vec3::new(0.25, 1.2, 0.35)).with_axis(1, reach),
        );
        motions.insert(
            EntityId::TaskObject,
            EntityMotion::still(Vec3::new(0.0, 2.0, 0.4)).with_yaw(WavePattern::Sawtooth {
                period: 4.0,
                amplitude: std::f32::consts::TAU,
            }),
        );

        Self {
            motions,
            skeleton: HandSkeleton::full(),
            tracked: [true, true],
            sentinel: Vec3::new(0.0, 2.0, 0.0),
            noise_amplitude: 0.0,
            elapsed: 0.0,
        }
    }

    /// Override the motion of one entity
    pub fn with_motion(mut self, entity: EntityId, motion: EntityMotion) -> Self {
        self.motions.insert(entity, motion);
        self
    }

    /// Set the reported hand skeleton
    pub fn with_skeleton(mut self, skeleton: HandSkeleton) -> Self {
        self.skeleton = skeleton;
        self
    }

    /// Set the position reported by untracked hands
    pub fn with_sentinel(mut self, sentinel: Vec3) -> Self {
        self.sentinel = sentinel;
        self
    }

    /// Add noise to generated positions
    pub fn with_noise(mut self, amplitude: f32) -> Self {
        self.noise_amplitude = amplitude;
        self
    }

    /// Set the time the patterns are evaluated at
    pub fn set_time(&mut self, now: Duration) {
        self.elapsed = now.as_secs_f32();
    }

    /// Mark a hand as tracked or lost
    pub fn set_hand_tracked(&mut self, side: Side, tracked: bool) {
        self.tracked[side.index()] = tracked;
    }

    /// Whether a hand is currently tracked
    pub fn is_hand_tracked(&self, side: Side) -> bool {
        self.tracked[side.index()]
    }

    fn noisy(&self, pose: Pose) -> Pose {
        if self.noise_amplitude <= 0.0 {
            return pose;
        }
        let jitter = Vec3::new(
            (rand_simple() - 0.5) * 2.0 * self.noise_amplitude,
            (rand_simple() - 0.5) * 2.0 * self.noise_amplitude,
            (rand_simple() - 0.5) * 2.0 * self.noise_amplitude,
        );
        Pose::new(pose.position + jitter, pose.orientation)
    }

    fn motion_pose(&self, entity: &EntityId) -> Pose {
        self.motions
            .get(entity)
            .map(|m| m.pose_at(self.elapsed))
            .unwrap_or_default()
    }

    fn bone_pose(&self, side: Side, index: u32) -> Pose {
        if !self.is_hand_tracked(side) {
            return Pose::at(self.sentinel);
        }
        let hand = self.motion_pose(&EntityId::Hand(side));
        let along = hand
            .facing()
            .unwrap_or_else(crate::types::forward)
            .scale(BONE_SPACING * (index + 1) as f32);
        Pose::new(hand.position + along, hand.orientation)
    }
}

impl SkeletonProvider for SyntheticPoseSource {
    fn bone_range(&self, side: Side) -> BoneRange {
        self.skeleton.bone_range(side)
    }

    fn bone_label(&self, side: Side, index: u32) -> String {
        self.skeleton.bone_label(side, index)
    }
}

impl PoseSource for SyntheticPoseSource {
    fn current_pose(&self, entity: &EntityId) -> Pose {
        match entity {
            EntityId::Hand(side) if !self.is_hand_tracked(*side) => {
                Pose::new(self.sentinel, Quat::identity())
            }
            EntityId::Bone { side, index } => self.noisy(self.bone_pose(*side, *index)),
            other => self.noisy(self.motion_pose(other)),
        }
    }
}
