//! Live replay targets
//!
//! Decoded frames are applied here: plain transforms for the head and bones,
//! visibility toggling for tracked hands, gaze indicators reconstructed from
//! eye orientations, and the two pre-placed task-object slots.

use super::raycast::Raycaster;
use crate::config::SceneLayout;
use crate::record::{DecodedFrame, Schema};
use crate::types::{Quat, Role, Side, Vec3};

/// Number of pre-placed task-object slots (cube, sphere)
pub const SHAPE_SLOTS: usize = 2;

/// Transform and visibility of one replayed object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetTransform {
    /// World-space position
    pub position: Vec3,
    /// World-space rotation (as recorded, not normalized)
    pub rotation: Quat,
    /// Whether the object is shown
    pub visible: bool,
}

impl TargetTransform {
    fn hidden_at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::identity(),
            visible: false,
        }
    }
}

impl Default for TargetTransform {
    fn default() -> Self {
        Self::hidden_at(Vec3::zeros())
    }
}

/// Gaze indicator and line for one eye
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GazeIndicator {
    /// Indicator position (last hit point)
    pub position: Vec3,
    /// Line from the eye origin to the hit point
    pub line: Option<[Vec3; 2]>,
    /// Whether the indicator is shown
    pub enabled: bool,
}

/// Everything a replay session moves
#[derive(Debug, Clone)]
pub struct ReplayTargets {
    entries: Vec<TargetTransform>,
    shape_slots: [TargetTransform; SHAPE_SLOTS],
    active_slot: usize,
    gaze: [GazeIndicator; 2],
    eye_offset: f32,
    park: Vec3,
}

impl ReplayTargets {
    /// Targets for every entry of `schema`, placed per `layout`
    pub fn new(schema: &Schema, layout: &SceneLayout) -> Self {
        let park = layout.park();
        Self {
            entries: vec![TargetTransform::default(); schema.len()],
            shape_slots: [TargetTransform::hidden_at(park); SHAPE_SLOTS],
            active_slot: 0,
            gaze: [GazeIndicator::default(); 2],
            eye_offset: layout.eye_offset,
            park,
        }
    }

    /// Return every target to its initial state
    pub fn reset(&mut self) {
        self.entries.fill(TargetTransform::default());
        self.shape_slots = [TargetTransform::hidden_at(self.park); SHAPE_SLOTS];
        self.active_slot = 0;
        self.gaze = [GazeIndicator::default(); 2];
    }

    /// Transform of schema entry `index`
    pub fn entry(&self, index: usize) -> Option<&TargetTransform> {
        self.entries.get(index)
    }

    /// Transform of a task-object slot
    pub fn shape_slot(&self, slot: usize) -> Option<&TargetTransform> {
        self.shape_slots.get(slot)
    }

    /// Slot selected by the most recent frame
    pub fn active_slot(&self) -> usize {
        self.active_slot
    }

    /// Gaze indicator for one eye
    pub fn gaze(&self, side: Side) -> &GazeIndicator {
        &self.gaze[side.index()]
    }

    /// Hide both gaze indicators
    pub fn disable_gaze(&mut self) {
        for g in &mut self.gaze {
            g.enabled = false;
        }
    }

    /// Apply one decoded frame
    pub fn apply<R>(&mut self, schema: &Schema, frame: &DecodedFrame, raycaster: &R)
    where
        R: Raycaster + ?Sized,
    {
        let head = schema
            .gaze_origin()
            .and_then(|i| frame.samples.get(i))
            .map(|s| s.pose.position);

        for (i, (entry, sample)) in schema.entries().iter().zip(&frame.samples).enumerate() {
            let pose = sample.pose;
            match entry.role {
                Role::Position => self.set_entry(i, pose.position, pose.orientation),
                Role::TrackedHand(_) => {
                    if sample.present {
                        self.set_entry(i, pose.position, pose.orientation);
                    } else if let Some(target) = self.entries.get_mut(i) {
                        target.visible = false;
                    }
                }
                Role::GazeRay(side) => {
                    let (Some(head), Some(direction)) = (head, pose.facing()) else {
                        continue;
                    };
                    if let Some(hit) = raycaster.raycast(head, direction) {
                        let lateral = match side {
                            Side::Left => -self.eye_offset,
                            Side::Right => self.eye_offset,
                        };
                        let eye = head + Vec3::new(lateral, 0.0, 0.0);
                        let g = &mut self.gaze[side.index()];
                        g.position = hit;
                        g.line = Some([eye, hit]);
                        g.enabled = true;
                    }
                }
                Role::ActiveObjectSlot => {
                    let slot = match frame.prefix.shape_index {
                        Some(n) if n < SHAPE_SLOTS => n,
                        Some(n) => {
                            tracing::debug!("Shape index {} out of range, using slot 0", n);
                            0
                        }
                        None => 0,
                    };
                    for (k, target) in self.shape_slots.iter_mut().enumerate() {
                        if k == slot {
                            *target = TargetTransform {
                                position: pose.position,
                                rotation: pose.orientation,
                                visible: true,
                            };
                        } else {
                            target.position = self.park;
                        }
                    }
                    self.active_slot = slot;
                }
            }
        }
    }

    fn set_entry(&mut self, index: usize, position: Vec3, rotation: Quat) {
        if let Some(target) = self.entries.get_mut(index) {
            *target = TargetTransform {
                position,
                rotation,
                visible: true,
            };
        }
    }
}
