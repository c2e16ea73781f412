//! Replay scene
//!
//! Static geometry that gaze rays are cast against, and the live targets a
//! replay session moves.

pub mod raycast;
pub mod targets;

pub use raycast::{room_colliders, Raycaster, StaticCollider, StaticScene, StaticShape};
pub use targets::{GazeIndicator, ReplayTargets, TargetTransform, SHAPE_SLOTS};
