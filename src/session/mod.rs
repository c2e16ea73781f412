//! Session recording and replay module
//!
//! This module provides the two session kinds the experiment switches
//! between. Both are driven by the per-frame update with the current time
//! and tick on their own [`Cadence`].
//!
//! # Features
//!
//! - Record poses at a fixed cadence into an append-only record stream
//! - Stop recording automatically at the configured game length
//! - Replay a fully loaded stream after a countdown pre-roll
//! - End replay on record time or stream exhaustion, whichever comes first
//! - Skip and count malformed records without aborting

pub mod cadence;
pub mod player;
pub mod recorder;
pub mod types;

pub use cadence::Cadence;
pub use player::{ReplayOptions, ReplaySession};
pub use recorder::RecordingSession;
pub use types::{RecordingState, RecordingStats, ReplayPhase, ReplayStats, SessionMetadata};
