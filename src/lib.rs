//! # Pose-Replay: VR Pose Recording and Deterministic Replay
//!
//! An engine for spatial-interaction experiments. During a timed sorting task
//! it samples the participant's head, eye, hand, and hand-bone poses at a fixed
//! cadence and appends them to a delimited text stream. Later the stream is
//! replayed onto live targets, including gaze rays cast against the static
//! scene, after a short countdown.
//!
//! ## Architecture
//!
//! - **Tracking**: [`tracking::PoseSource`] supplies current poses and the hand
//!   skeleton; a synthetic source stands in for hardware
//! - **Record**: schema resolution, record encoding and decoding, sinks, and
//!   stream loading
//! - **Session**: cadence-driven recording and replay sessions
//! - **Scene**: static colliders (rapier3d) for gaze ray casts and the replay
//!   targets they move
//! - **App**: the lobby/game/replay state machine with score, task objects,
//!   and HUD text
//!
//! ## Configuration
//!
//! The experiment config (`experiment.toml`) and recorded streams live in the
//! platform-appropriate data directory under `dev.pose-replay`:
//!
//! - **Linux**: `~/.local/share/dev.pose-replay/`
//! - **macOS**: `~/Library/Application Support/dev.pose-replay/`
//! - **Windows**: `%APPDATA%\dev.pose-replay\`
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Instant;
//! use pose_replay::{
//!     app::{ExperimentApp, ModeSelect},
//!     config::ExperimentConfig,
//!     tracking::SyntheticPoseSource,
//! };
//!
//! let config = ExperimentConfig { is_logging: true, ..Default::default() };
//! let mut source = SyntheticPoseSource::new();
//! let mut app = ExperimentApp::new(config);
//!
//! let clock = Instant::now();
//! app.select_mode(ModeSelect::Game, clock.elapsed(), &source);
//! loop {
//!     let now = clock.elapsed();
//!     source.set_time(now);
//!     app.update(now, &source);
//! }
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod hud;
pub mod record;
pub mod scene;
pub mod session;
pub mod tracking;
pub mod types;

// Re-export commonly used types
pub use app::{ExperimentApp, GameMode, ModeSelect, TaskShape};
pub use config::{ExperimentConfig, SceneLayout};
pub use error::{PoseReplayError, Result, ResultExt};
pub use record::{FrameDecoder, RecordSink, RecordStream, Schema};
pub use session::{RecordingSession, ReplaySession};
pub use tracking::{PoseSource, SkeletonProvider, SyntheticPoseSource};
pub use types::{EntityId, Pose, Side};
