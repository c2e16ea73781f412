//! Configuration module for pose-replay
//!
//! This module handles experiment configuration:
//! - Session options (logging, file names, cadence, game/replay length)
//! - Scene layout (camera rest position, replay viewpoint, table and bins)
//!
//! # Data Location
//!
//! Recordings and logs are stored in a data directory. Unless the config
//! names one explicitly, the platform-appropriate location is used:
//!
//! - **Linux**: `~/.local/share/dev.pose-replay/data/`
//! - **macOS**: `~/Library/Application Support/dev.pose-replay/data/`
//! - **Windows**: `%APPDATA%\dev.pose-replay\data\`
//!
//! # Example
//!
//! ```ignore
//! use pose_replay::config::ExperimentConfig;
//!
//! let mut config = ExperimentConfig::load_or_default("experiment.toml");
//! config.is_logging = true;
//! config.save("experiment.toml")?;
//! ```

use crate::error::{PoseReplayError, Result, ResultExt};
use crate::types::{vec3, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application identifier for data directories
pub const APP_ID: &str = "dev.pose-replay";

/// Config filename looked up in the app data directory
pub const CONFIG_FILE: &str = "experiment.toml";

/// Base name used when the configured output name is empty
pub const DEFAULT_OUTPUT_BASE: &str = "data";

/// Extension of recorded streams
pub const RECORD_FILE_EXTENSION: &str = "txt";

/// Default sampling/playback cadence in samples per second
pub const DEFAULT_READS_PER_SECOND: f32 = 2.0;

/// Default game and replay length in seconds
pub const DEFAULT_SESSION_LENGTH_SECS: f32 = 30.0;

/// Default replay pre-roll countdown in whole seconds
pub const DEFAULT_COUNTDOWN_SECS: u32 = 3;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Default directory for recorded streams
pub fn default_record_dir() -> PathBuf {
    app_data_dir()
        .map(|p| p.join("data"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// Get the path to the config file in the app data directory
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

// ==================== Experiment Config ====================

/// Options for one experiment run, passed in at session creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Record a stream during game mode
    #[serde(default)]
    pub is_logging: bool,

    /// Show the detailed pose readout instead of the timer/score HUD
    #[serde(default)]
    pub is_detailed_mode: bool,

    /// Base name of recorded streams (`<base>_<timestamp>.txt`)
    #[serde(default)]
    pub logging_file_name: String,

    /// File name of the stream to replay, relative to the data directory
    #[serde(default)]
    pub replay_file_name: String,

    /// Directory holding recorded streams (None = platform default)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Sampling and playback cadence in samples per second
    #[serde(default = "default_reads_per_second")]
    pub reads_per_second: f32,

    /// Game length in seconds
    #[serde(default = "default_session_length")]
    pub game_length: f32,

    /// Replay length in seconds, checked against each record's elapsed time
    #[serde(default = "default_session_length")]
    pub replay_length: f32,

    /// Replay pre-roll countdown in whole seconds
    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,

    /// Refuse to replay a stream whose header differs from the live schema
    #[serde(default)]
    pub strict_schema_check: bool,

    /// Static scene layout
    #[serde(default)]
    pub scene: SceneLayout,
}

fn default_reads_per_second() -> f32 {
    DEFAULT_READS_PER_SECOND
}

fn default_session_length() -> f32 {
    DEFAULT_SESSION_LENGTH_SECS
}

fn default_countdown_secs() -> u32 {
    DEFAULT_COUNTDOWN_SECS
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            is_logging: false,
            is_detailed_mode: false,
            logging_file_name: String::new(),
            replay_file_name: String::new(),
            data_dir: None,
            reads_per_second: DEFAULT_READS_PER_SECOND,
            game_length: DEFAULT_SESSION_LENGTH_SECS,
            replay_length: DEFAULT_SESSION_LENGTH_SECS,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            strict_schema_check: false,
            scene: SceneLayout::default(),
        }
    }
}

impl ExperimentConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file from disk (TOML)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PoseReplayError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            PoseReplayError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config
            .validate()
            .context(format!("Invalid config file {:?}", path))?;
        Ok(config)
    }

    /// Load a config file, returning defaults on any error
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load experiment config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save the config to disk as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PoseReplayError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PoseReplayError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            PoseReplayError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.reads_per_second.is_finite() && self.reads_per_second > 0.0) {
            return Err(PoseReplayError::Config(format!(
                "reads_per_second must be positive, got {}",
                self.reads_per_second
            )));
        }
        if Duration::try_from_secs_f32(1.0 / self.reads_per_second).is_err() {
            return Err(PoseReplayError::Config(format!(
                "reads_per_second {} gives a tick period too long to represent",
                self.reads_per_second
            )));
        }
        if !(self.game_length.is_finite() && self.game_length >= 0.0) {
            return Err(PoseReplayError::Config(format!(
                "game_length must be non-negative, got {}",
                self.game_length
            )));
        }
        if !(self.replay_length.is_finite() && self.replay_length >= 0.0) {
            return Err(PoseReplayError::Config(format!(
                "replay_length must be non-negative, got {}",
                self.replay_length
            )));
        }
        Ok(())
    }

    /// Directory holding recorded streams
    pub fn record_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_record_dir)
    }

    /// Base name for new recordings
    pub fn output_base_name(&self) -> &str {
        let name = self.logging_file_name.trim();
        if name.is_empty() {
            DEFAULT_OUTPUT_BASE
        } else {
            name
        }
    }

    /// Full path of the configured replay source
    pub fn replay_path(&self) -> PathBuf {
        self.record_dir().join(&self.replay_file_name)
    }

    /// Game length as a duration
    pub fn game_duration(&self) -> Duration {
        duration_from_secs(self.game_length)
    }

    /// Replay length as a duration
    pub fn replay_duration(&self) -> Duration {
        duration_from_secs(self.replay_length)
    }
}

/// Seconds as a duration; negative or NaN is zero, overflow saturates
pub fn duration_from_secs(secs: f32) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}

// ==================== Scene Layout ====================

/// Placement of the camera rig, props, and static geometry
///
/// Distances are meters. Triples are stored as arrays so the TOML stays flat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneLayout {
    /// Height of the cube and sphere bins
    #[serde(default = "default_box_height")]
    pub box_height: f32,

    /// Thickness of the table top
    #[serde(default = "default_table_height")]
    pub table_height: f32,

    /// Cube bin location; the sphere bin mirrors it across x = 0
    #[serde(default = "default_box_location")]
    pub box_location: [f32; 3],

    /// Table location
    #[serde(default = "default_table_location")]
    pub table_location: [f32; 3],

    /// Where new task objects appear
    #[serde(default = "default_spawn_location")]
    pub spawn_location: [f32; 3],

    /// Camera rig rest position; also the hand tracking-loss sentinel
    #[serde(default = "default_camera_location")]
    pub camera_location: [f32; 3],

    /// Camera rig position while replaying
    #[serde(default = "default_replay_camera_location")]
    pub replay_camera_location: [f32; 3],

    /// Where the inactive replay shape slot is parked
    #[serde(default = "default_park_location")]
    pub park_location: [f32; 3],

    /// Lateral offset of each eye from the head position
    #[serde(default = "default_eye_offset")]
    pub eye_offset: f32,

    /// Half-size of the room box (x, y, z) whose walls bound gaze rays
    #[serde(default = "default_room_half_extents")]
    pub room_half_extents: [f32; 3],

    /// Longest gaze ray cast during replay
    #[serde(default = "default_gaze_max_distance")]
    pub gaze_max_distance: f32,
}

fn default_box_height() -> f32 {
    1.0
}

fn default_table_height() -> f32 {
    0.1
}

fn default_box_location() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn default_table_location() -> [f32; 3] {
    [0.0, 1.0, 0.75]
}

fn default_spawn_location() -> [f32; 3] {
    [0.0, 2.0, 0.4]
}

fn default_camera_location() -> [f32; 3] {
    [0.0, 2.0, 0.0]
}

fn default_replay_camera_location() -> [f32; 3] {
    [0.0, 2.0, -2.0]
}

fn default_park_location() -> [f32; 3] {
    [0.0, -10.0, 0.0]
}

fn default_eye_offset() -> f32 {
    0.1
}

fn default_room_half_extents() -> [f32; 3] {
    [5.0, 4.0, 5.0]
}

fn default_gaze_max_distance() -> f32 {
    100.0
}

impl Default for SceneLayout {
    fn default() -> Self {
        Self {
            box_height: default_box_height(),
            table_height: default_table_height(),
            box_location: default_box_location(),
            table_location: default_table_location(),
            spawn_location: default_spawn_location(),
            camera_location: default_camera_location(),
            replay_camera_location: default_replay_camera_location(),
            park_location: default_park_location(),
            eye_offset: default_eye_offset(),
            room_half_extents: default_room_half_extents(),
            gaze_max_distance: default_gaze_max_distance(),
        }
    }
}

impl SceneLayout {
    /// Hand position that marks tracking as lost
    pub fn sentinel(&self) -> Vec3 {
        vec3(self.camera_location)
    }

    /// Camera rig rest position
    pub fn camera_rest(&self) -> Vec3 {
        vec3(self.camera_location)
    }

    /// Camera rig position during replay
    pub fn replay_camera(&self) -> Vec3 {
        vec3(self.replay_camera_location)
    }

    /// Park position for the inactive shape slot
    pub fn park(&self) -> Vec3 {
        vec3(self.park_location)
    }

    /// Task object spawn point
    pub fn spawn(&self) -> Vec3 {
        vec3(self.spawn_location)
    }

    /// Cube bin location
    pub fn cube_bin(&self) -> Vec3 {
        vec3(self.box_location)
    }

    /// Sphere bin location (mirrored cube bin)
    pub fn sphere_bin(&self) -> Vec3 {
        let b = self.box_location;
        Vec3::new(-b[0], b[1], b[2])
    }

    /// Table location
    pub fn table(&self) -> Vec3 {
        vec3(self.table_location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_experiment() {
        let config = ExperimentConfig::default();
        assert!(!config.is_logging);
        assert_eq!(config.reads_per_second, 2.0);
        assert_eq!(config.game_length, 30.0);
        assert_eq!(config.replay_length, 30.0);
        assert_eq!(config.countdown_secs, 3);
        assert_eq!(config.scene.sentinel(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(config.scene.sphere_bin(), Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_output_base_name_fallback() {
        let mut config = ExperimentConfig::default();
        assert_eq!(config.output_base_name(), "data");
        config.logging_file_name = "participant7".to_string();
        assert_eq!(config.output_base_name(), "participant7");
    }

    #[test]
    fn test_validate_rejects_zero_cadence() {
        let config = ExperimentConfig {
            reads_per_second: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PoseReplayError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_unrepresentable_period() {
        let config = ExperimentConfig {
            reads_per_second: 1e-30,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PoseReplayError::Config(_))));

        let config = ExperimentConfig {
            game_length: -5.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_rejects_out_of_range_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.toml");
        std::fs::write(&path, "reads_per_second = 1e-30\n").unwrap();

        let err = ExperimentConfig::load(&path).unwrap_err();
        assert!(matches!(err, PoseReplayError::WithContext { .. }));
        assert!(err.to_string().starts_with("Invalid config file"));

        let config = ExperimentConfig::load_or_default(&path);
        assert_eq!(config.reads_per_second, 2.0);
    }

    #[test]
    fn test_durations_never_panic() {
        let config = ExperimentConfig {
            game_length: -5.0,
            replay_length: f32::NAN,
            ..Default::default()
        };
        assert_eq!(config.game_duration(), Duration::ZERO);
        assert_eq!(config.replay_duration(), Duration::ZERO);
        assert_eq!(duration_from_secs(f32::INFINITY), Duration::MAX);
        assert_eq!(duration_from_secs(1e30), Duration::MAX);
        assert_eq!(duration_from_secs(0.5), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ExperimentConfig =
            toml::from_str("is_logging = true\nreads_per_second = 10.0\n").unwrap();
        assert!(config.is_logging);
        assert_eq!(config.reads_per_second, 10.0);
        assert_eq!(config.game_length, 30.0);
        assert_eq!(config.scene.park_location, [0.0, -10.0, 0.0]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = ExperimentConfig {
            is_logging: true,
            logging_file_name: "p01".to_string(),
            replay_file_name: "p01_2024-05-01T10-00-00.txt".to_string(),
            reads_per_second: 4.0,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = ExperimentConfig::load(&path).unwrap();
        assert!(loaded.is_logging);
        assert_eq!(loaded.logging_file_name, "p01");
        assert_eq!(loaded.reads_per_second, 4.0);
        assert_eq!(loaded.replay_file_name, config.replay_file_name);
    }

    #[test]
    fn test_load_or_default_on_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "reads_per_second = \"fast\"").unwrap();
        let config = ExperimentConfig::load_or_default(&path);
        assert_eq!(config.reads_per_second, DEFAULT_READS_PER_SECOND);
    }
}
