//! Session data types

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PoseReplayError, Result};

/// State of a recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Not sampling
    #[default]
    Idle,
    /// Sampling on every due tick
    Active,
}

impl RecordingState {
    /// Check if sampling
    pub fn is_active(&self) -> bool {
        matches!(self, RecordingState::Active)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            RecordingState::Idle => "Idle",
            RecordingState::Active => "Recording",
        }
    }
}

/// Phase of a replay session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayPhase {
    /// Stream being read into memory
    #[default]
    Loading,
    /// Pre-roll; `remaining` whole seconds left
    Countdown { remaining: u32 },
    /// Applying one record per due tick
    Active,
    /// Ended by duration or stream exhaustion
    Finished,
}

impl ReplayPhase {
    /// Check if in the pre-roll countdown
    pub fn is_countdown(&self) -> bool {
        matches!(self, ReplayPhase::Countdown { .. })
    }

    /// Check if applying records
    pub fn is_active(&self) -> bool {
        matches!(self, ReplayPhase::Active)
    }

    /// Check if finished
    pub fn is_finished(&self) -> bool {
        matches!(self, ReplayPhase::Finished)
    }

    /// Display name for the phase
    pub fn display_name(&self) -> &'static str {
        match self {
            ReplayPhase::Loading => "Loading",
            ReplayPhase::Countdown { .. } => "Countdown",
            ReplayPhase::Active => "Replaying",
            ReplayPhase::Finished => "Finished",
        }
    }
}

/// Counters for one recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordingStats {
    /// Records appended (header excluded)
    pub frames_written: u64,
    /// Appends that failed
    pub write_failures: u64,
}

/// Counters for one replay session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplayStats {
    /// Records decoded and applied
    pub records_applied: u64,
    /// Records skipped for having too few fields
    pub schema_mismatches: u64,
    /// Records skipped for a field that failed to parse
    pub malformed_fields: u64,
}

impl ReplayStats {
    /// Records skipped for any decode error
    pub fn records_skipped(&self) -> u64 {
        self.schema_mismatches + self.malformed_fields
    }

    /// Count a skipped record by decode error kind; other errors are not counted
    pub fn record_error(&mut self, error: &PoseReplayError) {
        match error {
            PoseReplayError::SchemaMismatch { .. } => self.schema_mismatches += 1,
            PoseReplayError::MalformedField { .. } => self.malformed_fields += 1,
            PoseReplayError::WithContext { source, .. } => self.record_error(source),
            _ => {}
        }
    }
}

/// Summary written next to each recording as `<file>.meta.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Record stream file name
    pub file_name: String,
    /// When the session started
    pub recorded_at: chrono::DateTime<chrono::Utc>,
    /// Sampling cadence (samples per second)
    pub reads_per_second: f32,
    /// Configured session length in seconds
    pub duration_secs: f32,
    /// Header column names
    pub columns: Vec<String>,
    /// Final counters
    pub stats: RecordingStats,
}

impl SessionMetadata {
    /// Path of the summary for a given record stream
    pub fn path_for(stream: &Path) -> PathBuf {
        let mut name = stream.as_os_str().to_os_string();
        name.push(".meta.json");
        PathBuf::from(name)
    }

    /// Save metadata to a file (JSON format)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PoseReplayError::Serialization(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load metadata from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| PoseReplayError::Serialization(e.to_string()))
    }
}
