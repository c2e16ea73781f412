//! Test data builders for configs and record streams

use std::path::{Path, PathBuf};

use pose_replay::config::ExperimentConfig;
use pose_replay::record::{encode_header, Schema};

/// Builder for experiment configs rooted in a temporary directory
pub struct ConfigBuilder {
    config: ExperimentConfig,
}

impl ConfigBuilder {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            config: ExperimentConfig {
                data_dir: Some(data_dir.to_path_buf()),
                ..Default::default()
            },
        }
    }

    pub fn logging(mut self, enabled: bool) -> Self {
        self.config.is_logging = enabled;
        self
    }

    pub fn detailed(mut self, enabled: bool) -> Self {
        self.config.is_detailed_mode = enabled;
        self
    }

    pub fn reads_per_second(mut self, hz: f32) -> Self {
        self.config.reads_per_second = hz;
        self
    }

    pub fn game_length(mut self, secs: f32) -> Self {
        self.config.game_length = secs;
        self
    }

    pub fn replay_length(mut self, secs: f32) -> Self {
        self.config.replay_length = secs;
        self
    }

    pub fn countdown(mut self, secs: u32) -> Self {
        self.config.countdown_secs = secs;
        self
    }

    pub fn replay_file(mut self, name: &str) -> Self {
        self.config.replay_file_name = name.to_string();
        self
    }

    pub fn build(self) -> ExperimentConfig {
        self.config
    }
}

/// Builder for hand-written record streams
pub struct StreamBuilder {
    lines: Vec<String>,
}

impl StreamBuilder {
    /// Start a stream with the header of `schema`
    pub fn with_header(schema: &Schema) -> Self {
        Self {
            lines: vec![encode_header(schema)],
        }
    }

    /// Start a stream without a header line
    pub fn headerless() -> Self {
        Self { lines: Vec::new() }
    }

    /// Append a record of `schema` with every pose at `position` and identity rotation
    pub fn record(mut self, schema: &Schema, time: f32, score: i32, shape: usize, position: [f32; 3]) -> Self {
        let mut fields = vec![time.to_string(), score.to_string(), shape.to_string()];
        for _ in 0..schema.len() {
            fields.extend(position.iter().map(|v| v.to_string()));
            fields.extend(["1", "0", "0", "0"].map(String::from));
        }
        self.lines.push(fields.join(","));
        self
    }

    /// Append a raw line
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    pub fn to_text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    /// Write the stream into `dir` and return its path
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_text()).expect("Failed to write stream fixture");
        path
    }
}
