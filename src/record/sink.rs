//! Record sinks
//!
//! A sink is an append-only line target owned by one recording session.
//! [`FileSink`] appends to a text file (created if missing, never
//! truncated); [`MemorySink`] keeps lines in memory.

use crate::error::{PoseReplayError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only line sink
#[cfg_attr(test, mockall::automock)]
pub trait RecordSink {
    /// Append one line; the sink adds the terminator
    fn append_line(&mut self, line: &str) -> Result<()>;

    /// Push buffered lines to the underlying target
    fn flush(&mut self) -> Result<()>;
}

/// Buffered file sink
pub struct FileSink {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    lines_written: u64,
}

impl FileSink {
    /// Open `path` for appending, creating it and its parent directory if needed
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |e: std::io::Error| PoseReplayError::SinkUnavailable {
            path: path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(unavailable)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(unavailable)?;

        tracing::info!("Record sink opened file: {:?}", path);
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            path,
            lines_written: 0,
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn unavailable(&self, message: impl Into<String>) -> PoseReplayError {
        PoseReplayError::SinkUnavailable {
            path: self.path.clone(),
            message: message.into(),
        }
    }
}

impl RecordSink for FileSink {
    fn append_line(&mut self, line: &str) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(self.unavailable("sink already closed"));
        };
        if let Err(e) = writeln!(writer, "{}", line) {
            return Err(self.unavailable(e.to_string()));
        }
        self.lines_written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        if let Err(e) = writer.flush() {
            return Err(self.unavailable(e.to_string()));
        }
        Ok(())
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::error!("Record sink failed to flush {:?}: {}", self.path, e);
            }
        }
        tracing::info!(
            "Record sink closed file after {} lines",
            self.lines_written
        );
    }
}

/// In-memory sink
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines appended so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Joined text as it would appear on disk
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

impl RecordSink for MemorySink {
    fn append_line(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
