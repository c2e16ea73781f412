//! Persisted record streams
//!
//! A stream is a header line followed by one record per line. Replay loads
//! the whole stream into memory before the first tick.

use super::decoder::split_fields;
use super::schema::Schema;
use crate::config::RECORD_FILE_EXTENSION;
use crate::error::{PoseReplayError, Result};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Timestamp format used in output file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Outcome of comparing a stream header with the live schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaCheck {
    /// Header names match the schema columns exactly
    Match,
    /// Header differs; the first differing column is reported
    Mismatch {
        column: usize,
        expected: Option<String>,
        found: Option<String>,
    },
    /// Stream has no lines at all
    Missing,
}

impl SchemaCheck {
    /// True for [`SchemaCheck::Match`]
    pub fn is_match(&self) -> bool {
        matches!(self, SchemaCheck::Match)
    }
}

/// A fully loaded stream
#[derive(Debug, Clone, Default)]
pub struct RecordStream {
    header: Option<String>,
    records: Vec<String>,
}

impl RecordStream {
    /// Load a stream from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| PoseReplayError::SourceUnavailable {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let stream = Self::from_text(&text);
        tracing::info!(
            "Loaded record stream {:?} ({} records)",
            path,
            stream.len()
        );
        Ok(stream)
    }

    /// Split text into header and records; `\r\n` endings are accepted
    pub fn from_text(text: &str) -> Self {
        let mut lines = text.lines().map(|l| l.trim_end_matches('\r').to_string());
        let header = lines.next();
        let mut records: Vec<String> = lines.collect();
        // A trailing blank line is not a record
        while records.last().is_some_and(|l| l.trim().is_empty()) {
            records.pop();
        }
        Self { header, records }
    }

    /// Header line, if the stream is not empty
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Records after the header
    pub fn records(&self) -> &[String] {
        &self.records
    }

    /// Record at `index` (0 = first record after the header)
    pub fn get(&self, index: usize) -> Option<&str> {
        self.records.get(index).map(String::as_str)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the stream has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Compare the header column names with the live schema
    pub fn check_schema(&self, schema: &Schema) -> SchemaCheck {
        let Some(header) = self.header() else {
            return SchemaCheck::Missing;
        };
        let found: Vec<&str> = split_fields(header).collect();
        let expected = schema.header_fields();

        let width = expected.len().max(found.len());
        for column in 0..width {
            let e = expected.get(column).map(String::as_str);
            let f = found.get(column).copied();
            if e != f {
                return SchemaCheck::Mismatch {
                    column,
                    expected: e.map(str::to_string),
                    found: f.map(str::to_string),
                };
            }
        }
        SchemaCheck::Match
    }
}

/// File name for a new recording: `<base>_<yyyy-MM-ddTHH-mm-ss>.txt`
pub fn output_file_name<Tz>(base: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}.{}",
        base,
        at.format(FILE_TIMESTAMP_FORMAT),
        RECORD_FILE_EXTENSION
    )
}

/// Path of a new recording stamped with the local time
pub fn output_path(dir: &Path, base: &str) -> PathBuf {
    dir.join(output_file_name(base, &chrono::Local::now()))
}
