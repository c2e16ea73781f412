//! Error handling for pose-replay
//!
//! This module defines the crate error type and a Result alias used by the
//! schema, codec, and session layers.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for recording and replay operations
#[derive(Error, Debug)]
pub enum PoseReplayError {
    /// The recording output target could not be opened or created
    #[error("Sink unavailable at {path:?}: {message}")]
    SinkUnavailable { path: PathBuf, message: String },

    /// The replay input could not be opened or read
    #[error("Source unavailable at {path:?}: {message}")]
    SourceUnavailable { path: PathBuf, message: String },

    /// A record carries fewer fields than the current schema requires
    #[error("Schema mismatch: expected at least {expected} fields, found {found}")]
    SchemaMismatch { expected: usize, found: usize },

    /// A field failed numeric parsing
    #[error("Malformed field at column {column}: {value:?}")]
    MalformedField { column: usize, value: String },

    /// Errors related to configuration loading/saving/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PoseReplayError>,
    },
}

impl PoseReplayError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PoseReplayError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True for the per-record errors that replay skips instead of aborting
    pub fn is_record_error(&self) -> bool {
        match self {
            PoseReplayError::SchemaMismatch { .. } | PoseReplayError::MalformedField { .. } => {
                true
            }
            PoseReplayError::WithContext { source, .. } => source.is_record_error(),
            _ => false,
        }
    }
}

/// Result type alias for pose-replay operations
pub type Result<T> = std::result::Result<T, PoseReplayError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
