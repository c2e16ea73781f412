//! Recording session: samples poses on a fixed cadence and appends records

use std::time::Duration;

use crate::error::{PoseReplayError, Result};
use crate::record::{encode, encode_header, PrefixValues, RecordSink, Schema};
use crate::tracking::PoseSource;

use super::cadence::Cadence;
use super::types::{RecordingState, RecordingStats, SessionMetadata};

/// One recording session
///
/// The session owns its schema and sink for its whole lifetime. The header is
/// written by [`start`](Self::start); every due tick appends one record whose
/// time field is the tick's scheduled instant minus the session start.
pub struct RecordingSession<S: RecordSink> {
    /// Current state
    state: RecordingState,
    /// Column layout, fixed for the session
    schema: Schema,
    /// Output target; `None` once released by `stop`
    sink: Option<S>,
    /// Sampling ticks
    cadence: Cadence,
    /// Session start on the driver clock
    start: Duration,
    /// Configured length
    duration: Duration,
    /// Wall-clock start for the metadata summary
    recorded_at: chrono::DateTime<chrono::Utc>,
    /// Counters
    stats: RecordingStats,
    /// Error that ended the session early
    last_error: Option<PoseReplayError>,
}

impl<S: RecordSink> std::fmt::Debug for RecordingSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("state", &self.state)
            .field("columns", &self.schema.record_width())
            .field("start", &self.start)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<S: RecordSink> RecordingSession<S> {
    /// Write the header and begin sampling at `cadence_hz`
    ///
    /// Fails with the sink's error when the header cannot be written; no
    /// session exists in that case.
    pub fn start(
        schema: Schema,
        mut sink: S,
        cadence_hz: f32,
        duration: Duration,
        now: Duration,
    ) -> Result<Self> {
        sink.append_line(&encode_header(&schema))?;

        let mut cadence = Cadence::from_hz(cadence_hz);
        cadence.arm(now);

        tracing::info!(
            "Recording started: {} entities, {} columns, {:.1} Hz for {:.1}s",
            schema.len(),
            schema.record_width(),
            cadence_hz,
            duration.as_secs_f32()
        );

        Ok(Self {
            state: RecordingState::Active,
            schema,
            sink: Some(sink),
            cadence,
            start: now,
            duration,
            recorded_at: chrono::Utc::now(),
            stats: RecordingStats::default(),
            last_error: None,
        })
    }

    /// Get current state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Check if sampling
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Column layout of this session
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Counters so far
    pub fn stats(&self) -> RecordingStats {
        self.stats
    }

    /// Error that ended the session early, if any
    pub fn last_error(&self) -> Option<&PoseReplayError> {
        self.last_error.as_ref()
    }

    /// Time since start on the driver clock
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.start)
    }

    /// Write one record for every tick due at `now`
    ///
    /// `prefix` supplies score and shape index; its time is replaced by each
    /// tick's elapsed time. Ticks at or past the configured length are not
    /// written and stop the session. Returns the number of records written.
    pub fn update<P>(&mut self, now: Duration, source: &P, prefix: PrefixValues) -> usize
    where
        P: PoseSource + ?Sized,
    {
        if !self.is_active() {
            return 0;
        }

        let mut written = 0;
        while let Some(tick) = self.cadence.poll(now) {
            let elapsed = tick.saturating_sub(self.start);
            if elapsed >= self.duration {
                break;
            }

            let record = encode(
                &self.schema,
                &PrefixValues {
                    time: elapsed.as_secs_f32(),
                    ..prefix
                },
                source,
            );

            let Some(sink) = self.sink.as_mut() else {
                break;
            };
            match sink.append_line(&record) {
                Ok(()) => {
                    self.stats.frames_written += 1;
                    written += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Recording write failed after {} frames: {}",
                        self.stats.frames_written,
                        e
                    );
                    self.stats.write_failures += 1;
                    self.last_error = Some(e);
                    self.halt();
                    return written;
                }
            }
        }

        if written > 0 {
            tracing::debug!(
                "Recorded {} frame(s), {} total",
                written,
                self.stats.frames_written
            );
        }

        if self.elapsed(now) >= self.duration {
            tracing::info!("Recording reached configured length");
            self.halt();
        }
        written
    }

    /// Cancel sampling, flush, and release the sink
    pub fn stop(&mut self) -> Option<S> {
        self.halt();
        self.sink.take()
    }

    /// Summary for the metadata file
    pub fn metadata(&self, file_name: impl Into<String>) -> SessionMetadata {
        SessionMetadata {
            file_name: file_name.into(),
            recorded_at: self.recorded_at,
            reads_per_second: (1.0 / self.cadence.period().as_secs_f64()) as f32,
            duration_secs: self.duration.as_secs_f32(),
            columns: self.schema.header_fields(),
            stats: self.stats,
        }
    }

    /// Cancel sampling and flush once; a flush failure counts as a write failure
    fn halt(&mut self) {
        self.cadence.cancel();
        if !self.state.is_active() {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.flush() {
                tracing::error!("Recording flush failed: {}", e);
                self.stats.write_failures += 1;
                // Keep the error that ended the session if there was one
                self.last_error.get_or_insert(e);
            }
        }
        tracing::info!(
            "Recording stopped: {} frames, {} write failures",
            self.stats.frames_written,
            self.stats.write_failures
        );
        self.state = RecordingState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sink::MockRecordSink;
    use crate::record::{game_layout, MemorySink};
    use crate::tracking::{HandSkeleton, SyntheticPoseSource};
    use std::path::PathBuf;

    fn schema() -> Schema {
        game_layout(&HandSkeleton::none())
    }

    #[test]
    fn test_recorder_lifecycle() {
        let source = SyntheticPoseSource::new().with_skeleton(HandSkeleton::none());
        let mut session = RecordingSession::start(
            schema(),
            MemorySink::new(),
            2.0,
            Duration::from_secs(30),
            Duration::from_secs(10),
        )
        .unwrap();
        assert!(session.is_active());

        // First tick is immediate
        assert_eq!(session.update(Duration::from_secs(10), &source, PrefixValues::default()), 1);
        assert_eq!(session.update(Duration::from_millis(10_400), &source, PrefixValues::default()), 0);
        assert_eq!(session.update(Duration::from_millis(11_000), &source, PrefixValues::default()), 2);

        let sink = session.stop().unwrap();
        assert_eq!(session.state(), RecordingState::Idle);
        assert_eq!(sink.lines().len(), 4);
        assert!(sink.lines()[0].starts_with("time,score,shapeNum"));
        assert!(sink.lines()[1].starts_with("0,0,0,"));
        assert!(sink.lines()[2].starts_with("0.5,"));
        assert!(sink.lines()[3].starts_with("1,"));
    }

    #[test]
    fn test_auto_stop_at_duration() {
        let source = SyntheticPoseSource::new();
        let mut session = RecordingSession::start(
            game_layout(&source),
            MemorySink::new(),
            2.0,
            Duration::from_secs(30),
            Duration::ZERO,
        )
        .unwrap();

        let written = session.update(Duration::from_secs(31), &source, PrefixValues::default());
        assert_eq!(written, 60);
        assert!(!session.is_active());
        assert_eq!(session.stats().frames_written, 60);

        let sink = session.stop().unwrap();
        let last = sink.lines().last().unwrap();
        assert!(last.starts_with("29.5,"));
    }

    #[test]
    fn test_prefix_carries_score_and_shape() {
        let source = SyntheticPoseSource::new();
        let mut session = RecordingSession::start(
            schema(),
            MemorySink::new(),
            1.0,
            Duration::from_secs(5),
            Duration::ZERO,
        )
        .unwrap();
        session.update(
            Duration::ZERO,
            &source,
            PrefixValues::at(99.0).with_score(3).with_shape(1),
        );
        let sink = session.stop().unwrap();
        assert!(sink.lines()[1].starts_with("0,3,1,"));
    }

    #[test]
    fn test_header_failure_is_sink_unavailable() {
        let mut sink = MockRecordSink::new();
        sink.expect_append_line().times(1).returning(|_| {
            Err(PoseReplayError::SinkUnavailable {
                path: PathBuf::from("data.txt"),
                message: "read-only".to_string(),
            })
        });

        let result = RecordingSession::start(
            schema(),
            sink,
            2.0,
            Duration::from_secs(30),
            Duration::ZERO,
        );
        assert!(matches!(
            result,
            Err(PoseReplayError::SinkUnavailable { .. })
        ));
    }

    #[test]
    fn test_mid_session_failure_stops_recording() {
        let mut sink = MockRecordSink::new();
        let mut calls = 0;
        sink.expect_append_line().returning(move |_| {
            calls += 1;
            if calls <= 3 {
                Ok(())
            } else {
                Err(PoseReplayError::SinkUnavailable {
                    path: PathBuf::from("data.txt"),
                    message: "disk full".to_string(),
                })
            }
        });
        sink.expect_flush().returning(|| Ok(()));

        let source = SyntheticPoseSource::new();
        let mut session = RecordingSession::start(
            schema(),
            sink,
            2.0,
            Duration::from_secs(30),
            Duration::ZERO,
        )
        .unwrap();

        let written = session.update(Duration::from_secs(5), &source, PrefixValues::default());
        assert_eq!(written, 2);
        assert!(!session.is_active());
        assert_eq!(session.stats().frames_written, 2);
        assert_eq!(session.stats().write_failures, 1);
        assert!(session.last_error().is_some());

        // No further writes once idle
        assert_eq!(session.update(Duration::from_secs(6), &source, PrefixValues::default()), 0);
    }

    #[test]
    fn test_flush_failure_is_recorded() {
        let mut sink = MockRecordSink::new();
        sink.expect_append_line().returning(|_| Ok(()));
        sink.expect_flush().times(1).returning(|| {
            Err(PoseReplayError::SinkUnavailable {
                path: PathBuf::from("data.txt"),
                message: "device removed".to_string(),
            })
        });

        let source = SyntheticPoseSource::new();
        let mut session = RecordingSession::start(
            schema(),
            sink,
            2.0,
            Duration::from_secs(30),
            Duration::ZERO,
        )
        .unwrap();

        assert_eq!(session.update(Duration::from_secs(2), &source, PrefixValues::default()), 5);
        assert_eq!(session.stats().write_failures, 0);

        session.stop();
        assert_eq!(session.state(), RecordingState::Idle);
        assert_eq!(session.stats().frames_written, 5);
        assert_eq!(session.stats().write_failures, 1);
        assert!(matches!(
            session.last_error(),
            Some(PoseReplayError::SinkUnavailable { .. })
        ));

        // A second stop does not flush again
        session.stop();
        assert_eq!(session.stats().write_failures, 1);
    }

    #[test]
    fn test_metadata_summary() {
        let session = RecordingSession::start(
            schema(),
            MemorySink::new(),
            2.0,
            Duration::from_secs(30),
            Duration::ZERO,
        )
        .unwrap();
        let meta = session.metadata("data_x.txt");
        assert_eq!(meta.columns.len(), schema().record_width());
        assert!((meta.reads_per_second - 2.0).abs() < 1e-4);
        assert_eq!(meta.duration_secs, 30.0);
    }
}
