//! Replay session: plays a recorded stream back onto live targets

use std::path::Path;
use std::time::Duration;

use crate::config::{duration_from_secs, ExperimentConfig};
use crate::error::{PoseReplayError, Result, ResultExt};
use crate::record::decoder::split_fields;
use crate::record::{FrameDecoder, PrefixValues, RecordStream, Schema, SchemaCheck};
use crate::scene::{Raycaster, ReplayTargets};
use crate::types::Vec3;

use super::cadence::Cadence;
use super::types::{ReplayPhase, ReplayStats};

/// Options fixed at replay start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOptions {
    /// Records applied per second
    pub cadence_hz: f32,
    /// Playback ends once this many seconds pass after the countdown, or at
    /// the first record whose time exceeds it
    pub replay_length: f32,
    /// Whole seconds of pre-roll before the first record
    pub countdown_secs: u32,
    /// Hand position that marks tracking as lost
    pub sentinel: Vec3,
    /// Refuse a stream whose header differs from the schema
    pub strict_schema_check: bool,
}

impl ReplayOptions {
    /// Options from an experiment config
    pub fn from_config(config: &ExperimentConfig) -> Self {
        Self {
            cadence_hz: config.reads_per_second,
            replay_length: config.replay_length,
            countdown_secs: config.countdown_secs,
            sentinel: config.scene.sentinel(),
            strict_schema_check: config.strict_schema_check,
        }
    }
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self::from_config(&ExperimentConfig::default())
    }
}

/// One replay session
///
/// The whole stream is loaded before the countdown starts. Playback is
/// forward-only: once finished the session cannot be restarted.
#[derive(Debug)]
pub struct ReplaySession {
    /// Current phase
    phase: ReplayPhase,
    /// Live column layout
    schema: Schema,
    /// Loaded stream
    stream: RecordStream,
    /// Record decoder with the tracking-loss sentinel
    decoder: FrameDecoder,
    /// Index of the next record to play
    cursor: usize,
    /// Playback ticks, armed when the countdown ends
    cadence: Cadence,
    /// When the countdown started
    countdown_start: Duration,
    /// Countdown length in whole seconds
    countdown_secs: u32,
    /// Record time bound in seconds
    replay_length: f32,
    /// Driver time at which playback ends regardless of record times
    play_end: Option<Duration>,
    /// Counters
    stats: ReplayStats,
    /// Prefix of the last applied record
    last_prefix: Option<PrefixValues>,
    /// Header comparison done at load
    schema_check: SchemaCheck,
}

impl ReplaySession {
    /// Load `path` and enter the countdown
    pub fn start(
        path: impl AsRef<Path>,
        schema: Schema,
        options: ReplayOptions,
        now: Duration,
    ) -> Result<Self> {
        let stream = RecordStream::load(path)?;
        Self::from_stream(stream, schema, options, now)
    }

    /// Enter the countdown with an already loaded stream
    pub fn from_stream(
        stream: RecordStream,
        schema: Schema,
        options: ReplayOptions,
        now: Duration,
    ) -> Result<Self> {
        let schema_check = stream.check_schema(&schema);
        match &schema_check {
            SchemaCheck::Match => tracing::debug!("Replay header matches live schema"),
            SchemaCheck::Mismatch {
                column,
                expected,
                found,
            } => tracing::warn!(
                "Replay header differs from live schema at column {}: expected {:?}, found {:?}",
                column,
                expected,
                found
            ),
            SchemaCheck::Missing => tracing::warn!("Replay stream has no header"),
        }

        if options.strict_schema_check && !schema_check.is_match() {
            let found = stream.header().map(|h| split_fields(h).count()).unwrap_or(0);
            return Err(PoseReplayError::SchemaMismatch {
                expected: schema.record_width(),
                found,
            });
        }

        let mut session = Self {
            phase: ReplayPhase::Countdown {
                remaining: options.countdown_secs,
            },
            schema,
            stream,
            decoder: FrameDecoder::new(options.sentinel),
            cursor: 0,
            cadence: Cadence::from_hz(options.cadence_hz),
            countdown_start: now,
            countdown_secs: options.countdown_secs,
            replay_length: options.replay_length,
            play_end: None,
            stats: ReplayStats::default(),
            last_prefix: None,
            schema_check,
        };

        tracing::info!(
            "Replay loaded: {} records, countdown {}s",
            session.stream.len(),
            session.countdown_secs
        );

        if session.countdown_secs == 0 {
            session.begin(now);
        }
        Ok(session)
    }

    /// Get current phase
    pub fn phase(&self) -> ReplayPhase {
        self.phase
    }

    /// Check if finished
    pub fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }

    /// Whole seconds left in the countdown, if counting down
    pub fn countdown_remaining(&self) -> Option<u32> {
        match self.phase {
            ReplayPhase::Countdown { remaining } => Some(remaining),
            _ => None,
        }
    }

    /// Live column layout
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Header comparison done at load
    pub fn schema_check(&self) -> &SchemaCheck {
        &self.schema_check
    }

    /// Counters so far
    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Index of the next record
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of records in the stream
    pub fn record_count(&self) -> usize {
        self.stream.len()
    }

    /// Prefix of the last applied record (replay time, score)
    pub fn last_prefix(&self) -> Option<&PrefixValues> {
        self.last_prefix.as_ref()
    }

    /// Advance the countdown or play every due record
    ///
    /// Returns the number of records applied.
    pub fn update<R>(&mut self, now: Duration, targets: &mut ReplayTargets, raycaster: &R) -> usize
    where
        R: Raycaster + ?Sized,
    {
        if let ReplayPhase::Countdown { .. } = self.phase {
            let end = self.countdown_start + Duration::from_secs(u64::from(self.countdown_secs));
            if now < end {
                let elapsed = now.saturating_sub(self.countdown_start).as_secs() as u32;
                self.phase = ReplayPhase::Countdown {
                    remaining: self.countdown_secs.saturating_sub(elapsed),
                };
                return 0;
            }
            self.begin(end);
        }

        if !self.phase.is_active() {
            return 0;
        }

        let play_end = self.play_end.unwrap_or(Duration::MAX);
        let mut applied = 0;
        while let Some(tick) = self.cadence.poll(now) {
            if tick > play_end {
                tracing::info!("Replay reached configured length after {:?}", tick);
                self.finish();
                break;
            }
            let Some(record) = self.stream.get(self.cursor) else {
                tracing::info!("Replay reached end of stream");
                self.finish();
                break;
            };

            let decoded = self
                .decoder
                .decode(&self.schema, record)
                .with_context(|| format!("record {}", self.cursor + 1));
            match decoded {
                Ok(frame) => {
                    if frame.prefix.time > self.replay_length {
                        tracing::info!(
                            "Replay reached configured length at record {}",
                            self.cursor + 1
                        );
                        self.finish();
                        break;
                    }
                    targets.apply(&self.schema, &frame, raycaster);
                    self.last_prefix = Some(frame.prefix);
                    self.stats.records_applied += 1;
                    applied += 1;
                }
                Err(e) if e.is_record_error() => {
                    tracing::warn!("Skipping replay {}", e);
                    self.stats.record_error(&e);
                }
                Err(e) => {
                    tracing::error!("Replay stopped: {}", e);
                    self.finish();
                    break;
                }
            }
            self.cursor += 1;
        }

        if self.phase.is_active() && now > play_end {
            tracing::info!("Replay reached configured length");
            self.finish();
        }

        if applied > 0 {
            tracing::debug!(
                "Replayed {} record(s), cursor {}/{}",
                applied,
                self.cursor,
                self.stream.len()
            );
        }
        applied
    }

    /// End playback early
    pub fn stop(&mut self) {
        if !self.is_finished() {
            self.finish();
        }
    }

    fn begin(&mut self, at: Duration) {
        self.cadence.arm(at);
        self.play_end = Some(at.saturating_add(duration_from_secs(self.replay_length)));
        self.phase = ReplayPhase::Active;
        tracing::info!("Replay started");
    }

    fn finish(&mut self) {
        self.cadence.cancel();
        self.phase = ReplayPhase::Finished;
        tracing::info!(
            "Replay finished: {} applied, {} skipped",
            self.stats.records_applied,
            self.stats.records_skipped()
        );
    }
}
