//! Experiment state machine
//!
//! [`ExperimentApp`] owns everything one participant session needs: the
//! current mode, score and task-object pool, grab state, lobby props, camera
//! placement, and at most one recording or replay session. The host calls
//! [`ExperimentApp::update`] once per frame and forwards mode-select events.
//!
//! ```text
//!          select Game                 select Replay
//!   Lobby ─────────────▶ Game   Lobby ───────────────▶ Replay
//!     ▲                   │       ▲                       │
//!     └── elapsed ≥ len ──┘       └─── replay finished ───┘
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ExperimentConfig;
use crate::error::{PoseReplayError, Result};
use crate::hud::{Hud, PoseReadout};
use crate::record::{game_layout, output_path, FileSink, PrefixValues};
use crate::scene::{ReplayTargets, StaticScene};
use crate::session::{
    RecordingSession, ReplayOptions, ReplaySession, ReplayStats, RecordingStats, SessionMetadata,
};
use crate::tracking::PoseSource;
use crate::types::{Side, Vec3};

/// Top-level experiment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Waiting for a mode select
    #[default]
    Lobby,
    /// Sorting task running
    Game,
    /// Replaying a recorded stream
    Replay,
}

impl GameMode {
    /// Display name for the mode
    pub fn display_name(&self) -> &'static str {
        match self {
            GameMode::Lobby => "Lobby",
            GameMode::Game => "Game",
            GameMode::Replay => "Replay",
        }
    }
}

/// Mode-select event from a lobby button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelect {
    /// Start the sorting task
    Game,
    /// Start replaying the configured stream
    Replay,
}

/// Task object kind; the index is the recorded `shapeNum`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskShape {
    Cube,
    Sphere,
}

impl TaskShape {
    /// Shape for a pool index
    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            TaskShape::Cube
        } else {
            TaskShape::Sphere
        }
    }

    /// Pool index of this shape
    pub fn index(&self) -> usize {
        match self {
            TaskShape::Cube => 0,
            TaskShape::Sphere => 1,
        }
    }
}

/// Experiment session owner
pub struct ExperimentApp {
    config: ExperimentConfig,
    mode: GameMode,
    mode_start: Duration,
    score: i32,
    shape_num: usize,
    task_object: Option<TaskShape>,
    grabs: [bool; 2],
    lobby_props_visible: bool,
    controllers_visible: bool,
    camera_position: Vec3,
    scene: StaticScene,
    recording: Option<RecordingSession<FileSink>>,
    recording_path: Option<PathBuf>,
    last_recording: Option<(PathBuf, RecordingStats)>,
    replay: Option<ReplaySession>,
    targets: Option<ReplayTargets>,
    last_replay_stats: Option<ReplayStats>,
    hud: Hud,
}

impl ExperimentApp {
    /// Create an app in the lobby
    ///
    /// Out-of-range timing values are reported and then clamped where used.
    pub fn new(config: ExperimentConfig) -> Self {
        if let Err(e) = config.validate() {
            tracing::warn!("Experiment config out of range, clamping: {}", e);
        }
        let scene = StaticScene::from_layout(&config.scene);
        let camera_position = config.scene.camera_rest();
        Self {
            config,
            mode: GameMode::Lobby,
            mode_start: Duration::ZERO,
            score: 0,
            shape_num: 0,
            task_object: None,
            grabs: [false; 2],
            lobby_props_visible: true,
            controllers_visible: true,
            camera_position,
            scene,
            recording: None,
            recording_path: None,
            last_recording: None,
            replay: None,
            targets: None,
            last_replay_stats: None,
            hud: Hud::new(),
        }
    }

    // ==================== Accessors ====================

    /// Experiment options
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Current mode
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Current score
    pub fn score(&self) -> i32 {
        self.score
    }

    /// Index of the most recently spawned shape
    pub fn shape_num(&self) -> usize {
        self.shape_num
    }

    /// Live task object, if any
    pub fn task_object(&self) -> Option<TaskShape> {
        self.task_object
    }

    /// Whether the table props (mode buttons) are shown
    pub fn lobby_props_visible(&self) -> bool {
        self.lobby_props_visible
    }

    /// Whether controller models are shown instead of tracked hands
    pub fn controllers_visible(&self) -> bool {
        self.controllers_visible
    }

    /// Camera rig position
    pub fn camera_position(&self) -> Vec3 {
        self.camera_position
    }

    /// HUD text
    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// Active recording session
    pub fn recording(&self) -> Option<&RecordingSession<FileSink>> {
        self.recording.as_ref()
    }

    /// Path and final counters of the most recent recording
    pub fn last_recording(&self) -> Option<&(PathBuf, RecordingStats)> {
        self.last_recording.as_ref()
    }

    /// Active replay session
    pub fn replay(&self) -> Option<&ReplaySession> {
        self.replay.as_ref()
    }

    /// Replay targets of the current or most recent replay
    pub fn targets(&self) -> Option<&ReplayTargets> {
        self.targets.as_ref()
    }

    /// Final counters of the most recent replay
    pub fn last_replay_stats(&self) -> Option<ReplayStats> {
        self.last_replay_stats
    }

    /// Static scene gaze rays are cast against
    pub fn scene(&self) -> &StaticScene {
        &self.scene
    }

    // ==================== Game helpers ====================

    /// Add one point
    pub fn increase_score(&mut self) {
        self.score += 1;
    }

    /// Remove one point
    pub fn decrease_score(&mut self) {
        self.score -= 1;
    }

    /// Spawn the next task object, alternating cube and sphere
    pub fn spawn_shape(&mut self) -> TaskShape {
        self.shape_num = (self.shape_num + 1) % 2;
        let shape = TaskShape::from_index(self.shape_num);
        self.task_object = Some(shape);
        tracing::debug!("Spawned {:?} at {:?}", shape, self.config.scene.spawn_location);
        shape
    }

    /// The live object landed in `bin`: score it, destroy it, spawn the next
    pub fn deposit(&mut self, bin: TaskShape) {
        let Some(shape) = self.task_object.take() else {
            return;
        };
        if shape == bin {
            self.increase_score();
        } else {
            self.decrease_score();
        }
        self.spawn_shape();
    }

    /// Whether a hand is holding the task object
    pub fn check_grab(&self, side: Side) -> bool {
        self.grabs[side.index()]
    }

    /// Set the grab state of a hand
    pub fn set_grab(&mut self, side: Side, grabbed: bool) {
        self.grabs[side.index()] = grabbed;
    }

    // ==================== Transitions ====================

    /// Handle a lobby button; ignored outside the lobby
    ///
    /// Returns true when the mode changed.
    pub fn select_mode<P>(&mut self, select: ModeSelect, now: Duration, source: &P) -> bool
    where
        P: PoseSource + ?Sized,
    {
        if self.mode != GameMode::Lobby {
            tracing::debug!(
                "Ignoring {:?} select while in {}",
                select,
                self.mode.display_name()
            );
            return false;
        }

        match select {
            ModeSelect::Game => {
                self.start_game(now, source);
                true
            }
            ModeSelect::Replay => match self.start_replay(now, source) {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!("Failed to start replay: {}", e);
                    self.hud.set_notice(Some(format!("Replay unavailable: {}", e)));
                    self.start_lobby();
                    false
                }
            },
        }
    }

    /// Per-frame update
    pub fn update<P>(&mut self, now: Duration, source: &P)
    where
        P: PoseSource + ?Sized,
    {
        match self.mode {
            GameMode::Lobby => {}
            GameMode::Game => self.update_game(now, source),
            GameMode::Replay => self.update_replay(now),
        }
    }

    fn start_game<P>(&mut self, now: Duration, source: &P)
    where
        P: PoseSource + ?Sized,
    {
        self.mode = GameMode::Game;
        self.mode_start = now;
        self.lobby_props_visible = false;
        self.hud.set_notice(None);
        self.score = 0;
        self.shape_num = 0;
        self.spawn_shape();

        if self.config.is_logging {
            if let Err(e) = self.start_recording(now, source) {
                tracing::error!("Recording disabled for this game: {}", e);
                self.hud.set_notice(Some(format!("Logging unavailable: {}", e)));
            }
        }

        tracing::info!("Game started ({}s)", self.config.game_length);
        self.refresh_game_hud(now, source);
    }

    fn start_recording<P>(&mut self, now: Duration, source: &P) -> Result<()>
    where
        P: PoseSource + ?Sized,
    {
        let path = output_path(&self.config.record_dir(), self.config.output_base_name());
        let sink = FileSink::create(&path)?;
        let session = RecordingSession::start(
            game_layout(source),
            sink,
            self.config.reads_per_second,
            self.config.game_duration(),
            now,
        )?;
        self.recording = Some(session);
        self.recording_path = Some(path);
        Ok(())
    }

    fn update_game<P>(&mut self, now: Duration, source: &P)
    where
        P: PoseSource + ?Sized,
    {
        self.controllers_visible = source.total_bones() == 0;

        if let Some(recording) = self.recording.as_mut() {
            let prefix = PrefixValues {
                time: 0.0,
                score: Some(self.score),
                shape_index: Some(self.shape_num),
            };
            recording.update(now, source, prefix);
        }

        if now.saturating_sub(self.mode_start) >= self.config.game_duration() {
            self.end_game();
            return;
        }
        self.refresh_game_hud(now, source);
    }

    fn refresh_game_hud<P>(&mut self, now: Duration, source: &P)
    where
        P: PoseSource + ?Sized,
    {
        let elapsed = now.saturating_sub(self.mode_start).as_secs_f32();
        if self.config.is_detailed_mode {
            self.hud
                .show_detailed(&PoseReadout::capture(source), elapsed, self.score);
        } else {
            self.hud.show_game(elapsed, self.score);
        }
    }

    fn end_game(&mut self) {
        self.stop_recording();
        self.set_grab(Side::Left, false);
        self.set_grab(Side::Right, false);
        self.task_object = None;
        tracing::info!("Game ended with score {}", self.score);
        self.start_lobby();
    }

    fn stop_recording(&mut self) {
        let Some(mut session) = self.recording.take() else {
            return;
        };
        drop(session.stop());

        let Some(path) = self.recording_path.take() else {
            return;
        };
        if let Some(e) = session.last_error() {
            self.hud
                .set_notice(Some(format!("Logging stopped early: {}", e)));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = session.metadata(file_name);
        if let Err(e) = metadata.save_to_file(&SessionMetadata::path_for(&path)) {
            tracing::warn!("Failed to write session summary for {:?}: {}", path, e);
        }
        self.last_recording = Some((path, session.stats()));
    }

    fn start_replay<P>(&mut self, now: Duration, source: &P) -> Result<()>
    where
        P: PoseSource + ?Sized,
    {
        if self.config.replay_file_name.trim().is_empty() {
            return Err(PoseReplayError::Config(
                "no replay file configured".to_string(),
            ));
        }

        self.lobby_props_visible = false;
        self.camera_position = self.config.scene.replay_camera();
        self.controllers_visible = false;

        let schema = game_layout(source);
        let mut targets = ReplayTargets::new(&schema, &self.config.scene);
        targets.reset();

        let session = ReplaySession::start(
            self.config.replay_path(),
            schema,
            ReplayOptions::from_config(&self.config),
            now,
        )?;

        self.mode = GameMode::Replay;
        self.mode_start = now;
        self.hud.set_notice(None);
        self.hud.show_countdown(self.config.countdown_secs);
        self.replay = Some(session);
        self.targets = Some(targets);
        tracing::info!("Replay started from {:?}", self.config.replay_path());
        Ok(())
    }

    fn update_replay(&mut self, now: Duration) {
        let (Some(session), Some(targets)) = (self.replay.as_mut(), self.targets.as_mut()) else {
            self.end_replay();
            return;
        };
        session.update(now, targets, &self.scene);

        if session.is_finished() {
            self.end_replay();
            return;
        }

        match session.countdown_remaining() {
            Some(remaining) => self.hud.show_countdown(remaining),
            None => {
                let countdown = Duration::from_secs(u64::from(self.config.countdown_secs));
                let elapsed = now.saturating_sub(self.mode_start + countdown).as_secs_f32();
                let last = session.last_prefix();
                self.hud.show_replay(
                    elapsed,
                    last.map(|p| p.time),
                    last.and_then(|p| p.score),
                );
            }
        }
    }

    fn end_replay(&mut self) {
        if let Some(session) = self.replay.take() {
            self.last_replay_stats = Some(session.stats());
        }
        if let Some(targets) = self.targets.as_mut() {
            targets.disable_gaze();
        }
        tracing::info!("Replay ended");
        self.start_lobby();
    }

    fn start_lobby(&mut self) {
        self.mode = GameMode::Lobby;
        self.lobby_props_visible = true;
        self.controllers_visible = true;
        self.camera_position = self.config.scene.camera_rest();
        self.hud.show_lobby();
    }
}
