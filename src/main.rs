//! Pose-Replay - Main Entry Point
//!
//! Runs one scripted experiment cycle headless against the synthetic pose
//! source: a logged game, then a replay of the stream it produced.

use std::time::{Duration, Instant};

use anyhow::Context;
use pose_replay::{
    app::{ExperimentApp, GameMode, ModeSelect},
    config::{self, ExperimentConfig},
    tracking::SyntheticPoseSource,
    types::Side,
};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Frame interval of the driver loop
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> anyhow::Result<()> {
    // Log to stderr and to a file next to the recordings
    let log_dir = config::app_data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create data directory {:?}", log_dir))?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("pose-replay.log")
        .build(&log_dir)
        .context("Failed to open log file")?;
    let (file_writer, _log_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pose_replay=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer),
        )
        .init();

    tracing::info!("Starting Pose-Replay");

    let mut experiment = match config::config_path() {
        Some(path) => {
            tracing::info!("Loading experiment config from {:?}", path);
            ExperimentConfig::load_or_default(path)
        }
        None => ExperimentConfig::default(),
    };
    experiment.is_logging = true;

    let mut source = SyntheticPoseSource::new().with_noise(0.002);
    let mut app = ExperimentApp::new(experiment);
    let clock = Instant::now();

    // Game with logging
    app.select_mode(ModeSelect::Game, clock.elapsed(), &source);
    let mut lost_hand = false;
    while app.mode() == GameMode::Game {
        let now = clock.elapsed();
        source.set_time(now);

        // Drop left-hand tracking for a few seconds mid-game
        let lose = (10..13).contains(&now.as_secs());
        if lose != lost_hand {
            source.set_hand_tracked(Side::Left, !lose);
            lost_hand = lose;
        }

        app.update(now, &source);
        std::thread::sleep(FRAME_INTERVAL);
    }

    let (recorded, stats) = app
        .last_recording()
        .cloned()
        .context("Game ended without a recording")?;
    tracing::info!(
        "Recorded {} frames to {:?} (final score {})",
        stats.frames_written,
        recorded,
        app.score()
    );

    // Replay what was just recorded
    let mut replay_config = app.config().clone();
    replay_config.is_logging = false;
    replay_config.replay_file_name = recorded
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Recorded path has no file name")?;
    let mut app = ExperimentApp::new(replay_config);

    if !app.select_mode(ModeSelect::Replay, clock.elapsed(), &source) {
        anyhow::bail!(
            "Replay could not start: {}",
            app.hud().notice().unwrap_or("unknown error")
        );
    }
    while app.mode() == GameMode::Replay {
        app.update(clock.elapsed(), &source);
        std::thread::sleep(FRAME_INTERVAL);
    }

    if let Some(stats) = app.last_replay_stats() {
        tracing::info!(
            "Replay applied {} records, skipped {}",
            stats.records_applied,
            stats.records_skipped()
        );
    }

    tracing::info!("Shutting down...");
    Ok(())
}
