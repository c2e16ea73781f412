//! HUD text state
//!
//! The presentation layer shows one panel of text lines at a time. This
//! module decides which panel and what the lines say; drawing them is up to
//! the host.

use rapier3d::na::UnitQuaternion;

use crate::tracking::PoseSource;
use crate::types::{EntityId, Quat, Side, Vec3};

/// Which text panel is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HudPanel {
    /// Mode selection
    #[default]
    Lobby,
    /// Timer and score
    Game,
    /// Live pose readout with timer and score
    Detailed,
    /// Countdown, then replay progress
    Replay,
}

/// Text shown to the participant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    panel: HudPanel,
    lines: Vec<String>,
    notice: Option<String>,
}

impl Hud {
    /// Create a lobby HUD
    pub fn new() -> Self {
        let mut hud = Self::default();
        hud.show_lobby();
        hud
    }

    /// Current panel
    pub fn panel(&self) -> HudPanel {
        self.panel
    }

    /// Current lines, top to bottom
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Persistent notice (e.g. a failed recording or replay start)
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Set or clear the notice
    pub fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }

    /// Lobby panel
    pub fn show_lobby(&mut self) {
        self.panel = HudPanel::Lobby;
        self.lines = vec!["Touch a button to begin".to_string()];
        if let Some(notice) = &self.notice {
            self.lines.push(notice.clone());
        }
    }

    /// Game panel with timer and score
    pub fn show_game(&mut self, elapsed: f32, score: i32) {
        self.panel = HudPanel::Game;
        self.lines = vec![
            "Sort the shapes".to_string(),
            format!("Time: {}", format_g4(elapsed)),
            format!("Score: {}", score),
        ];
        if let Some(notice) = &self.notice {
            self.lines.push(notice.clone());
        }
    }

    /// Detailed panel with the live pose readout
    pub fn show_detailed(&mut self, readout: &PoseReadout, elapsed: f32, score: i32) {
        self.panel = HudPanel::Detailed;
        self.lines = vec![
            format!("Head Position: {}", format_vec(readout.head_position)),
            format!("Left Hand Position: {}", format_vec(readout.hand_positions[0])),
            format!("Right Hand Position: {}", format_vec(readout.hand_positions[1])),
            format!("Left Eye Rotation: {}", format_vec(readout.eye_rotations[0])),
            format!("Right Eye Rotation: {}", format_vec(readout.eye_rotations[1])),
            format!("Head Rotation: {}", format_vec(readout.head_rotation)),
            format!("Left Hand Rotation: {}", format_vec(readout.hand_rotations[0])),
            format!("Right Hand Rotation: {}", format_vec(readout.hand_rotations[1])),
            format!(
                "Hands Active? {}",
                if readout.hands_active { "True" } else { "False" }
            ),
            format!("Time: {}", format_g4(elapsed)),
            format!("Score: {}", score),
        ];
    }

    /// Replay pre-roll
    pub fn show_countdown(&mut self, remaining: u32) {
        self.panel = HudPanel::Replay;
        self.lines = vec![
            format!("Replay beginning in {}", remaining),
            String::new(),
            String::new(),
            String::new(),
        ];
    }

    /// Replay progress; record values are blank until the first record plays
    pub fn show_replay(&mut self, elapsed: f32, replay_time: Option<f32>, score: Option<i32>) {
        self.panel = HudPanel::Replay;
        self.lines = vec![
            "Replay in progress".to_string(),
            format!("Time: {}", format_g4(elapsed)),
            replay_time
                .map(|t| format!("Replay Time: {}", format_g4(t)))
                .unwrap_or_default(),
            score.map(|s| format!("Score: {}", s)).unwrap_or_default(),
        ];
    }
}

/// Snapshot of the poses shown in detailed mode
///
/// Rotations are Euler angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseReadout {
    pub head_position: Vec3,
    pub head_rotation: Vec3,
    pub hand_positions: [Vec3; 2],
    pub hand_rotations: [Vec3; 2],
    pub eye_rotations: [Vec3; 2],
    pub hands_active: bool,
}

impl PoseReadout {
    /// Read the current poses from a source
    pub fn capture<P>(source: &P) -> Self
    where
        P: PoseSource + ?Sized,
    {
        let head = source.current_pose(&EntityId::Head);
        let hands = Side::BOTH.map(|s| source.current_pose(&EntityId::Hand(s)));
        let eyes = Side::BOTH.map(|s| source.current_pose(&EntityId::Eye(s)));
        Self {
            head_position: head.position,
            head_rotation: euler_degrees(head.orientation),
            hand_positions: hands.map(|p| p.position),
            hand_rotations: hands.map(|p| euler_degrees(p.orientation)),
            eye_rotations: eyes.map(|p| euler_degrees(p.orientation)),
            hands_active: source.total_bones() > 0,
        }
    }
}

/// Roll/pitch/yaw of an orientation in degrees; zero for a degenerate quaternion
pub fn euler_degrees(q: Quat) -> Vec3 {
    UnitQuaternion::try_new(q, 1.0e-6)
        .map(|u| {
            let (roll, pitch, yaw) = u.euler_angles();
            Vec3::new(roll, pitch, yaw).map(f32::to_degrees)
        })
        .unwrap_or_else(Vec3::zeros)
}

/// Up to four significant digits, trailing zeros dropped
pub fn format_g4(value: f32) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = value.abs().log10().floor() as i32 + 1;
    let decimals = (4 - digits).clamp(0, 4) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn format_vec(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}
