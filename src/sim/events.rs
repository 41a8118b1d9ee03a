//! Outputs of a tick: discrete events for the host and the render snapshot

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::faults::Stage;
use super::match_state::{MatchPhase, Score};
use super::powerup::PowerUpKind;
use super::state::{GoalRegion, PlayerId};

/// Named audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    Kick,
    Bounce,
    Goal,
    Power,
    Combo,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Kick => "kick",
            Cue::Bounce => "bounce",
            Cue::Goal => "goal",
            Cue::Power => "power",
            Cue::Combo => "combo",
        }
    }
}

/// Something the host may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Cue(Cue),
    PhaseChanged { from: MatchPhase, to: MatchPhase },
    Goal { scorer: PlayerId, score: Score },
    Combo { player: PlayerId, count: u32 },
    PowerUpCollected { player: PlayerId, kind: PowerUpKind },
    /// A stage failed and its work for this tick was dropped
    Fault { stage: Stage, message: String },
    EmergencyReset,
    MatchEnded { winner: Option<PlayerId>, score: Score },
}

/// Transient user-visible message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: u32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyView {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub body: BodyView,
    pub speed_boosted: bool,
    pub jump_boosted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallView {
    pub body: BodyView,
    pub on_fire: bool,
    pub big: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpView {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
}

/// Immutable per-tick view consumed by the render sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub width: f32,
    pub height: f32,
    pub floor_y: f32,
    pub players: [PlayerView; 2],
    pub ball: BallView,
    pub goals: [GoalRegion; 2],
    pub power_ups: Vec<PowerUpView>,
    pub screen_shake: f32,
    pub phase: MatchPhase,
    pub score: Score,
    pub time_left: u32,
    pub notices: Vec<Notice>,
}
