//! Fault taxonomy
//!
//! Every stage returns `Result<(), StageFault>`; the supervisor turns an `Err`
//! into a counted, labelled fault.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::ConfigError;

/// Where a fault originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Init,
    Clock,
    Input,
    Ai,
    Physics,
    Collision,
    Goal,
    PowerUp,
    Scoring,
    MatchEnd,
    /// Reported by the host, not owned by the core
    Render,
}

impl Stage {
    /// Human readable context label
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Init => "initialization",
            Stage::Clock => "scheduling/timer",
            Stage::Input => "input sampling",
            Stage::Ai => "AI",
            Stage::Physics => "physics",
            Stage::Collision => "collision",
            Stage::Goal => "goal detection",
            Stage::PowerUp => "power-up",
            Stage::Scoring => "combo/score",
            Stage::MatchEnd => "match end",
            Stage::Render => "rendering",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a stage gave up for this tick
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageFault {
    #[error("{what} has a non-finite position or velocity")]
    NonFinite { what: &'static str },
    #[error("{what} has invalid radius {radius}")]
    BadRadius { what: &'static str, radius: f32 },
    #[error("clock went backwards ({now} < {last})")]
    ClockRewind { now: u64, last: u64 },
    #[error("{0}")]
    External(String),
}

/// Construction failure; the core refuses to start
#[derive(Debug, Error)]
pub enum InitError {
    #[error("render surface is missing or degenerate ({width}x{height})")]
    Surface { width: f32, height: f32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
