//! Slime Soccer - A two-slime arcade soccer simulation
//!
//! Core modules:
//! - `sim`: Deterministic per-tick simulation (physics, collisions, AI, power-ups, scoring)
//! - `platform`: Host-facing sinks (render snapshot, audio cues, scoreboard) and frame glue
//! - `settings`: Match configuration and player preferences
//! - `audio`: Web Audio cue synthesis (wasm32 only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;

pub use platform::{AudioSink, Host, LogScoreboard, NullAudio, NullRender, RenderSink, ScoreboardSink};
pub use settings::{ConfigError, Difficulty, GravityProfile, MatchConfig, Mode, Settings};
pub use sim::{InitError, InputState, Simulation, Snapshot};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal host frame rate the per-tick constants are tuned for
    pub const NOMINAL_TPS: u32 = 60;

    /// Default playfield size (resize() replaces these at runtime)
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 400.0;
    /// Distance from the bottom edge to the floor line
    pub const FLOOR_OFFSET: f32 = 40.0;

    /// Player (slime) body
    pub const PLAYER_RADIUS: f32 = 30.0;
    /// Horizontal acceleration per tick while a move control is held
    pub const PLAYER_MOVE_ACCEL: f32 = 1.0;
    /// Base horizontal speed cap for the AI (scaled by difficulty speed)
    pub const PLAYER_MAX_SPEED: f32 = 5.0;
    /// Jump launch speed before gravity-profile and effect multipliers
    pub const JUMP_SPEED: f32 = 9.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 15.0;
    pub const BALL_BIG_RADIUS: f32 = 26.0;
    /// Per-tick air damping applied to both ball velocity components
    pub const BALL_DAMPING: f32 = 0.995;
    /// Minimum gap between two bounce cues
    pub const BOUNCE_DEBOUNCE_MS: u64 = 200;

    /// Fixed physics constants (independent of gravity profile)
    pub const FRICTION: f32 = 0.85;
    pub const BOUNCE_DECAY: f32 = 0.8;

    /// Kick impulse: direction * KICK_BASE * KICK_SCALE * power + player_vel * KICK_CARRY
    pub const KICK_BASE: f32 = 0.34;
    pub const KICK_SCALE: f32 = 20.0;
    pub const KICK_CARRY: f32 = 0.5;
    /// Kick power while the hitter holds a speed effect
    pub const SPEED_KICK_POWER: f32 = 1.3;

    /// Screen shake
    pub const SHAKE_PER_HIT_MAX: f32 = 8.0;
    pub const SHAKE_MAX: f32 = 15.0;
    pub const SHAKE_DECAY: f32 = 0.3;

    /// Smallest surface that fits both goals, two slimes and the floor strip
    pub const MIN_SURFACE_WIDTH: f32 = 2.0 * (GOAL_WIDTH + PLAYER_RADIUS);
    pub const MIN_SURFACE_HEIGHT: f32 = 2.0 * PLAYER_RADIUS + FLOOR_OFFSET;

    /// Goal mouth geometry
    /// Wider than the enlarged ball so a big ball can still score
    pub const GOAL_WIDTH: f32 = 80.0;
    pub const GOAL_HEIGHT: f32 = 130.0;

    /// Power-ups
    pub const POWERUP_RADIUS: f32 = 16.0;
    pub const POWERUP_SPAWN_INTERVAL_MS: u64 = 3000;
    pub const POWERUP_SPAWN_CHANCE: f64 = 0.35;
    pub const POWERUP_MAX_LIVE: usize = 2;
    pub const POWERUP_LIFETIME_MS: u64 = 12_000;
    pub const POWERUP_MARGIN: f32 = 100.0;
    /// Height of a spawned power-up above the floor line
    pub const POWERUP_FLOOR_GAP: f32 = 40.0;
    pub const EFFECT_DURATION_MS: u64 = 5000;
    pub const SPEED_EFFECT_MUL: f32 = 1.6;
    pub const JUMP_EFFECT_MUL: f32 = 1.7;

    /// Combo / scoring
    pub const COMBO_WINDOW_MS: u64 = 2000;
    pub const COMBO_CALLOUT_MIN: u32 = 3;
    pub const GOAL_GUARD_CLEAR_MS: u64 = 500;
    /// Max |vx| given to the ball at kickoff
    pub const KICKOFF_BALL_VX: f32 = 2.0;

    /// Match flow
    pub const MATCH_SECONDS: u32 = 90;
    pub const END_DISPLAY_MS: u64 = 2100;

    /// Resilience
    pub const MAX_ERRORS: u32 = 5;
    pub const NOTICE_MS: u64 = 3000;
    pub const TIMER_CAPACITY: usize = 20;
}

/// Sign of `v` as -1, 0 or 1 (glam's signum never returns 0)
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Linear interpolation from `a` toward `b` by `t`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// True when both components are finite
#[inline]
pub fn is_finite_vec(v: Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
