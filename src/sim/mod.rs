//! Slime soccer simulation core
//!
//! All gameplay logic lives here:
//! - Time comes from the host as milliseconds, never from a wall clock
//! - Randomness comes from one seeded RNG owned by the simulation
//! - Players are always processed P1 then P2
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod effects;
pub mod events;
pub mod faults;
pub mod input;
pub mod match_state;
pub mod physics;
pub mod powerup;
pub mod scoring;
pub mod state;
pub mod supervisor;
pub mod tick;
pub mod timers;

pub use collision::{CollisionResult, ScreenShake, player_ball_collision};
pub use effects::{EffectKind, EffectSet};
pub use events::{Cue, GameEvent, Notice, Snapshot};
pub use faults::{InitError, Stage, StageFault};
pub use input::{Control, InputState, PadState};
pub use match_state::{MatchPhase, Score};
pub use powerup::{PowerUp, PowerUpKind};
pub use state::{Ball, Body, EntityStore, Field, GoalRegion, Player, PlayerId};
pub use tick::Simulation;
pub use timers::{TimerAction, TimerRegistry};
