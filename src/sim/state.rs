//! Entity state: players, ball, goals and the field geometry
//!
//! The `EntityStore` owns every body. Stages borrow it; nothing else keeps a
//! reference across ticks.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::{EffectKind, EffectSet};
use crate::consts::*;
use crate::is_finite_vec;

/// Which slime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerId {
    /// Left side, defends the left goal
    P1,
    /// Right side, defends the right goal (AI in single mode)
    P2,
}

impl PlayerId {
    pub const ALL: [PlayerId; 2] = [PlayerId::P1, PlayerId::P2];

    pub fn index(self) -> usize {
        match self {
            PlayerId::P1 => 0,
            PlayerId::P2 => 1,
        }
    }
}

/// Shared physical body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Packed 0xRRGGBB, only read by the render sink
    pub color: u32,
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: Vec2, radius: f32, color: u32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            color,
            on_ground: false,
        }
    }

    /// Finite position/velocity and a positive radius
    pub fn is_sane(&self) -> bool {
        is_finite_vec(self.pos) && is_finite_vec(self.vel) && self.radius > 0.0
    }
}

/// A slime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub body: Body,
    /// Derived from `effects` once per tick
    pub speed_mul: f32,
    /// Derived from `effects` once per tick
    pub jump_mul: f32,
    pub effects: EffectSet,
}

impl Player {
    pub fn new(id: PlayerId, pos: Vec2) -> Self {
        let color = match id {
            PlayerId::P1 => 0x00_a8_ff,
            PlayerId::P2 => 0xff_4d_4d,
        };
        Self {
            id,
            body: Body::new(pos, PLAYER_RADIUS, color),
            speed_mul: 1.0,
            jump_mul: 1.0,
            effects: EffectSet::default(),
        }
    }

    /// Drop expired effects and recompute the multipliers
    pub fn refresh_multipliers(&mut self, now: u64) {
        self.effects.prune(now);
        self.speed_mul = self.effects.multiplier(EffectKind::Speed, now);
        self.jump_mul = self.effects.multiplier(EffectKind::Jump, now);
    }

    pub fn has_speed_effect(&self, now: u64) -> bool {
        self.effects.is_active(EffectKind::Speed, now)
    }
}

/// The ball
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub body: Body,
    /// Physics skipped while frozen (end-of-match display)
    pub frozen: bool,
    /// Set by a 3+ combo, cleared at kickoff
    pub on_fire: bool,
    /// Timestamp the bigball effect ends, 0 when not enlarged
    pub big_until: u64,
    pub last_bounce_at: Option<u64>,
    pub last_touched_by: Option<PlayerId>,
}

impl Ball {
    pub fn new(pos: Vec2) -> Self {
        Self {
            body: Body::new(pos, BALL_RADIUS, 0xff_ff_ff),
            frozen: false,
            on_fire: false,
            big_until: 0,
            last_bounce_at: None,
            last_touched_by: None,
        }
    }

    pub fn enlarge(&mut self, until: u64) {
        self.big_until = self.big_until.max(until);
        self.body.radius = BALL_BIG_RADIUS;
    }

    /// Revert to base radius once `now` reaches `big_until`. Returns true on revert
    pub fn expire_big(&mut self, now: u64) -> bool {
        if self.big_until != 0 && now >= self.big_until {
            self.big_until = 0;
            self.body.radius = BALL_RADIUS;
            return true;
        }
        false
    }
}

/// Axis-aligned goal mouth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GoalRegion {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Playfield dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub width: f32,
    pub height: f32,
    pub floor_y: f32,
}

impl Field {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            floor_y: (height - FLOOR_OFFSET).max(height * 0.5),
        }
    }

    /// Left then right goal
    pub fn goals(&self) -> [GoalRegion; 2] {
        let y = self.floor_y - GOAL_HEIGHT.min(self.floor_y);
        let height = self.floor_y - y;
        [
            GoalRegion {
                x: 0.0,
                y,
                width: GOAL_WIDTH,
                height,
            },
            GoalRegion {
                x: self.width - GOAL_WIDTH,
                y,
                width: GOAL_WIDTH,
                height,
            },
        ]
    }
}

/// Owner of every body in the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStore {
    pub field: Field,
    pub players: [Player; 2],
    pub ball: Ball,
    /// Left, right
    pub goals: [GoalRegion; 2],
}

impl EntityStore {
    pub fn new(width: f32, height: f32) -> Self {
        let field = Field::new(width, height);
        let mut store = Self {
            field,
            players: [
                Player::new(PlayerId::P1, Vec2::ZERO),
                Player::new(PlayerId::P2, Vec2::ZERO),
            ],
            ball: Ball::new(Vec2::ZERO),
            goals: field.goals(),
        };
        store.kickoff(0.0);
        store
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.index()]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.index()]
    }

    /// Goal defended by `id`
    pub fn home_goal(&self, id: PlayerId) -> GoalRegion {
        self.goals[id.index()]
    }

    /// Put every body at its kickoff spot. Effects survive; ball flags reset.
    pub fn kickoff(&mut self, ball_vx: f32) {
        let f = self.field;
        for player in &mut self.players {
            let x = match player.id {
                PlayerId::P1 => f.width * 0.25,
                PlayerId::P2 => f.width * 0.75,
            };
            let r = player.body.radius;
            player.body.pos = Vec2::new(x, f.floor_y - r);
            player.body.vel = Vec2::ZERO;
            player.body.on_ground = true;
        }

        let ball = &mut self.ball;
        let r = ball.body.radius;
        let y = (f.floor_y - 200.0).max(r);
        ball.body.pos = Vec2::new(f.width / 2.0, y);
        ball.body.vel = Vec2::new(ball_vx, 0.0);
        ball.body.on_ground = false;
        ball.on_fire = false;
        ball.last_touched_by = None;
    }

    /// New field size: rebuild goals and re-center to kickoff
    pub fn resize(&mut self, width: f32, height: f32) {
        self.field = Field::new(width, height);
        self.goals = self.field.goals();
        self.kickoff(0.0);
    }

    /// True when the ball sits strictly between the two goal mouths
    pub fn ball_in_neutral_zone(&self) -> bool {
        let b = &self.ball.body;
        let [left, right] = self.goals;
        b.pos.x - b.radius > left.x + left.width && b.pos.x + b.radius < right.x
    }
}
