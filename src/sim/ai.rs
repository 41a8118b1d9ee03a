//! Computer opponent for player 2
//!
//! Picks a horizontal target from the ball's position and heading, nudges the
//! slime toward it and sometimes jumps to block a dropping ball.

use rand::Rng;

use super::state::{EntityStore, PlayerId};
use crate::consts::*;
use crate::settings::AiTuning;
use crate::{lerp, sign};

/// Ball must be past this fraction of the width (and moving right) to be chased directly
const CHASE_LINE: f32 = 0.6;
/// Below this fraction of the width the AI falls back toward its goal
const DEFENSIVE_LINE: f32 = 0.4;
const RETREAT_BLEND: f32 = 0.3;
const TRACK_BLEND: f32 = 0.8;
/// No force inside this distance from the target
const DEAD_ZONE: f32 = 15.0;
const BASE_FORCE: f32 = 0.6;
const JUMP_RANGE: f32 = 120.0;
/// Height above the floor where a ball counts as "high"
const HIGH_BALL: f32 = 100.0;

/// What the AI decided this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiDecision {
    pub target_x: f32,
    /// Horizontal acceleration applied, 0 inside the dead zone
    pub force: f32,
    pub jump: bool,
}

/// Horizontal target for the AI slime
pub fn target_x(store: &EntityStore) -> f32 {
    let ai = &store.player(PlayerId::P2).body;
    let ball = &store.ball.body;
    let width = store.field.width;

    if ball.vel.x > 0.0 && ball.pos.x > width * CHASE_LINE {
        ball.pos.x
    } else if ball.pos.x < width * DEFENSIVE_LINE {
        let goal_center = store.home_goal(PlayerId::P2).center_x();
        lerp(ai.pos.x, goal_center, RETREAT_BLEND)
    } else {
        lerp(ai.pos.x, ball.pos.x, TRACK_BLEND)
    }
}

/// True when the ball is close and high or dropping
fn jump_warranted(store: &EntityStore) -> bool {
    let ai = &store.player(PlayerId::P2).body;
    let ball = &store.ball.body;
    if !ai.on_ground {
        return false;
    }
    let close = ai.pos.distance(ball.pos) < JUMP_RANGE;
    let high = ball.pos.y < store.field.floor_y - HIGH_BALL;
    let dropping = ball.vel.y > 0.0;
    close && (high || dropping)
}

/// Run the AI for one tick, mutating player 2's velocity
pub fn step<R: Rng>(
    store: &mut EntityStore,
    tuning: &AiTuning,
    jump_base: f32,
    rng: &mut R,
) -> AiDecision {
    let target = target_x(store);
    let want_jump = jump_warranted(store);

    let ai = store.player_mut(PlayerId::P2);
    let diff = target - ai.body.pos.x;

    let mut force = 0.0;
    if diff.abs() > DEAD_ZONE {
        force = sign(diff) * BASE_FORCE * tuning.track * tuning.react;
        ai.body.vel.x += force;
        let cap = PLAYER_MAX_SPEED * tuning.speed * ai.speed_mul;
        ai.body.vel.x = ai.body.vel.x.clamp(-cap, cap);
    }

    // Always draw so the RNG stream does not depend on ball position
    let roll: f64 = rng.random();
    let jump = want_jump && roll < tuning.jump_prob * 2.0;
    if jump {
        ai.body.vel.y = -JUMP_SPEED * jump_base * ai.jump_mul;
        ai.body.on_ground = false;
    }

    AiDecision {
        target_x: target,
        force,
        jump,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn store() -> EntityStore {
        EntityStore::new(800.0, 400.0)
    }

    #[test]
    fn test_defensive_third_blends_toward_goal() {
        let mut s = store();
        s.ball.body.pos = Vec2::new(0.3 * 800.0, 200.0);
        s.ball.body.vel = Vec2::new(-3.0, 0.0);
        let ai_x = s.players[1].body.pos.x;
        let goal_center = s.goals[1].center_x();

        let target = target_x(&s);
        assert!((target - (ai_x + (goal_center - ai_x) * 0.3)).abs() < 1e-3);
    }

    #[test]
    fn test_chases_ball_moving_into_own_half() {
        let mut s = store();
        s.ball.body.pos = Vec2::new(700.0, 200.0);
        s.ball.body.vel = Vec2::new(2.0, 0.0);
        assert_eq!(target_x(&s), 700.0);

        // Same spot, moving away: blended tracking instead
        s.ball.body.vel = Vec2::new(-2.0, 0.0);
        let ai_x = s.players[1].body.pos.x;
        assert!((target_x(&s) - (ai_x + (700.0 - ai_x) * 0.8)).abs() < 1e-3);
    }

    #[test]
    fn test_force_uses_difficulty() {
        let mut s = store();
        s.ball.body.pos = Vec2::new(450.0, 100.0);
        s.ball.body.vel = Vec2::ZERO;
        let tuning = Difficulty::Hard.tuning();
        let mut rng = Pcg32::seed_from_u64(1);

        let decision = step(&mut s, &tuning, 1.0, &mut rng);
        assert!((decision.force + 0.6 * 1.5 * 1.3).abs() < 1e-5);
        assert!(s.players[1].body.vel.x < 0.0);
    }

    #[test]
    fn test_dead_zone_applies_no_force() {
        let mut s = store();
        let ai_x = s.players[1].body.pos.x;
        s.ball.body.pos = Vec2::new(ai_x + 10.0, 100.0);
        let tuning = Difficulty::Normal.tuning();
        let mut rng = Pcg32::seed_from_u64(1);

        let decision = step(&mut s, &tuning, 1.0, &mut rng);
        assert_eq!(decision.force, 0.0);
        assert_eq!(s.players[1].body.vel.x, 0.0);
    }

    #[test]
    fn test_jumps_only_when_warranted() {
        let mut s = store();
        let ai = s.players[1].body.pos;
        let tuning = crate::settings::AiTuning {
            jump_prob: 1.0,
            ..Difficulty::Expert.tuning()
        };
        let mut rng = Pcg32::seed_from_u64(7);

        // Far away ball: no jump even with certain probability
        s.ball.body.pos = Vec2::new(ai.x - 300.0, 100.0);
        assert!(!step(&mut s, &tuning, 1.0, &mut rng).jump);

        // Close, dropping ball
        let mut s = store();
        s.ball.body.pos = Vec2::new(ai.x, ai.y - 80.0);
        s.ball.body.vel = Vec2::new(0.0, 2.0);
        let decision = step(&mut s, &tuning, 1.0, &mut rng);
        assert!(decision.jump);
        assert_eq!(s.players[1].body.vel.y, -JUMP_SPEED);

        // Airborne slimes never jump
        let mut s = store();
        s.players[1].body.on_ground = false;
        s.ball.body.pos = Vec2::new(ai.x, ai.y - 80.0);
        s.ball.body.vel = Vec2::new(0.0, 2.0);
        assert!(!step(&mut s, &tuning, 1.0, &mut rng).jump);
    }
}
