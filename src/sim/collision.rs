//! Player vs ball collision detection and response
//!
//! Slimes and the ball are circles. On overlap the ball is pushed out to
//! exact contact along the center line and given a kick impulse.

use glam::Vec2;

use super::state::{Ball, Player, PlayerId};
use crate::consts::*;

/// Overlaps smaller than this are treated as resting contact
const CONTACT_EPSILON: f32 = 1e-3;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Unit vector from the player center toward the ball center
    pub normal: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
        }
    }
}

/// Circle overlap test between a slime and the ball
pub fn player_ball_collision(
    player_pos: Vec2,
    player_radius: f32,
    ball_pos: Vec2,
    ball_radius: f32,
) -> CollisionResult {
    let delta = ball_pos - player_pos;
    let dist = delta.length();
    let reach = player_radius + ball_radius;

    if dist.is_nan() || dist >= reach - CONTACT_EPSILON {
        return CollisionResult::miss();
    }

    // Concentric bodies: push straight up
    let normal = if dist > f32::EPSILON {
        delta / dist
    } else {
        Vec2::new(0.0, -1.0)
    };

    CollisionResult { hit: true, normal }
}

/// A resolved touch, handed to the combo tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub player: PlayerId,
    /// Relative speed at impact, drives screen shake
    pub impact: f32,
}

/// Resolve one slime against the ball. Returns the touch on contact.
pub fn resolve(player: &Player, ball: &mut Ball, now: u64) -> Option<Touch> {
    let p = &player.body;
    let result = player_ball_collision(p.pos, p.radius, ball.body.pos, ball.body.radius);
    if !result.hit {
        return None;
    }

    let impact = (ball.body.vel - p.vel).length();

    ball.body.pos = p.pos + result.normal * (p.radius + ball.body.radius);

    let power = if player.has_speed_effect(now) {
        SPEED_KICK_POWER
    } else {
        1.0
    };
    ball.body.vel = result.normal * KICK_BASE * KICK_SCALE * power + p.vel * KICK_CARRY;
    ball.last_touched_by = Some(player.id);

    Some(Touch {
        player: player.id,
        impact,
    })
}

/// Screen shake accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenShake {
    pub magnitude: f32,
}

impl ScreenShake {
    pub fn add_hit(&mut self, impact: f32) {
        let kick = (impact * 0.5).clamp(0.0, SHAKE_PER_HIT_MAX);
        self.magnitude = (self.magnitude + kick).min(SHAKE_MAX);
    }

    /// Called on ticks without a hit
    pub fn decay(&mut self) {
        self.magnitude = (self.magnitude - SHAKE_DECAY).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::effects::EffectKind;
    use proptest::prelude::*;

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(PlayerId::P1, Vec2::new(x, y))
    }

    #[test]
    fn test_miss_when_apart() {
        let result = player_ball_collision(Vec2::ZERO, 30.0, Vec2::new(50.0, 0.0), 15.0);
        assert!(!result.hit);
    }

    #[test]
    fn test_overlap_pushes_ball_to_contact() {
        let player = player_at(100.0, 300.0);
        let mut ball = Ball::new(Vec2::new(130.0, 300.0));

        let touch = resolve(&player, &mut ball, 0).expect("overlap");
        assert_eq!(touch.player, PlayerId::P1);
        let dist = (ball.body.pos - player.body.pos).length();
        assert!((dist - (PLAYER_RADIUS + BALL_RADIUS)).abs() < 1e-3);
        // Pure horizontal hit from a resting slime
        assert!((ball.body.vel.x - KICK_BASE * KICK_SCALE).abs() < 1e-4);
        assert!(ball.body.vel.y.abs() < 1e-4);
        assert_eq!(ball.last_touched_by, Some(PlayerId::P1));
    }

    #[test]
    fn test_speed_effect_boosts_kick_and_carries_velocity() {
        let mut player = player_at(100.0, 300.0);
        player.body.vel = Vec2::new(4.0, 0.0);
        player.effects.grant(EffectKind::Speed, 0, EFFECT_DURATION_MS);
        let mut ball = Ball::new(Vec2::new(100.0, 260.0));

        resolve(&player, &mut ball, 100).expect("overlap");
        let expected_y = -KICK_BASE * KICK_SCALE * SPEED_KICK_POWER;
        assert!((ball.body.vel.y - expected_y).abs() < 1e-3);
        assert!((ball.body.vel.x - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_shake_caps_and_decays() {
        let mut shake = ScreenShake::default();
        shake.add_hit(100.0);
        assert_eq!(shake.magnitude, SHAKE_PER_HIT_MAX);
        shake.add_hit(100.0);
        assert_eq!(shake.magnitude, SHAKE_MAX);
        for _ in 0..100 {
            shake.decay();
        }
        assert_eq!(shake.magnitude, 0.0);
    }

    proptest! {
        #[test]
        fn prop_resolution_is_idempotent(
            px in 100.0f32..700.0,
            py in 100.0f32..330.0,
            dx in -44.0f32..44.0,
            dy in -44.0f32..44.0,
        ) {
            let player = player_at(px, py);
            let mut ball = Ball::new(Vec2::new(px + dx, py + dy));
            resolve(&player, &mut ball, 0);
            let settled_pos = ball.body.pos;
            let settled_vel = ball.body.vel;

            prop_assert!(resolve(&player, &mut ball, 0).is_none());
            prop_assert_eq!(ball.body.pos, settled_pos);
            prop_assert_eq!(ball.body.vel, settled_vel);
        }
    }
}
