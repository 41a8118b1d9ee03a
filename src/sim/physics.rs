//! Per-tick integration and boundary handling
//!
//! Constants are per tick, not per second: the loop assumes a roughly steady
//! host frame rate.

use super::events::Cue;
use super::state::{Ball, Body, EntityStore, Field};
use crate::consts::*;

/// Integrate a slime and clamp it into the field
pub fn integrate_player(body: &mut Body, field: &Field, gravity: f32) {
    body.vel.y += gravity;
    body.vel.x *= FRICTION;
    body.pos += body.vel;

    let r = body.radius;
    if body.pos.y + r > field.floor_y {
        body.pos.y = field.floor_y - r;
        body.vel.y = 0.0;
        body.on_ground = true;
    } else {
        body.on_ground = false;
    }

    if body.pos.y - r < 0.0 {
        body.pos.y = r;
        if body.vel.y < 0.0 {
            body.vel.y = 0.0;
        }
    }

    if body.pos.x - r < 0.0 {
        body.pos.x = r;
        body.vel.x = 0.0;
    } else if body.pos.x + r > field.width {
        body.pos.x = field.width - r;
        body.vel.x = 0.0;
    }
}

/// Integrate the ball. Returns `Some(Cue::Bounce)` when a floor bounce should be heard.
pub fn integrate_ball(ball: &mut Ball, field: &Field, gravity: f32, now: u64) -> Option<Cue> {
    if ball.frozen {
        return None;
    }

    let body = &mut ball.body;
    body.vel.y += gravity;
    body.vel *= BALL_DAMPING;
    body.pos += body.vel;

    let r = body.radius;
    let mut cue = None;

    if body.pos.y + r > field.floor_y {
        body.pos.y = field.floor_y - r;
        body.vel.y = -body.vel.y * BOUNCE_DECAY;
        body.on_ground = true;

        let quiet = ball
            .last_bounce_at
            .is_some_and(|t| now.saturating_sub(t) < BOUNCE_DEBOUNCE_MS);
        if !quiet {
            ball.last_bounce_at = Some(now);
            cue = Some(Cue::Bounce);
        }
    } else {
        body.on_ground = false;
    }

    if body.pos.y - r < 0.0 {
        body.pos.y = r;
        body.vel.y = -body.vel.y * BOUNCE_DECAY;
    }

    if body.pos.x - r < 0.0 {
        body.pos.x = r;
        body.vel.x = -body.vel.x * BOUNCE_DECAY;
    } else if body.pos.x + r > field.width {
        body.pos.x = field.width - r;
        body.vel.x = -body.vel.x * BOUNCE_DECAY;
    }

    cue
}

/// Physics stage body: both players, then the ball
pub fn step(store: &mut EntityStore, gravity: f32, now: u64) -> Option<Cue> {
    let field = store.field;
    for player in &mut store.players {
        integrate_player(&mut player.body, &field, gravity);
    }
    integrate_ball(&mut store.ball, &field, gravity, now)
}

/// True when `body` is inside the playable rectangle
pub fn in_bounds(body: &Body, field: &Field) -> bool {
    let r = body.radius;
    body.pos.x >= r - 1e-3
        && body.pos.x <= field.width - r + 1e-3
        && body.pos.y + r <= field.floor_y + 1e-3
        && body.pos.y >= r - 1e-3
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn field() -> Field {
        Field::new(800.0, 400.0)
    }

    #[test]
    fn test_player_lands_on_floor() {
        let f = field();
        let mut body = Body::new(Vec2::new(200.0, f.floor_y - 31.0), 30.0, 0);
        body.vel.y = 5.0;
        integrate_player(&mut body, &f, 0.5);
        assert_eq!(body.pos.y, f.floor_y - 30.0);
        assert_eq!(body.vel.y, 0.0);
        assert!(body.on_ground);
    }

    #[test]
    fn test_player_wall_zeroes_vx() {
        let f = field();
        let mut body = Body::new(Vec2::new(35.0, 100.0), 30.0, 0);
        body.vel.x = -20.0;
        integrate_player(&mut body, &f, 0.5);
        assert_eq!(body.pos.x, 30.0);
        assert_eq!(body.vel.x, 0.0);
        assert!(!body.on_ground);
    }

    #[test]
    fn test_floor_bounce_reflects_by_decay() {
        let f = field();
        let mut ball = Ball::new(Vec2::new(400.0, f.floor_y - 16.0));
        ball.body.vel.y = 10.0;
        let incoming = (10.0 + 0.5) * BALL_DAMPING;
        let cue = integrate_ball(&mut ball, &f, 0.5, 1000);
        assert_eq!(cue, Some(Cue::Bounce));
        assert!((ball.body.vel.y + incoming * BOUNCE_DECAY).abs() < 1e-4);
        assert_eq!(ball.body.pos.y, f.floor_y - BALL_RADIUS);
    }

    #[test]
    fn test_bounce_cue_debounced() {
        let f = field();
        let mut ball = Ball::new(Vec2::new(400.0, f.floor_y - 16.0));
        ball.body.vel.y = 10.0;
        assert_eq!(integrate_ball(&mut ball, &f, 0.5, 1000), Some(Cue::Bounce));

        ball.body.pos.y = f.floor_y - 16.0;
        ball.body.vel.y = 10.0;
        assert_eq!(integrate_ball(&mut ball, &f, 0.5, 1199), None);

        ball.body.pos.y = f.floor_y - 16.0;
        ball.body.vel.y = 10.0;
        assert_eq!(integrate_ball(&mut ball, &f, 0.5, 1200), Some(Cue::Bounce));
    }

    #[test]
    fn test_frozen_ball_does_not_move() {
        let f = field();
        let mut ball = Ball::new(Vec2::new(400.0, 100.0));
        ball.body.vel = Vec2::new(3.0, 3.0);
        ball.frozen = true;
        assert_eq!(integrate_ball(&mut ball, &f, 0.5, 0), None);
        assert_eq!(ball.body.pos, Vec2::new(400.0, 100.0));
    }

    #[test]
    fn test_dropped_ball_decays_geometrically() {
        let f = field();
        let mut ball = Ball::new(Vec2::new(400.0, 50.0));
        let mut rebounds = Vec::new();
        for tick in 0..2000u64 {
            let before = ball.body.vel.y;
            integrate_ball(&mut ball, &f, 0.5, tick * 16);
            if before > 0.0 && ball.body.vel.y < 0.0 {
                rebounds.push(-ball.body.vel.y);
            }
        }
        assert!(rebounds.len() > 3);
        // Each rebound is at most 0.8 of the previous one (air damping only lowers it)
        for pair in rebounds.windows(2).take(4) {
            let ratio = pair[1] / pair[0];
            assert!(ratio <= BOUNCE_DECAY + 0.01, "ratio {ratio}");
            assert!(ratio > 0.55, "ratio {ratio}");
        }
        assert!(ball.body.vel.y.abs() < 1.0);
    }

    proptest! {
        #[test]
        fn prop_players_stay_in_bounds(
            x in -200.0f32..1000.0,
            y in -200.0f32..600.0,
            vx in -60.0f32..60.0,
            vy in -60.0f32..60.0,
            g in prop::sample::select(vec![0.2f32, 0.5, 0.8]),
        ) {
            let f = field();
            let mut body = Body::new(Vec2::new(x, y), PLAYER_RADIUS, 0);
            body.vel = Vec2::new(vx, vy);
            for _ in 0..3 {
                integrate_player(&mut body, &f, g);
                prop_assert!(in_bounds(&body, &f));
            }
        }

        #[test]
        fn prop_ball_stays_in_bounds(
            x in 0.0f32..800.0,
            y in 0.0f32..360.0,
            vx in -60.0f32..60.0,
            vy in -60.0f32..60.0,
            big in any::<bool>(),
        ) {
            let f = field();
            let mut ball = Ball::new(Vec2::new(x, y));
            if big {
                ball.enlarge(1);
            }
            ball.body.vel = Vec2::new(vx, vy);
            for t in 0..3 {
                integrate_ball(&mut ball, &f, 0.5, t);
                prop_assert!(in_bounds(&ball.body, &f));
            }
        }
    }
}
