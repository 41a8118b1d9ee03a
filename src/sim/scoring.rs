//! Combo counting and goal detection

use serde::{Deserialize, Serialize};

use super::state::{EntityStore, PlayerId};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastHit {
    pub player: PlayerId,
    pub at: u64,
}

/// Consecutive-touch counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboState {
    pub p1: u32,
    pub p2: u32,
    pub last_hit: Option<LastHit>,
}

impl ComboState {
    pub fn count(&self, player: PlayerId) -> u32 {
        match player {
            PlayerId::P1 => self.p1,
            PlayerId::P2 => self.p2,
        }
    }

    fn count_mut(&mut self, player: PlayerId) -> &mut u32 {
        match player {
            PlayerId::P1 => &mut self.p1,
            PlayerId::P2 => &mut self.p2,
        }
    }

    /// Register a touch and return the player's new combo count
    pub fn register_hit(&mut self, player: PlayerId, now: u64) -> u32 {
        let chained = self
            .last_hit
            .is_some_and(|h| h.player == player && now.saturating_sub(h.at) < COMBO_WINDOW_MS);
        let count = self.count_mut(player);
        *count = if chained { *count + 1 } else { 1 };
        let count = *count;
        self.last_hit = Some(LastHit { player, at: now });
        count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Which player scores if the ball is fully inside a goal mouth, moving inward
pub fn detect_goal(store: &EntityStore) -> Option<PlayerId> {
    let ball = &store.ball.body;
    let [left, right] = store.goals;
    let below_bar = |y_top: f32| ball.pos.y > y_top;

    if ball.pos.x + ball.radius < left.x + left.width && ball.vel.x < 0.0 && below_bar(left.y) {
        return Some(PlayerId::P2);
    }
    if ball.pos.x - ball.radius > right.x && ball.vel.x > 0.0 && below_bar(right.y) {
        return Some(PlayerId::P1);
    }
    None
}

/// Goal re-entry guard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalGuard {
    /// Set on a goal; no further goal counts until cleared
    pub last_scored: Option<PlayerId>,
    /// A deferred clear is already scheduled
    pub clear_pending: bool,
}

impl GoalGuard {
    pub fn is_armed(&self) -> bool {
        self.last_scored.is_some()
    }

    pub fn arm(&mut self, scorer: PlayerId) {
        self.last_scored = Some(scorer);
        self.clear_pending = false;
    }

    pub fn clear(&mut self) {
        self.last_scored = None;
        self.clear_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_combo_window_is_strict() {
        let mut combo = ComboState::default();
        assert_eq!(combo.register_hit(PlayerId::P1, 0), 1);
        assert_eq!(combo.register_hit(PlayerId::P1, 1999), 2);
        assert_eq!(combo.register_hit(PlayerId::P1, 3998), 3);
        // Exactly 2000ms later resets
        assert_eq!(combo.register_hit(PlayerId::P1, 5998), 1);
    }

    #[test]
    fn test_other_player_breaks_chain() {
        let mut combo = ComboState::default();
        combo.register_hit(PlayerId::P1, 0);
        combo.register_hit(PlayerId::P1, 100);
        assert_eq!(combo.register_hit(PlayerId::P2, 200), 1);
        assert_eq!(combo.p1, 2);
        assert_eq!(combo.register_hit(PlayerId::P1, 300), 1);
    }

    #[test]
    fn test_goal_needs_full_crossing_and_inward_motion() {
        let mut store = EntityStore::new(800.0, 400.0);
        let left = store.goals[0];

        // Straddling the line
        store.ball.body.pos = Vec2::new(left.width, 340.0);
        store.ball.body.vel = Vec2::new(-3.0, 0.0);
        assert_eq!(detect_goal(&store), None);

        store.ball.body.pos = Vec2::new(left.width - BALL_RADIUS - 1.0, 340.0);
        assert_eq!(detect_goal(&store), Some(PlayerId::P2));

        // Moving back out
        store.ball.body.vel = Vec2::new(3.0, 0.0);
        assert_eq!(detect_goal(&store), None);

        // Over the crossbar
        store.ball.body.vel = Vec2::new(-3.0, 0.0);
        store.ball.body.pos.y = left.y - 5.0;
        assert_eq!(detect_goal(&store), None);

        let right = store.goals[1];
        store.ball.body.pos = Vec2::new(right.x + BALL_RADIUS + 1.0, 340.0);
        store.ball.body.vel = Vec2::new(3.0, 0.0);
        assert_eq!(detect_goal(&store), Some(PlayerId::P1));
    }
}
