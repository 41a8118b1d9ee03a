//! Power-up spawning, pickup and expiry

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::effects::EffectKind;
use super::state::{EntityStore, PlayerId};
use crate::consts::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Speed,
    Jump,
    BigBall,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Speed, PowerUpKind::Jump, PowerUpKind::BigBall];
}

/// A collectible on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub spawned_at: u64,
}

/// Result of one power-up stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerUpReport {
    pub spawned: Option<PowerUpKind>,
    pub collected: Vec<(PlayerId, PowerUpKind)>,
    pub expired: usize,
}

/// Owns the live power-up set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpManager {
    live: Vec<PowerUp>,
    /// Start of the current spawn interval
    interval_start: Option<u64>,
    next_id: u32,
}

impl PowerUpManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> &[PowerUp] {
        &self.live
    }

    /// Drop every power-up and restart the spawn interval
    pub fn reset(&mut self, now: u64) {
        self.live.clear();
        self.interval_start = Some(now);
    }

    /// Spawn roll for the interval that just elapsed, if any
    pub fn try_spawn<R: Rng>(&mut self, store: &EntityStore, now: u64, rng: &mut R) -> Option<PowerUpKind> {
        let start = *self.interval_start.get_or_insert(now);
        if now.saturating_sub(start) < POWERUP_SPAWN_INTERVAL_MS {
            return None;
        }
        self.interval_start = Some(now);

        if self.live.len() >= POWERUP_MAX_LIVE {
            return None;
        }
        let roll: f64 = rng.random();
        if roll >= POWERUP_SPAWN_CHANCE {
            return None;
        }

        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        let field = store.field;
        let lo = POWERUP_MARGIN.min(field.width / 2.0);
        let hi = (field.width - POWERUP_MARGIN).max(lo);
        let x = if hi > lo { rng.random_range(lo..hi) } else { lo };
        let y = (field.floor_y - POWERUP_FLOOR_GAP).max(POWERUP_RADIUS);

        let id = self.next_id;
        self.next_id += 1;
        self.live.push(PowerUp {
            id,
            kind,
            pos: Vec2::new(x, y),
            radius: POWERUP_RADIUS,
            spawned_at: now,
        });
        Some(kind)
    }

    /// Remove power-ups that reached their lifetime. Returns how many went away.
    pub fn expire(&mut self, now: u64) -> usize {
        let before = self.live.len();
        self.live
            .retain(|p| now.saturating_sub(p.spawned_at) < POWERUP_LIFETIME_MS);
        before - self.live.len()
    }

    /// Hand overlapping power-ups to players. Player 1 is checked first.
    pub fn collect(&mut self, store: &mut EntityStore, now: u64) -> Vec<(PlayerId, PowerUpKind)> {
        let mut collected = Vec::new();
        let mut i = 0;
        while i < self.live.len() {
            let p = &self.live[i];
            let claimant = PlayerId::ALL.into_iter().find(|&id| {
                let body = &store.player(id).body;
                body.pos.distance(p.pos) < body.radius + p.radius
            });
            match claimant {
                Some(id) => {
                    let kind = self.live.remove(i).kind;
                    apply(store, id, kind, now);
                    collected.push((id, kind));
                }
                None => i += 1,
            }
        }
        collected
    }

    /// Full stage: spawn, pickup, expiry
    pub fn step<R: Rng>(&mut self, store: &mut EntityStore, now: u64, rng: &mut R) -> PowerUpReport {
        let spawned = self.try_spawn(store, now, rng);
        let collected = self.collect(store, now);
        let expired = self.expire(now);
        PowerUpReport {
            spawned,
            collected,
            expired,
        }
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, kind: PowerUpKind, pos: Vec2, now: u64) {
        let id = self.next_id;
        self.next_id += 1;
        self.live.push(PowerUp {
            id,
            kind,
            pos,
            radius: POWERUP_RADIUS,
            spawned_at: now,
        });
    }
}

/// Apply a collected power-up
pub fn apply(store: &mut EntityStore, player: PlayerId, kind: PowerUpKind, now: u64) {
    match kind {
        PowerUpKind::Speed => {
            let p = store.player_mut(player);
            p.effects.grant(EffectKind::Speed, now, EFFECT_DURATION_MS);
            p.refresh_multipliers(now);
        }
        PowerUpKind::Jump => {
            let p = store.player_mut(player);
            p.effects.grant(EffectKind::Jump, now, EFFECT_DURATION_MS);
            p.refresh_multipliers(now);
        }
        PowerUpKind::BigBall => store.ball.enlarge(now + EFFECT_DURATION_MS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_spawn_cadence_and_cap() {
        let store = EntityStore::new(800.0, 400.0);
        let mut mgr = PowerUpManager::new();
        let mut rng = Pcg32::seed_from_u64(42);
        mgr.reset(0);

        assert!(mgr.try_spawn(&store, 2999, &mut rng).is_none());

        let mut now = 0;
        for _ in 0..200 {
            now += POWERUP_SPAWN_INTERVAL_MS;
            mgr.try_spawn(&store, now, &mut rng);
            assert!(mgr.live().len() <= POWERUP_MAX_LIVE);
        }
        assert_eq!(mgr.live().len(), POWERUP_MAX_LIVE);
        for p in mgr.live() {
            assert!(p.pos.x >= POWERUP_MARGIN && p.pos.x <= 800.0 - POWERUP_MARGIN);
            assert_eq!(p.pos.y, store.field.floor_y - POWERUP_FLOOR_GAP);
        }
    }

    #[test]
    fn test_spawn_rate_is_roughly_35_percent() {
        let store = EntityStore::new(800.0, 400.0);
        let mut rng = Pcg32::seed_from_u64(9);
        let mut spawned = 0;
        for round in 0..2000u64 {
            let mut mgr = PowerUpManager::new();
            mgr.reset(round);
            if mgr
                .try_spawn(&store, round + POWERUP_SPAWN_INTERVAL_MS, &mut rng)
                .is_some()
            {
                spawned += 1;
            }
        }
        let rate = spawned as f64 / 2000.0;
        assert!((0.30..0.40).contains(&rate), "rate {rate}");
    }

    #[test]
    fn test_unclaimed_expire_at_lifetime() {
        let mut mgr = PowerUpManager::new();
        mgr.place(PowerUpKind::Speed, Vec2::new(400.0, 100.0), 1000);
        assert_eq!(mgr.expire(1000 + POWERUP_LIFETIME_MS - 1), 0);
        assert_eq!(mgr.expire(1000 + POWERUP_LIFETIME_MS), 1);
        assert!(mgr.live().is_empty());
    }

    #[test]
    fn test_pickup_grants_effect_with_player_one_priority() {
        let mut store = EntityStore::new(800.0, 400.0);
        let mut mgr = PowerUpManager::new();
        store.players[0].body.pos = Vec2::new(390.0, 330.0);
        store.players[1].body.pos = Vec2::new(410.0, 330.0);
        mgr.place(PowerUpKind::Jump, Vec2::new(400.0, 320.0), 0);

        let collected = mgr.collect(&mut store, 500);
        assert_eq!(collected, vec![(PlayerId::P1, PowerUpKind::Jump)]);
        assert!(mgr.live().is_empty());
        assert_eq!(store.players[0].jump_mul, JUMP_EFFECT_MUL);
        assert_eq!(store.players[1].jump_mul, 1.0);
    }

    #[test]
    fn test_bigball_enlarges_ball() {
        let mut store = EntityStore::new(800.0, 400.0);
        apply(&mut store, PlayerId::P2, PowerUpKind::BigBall, 100);
        assert_eq!(store.ball.body.radius, BALL_BIG_RADIUS);
        assert_eq!(store.ball.big_until, 100 + EFFECT_DURATION_MS);
    }
}
