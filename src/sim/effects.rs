//! Timed player effects
//!
//! A player holds at most one entry per effect kind, kept sorted by expiry so
//! pruning only ever pops from the front.

use serde::{Deserialize, Serialize};

use crate::consts::{JUMP_EFFECT_MUL, SPEED_EFFECT_MUL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Speed,
    Jump,
}

impl EffectKind {
    /// Multiplier while the effect is active
    pub fn boost(self) -> f32 {
        match self {
            EffectKind::Speed => SPEED_EFFECT_MUL,
            EffectKind::Jump => JUMP_EFFECT_MUL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub kind: EffectKind,
    /// Active for `now < expires_at`
    pub expires_at: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectSet {
    entries: Vec<TimedEffect>,
}

impl EffectSet {
    /// Grant `kind` until `now + duration_ms`. Re-granting extends, never stacks.
    pub fn grant(&mut self, kind: EffectKind, now: u64, duration_ms: u64) {
        let mut expires_at = now + duration_ms;
        if let Some(idx) = self.entries.iter().position(|e| e.kind == kind) {
            expires_at = expires_at.max(self.entries.remove(idx).expires_at);
        }
        let at = self.entries.partition_point(|e| e.expires_at <= expires_at);
        self.entries.insert(at, TimedEffect { kind, expires_at });
    }

    /// Remove everything that has expired by `now`
    pub fn prune(&mut self, now: u64) {
        let expired = self.entries.partition_point(|e| e.expires_at <= now);
        self.entries.drain(..expired);
    }

    pub fn is_active(&self, kind: EffectKind, now: u64) -> bool {
        self.entries
            .iter()
            .any(|e| e.kind == kind && now < e.expires_at)
    }

    /// Max boost among active entries of `kind`, 1.0 when none
    pub fn multiplier(&self, kind: EffectKind, now: u64) -> f32 {
        self.entries
            .iter()
            .filter(|e| e.kind == kind && now < e.expires_at)
            .map(|e| e.kind.boost())
            .fold(1.0, f32::max)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimedEffect> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_window() {
        let mut set = EffectSet::default();
        set.grant(EffectKind::Speed, 1000, 5000);
        assert_eq!(set.multiplier(EffectKind::Speed, 1000), SPEED_EFFECT_MUL);
        assert_eq!(set.multiplier(EffectKind::Speed, 5999), SPEED_EFFECT_MUL);
        assert_eq!(set.multiplier(EffectKind::Speed, 6000), 1.0);
        assert_eq!(set.multiplier(EffectKind::Jump, 2000), 1.0);
    }

    #[test]
    fn test_regrant_extends_without_stacking() {
        let mut set = EffectSet::default();
        set.grant(EffectKind::Jump, 0, 5000);
        set.grant(EffectKind::Jump, 3000, 5000);
        assert_eq!(set.len(), 1);
        assert_eq!(set.multiplier(EffectKind::Jump, 7999), JUMP_EFFECT_MUL);
        assert_eq!(set.multiplier(EffectKind::Jump, 8000), 1.0);
    }

    #[test]
    fn test_prune_keeps_order() {
        let mut set = EffectSet::default();
        set.grant(EffectKind::Speed, 0, 5000);
        set.grant(EffectKind::Jump, 1000, 5000);
        let expiries: Vec<u64> = set.iter().map(|e| e.expires_at).collect();
        assert_eq!(expiries, vec![5000, 6000]);

        set.prune(5000);
        assert_eq!(set.len(), 1);
        assert!(set.is_active(EffectKind::Jump, 5000));
        set.prune(6000);
        assert!(set.is_empty());
    }
}
