//! Match phase machine and countdown
//!
//! `Menu → Playing ⇄ Paused`, `Playing → Ended → Menu`. The countdown is
//! anchored to the host clock; pausing shifts the anchor so paused time is
//! never counted. Entity timestamps use `game_time`, which also excludes
//! every completed pause.

use serde::{Deserialize, Serialize};

use super::state::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Menu,
    Playing,
    Paused,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub p1: u32,
    pub p2: u32,
}

impl Score {
    pub fn add(&mut self, player: PlayerId) {
        match player {
            PlayerId::P1 => self.p1 += 1,
            PlayerId::P2 => self.p2 += 1,
        }
    }

    /// None on a draw
    pub fn leader(&self) -> Option<PlayerId> {
        match self.p1.cmp(&self.p2) {
            std::cmp::Ordering::Greater => Some(PlayerId::P1),
            std::cmp::Ordering::Less => Some(PlayerId::P2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub phase: MatchPhase,
    pub score: Score,
    /// Whole seconds remaining
    pub time_left: u32,
    pub winning_score: Option<u32>,
    /// Host time the current second started
    second_anchor: u64,
    paused_at: Option<u64>,
    /// Sum of all completed pauses this match
    paused_total: u64,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            phase: MatchPhase::Menu,
            score: Score::default(),
            time_left: crate::consts::MATCH_SECONDS,
            winning_score: None,
            second_anchor: 0,
            paused_at: None,
            paused_total: 0,
        }
    }
}

impl MatchState {
    /// Fresh match from any phase
    pub fn start(&mut self, now: u64, seconds: u32, winning_score: Option<u32>) {
        *self = Self {
            phase: MatchPhase::Playing,
            score: Score::default(),
            time_left: seconds,
            winning_score,
            second_anchor: now,
            paused_at: None,
            paused_total: 0,
        };
    }

    pub fn pause(&mut self, now: u64) -> bool {
        if self.phase != MatchPhase::Playing {
            return false;
        }
        self.phase = MatchPhase::Paused;
        self.paused_at = Some(now);
        true
    }

    pub fn resume(&mut self, now: u64) -> bool {
        if self.phase != MatchPhase::Paused {
            return false;
        }
        if let Some(at) = self.paused_at.take() {
            let paused = now.saturating_sub(at);
            self.second_anchor += paused;
            self.paused_total += paused;
        }
        self.phase = MatchPhase::Playing;
        true
    }

    /// Host time with paused spans removed
    pub fn game_time(&self, now: u64) -> u64 {
        now.saturating_sub(self.paused_total)
    }

    /// Count down whole seconds elapsed since the anchor
    pub fn advance_clock(&mut self, now: u64) {
        if self.phase != MatchPhase::Playing {
            return;
        }
        while self.time_left > 0 && now.saturating_sub(self.second_anchor) >= 1000 {
            self.time_left -= 1;
            self.second_anchor += 1000;
        }
    }

    /// Whether the running match should end now
    pub fn should_end(&self) -> bool {
        if self.phase != MatchPhase::Playing {
            return false;
        }
        let reached = self
            .winning_score
            .is_some_and(|w| self.score.p1 >= w || self.score.p2 >= w);
        self.time_left == 0 || reached
    }

    pub fn end(&mut self) -> bool {
        if self.phase != MatchPhase::Playing {
            return false;
        }
        self.phase = MatchPhase::Ended;
        true
    }

    /// Back to the menu from anywhere
    pub fn to_menu(&mut self) {
        self.phase = MatchPhase::Menu;
        self.paused_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_ticks_whole_seconds() {
        let mut m = MatchState::default();
        m.start(1000, 90, None);
        m.advance_clock(1999);
        assert_eq!(m.time_left, 90);
        m.advance_clock(2000);
        assert_eq!(m.time_left, 89);
        m.advance_clock(5500);
        assert_eq!(m.time_left, 86);
    }

    #[test]
    fn test_pause_does_not_lose_or_double_count() {
        let mut m = MatchState::default();
        m.start(0, 90, None);
        m.advance_clock(1500);
        assert_eq!(m.time_left, 89);

        assert!(m.pause(1500));
        m.advance_clock(60_000);
        assert_eq!(m.time_left, 89);

        assert!(m.resume(60_000));
        // 500ms of the partial second were already spent before pausing
        m.advance_clock(60_499);
        assert_eq!(m.time_left, 89);
        m.advance_clock(60_500);
        assert_eq!(m.time_left, 88);
    }

    #[test]
    fn test_game_time_skips_pauses() {
        let mut m = MatchState::default();
        m.start(0, 90, None);
        assert_eq!(m.game_time(1000), 1000);
        m.pause(1000);
        m.resume(11_000);
        assert_eq!(m.game_time(11_016), 1016);
        m.pause(12_000);
        m.resume(12_500);
        assert_eq!(m.game_time(13_000), 2500);

        m.start(20_000, 90, None);
        assert_eq!(m.game_time(20_000), 20_000);
    }

    #[test]
    fn test_invalid_transitions_are_ignored() {
        let mut m = MatchState::default();
        assert!(!m.pause(0));
        assert!(!m.resume(0));
        assert!(!m.end());
        m.start(0, 90, None);
        assert!(!m.resume(10));
        assert!(m.end());
        assert!(!m.pause(20));
        m.to_menu();
        assert_eq!(m.phase, MatchPhase::Menu);
    }

    #[test]
    fn test_end_conditions() {
        let mut m = MatchState::default();
        m.start(0, 2, Some(3));
        assert!(!m.should_end());
        m.advance_clock(2000);
        assert_eq!(m.time_left, 0);
        assert!(m.should_end());

        m.start(0, 90, Some(3));
        for _ in 0..3 {
            m.score.add(PlayerId::P2);
        }
        assert!(m.should_end());
        assert_eq!(m.score.leader(), Some(PlayerId::P2));
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut m = MatchState::default();
        m.start(0, 90, None);
        m.score.add(PlayerId::P1);
        m.pause(100);
        m.start(500, 90, None);
        assert_eq!(m.phase, MatchPhase::Playing);
        assert_eq!(m.score, Score::default());
        assert_eq!(m.time_left, 90);
    }
}
