//! Fault counting, notices and the emergency-reset threshold

use serde::{Deserialize, Serialize};

use super::events::Notice;
use super::faults::{Stage, StageFault};
use super::timers::{TimerAction, TimerRegistry};
use crate::consts::{MAX_ERRORS, NOTICE_MS};

/// What the loop should do after a fault was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    /// Threshold reached: cancel timers, halt, back to menu
    EmergencyReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supervisor {
    pub error_count: u32,
    pub max_errors: u32,
    pub last_error_at: Option<u64>,
    notices: Vec<Notice>,
    next_notice: u32,
    /// Lifetime total, never reset
    total_faults: u64,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self {
            error_count: 0,
            max_errors: MAX_ERRORS,
            last_error_at: None,
            notices: Vec::new(),
            next_notice: 0,
            total_faults: 0,
        }
    }
}

impl Supervisor {
    /// Record a fault, post a notice and decide whether to reset
    pub fn report(
        &mut self,
        stage: Stage,
        fault: &StageFault,
        now: u64,
        timers: &mut TimerRegistry,
    ) -> Verdict {
        self.error_count += 1;
        self.total_faults += 1;
        self.last_error_at = Some(now);
        log::warn!(
            "Fault in {} stage ({}/{}): {}",
            stage,
            self.error_count,
            self.max_errors,
            fault
        );

        let id = self.next_notice;
        self.next_notice = self.next_notice.wrapping_add(1);
        self.notices.push(Notice {
            id,
            text: format!("Recovered from a {} error", stage),
        });
        timers.schedule(now + NOTICE_MS, TimerAction::DismissNotice(id));

        if self.error_count >= self.max_errors {
            log::error!(
                "{} faults reached, emergency reset",
                self.error_count
            );
            self.error_count = 0;
            return Verdict::EmergencyReset;
        }
        Verdict::Continue
    }

    pub fn dismiss(&mut self, id: u32) {
        self.notices.retain(|n| n.id != id);
    }

    pub fn clear_notices(&mut self) {
        self.notices.clear();
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn total_faults(&self) -> u64 {
        self.total_faults
    }

    /// Fresh match: counter back to zero
    pub fn reset_count(&mut self) {
        self.error_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fault() -> StageFault {
        StageFault::External("boom".to_string())
    }

    #[test]
    fn test_threshold_fires_once_and_restarts_count() {
        let mut sup = Supervisor::default();
        let mut timers = TimerRegistry::default();

        for i in 1..MAX_ERRORS {
            assert_eq!(sup.report(Stage::Physics, &fault(), i as u64, &mut timers), Verdict::Continue);
            assert_eq!(sup.error_count, i);
        }
        assert_eq!(
            sup.report(Stage::Physics, &fault(), 10, &mut timers),
            Verdict::EmergencyReset
        );
        assert_eq!(sup.error_count, 0);

        // Sixth fault starts a fresh count
        assert_eq!(sup.report(Stage::Ai, &fault(), 11, &mut timers), Verdict::Continue);
        assert_eq!(sup.error_count, 1);
        assert_eq!(sup.total_faults(), 6);
    }

    #[test]
    fn test_notice_dismissed_by_timer() {
        let mut sup = Supervisor::default();
        let mut timers = TimerRegistry::default();
        sup.report(Stage::Collision, &fault(), 1000, &mut timers);
        assert_eq!(sup.notices().len(), 1);
        assert!(sup.notices()[0].text.contains("collision"));

        assert!(timers.fire_due(3999).is_empty());
        for action in timers.fire_due(4000) {
            if let TimerAction::DismissNotice(id) = action {
                sup.dismiss(id);
            }
        }
        assert!(sup.notices().is_empty());
    }
}
