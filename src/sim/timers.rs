//! Cancellable deferred actions
//!
//! The host polls `fire_due` each frame. Capacity is bounded; scheduling past
//! the cap cancels the oldest pending entry.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::TIMER_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

/// What to do when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerAction {
    DismissNotice(u32),
    ClearGoalGuard,
    ReturnToMenu,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    handle: TimerHandle,
    due: u64,
    action: TimerAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerRegistry {
    /// Insertion order, oldest first
    entries: VecDeque<Entry>,
    capacity: usize,
    next_handle: u64,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::with_capacity(TIMER_CAPACITY)
    }
}

impl TimerRegistry {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            next_handle: 1,
        }
    }

    pub fn schedule(&mut self, due: u64, action: TimerAction) -> TimerHandle {
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::warn!(
                    "Timer registry full ({}), evicting {:?}",
                    self.capacity,
                    evicted.action
                );
            }
        }
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push_back(Entry {
            handle,
            due,
            action,
        });
        handle
    }

    /// Returns false if the handle already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.entries.iter().position(|e| e.handle == handle) {
            Some(idx) => {
                self.entries.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    /// Remove and return due actions, ordered by due time then insertion
    pub fn fire_due(&mut self, now: u64) -> Vec<TimerAction> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due <= now {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.due);
        due.into_iter().map(|e| e.action).collect()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
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
    fn test_fires_in_due_order() {
        let mut timers = TimerRegistry::default();
        timers.schedule(300, TimerAction::ReturnToMenu);
        timers.schedule(100, TimerAction::ClearGoalGuard);
        timers.schedule(900, TimerAction::DismissNotice(1));

        assert!(timers.fire_due(99).is_empty());
        assert_eq!(
            timers.fire_due(300),
            vec![TimerAction::ClearGoalGuard, TimerAction::ReturnToMenu]
        );
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerRegistry::default();
        let h = timers.schedule(100, TimerAction::ClearGoalGuard);
        assert!(timers.is_pending(h));
        assert!(timers.cancel(h));
        assert!(!timers.cancel(h));
        assert!(timers.fire_due(1000).is_empty());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut timers = TimerRegistry::default();
        let first = timers.schedule(10, TimerAction::DismissNotice(0));
        for i in 1..=TIMER_CAPACITY as u32 {
            timers.schedule(10, TimerAction::DismissNotice(i));
        }
        assert_eq!(timers.len(), TIMER_CAPACITY);
        assert!(!timers.is_pending(first));
        let fired = timers.fire_due(10);
        assert_eq!(fired.first(), Some(&TimerAction::DismissNotice(1)));
        assert_eq!(fired.len(), TIMER_CAPACITY);
    }
}
