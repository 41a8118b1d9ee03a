//! Held-control snapshot sampled before each tick
//!
//! The source (keyboard, touch) is the host's business; the core only sees
//! the six named controls.

use serde::{Deserialize, Serialize};

use super::state::PlayerId;

/// A named control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Control {
    MoveLeft1,
    MoveRight1,
    Jump1,
    MoveLeft2,
    MoveRight2,
    Jump2,
}

impl Control {
    pub fn name(&self) -> &'static str {
        match self {
            Control::MoveLeft1 => "moveLeft1",
            Control::MoveRight1 => "moveRight1",
            Control::Jump1 => "jump1",
            Control::MoveLeft2 => "moveLeft2",
            Control::MoveRight2 => "moveRight2",
            Control::Jump2 => "jump2",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "moveLeft1" => Some(Control::MoveLeft1),
            "moveRight1" => Some(Control::MoveRight1),
            "jump1" => Some(Control::Jump1),
            "moveLeft2" => Some(Control::MoveLeft2),
            "moveRight2" => Some(Control::MoveRight2),
            "jump2" => Some(Control::Jump2),
            _ => None,
        }
    }
}

/// Controls for one slime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl PadState {
    /// -1, 0 or 1; opposite directions cancel
    pub fn axis(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Held state of every control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub p1: PadState,
    pub p2: PadState,
}

impl InputState {
    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::MoveLeft1 => self.p1.left = held,
            Control::MoveRight1 => self.p1.right = held,
            Control::Jump1 => self.p1.jump = held,
            Control::MoveLeft2 => self.p2.left = held,
            Control::MoveRight2 => self.p2.right = held,
            Control::Jump2 => self.p2.jump = held,
        }
    }

    /// Set by control name. Unknown names are ignored and return false.
    pub fn set_named(&mut self, name: &str, held: bool) -> bool {
        match Control::from_name(name) {
            Some(control) => {
                self.set(control, held);
                true
            }
            None => false,
        }
    }

    pub fn pad(&self, player: PlayerId) -> PadState {
        match player {
            PlayerId::P1 => self.p1,
            PlayerId::P2 => self.p2,
        }
    }
}

impl<'a> FromIterator<(&'a str, bool)> for InputState {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        let mut input = InputState::default();
        for (name, held) in iter {
            input.set_named(name, held);
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_controls() {
        let input: InputState = [("moveLeft1", true), ("jump2", true), ("fire", true)]
            .into_iter()
            .collect();
        assert!(input.p1.left);
        assert!(input.p2.jump);
        assert_eq!(input.pad(PlayerId::P1).axis(), -1.0);

        let mut input = input;
        assert!(!input.set_named("fire", true));
        input.set(Control::MoveRight1, true);
        assert_eq!(input.p1.axis(), 0.0);
        assert_eq!(Control::from_name(Control::Jump1.name()), Some(Control::Jump1));
    }
}
