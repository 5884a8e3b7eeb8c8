//! Enabled/disabled state of the named controls

use crate::core::types::Control;

const CONTROL_COUNT: usize = Control::ALL.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    enabled: [bool; CONTROL_COUNT],
}

fn slot(control: Control) -> usize {
    match control {
        Control::MapClue => 0,
        Control::EstimatePosition => 1,
        Control::Timer => 2,
        Control::Markers => 3,
        Control::Forfeit => 4,
        Control::GuessInput => 5,
    }
}

impl Controls {
    pub fn all_disabled() -> Self {
        Self {
            enabled: [false; CONTROL_COUNT],
        }
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        self.enabled[slot(control)]
    }

    /// Returns true if the state changed
    pub fn set(&mut self, control: Control, enabled: bool) -> bool {
        let s = &mut self.enabled[slot(control)];
        let changed = *s != enabled;
        *s = enabled;
        changed
    }
}
