//! Agent status codes and the per-tile pending-state buffer
//!
//! State codes double as color-lookup keys on the render side, so their byte
//! values are fixed: `code / 51` indexes the color theme.

use serde::{Deserialize, Serialize};

/// Agent status as seen by the renderer.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StateCode {
    /// Sentinel for tiles that never received a state.
    Uninit = 0,
    Available = 51,
    Previewing = 102,
    OnCall = 153,
    AfterCall = 204,
    LoggedOut = 255,
}

impl StateCode {
    /// States a new agent may join with. Nobody joins already logged out.
    pub const JOINABLE: [StateCode; 4] = [
        StateCode::OnCall,
        StateCode::Available,
        StateCode::Previewing,
        StateCode::AfterCall,
    ];

    /// States a tick may move an existing agent into.
    pub const LIVE: [StateCode; 5] = [
        StateCode::OnCall,
        StateCode::Available,
        StateCode::Previewing,
        StateCode::AfterCall,
        StateCode::LoggedOut,
    ];

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(StateCode::Uninit),
            51 => Some(StateCode::Available),
            102 => Some(StateCode::Previewing),
            153 => Some(StateCode::OnCall),
            204 => Some(StateCode::AfterCall),
            255 => Some(StateCode::LoggedOut),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StateCode::Uninit => "uninit",
            StateCode::Available => "available",
            StateCode::Previewing => "previewing",
            StateCode::OnCall => "onCall",
            StateCode::AfterCall => "afterCall",
            StateCode::LoggedOut => "loggedOut",
        }
    }

    /// Position of this state's color in a theme table (background first).
    #[inline]
    pub fn theme_slot(self) -> usize {
        usize::from(self.code()) / 51
    }
}

/// What a tile is waiting to animate into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PendingState {
    /// Nothing queued since the last transition.
    #[default]
    Empty,
    /// Tile has never been handed a state.
    Uninitialized,
    State(StateCode),
}

impl PendingState {
    pub fn is_empty(self) -> bool {
        matches!(self, PendingState::Empty)
    }

    /// Code written to the texture when this pending state starts animating.
    pub fn texture_code(self) -> Option<u8> {
        match self {
            PendingState::Empty => None,
            PendingState::Uninitialized => Some(StateCode::Uninit.code()),
            PendingState::State(state) => Some(state.code()),
        }
    }
}

/// Per-tile pending states, filled by queue drains and consumed by the
/// color-mix state machine.
#[derive(Debug, Clone)]
pub struct PendingStates {
    slots: Vec<PendingState>,
}

impl PendingStates {
    /// Buffer of `len` slots, all `Uninitialized`.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![PendingState::Uninitialized; len],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PendingState> {
        self.slots.get(index).copied()
    }

    /// Overwrite the pending state for `index`. Out-of-range writes are
    /// ignored and reported as `false`.
    #[inline]
    pub fn set(&mut self, index: usize, state: StateCode) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = PendingState::State(state);
                true
            }
            None => false,
        }
    }

    /// Pop the pending state for `index`, leaving `Empty` behind.
    #[inline]
    pub fn take(&mut self, index: usize) -> PendingState {
        self.slots
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or(PendingState::Empty)
    }

    pub fn mark_all_uninitialized(&mut self) {
        self.slots.fill(PendingState::Uninitialized);
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [PendingState] {
        &mut self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_bytes() {
        for state in StateCode::LIVE {
            assert_eq!(StateCode::from_code(state.code()), Some(state));
        }
        assert_eq!(StateCode::from_code(253), None);
        assert_eq!(StateCode::LoggedOut.theme_slot(), 5);
        assert_eq!(StateCode::Available.theme_slot(), 1);
    }

    #[test]
    fn joinable_states_exclude_logged_out() {
        assert!(!StateCode::JOINABLE.contains(&StateCode::LoggedOut));
        assert!(!StateCode::JOINABLE.contains(&StateCode::Uninit));
    }

    #[test]
    fn pending_logged_out_is_not_empty() {
        let mut pending = PendingStates::new(2);
        assert_eq!(pending.get(0), Some(PendingState::Uninitialized));

        assert!(pending.set(1, StateCode::LoggedOut));
        assert_eq!(pending.take(1), PendingState::State(StateCode::LoggedOut));
        assert_eq!(pending.take(1), PendingState::Empty);
        assert!(!pending.set(7, StateCode::OnCall));
    }

    #[test]
    fn serializes_with_display_names() {
        let json = serde_json::to_string(&StateCode::OnCall).unwrap();
        assert_eq!(json, "\"onCall\"");
    }
}
