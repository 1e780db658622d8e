//! Anchor lifecycle states and their transition table

use enklu_core::{EventId, StateTransitions};

/// Input events for [`AnchorState`]
pub mod anchor_events {
    use enklu_core::EventId;

    pub const BEGIN_EDIT: EventId = 1;
    pub const FINALIZE_EDIT: EventId = 2;
    pub const ABORT_EDIT: EventId = 3;
    pub const LOAD_SUCCEEDED: EventId = 4;
    pub const LOAD_FAILED: EventId = 5;
    pub const SAVE_SUCCEEDED: EventId = 6;
    pub const SAVE_FAILED: EventId = 7;
    pub const RETRY: EventId = 8;
}

use anchor_events::*;

/// Lifecycle of one world anchor
///
/// ```text
/// Loading ──► Ready ◄──► Moving ──► Saving ──► Ready
///    │                                 │
///    └──────────► Error ◄──────────────┘
/// ```
///
/// `ABORT_EDIT` returns any state to `Loading`; `RETRY` leaves `Error`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnchorState {
    #[default]
    Loading,
    Ready,
    Moving,
    Saving,
    Error,
}

impl AnchorState {
    /// Whether user manipulation is disallowed in this state
    pub fn is_locked(self) -> bool {
        !matches!(self, AnchorState::Moving)
    }
}

impl StateTransitions for AnchorState {
    fn on_event(&self, event: EventId) -> Option<Self> {
        use AnchorState::*;
        match (self, event) {
            (Loading, LOAD_SUCCEEDED) => Some(Ready),
            (Loading, LOAD_FAILED) => Some(Error),
            (Ready | Moving, BEGIN_EDIT) => Some(Moving),
            (Moving, FINALIZE_EDIT) => Some(Saving),
            (Saving, SAVE_SUCCEEDED) => Some(Ready),
            (Saving, SAVE_FAILED) => Some(Error),
            (_, ABORT_EDIT) => Some(Loading),
            (Error, RETRY) => Some(Loading),
            _ => None,
        }
    }
}
