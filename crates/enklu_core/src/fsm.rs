//! Finite state machines driven by numeric input events
//!
//! States are user-defined `Copy` enums that map `(state, event)` pairs to a
//! next state in one `match`:
//!
//! ```ignore
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
//! enum Door {
//!     Open,
//!     Closed,
//! }
//!
//! const TOGGLE: u32 = 0;
//!
//! impl StateTransitions for Door {
//!     fn on_event(&self, event: u32) -> Option<Self> {
//!         match (self, event) {
//!             (Door::Open, TOGGLE) => Some(Door::Closed),
//!             (Door::Closed, TOGGLE) => Some(Door::Open),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut door = StateMachine::new(Door::Closed);
//! let transition = door.send(TOGGLE);
//! assert_eq!(transition.map(|t| t.to), Some(Door::Open));
//! ```
//!
//! The machine only answers *where* to go. Owners run exit/entry side effects
//! from the returned [`Transition`].

use std::hash::Hash;

/// Event identifier
pub type EventId = u32;

/// A state type with a transition table
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventId) -> Option<Self>;
}

/// A transition that was taken
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<S> {
    pub from: S,
    pub event: EventId,
    pub to: S,
}

/// Holds the current state and applies events to it
#[derive(Clone, Debug)]
pub struct StateMachine<S: StateTransitions> {
    current: S,
    previous: Option<S>,
}

impl<S: StateTransitions> StateMachine<S> {
    pub fn new(initial: S) -> Self {
        Self {
            current: initial,
            previous: None,
        }
    }

    pub fn current(&self) -> S {
        self.current
    }

    /// State before the last taken transition
    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    /// Apply an event; returns the transition if the table has one
    ///
    /// Self-transitions (`from == to`) are reported as well so owners can
    /// re-run entry actions.
    pub fn send(&mut self, event: EventId) -> Option<Transition<S>> {
        let to = self.current.on_event(event)?;
        let from = self.current;
        self.previous = Some(from);
        self.current = to;
        Some(Transition { from, event, to })
    }

    /// Whether the current state accepts an event
    pub fn can_send(&self, event: EventId) -> bool {
        self.current.on_event(event).is_some()
    }
}
