//! Enklu World Anchors
//!
//! Lifecycle of a persisted world anchor: import on load, user edits,
//! export and upload on save.
//!
//! ```text
//! Loading ─► Ready ⇄ Moving ─► Saving ─► Ready
//!    │                           │
//!    └────────► Error ◄──────────┘
//! ```
//!
//! The platform side (pose export/import) is reached through
//! [`AnchorProvider`], the backend through [`enklu_core::HttpService`]. Both
//! answer with tokens that [`AnchorMachine::update`] polls once per tick.

pub mod cache;
pub mod error;
pub mod machine;
pub mod provider;
pub mod record;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cache::{AnchorCache, FileAnchorCache, MemoryAnchorCache};
pub use error::{AnchorError, Result};
pub use machine::{AnchorMachine, AnchorNotification};
pub use provider::AnchorProvider;
pub use record::{AnchorEndpoints, AnchorRecord, AnchorUploadBody};
pub use state::{anchor_events, AnchorState};
