//! Error types for enklu_core

use thiserror::Error;

use crate::element::ElementId;

/// Errors raised by the element graph and service plumbing
#[derive(Error, Debug)]
pub enum CoreError {
    /// The element id does not refer to a live element
    #[error("unknown element {0:?}")]
    UnknownElement(ElementId),

    /// Another element already uses this guid
    #[error("duplicate element guid: {0}")]
    DuplicateGuid(String),

    /// Reparenting would make an element its own ancestor
    #[error("cannot move {child:?} under its own descendant {parent:?}")]
    CyclicParent { child: ElementId, parent: ElementId },

    /// The graph root cannot be moved or destroyed
    #[error("operation not permitted on the graph root")]
    RootElement,

    /// A request finished with a non-success status
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A response body could not be decoded
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The producer side of a token went away without completing it
    #[error("token abandoned before completion")]
    Abandoned,

    /// Generic failure reported by a worker
    #[error("{0}")]
    Other(String),
}

/// Result type for enklu_core operations
pub type Result<T> = std::result::Result<T, CoreError>;
