//! Enklu Player Core
//!
//! Foundational types shared by the player subsystems:
//!
//! - **Element Graph**: the mutable scene tree, its mutation event queues,
//!   and per-element controller storage
//! - **Controllers**: typed behavior objects bound to elements
//! - **State Machines**: table-driven transitions for lifecycle state
//! - **Async Tokens**: results produced on worker threads, observed on tick
//! - **HTTP**: the service interface consumed for backend calls
//!
//! # Example
//!
//! ```rust
//! use enklu_core::element::ElementGraph;
//!
//! let mut graph = ElementGraph::new();
//! let events = graph.subscribe();
//!
//! let root = graph.root();
//! let cube = graph.create(root, "cube", "asset").unwrap();
//! assert_eq!(graph.parent(cube), Some(root));
//!
//! assert_eq!(graph.drain_events(events).len(), 1);
//! ```

pub mod controller;
pub mod element;
pub mod error;
pub mod fsm;
pub mod http;
pub mod math;
pub mod schema;
pub mod token;

pub use controller::{AnyController, ElementController};
pub use element::{Element, ElementGraph, ElementId, GraphEvent, SubscriptionId, ROOT_KIND};
pub use error::{CoreError, Result};
pub use fsm::{EventId, StateMachine, StateTransitions, Transition};
pub use http::{HttpResponse, HttpService, TrellisResponse};
pub use math::Vec3;
pub use schema::{Schema, SchemaValue};
pub use token::{AsyncToken, TokenPoll, TokenSource};
