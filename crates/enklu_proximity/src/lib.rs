//! Enklu Proximity
//!
//! Enter/stay/exit notifications between elements that listen for and
//! elements that trigger proximity events.
//!
//! # Example
//!
//! ```rust
//! use enklu_core::{ElementGraph, Vec3};
//! use enklu_proximity::{ProximityChecker, ProximitySettings};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let mut graph = ElementGraph::new();
//! let root = graph.root();
//! let door = graph.create(root, "door", "asset").unwrap();
//! let player = graph.create(root, "player", "asset").unwrap();
//! graph.get_mut(player).unwrap().position = Vec3::new(0.6, 0.0, 0.0);
//!
//! let entered = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&entered);
//!
//! let mut checker = ProximityChecker::new(ProximitySettings::default());
//! checker.on_enter(move |_listener, _trigger| counter.set(counter.get() + 1));
//! checker.set_element_state(door, true, false);
//! checker.set_element_state(player, false, true);
//!
//! checker.update(&graph);
//! assert_eq!(entered.get(), 1);
//! ```

pub mod checker;
pub mod settings;

pub use checker::{ProximityCallback, ProximityChecker};
pub use settings::{EntityConfig, ProximitySettings};
