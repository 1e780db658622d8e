//! Enklu Element Controllers
//!
//! Keeps typed controllers bound to a filtered, live view of the element
//! graph:
//!
//! - **Filters**: predicates deciding which elements a group tracks
//! - **Bindings**: per-controller-type records (active flag, shared context,
//!   attached elements)
//! - **Groups**: filtered membership over a subtree, reacting to graph
//!   mutations
//! - **Manager**: owns the groups of a scene and ticks them
//!
//! # Example
//!
//! ```rust
//! use enklu_controllers::{ElementControllerManager, TypeFilter};
//! use enklu_core::{Element, ElementController, ElementGraph, ElementId};
//!
//! #[derive(Default)]
//! struct Glow {
//!     intensity: f32,
//! }
//!
//! impl ElementController for Glow {
//!     type Context = f32;
//!
//!     fn initialize(&mut self, _id: ElementId, _element: &Element, intensity: &f32) {
//!         self.intensity = *intensity;
//!     }
//!
//!     fn uninitialize(&mut self) {
//!         self.intensity = 0.0;
//!     }
//! }
//!
//! let mut graph = ElementGraph::new();
//! let mut manager = ElementControllerManager::new();
//! let root = graph.root();
//! let group = manager.create_group(&mut graph, root);
//!
//! let g = manager.group_mut(group).unwrap();
//! g.filter(&mut graph, TypeFilter::new(["asset"]));
//! g.add::<Glow>(&mut graph, 0.8);
//!
//! let cube = graph.create(root, "cube", "asset").unwrap();
//! manager.update(&mut graph);
//! assert_eq!(graph.controller::<Glow>(cube).unwrap().intensity, 0.8);
//! ```

pub mod binding;
pub mod filter;
pub mod group;
pub mod manager;

pub use binding::ControllerBinding;
pub use filter::{DistanceFilter, ElementFilter, PropertyFilter, TypeFilter};
pub use group::{ElementControllerGroup, FilterId};
pub use manager::{ElementControllerManager, GroupId};
