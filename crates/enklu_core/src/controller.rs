//! Controllers - behavior objects bound to elements
//!
//! A controller is the unit of per-element behavior. Each element stores at
//! most one controller of a given type; the graph keeps them type-erased and
//! hands them back by type.
//!
//! ```ignore
//! #[derive(Default)]
//! struct Highlight {
//!     color: Option<u32>,
//! }
//!
//! impl ElementController for Highlight {
//!     type Context = u32;
//!
//!     fn initialize(&mut self, _id: ElementId, _element: &Element, color: &u32) {
//!         self.color = Some(*color);
//!     }
//!
//!     fn uninitialize(&mut self) {
//!         self.color = None;
//!     }
//! }
//! ```

use crate::element::{Element, ElementId};
use std::any::Any;

/// Behavior attached to an element
///
/// `Context` is shared by every controller of this type within one binding
/// and is passed by reference on initialization.
pub trait ElementController: Any + Default {
    /// Shared data handed to every instance on initialization
    type Context: Clone + 'static;

    /// Called when the controller is bound to a matching element
    fn initialize(&mut self, id: ElementId, element: &Element, context: &Self::Context);

    /// Called before the controller is detached or its element torn down
    fn uninitialize(&mut self);
}

/// Type-erased controller storage trait
pub trait AnyController: Any {
    /// Get as Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Get as mutable Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Convert into a boxed Any for by-value downcasting
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn uninitialize(&mut self);

    /// Type name for diagnostics
    fn type_name(&self) -> &'static str;
}

impl<T: ElementController> AnyController for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn uninitialize(&mut self) {
        ElementController::uninitialize(self);
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}
