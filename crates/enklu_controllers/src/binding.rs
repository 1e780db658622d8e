//! Controller bindings - one record per controller type within a group

use enklu_core::{ElementController, ElementGraph, ElementId};
use indexmap::IndexSet;
use std::any::Any;
use tracing::{debug, warn};

/// Binding of a controller type to a group's filtered elements
///
/// Holds the shared context passed to every instance and the set of elements
/// that currently carry a controller initialized through this binding.
/// Deactivating keeps the record (and its context) for later reuse.
pub struct ControllerBinding<T: ElementController> {
    active: bool,
    context: T::Context,
    controllers: IndexSet<ElementId>,
}

impl<T: ElementController> ControllerBinding<T> {
    pub(crate) fn new(context: T::Context) -> Self {
        Self {
            active: true,
            context,
            controllers: IndexSet::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn context(&self) -> &T::Context {
        &self.context
    }

    /// Elements carrying a controller from this binding, in attach order
    pub fn elements(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.controllers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub(crate) fn activate(&mut self, context: Option<T::Context>) {
        if let Some(context) = context {
            self.context = context;
        }
        self.active = true;
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    /// Attach a controller on `id`
    ///
    /// An existing `T` on the element is reused rather than replaced. The
    /// first binding to hold it initializes it with its context; a binding
    /// from another group that overlaps shares the instance untouched.
    pub(crate) fn attach(&mut self, graph: &mut ElementGraph, id: ElementId) {
        if self.controllers.contains(&id) {
            return;
        }
        match graph.acquire_controller::<T>(id) {
            Ok(true) => {
                let context = &self.context;
                graph.with_controller::<T, _>(id, |element, controller| {
                    controller.initialize(id, element, context);
                });
            }
            Ok(false) => {
                debug!(?id, "sharing {}", std::any::type_name::<T>());
            }
            Err(err) => {
                warn!("cannot attach {}: {}", std::any::type_name::<T>(), err);
                return;
            }
        }
        self.controllers.insert(id);
    }

    /// Release the controller on `id`, tearing it down if no other binding
    /// still holds it
    pub(crate) fn detach(&mut self, graph: &mut ElementGraph, id: ElementId) {
        if !self.controllers.shift_remove(&id) {
            return;
        }
        Self::release(graph, id);
    }

    pub(crate) fn detach_all(&mut self, graph: &mut ElementGraph) {
        for id in std::mem::take(&mut self.controllers) {
            Self::release(graph, id);
        }
    }

    fn release(graph: &mut ElementGraph, id: ElementId) {
        if let Some(mut controller) = graph.release_controller::<T>(id) {
            ElementController::uninitialize(&mut controller);
        }
    }
}

/// Type-erased binding so a group can apply all of its bindings to an
/// element without knowing their controller types
pub(crate) trait AnyBinding {
    fn is_active(&self) -> bool;

    fn attach(&mut self, graph: &mut ElementGraph, id: ElementId);

    fn detach(&mut self, graph: &mut ElementGraph, id: ElementId);

    /// Drop bookkeeping for an element the graph already tore down
    fn forget(&mut self, id: ElementId);

    fn detach_all(&mut self, graph: &mut ElementGraph);

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: ElementController> AnyBinding for ControllerBinding<T> {
    fn is_active(&self) -> bool {
        self.active
    }

    fn attach(&mut self, graph: &mut ElementGraph, id: ElementId) {
        ControllerBinding::attach(self, graph, id);
    }

    fn detach(&mut self, graph: &mut ElementGraph, id: ElementId) {
        ControllerBinding::detach(self, graph, id);
    }

    fn forget(&mut self, id: ElementId) {
        self.controllers.shift_remove(&id);
    }

    fn detach_all(&mut self, graph: &mut ElementGraph) {
        ControllerBinding::detach_all(self, graph);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
