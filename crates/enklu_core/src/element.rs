//! Element graph - the mutable scene tree
//!
//! Elements live in a slot-map arena owned by [`ElementGraph`]. Parents own
//! their children by id; the parent link is a back reference used for
//! hierarchy checks and teardown.
//!
//! # Mutation events
//!
//! Structural changes are recorded as [`GraphEvent`]s into one FIFO queue per
//! subscriber. Consumers (controller groups, tools) subscribe once and drain
//! their queue on their own tick, so every subscriber sees every mutation in
//! the order it happened.
//!
//! ```ignore
//! let mut graph = ElementGraph::new();
//! let sub = graph.subscribe();
//!
//! let cube = graph.create(graph.root(), "cube-1", "asset")?;
//! graph.destroy(cube);
//!
//! for event in graph.drain_events(sub) {
//!     println!("{:?}", event);
//! }
//! ```
//!
//! # Controllers
//!
//! Each element carries a typed controller map (at most one controller per
//! type). Destroying an element uninitializes and drops its controllers
//! after the removal event has been queued.

use crate::controller::{AnyController, ElementController};
use crate::error::{CoreError, Result};
use crate::math::Vec3;
use crate::schema::Schema;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use smallvec::SmallVec;
use std::any::TypeId;
use std::collections::VecDeque;
use tracing::{debug, warn};

new_key_type! {
    /// Unique identifier for an element in the graph
    pub struct ElementId;
    /// Handle to a mutation event queue
    pub struct SubscriptionId;
}

/// Kind assigned to the graph root
pub const ROOT_KIND: &str = "root";

/// A node in the scene tree
#[derive(Clone, Debug)]
pub struct Element {
    /// Stable id assigned by the authoring backend
    pub guid: String,
    /// Type tag (e.g. `"asset"`, `"light"`, `"scan"`)
    pub kind: String,
    /// Property bag
    pub schema: Schema,
    /// World-space position, written by the host each frame
    pub position: Vec3,
    parent: Option<ElementId>,
    children: SmallVec<[ElementId; 4]>,
}

impl Element {
    fn new(guid: String, kind: String, parent: Option<ElementId>) -> Self {
        Self {
            guid,
            kind,
            schema: Schema::new(),
            position: Vec3::ZERO,
            parent,
            children: SmallVec::new(),
        }
    }

    /// Parent element (None for the root)
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// A structural change to the graph
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
    /// `child` (and its subtree) was attached under `parent`
    ChildAdded { parent: ElementId, child: ElementId },
    /// `child` was detached from `parent`
    ///
    /// `subtree` lists `child` and all of its descendants, pre-order. When
    /// `destroyed` is true these ids are no longer valid; otherwise the
    /// subtree was moved and a matching `ChildAdded` follows.
    ChildRemoved {
        parent: ElementId,
        child: ElementId,
        subtree: SmallVec<[ElementId; 8]>,
        destroyed: bool,
    },
}

type ControllerMap = FxHashMap<TypeId, Box<dyn AnyController>>;

/// The scene tree plus per-element controller storage
pub struct ElementGraph {
    elements: SlotMap<ElementId, Element>,
    controllers: SecondaryMap<ElementId, ControllerMap>,
    holders: SecondaryMap<ElementId, FxHashMap<TypeId, u32>>,
    by_guid: FxHashMap<String, ElementId>,
    subscribers: SlotMap<SubscriptionId, VecDeque<GraphEvent>>,
    root: ElementId,
}

impl Default for ElementGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementGraph {
    /// Create a graph containing only the root element
    pub fn new() -> Self {
        let mut elements = SlotMap::with_key();
        let root = elements.insert(Element::new("root".to_string(), ROOT_KIND.to_string(), None));
        let mut controllers = SecondaryMap::new();
        controllers.insert(root, ControllerMap::default());
        let mut by_guid = FxHashMap::default();
        by_guid.insert("root".to_string(), root);

        Self {
            elements,
            controllers,
            holders: SecondaryMap::new(),
            by_guid,
            subscribers: SlotMap::with_key(),
            root,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Create a new element as the last child of `parent`
    pub fn create(
        &mut self,
        parent: ElementId,
        guid: impl Into<String>,
        kind: impl Into<String>,
    ) -> Result<ElementId> {
        let guid = guid.into();
        if !self.elements.contains_key(parent) {
            return Err(CoreError::UnknownElement(parent));
        }
        if self.by_guid.contains_key(&guid) {
            return Err(CoreError::DuplicateGuid(guid));
        }

        let child = self
            .elements
            .insert(Element::new(guid.clone(), kind.into(), Some(parent)));
        self.controllers.insert(child, ControllerMap::default());
        self.by_guid.insert(guid, child);
        self.elements[parent].children.push(child);

        self.emit(GraphEvent::ChildAdded { parent, child });
        Ok(child)
    }

    /// Destroy an element and its whole subtree
    ///
    /// Subscribers receive a single `ChildRemoved` for the subtree root.
    /// Controllers on every removed element are uninitialized and dropped.
    pub fn destroy(&mut self, id: ElementId) {
        if id == self.root {
            warn!("refusing to destroy the graph root");
            return;
        }
        let Some(parent) = self.elements.get(id).and_then(|e| e.parent) else {
            return;
        };

        let subtree: SmallVec<[ElementId; 8]> = self.descendants(id).into_iter().collect();
        self.emit(GraphEvent::ChildRemoved {
            parent,
            child: id,
            subtree: subtree.clone(),
            destroyed: true,
        });

        if let Some(node) = self.elements.get_mut(parent) {
            node.children.retain(|c| *c != id);
        }

        // Leaves first so children are torn down before their parents
        for &element in subtree.iter().rev() {
            self.holders.remove(element);
            if let Some(mut controllers) = self.controllers.remove(element) {
                for (_, controller) in controllers.iter_mut() {
                    controller.uninitialize();
                }
            }
            if let Some(node) = self.elements.remove(element) {
                self.by_guid.remove(&node.guid);
            }
        }

        debug!(count = subtree.len(), "destroyed element subtree");
    }

    /// Move an element (and its subtree) under a new parent
    pub fn reparent(&mut self, id: ElementId, new_parent: ElementId) -> Result<()> {
        if id == self.root {
            return Err(CoreError::RootElement);
        }
        let old_parent = self
            .elements
            .get(id)
            .and_then(|e| e.parent)
            .ok_or(CoreError::UnknownElement(id))?;
        if !self.elements.contains_key(new_parent) {
            return Err(CoreError::UnknownElement(new_parent));
        }
        if id == new_parent || self.is_ancestor(id, new_parent) {
            return Err(CoreError::CyclicParent {
                child: id,
                parent: new_parent,
            });
        }
        if old_parent == new_parent {
            return Ok(());
        }

        let subtree: SmallVec<[ElementId; 8]> = self.descendants(id).into_iter().collect();
        self.emit(GraphEvent::ChildRemoved {
            parent: old_parent,
            child: id,
            subtree,
            destroyed: false,
        });

        self.elements[old_parent].children.retain(|c| *c != id);
        self.elements[new_parent].children.push(id);
        self.elements[id].parent = Some(new_parent);

        self.emit(GraphEvent::ChildAdded {
            parent: new_parent,
            child: id,
        });
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    /// `id` and every element below it, pre-order
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if !self.elements.contains_key(id) {
            return out;
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(node) = self.elements.get(next) {
                // Reverse so the first child is visited first
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Whether `ancestor` is a strict ancestor of `id`
    pub fn is_ancestor(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether one element contains the other
    pub fn is_related(&self, a: ElementId, b: ElementId) -> bool {
        self.is_ancestor(a, b) || self.is_ancestor(b, a)
    }

    pub fn find_by_guid(&self, guid: &str) -> Option<ElementId> {
        self.by_guid.get(guid).copied()
    }

    /// Number of live elements, root included
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.elements.iter()
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// Open a new mutation queue; events are recorded from this point on
    pub fn subscribe(&mut self) -> SubscriptionId {
        self.subscribers.insert(VecDeque::new())
    }

    /// Close a queue, discarding undelivered events
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.remove(id);
    }

    /// Take all pending events for a subscriber, oldest first
    pub fn drain_events(&mut self, id: SubscriptionId) -> Vec<GraphEvent> {
        self.subscribers
            .get_mut(id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn has_pending_events(&self, id: SubscriptionId) -> bool {
        self.subscribers
            .get(id)
            .map(|queue| !queue.is_empty())
            .unwrap_or(false)
    }

    fn emit(&mut self, event: GraphEvent) {
        for (_, queue) in self.subscribers.iter_mut() {
            queue.push_back(event.clone());
        }
    }

    // =========================================================================
    // CONTROLLERS
    // =========================================================================

    /// Get a controller reference
    pub fn controller<T: ElementController>(&self, id: ElementId) -> Option<&T> {
        self.controllers
            .get(id)?
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<T>()
    }

    /// Get a mutable controller reference
    pub fn controller_mut<T: ElementController>(&mut self, id: ElementId) -> Option<&mut T> {
        self.controllers
            .get_mut(id)?
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// Check if an element carries a controller of type `T`
    pub fn has_controller<T: ElementController>(&self, id: ElementId) -> bool {
        self.controllers
            .get(id)
            .map(|map| map.contains_key(&TypeId::of::<T>()))
            .unwrap_or(false)
    }

    /// Attach a controller, replacing (and uninitializing) any existing one
    /// of the same type
    pub fn insert_controller<T: ElementController>(
        &mut self,
        id: ElementId,
        controller: T,
    ) -> Result<()> {
        let map = self
            .controllers
            .get_mut(id)
            .ok_or(CoreError::UnknownElement(id))?;
        if let Some(mut previous) = map.insert(TypeId::of::<T>(), Box::new(controller)) {
            previous.uninitialize();
        }
        Ok(())
    }

    /// Detach a controller without uninitializing it
    ///
    /// Outstanding holds on the controller are dropped with it.
    pub fn remove_controller<T: ElementController>(&mut self, id: ElementId) -> Option<T> {
        if let Some(counts) = self.holders.get_mut(id) {
            counts.remove(&TypeId::of::<T>());
        }
        let boxed = self.controllers.get_mut(id)?.remove(&TypeId::of::<T>())?;
        boxed.into_any().downcast::<T>().ok().map(|c| *c)
    }

    /// Run `f` with an element and one of its controllers borrowed together
    pub fn with_controller<T, R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&Element, &mut T) -> R,
    ) -> Option<R>
    where
        T: ElementController,
    {
        let element = self.elements.get(id)?;
        let controller = self
            .controllers
            .get_mut(id)?
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<T>()?;
        Some(f(element, controller))
    }

    /// Take a hold on the `T` controller of `id`, inserting a default one
    /// if the element has none
    ///
    /// Returns true for the first holder, which initializes the controller.
    /// Later holders share the instance as it is.
    pub fn acquire_controller<T: ElementController>(&mut self, id: ElementId) -> Result<bool> {
        if !self.has_controller::<T>(id) {
            self.insert_controller(id, T::default())?;
        }
        let count = self
            .holders
            .entry(id)
            .ok_or(CoreError::UnknownElement(id))?
            .or_default()
            .entry(TypeId::of::<T>())
            .or_insert(0);
        *count += 1;
        Ok(*count == 1)
    }

    /// Give up a hold on the `T` controller of `id`
    ///
    /// The last holder gets the controller back, detached from the element
    /// and still initialized. Earlier releases return None.
    pub fn release_controller<T: ElementController>(&mut self, id: ElementId) -> Option<T> {
        let type_id = TypeId::of::<T>();
        if let Some(count) = self.holders.get_mut(id).and_then(|c| c.get_mut(&type_id)) {
            if *count > 1 {
                *count -= 1;
                return None;
            }
        }
        self.remove_controller::<T>(id)
    }

    /// Number of holds on the `T` controller of `id`
    pub fn controller_holders<T: ElementController>(&self, id: ElementId) -> u32 {
        self.holders
            .get(id)
            .and_then(|counts| counts.get(&TypeId::of::<T>()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of controllers attached to an element
    pub fn controller_count(&self, id: ElementId) -> usize {
        self.controllers.get(id).map(|map| map.len()).unwrap_or(0)
    }
}
