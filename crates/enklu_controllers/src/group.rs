//! Element-controller groups
//!
//! A group keeps a filtered view over the subtree under its root element and
//! keeps controller bindings in sync with that view as the graph mutates.
//!
//! ```ignore
//! let mut group = ElementControllerGroup::new(graph.root());
//! group.set_active(&mut graph, true);
//!
//! // Only assets take part
//! group.filter(&mut graph, TypeFilter::new(["asset"]));
//!
//! // Every filtered asset gets a Highlight controller sharing one color
//! group.add::<Highlight>(&mut graph, 0xff00ff);
//!
//! // Elements created later pick up the binding on the next update
//! graph.create(graph.root(), "cube", "asset")?;
//! group.update(&mut graph);
//! ```
//!
//! # Membership
//!
//! The filtered set is exactly the elements of the root's subtree (root
//! included) that pass every active filter. Adding a filter can only shrink
//! the set, so it is evaluated against current members only; removing one
//! triggers a full re-scan.

use crate::binding::{AnyBinding, ControllerBinding};
use crate::filter::ElementFilter;
use enklu_core::{ElementController, ElementGraph, ElementId, GraphEvent, SubscriptionId};
use indexmap::{IndexMap, IndexSet};
use slotmap::{new_key_type, SlotMap};
use std::any::TypeId;
use tracing::{debug, warn};

new_key_type! {
    /// Handle to a filter registered on a group
    pub struct FilterId;
}

/// Filtered view over a subtree with controller bindings
pub struct ElementControllerGroup {
    root: ElementId,
    filters: SlotMap<FilterId, Box<dyn ElementFilter>>,
    bindings: IndexMap<TypeId, Box<dyn AnyBinding>>,
    filtered: IndexSet<ElementId>,
    subscription: Option<SubscriptionId>,
}

impl ElementControllerGroup {
    /// Create an inactive group tracking `root` and its descendants
    pub fn new(root: ElementId) -> Self {
        Self {
            root,
            filters: SlotMap::with_key(),
            bindings: IndexMap::new(),
            filtered: IndexSet::new(),
            subscription: None,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Start or stop tracking
    ///
    /// Activating subscribes to graph mutations and scans the subtree.
    /// Deactivating unsubscribes, detaches every controller, and clears the
    /// filtered set. Bindings and filters are kept either way.
    pub fn set_active(&mut self, graph: &mut ElementGraph, active: bool) {
        if active == self.is_active() {
            return;
        }

        if active {
            self.subscription = Some(graph.subscribe());
            self.reapply(graph);
        } else {
            if let Some(subscription) = self.subscription.take() {
                graph.unsubscribe(subscription);
            }
            for id in std::mem::take(&mut self.filtered) {
                for binding in self.bindings.values_mut() {
                    if binding.is_active() {
                        binding.detach(graph, id);
                    }
                }
            }
        }
        debug!(active, root = ?self.root, "controller group toggled");
    }

    // =========================================================================
    // FILTERS
    // =========================================================================

    /// Add a filter; current members that fail it are dropped
    pub fn filter<F>(&mut self, graph: &mut ElementGraph, filter: F) -> FilterId
    where
        F: ElementFilter + 'static,
    {
        self.update(graph);

        let failing: Vec<ElementId> = self
            .filtered
            .iter()
            .copied()
            .filter(|&id| match graph.get(id) {
                Some(element) => !filter.include(graph, id, element),
                None => true,
            })
            .collect();

        for id in failing {
            self.exclude(graph, id);
        }
        self.filters.insert(Box::new(filter))
    }

    /// Remove a filter and re-scan the subtree
    pub fn unfilter(&mut self, graph: &mut ElementGraph, id: FilterId) {
        self.update(graph);

        if self.filters.remove(id).is_none() {
            warn!("unfilter called with unknown filter {:?}", id);
            return;
        }
        if self.is_active() {
            self.reapply(graph);
        }
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    // =========================================================================
    // BINDINGS
    // =========================================================================

    /// Bind controller type `T` to every filtered element
    ///
    /// Creates the binding on first use; an inactive binding is reactivated
    /// with the new context. Adding a type that is already active is a no-op.
    pub fn add<T: ElementController>(&mut self, graph: &mut ElementGraph, context: T::Context) {
        self.activate_binding::<T>(graph, Some(context));
    }

    /// Reactivate a removed binding with the context it had before
    ///
    /// Returns false if `T` was never added.
    pub fn resume<T: ElementController>(&mut self, graph: &mut ElementGraph) -> bool {
        if !self.bindings.contains_key(&TypeId::of::<T>()) {
            return false;
        }
        self.activate_binding::<T>(graph, None);
        true
    }

    fn activate_binding<T: ElementController>(
        &mut self,
        graph: &mut ElementGraph,
        context: Option<T::Context>,
    ) {
        self.update(graph);

        let type_id = TypeId::of::<T>();
        match self.bindings.get_mut(&type_id) {
            Some(existing) if existing.is_active() => {
                warn!("{} is already bound", std::any::type_name::<T>());
                return;
            }
            Some(existing) => {
                if let Some(binding) = existing.as_any_mut().downcast_mut::<ControllerBinding<T>>()
                {
                    binding.activate(context);
                }
            }
            None => {
                let Some(context) = context else {
                    return;
                };
                self.bindings
                    .insert(type_id, Box::new(ControllerBinding::<T>::new(context)));
            }
        }

        let Some(binding) = self
            .bindings
            .get_mut(&type_id)
            .and_then(|b| b.as_any_mut().downcast_mut::<ControllerBinding<T>>())
        else {
            return;
        };
        for &id in &self.filtered {
            binding.attach(graph, id);
        }
        debug!(
            controller = std::any::type_name::<T>(),
            count = binding.len(),
            "binding activated"
        );
    }

    /// Unbind controller type `T`, keeping its context for reuse
    pub fn remove<T: ElementController>(&mut self, graph: &mut ElementGraph) {
        self.update(graph);

        let Some(binding) = self.binding_mut::<T>() else {
            return;
        };
        if !binding.is_active() {
            return;
        }
        binding.detach_all(graph);
        binding.deactivate();
    }

    /// Append every live `T` controller in this group to `out`
    pub fn all<'g, T: ElementController>(&self, graph: &'g ElementGraph, out: &mut Vec<&'g T>) {
        let Some(binding) = self.binding::<T>() else {
            return;
        };
        out.extend(binding.elements().filter_map(|id| graph.controller::<T>(id)));
    }

    pub fn binding<T: ElementController>(&self) -> Option<&ControllerBinding<T>> {
        self.bindings
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ControllerBinding<T>>()
    }

    fn binding_mut<T: ElementController>(&mut self) -> Option<&mut ControllerBinding<T>> {
        self.bindings
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ControllerBinding<T>>()
    }

    /// Shared context of a binding, whether or not it is active
    pub fn binding_context<T: ElementController>(&self) -> Option<&T::Context> {
        self.binding::<T>().map(|b| b.context())
    }

    /// Live controllers of type `T` (zero while the binding is inactive)
    pub fn controller_count<T: ElementController>(&self) -> usize {
        self.binding::<T>().map(|b| b.len()).unwrap_or(0)
    }

    // =========================================================================
    // MEMBERSHIP
    // =========================================================================

    /// Currently filtered elements, in the order they joined
    pub fn filtered(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.filtered.iter().copied()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_filtered(&self, id: ElementId) -> bool {
        self.filtered.contains(&id)
    }

    /// Apply pending graph mutations
    pub fn update(&mut self, graph: &mut ElementGraph) {
        let Some(subscription) = self.subscription else {
            return;
        };

        for event in graph.drain_events(subscription) {
            match event {
                GraphEvent::ChildAdded { child, .. } => {
                    if !self.tracks(graph, child) {
                        continue;
                    }
                    for id in graph.descendants(child) {
                        self.include(graph, id);
                    }
                }
                GraphEvent::ChildRemoved {
                    subtree,
                    destroyed: false,
                    ..
                } if subtree.contains(&self.root) => {
                    // The root or one of its ancestors moved; the tracked
                    // subtree moved with it unchanged
                    debug!(root = ?self.root, "group root moved");
                }
                GraphEvent::ChildRemoved {
                    subtree, destroyed, ..
                } => {
                    for id in subtree {
                        if destroyed {
                            if self.filtered.shift_remove(&id) {
                                for binding in self.bindings.values_mut() {
                                    binding.forget(id);
                                }
                            }
                        } else {
                            self.exclude(graph, id);
                        }
                    }
                }
            }
        }
    }

    /// Recompute membership from scratch against the current filters
    pub fn reapply(&mut self, graph: &mut ElementGraph) {
        // Drop queued events; the scan below observes the current tree
        if let Some(subscription) = self.subscription {
            graph.drain_events(subscription);
        }

        let candidates = graph.descendants(self.root);
        let wanted: IndexSet<ElementId> = candidates
            .into_iter()
            .filter(|&id| self.passes(graph, id))
            .collect();

        let stale: Vec<ElementId> = self
            .filtered
            .iter()
            .copied()
            .filter(|id| !wanted.contains(id))
            .collect();
        for id in stale {
            self.exclude(graph, id);
        }
        for id in wanted {
            self.include(graph, id);
        }
    }

    fn tracks(&self, graph: &ElementGraph, id: ElementId) -> bool {
        graph.contains(id) && (id == self.root || graph.is_ancestor(self.root, id))
    }

    fn passes(&self, graph: &ElementGraph, id: ElementId) -> bool {
        let Some(element) = graph.get(id) else {
            return false;
        };
        self.filters
            .values()
            .all(|filter| filter.include(graph, id, element))
    }

    fn include(&mut self, graph: &mut ElementGraph, id: ElementId) {
        if self.filtered.contains(&id) || !self.passes(graph, id) {
            return;
        }
        self.filtered.insert(id);
        for binding in self.bindings.values_mut() {
            if binding.is_active() {
                binding.attach(graph, id);
            }
        }
    }

    fn exclude(&mut self, graph: &mut ElementGraph, id: ElementId) {
        if !self.filtered.shift_remove(&id) {
            return;
        }
        for binding in self.bindings.values_mut() {
            if binding.is_active() {
                binding.detach(graph, id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PropertyFilter, TypeFilter};
    use enklu_core::Element;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct Tag {
        label: Option<String>,
        log: Option<Log>,
        inits: u32,
    }

    impl ElementController for Tag {
        type Context = (String, Log);

        fn initialize(&mut self, _id: ElementId, element: &Element, context: &Self::Context) {
            self.label = Some(context.0.clone());
            self.log = Some(context.1.clone());
            self.inits += 1;
            context.1.borrow_mut().push(format!("init {}", element.guid));
        }

        fn uninitialize(&mut self) {
            if let Some(log) = &self.log {
                log.borrow_mut().push("uninit".to_string());
            }
            self.label = None;
        }
    }

    #[derive(Default)]
    struct Counter;

    impl ElementController for Counter {
        type Context = ();

        fn initialize(&mut self, _id: ElementId, _element: &Element, _context: &()) {}

        fn uninitialize(&mut self) {}
    }

    fn ctx(label: &str, log: &Log) -> (String, Log) {
        (label.to_string(), log.clone())
    }

    /// root -> [a (asset), b (light) -> [c (asset)]]
    fn scene() -> (ElementGraph, ElementId, ElementId, ElementId) {
        let mut graph = ElementGraph::new();
        let root = graph.root();
        let a = graph.create(root, "a", "asset").unwrap();
        let b = graph.create(root, "b", "light").unwrap();
        let c = graph.create(b, "c", "asset").unwrap();
        (graph, a, b, c)
    }

    fn active_group(graph: &mut ElementGraph) -> ElementControllerGroup {
        let mut group = ElementControllerGroup::new(graph.root());
        group.set_active(graph, true);
        group
    }

    #[test]
    fn test_activation_scans_subtree() {
        let (mut graph, a, b, c) = scene();
        let group = active_group(&mut graph);

        assert!(group.is_active());
        assert_eq!(group.filtered_len(), 4);
        for id in [graph.root(), a, b, c] {
            assert!(group.is_filtered(id));
        }
    }

    #[test]
    fn test_filter_only_shrinks() {
        let (mut graph, a, b, c) = scene();
        let mut group = active_group(&mut graph);
        let log = Log::default();
        group.add::<Tag>(&mut graph, ctx("t", &log));

        group.filter(&mut graph, TypeFilter::new(["asset"]));
        assert_eq!(group.filtered().collect::<Vec<_>>(), vec![a, c]);
        assert!(!group.is_filtered(b));

        // Dropped members lost their controllers
        assert!(!graph.has_controller::<Tag>(b));
        assert!(!graph.has_controller::<Tag>(graph.root()));
        assert_eq!(group.controller_count::<Tag>(), 2);
    }

    #[test]
    fn test_unfilter_regrows_membership() {
        let (mut graph, a, b, c) = scene();
        let mut group = active_group(&mut graph);
        let assets = group.filter(&mut graph, TypeFilter::new(["asset"]));
        graph.get_mut(a).unwrap().schema.set("visible", true);
        let visible = group.filter(&mut graph, PropertyFilter::new("visible", true));
        assert_eq!(group.filtered().collect::<Vec<_>>(), vec![a]);

        group.unfilter(&mut graph, visible);
        assert_eq!(group.filtered_len(), 2);
        assert!(group.is_filtered(c));

        group.unfilter(&mut graph, assets);
        assert_eq!(group.filtered_len(), 4);
        assert!(group.is_filtered(b));
        assert_eq!(group.filter_count(), 0);

        // Unknown id is ignored
        group.unfilter(&mut graph, assets);
        assert_eq!(group.filtered_len(), 4);
    }

    #[test]
    fn test_membership_matches_filter_conjunction() {
        let (mut graph, a, _b, c) = scene();
        graph.get_mut(c).unwrap().schema.set("visible", true);
        let mut group = active_group(&mut graph);

        let f1 = group.filter(&mut graph, TypeFilter::new(["asset"]));
        let f2 = group.filter(&mut graph, PropertyFilter::new("visible", true));
        group.unfilter(&mut graph, f1);
        let f3 = group.filter(&mut graph, |e: &Element| e.guid != "root");
        group.reapply(&mut graph);
        group.reapply(&mut graph);

        // Only f2 and f3 remain: visible and not root
        assert_eq!(group.filtered().collect::<Vec<_>>(), vec![c]);
        assert!(!group.is_filtered(a));

        group.unfilter(&mut graph, f2);
        group.unfilter(&mut graph, f3);
        assert_eq!(group.filtered_len(), 4);
    }

    #[test]
    fn test_add_attaches_one_controller_per_member() {
        let (mut graph, a, _b, c) = scene();
        let mut group = active_group(&mut graph);
        group.filter(&mut graph, TypeFilter::new(["asset"]));
        let log = Log::default();

        group.add::<Tag>(&mut graph, ctx("blue", &log));
        group.add::<Counter>(&mut graph, ());

        assert_eq!(group.controller_count::<Tag>(), group.filtered_len());
        assert_eq!(group.controller_count::<Counter>(), group.filtered_len());
        for id in [a, c] {
            let tag = graph.controller::<Tag>(id).unwrap();
            assert_eq!(tag.label.as_deref(), Some("blue"));
            assert_eq!(tag.inits, 1);
        }

        let mut all: Vec<&Tag> = Vec::new();
        group.all::<Tag>(&graph, &mut all);
        assert_eq!(all.len(), 2);

        // Adding the same active type again does nothing
        group.add::<Tag>(&mut graph, ctx("red", &log));
        assert_eq!(group.binding_context::<Tag>().unwrap().0, "blue");
        assert_eq!(graph.controller::<Tag>(a).unwrap().inits, 1);
    }

    #[test]
    fn test_add_reuses_existing_controller() {
        let (mut graph, a, _b, _c) = scene();
        graph
            .insert_controller(
                a,
                Tag {
                    inits: 5,
                    ..Default::default()
                },
            )
            .unwrap();

        let mut group = active_group(&mut graph);
        let log = Log::default();
        group.add::<Tag>(&mut graph, ctx("x", &log));

        let tag = graph.controller::<Tag>(a).unwrap();
        assert_eq!(tag.inits, 6);
        assert_eq!(tag.label.as_deref(), Some("x"));
    }

    #[test]
    fn test_remove_keeps_context_and_other_bindings() {
        let (mut graph, a, _b, _c) = scene();
        let mut group = active_group(&mut graph);
        let log = Log::default();
        group.add::<Tag>(&mut graph, ctx("keep", &log));
        group.add::<Counter>(&mut graph, ());

        group.remove::<Tag>(&mut graph);
        assert_eq!(group.controller_count::<Tag>(), 0);
        assert!(!graph.has_controller::<Tag>(a));
        assert!(graph.has_controller::<Counter>(a));
        assert_eq!(group.binding_context::<Tag>().unwrap().0, "keep");
        let uninits = log.borrow().iter().filter(|l| *l == "uninit").count();
        assert_eq!(uninits, 4);

        // Double removal is a no-op
        group.remove::<Tag>(&mut graph);
        assert_eq!(log.borrow().iter().filter(|l| *l == "uninit").count(), 4);

        // Resume restores the retained context
        assert!(group.resume::<Tag>(&mut graph));
        assert_eq!(group.controller_count::<Tag>(), group.filtered_len());
        assert_eq!(graph.controller::<Tag>(a).unwrap().label.as_deref(), Some("keep"));

        // Resuming an active binding changes nothing
        assert!(group.resume::<Tag>(&mut graph));
        assert_eq!(group.controller_count::<Tag>(), 4);
    }

    #[test]
    fn test_readd_after_remove_uses_new_context() {
        let (mut graph, a, _b, _c) = scene();
        let mut group = active_group(&mut graph);
        let log = Log::default();
        group.add::<Tag>(&mut graph, ctx("first", &log));
        group.remove::<Tag>(&mut graph);
        group.add::<Tag>(&mut graph, ctx("second", &log));

        assert_eq!(group.controller_count::<Tag>(), group.filtered_len());
        assert_eq!(graph.controller::<Tag>(a).unwrap().label.as_deref(), Some("second"));
    }

    #[test]
    fn test_resume_unknown_binding() {
        let (mut graph, _a, _b, _c) = scene();
        let mut group = active_group(&mut graph);
        assert!(!group.resume::<Counter>(&mut graph));
    }

    #[test]
    fn test_child_added_and_removed() {
        let (mut graph, _a, b, _c) = scene();
        let mut group = active_group(&mut graph);
        group.filter(&mut graph, TypeFilter::new(["asset"]));
        let log = Log::default();
        group.add::<Tag>(&mut graph, ctx("t", &log));

        let d = graph.create(b, "d", "asset").unwrap();
        let e = graph.create(d, "e", "asset").unwrap();
        let f = graph.create(d, "f", "light").unwrap();
        group.update(&mut graph);

        assert!(group.is_filtered(d));
        assert!(group.is_filtered(e));
        assert!(!group.is_filtered(f));
        assert!(graph.has_controller::<Tag>(e));
        assert_eq!(group.controller_count::<Tag>(), group.filtered_len());

        graph.destroy(d);
        group.update(&mut graph);
        assert!(!group.is_filtered(d));
        assert!(!group.is_filtered(e));
        assert_eq!(group.controller_count::<Tag>(), group.filtered_len());
        assert_eq!(group.filtered_len(), 2);
    }

    #[test]
    fn test_add_then_destroy_before_update() {
        let (mut graph, _a, _b, _c) = scene();
        let mut group = active_group(&mut graph);
        let before = group.filtered_len();

        let temp = graph.create(graph.root(), "temp", "asset").unwrap();
        graph.destroy(temp);
        group.update(&mut graph);

        assert_eq!(group.filtered_len(), before);
        assert!(!group.is_filtered(temp));
    }

    #[test]
    fn test_reparent_in_and_out_of_root() {
        let mut graph = ElementGraph::new();
        let root = graph.root();
        let inside = graph.create(root, "inside", "asset").unwrap();
        let outside = graph.create(root, "outside", "asset").unwrap();
        let mover = graph.create(outside, "mover", "asset").unwrap();

        let mut group = ElementControllerGroup::new(inside);
        group.set_active(&mut graph, true);
        group.add::<Counter>(&mut graph, ());
        assert_eq!(group.filtered_len(), 1);

        graph.reparent(mover, inside).unwrap();
        group.update(&mut graph);
        assert!(group.is_filtered(mover));
        assert!(graph.has_controller::<Counter>(mover));

        graph.reparent(mover, outside).unwrap();
        group.update(&mut graph);
        assert!(!group.is_filtered(mover));
        assert!(!graph.has_controller::<Counter>(mover));
        assert_eq!(group.controller_count::<Counter>(), 1);
    }

    #[test]
    fn test_moving_root_ancestor_keeps_membership() {
        let mut graph = ElementGraph::new();
        let root = graph.root();
        let holder = graph.create(root, "holder", "asset").unwrap();
        let other = graph.create(root, "other", "asset").unwrap();
        let scope = graph.create(holder, "scope", "asset").unwrap();
        let item = graph.create(scope, "item", "asset").unwrap();
        let sibling = graph.create(holder, "sibling", "asset").unwrap();

        let mut group = ElementControllerGroup::new(scope);
        group.set_active(&mut graph, true);
        let log = Log::default();
        group.add::<Tag>(&mut graph, ctx("t", &log));
        assert_eq!(group.filtered_len(), 2);

        graph.reparent(holder, other).unwrap();
        group.update(&mut graph);

        assert_eq!(group.filtered().collect::<Vec<_>>(), vec![scope, item]);
        assert!(!group.is_filtered(sibling));
        assert_eq!(group.controller_count::<Tag>(), 2);
        assert_eq!(graph.controller::<Tag>(item).unwrap().inits, 1);
        assert!(!log.borrow().iter().any(|l| l == "uninit"));

        // Moving the root itself is the same
        graph.reparent(scope, root).unwrap();
        group.update(&mut graph);
        assert_eq!(group.filtered_len(), 2);
        assert!(graph.has_controller::<Tag>(scope));

        // Later mutations under the moved root are still tracked
        let late = graph.create(item, "late", "asset").unwrap();
        group.update(&mut graph);
        assert!(group.is_filtered(late));
        assert_eq!(group.controller_count::<Tag>(), 3);
    }

    #[test]
    fn test_overlapping_groups_share_controller() {
        let (mut graph, a, _b, _c) = scene();
        let log = Log::default();
        let mut outer = active_group(&mut graph);
        outer.add::<Tag>(&mut graph, ctx("outer", &log));

        let mut inner = ElementControllerGroup::new(a);
        inner.set_active(&mut graph, true);
        inner.add::<Tag>(&mut graph, ctx("inner", &log));

        // One instance, initialized once by the first binding
        let tag = graph.controller::<Tag>(a).unwrap();
        assert_eq!(tag.inits, 1);
        assert_eq!(tag.label.as_deref(), Some("outer"));
        assert_eq!(graph.controller_holders::<Tag>(a), 2);
        assert_eq!(inner.controller_count::<Tag>(), 1);

        outer.remove::<Tag>(&mut graph);
        assert_eq!(outer.controller_count::<Tag>(), 0);
        assert_eq!(log.borrow().iter().filter(|l| *l == "uninit").count(), 3);
        assert!(graph.has_controller::<Tag>(a));
        assert_eq!(inner.controller_count::<Tag>(), 1);
        let mut live: Vec<&Tag> = Vec::new();
        inner.all::<Tag>(&graph, &mut live);
        assert_eq!(live.len(), 1);

        inner.remove::<Tag>(&mut graph);
        assert!(!graph.has_controller::<Tag>(a));
        assert_eq!(log.borrow().iter().filter(|l| *l == "uninit").count(), 4);
    }

    #[test]
    fn test_ignores_mutations_outside_root() {
        let mut graph = ElementGraph::new();
        let root = graph.root();
        let scope = graph.create(root, "scope", "asset").unwrap();
        let mut group = ElementControllerGroup::new(scope);
        group.set_active(&mut graph, true);

        graph.create(root, "elsewhere", "asset").unwrap();
        group.update(&mut graph);
        assert_eq!(group.filtered_len(), 1);
    }

    #[test]
    fn test_deactivate_clears_but_keeps_bindings() {
        let (mut graph, a, _b, _c) = scene();
        let mut group = active_group(&mut graph);
        let log = Log::default();
        group.add::<Tag>(&mut graph, ctx("t", &log));

        group.set_active(&mut graph, false);
        assert_eq!(group.filtered_len(), 0);
        assert_eq!(group.controller_count::<Tag>(), 0);
        assert!(!graph.has_controller::<Tag>(a));

        // Mutations while inactive are not tracked
        graph.create(graph.root(), "late", "asset").unwrap();
        group.update(&mut graph);
        assert_eq!(group.filtered_len(), 0);

        group.set_active(&mut graph, true);
        assert_eq!(group.filtered_len(), 5);
        assert_eq!(group.controller_count::<Tag>(), 5);
        assert!(graph.has_controller::<Tag>(a));
    }
}
