//! Controller manager - owns every controller group in a scene

use crate::group::ElementControllerGroup;
use enklu_core::{ElementGraph, ElementId};
use slotmap::{new_key_type, SlotMap};
use tracing::debug;

new_key_type! {
    /// Handle to a group owned by the manager
    pub struct GroupId;
}

/// Owns controller groups and ticks them together
#[derive(Default)]
pub struct ElementControllerManager {
    groups: SlotMap<GroupId, ElementControllerGroup>,
}

impl ElementControllerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an active group tracking `root`
    pub fn create_group(&mut self, graph: &mut ElementGraph, root: ElementId) -> GroupId {
        let mut group = ElementControllerGroup::new(root);
        group.set_active(graph, true);
        let id = self.groups.insert(group);
        debug!(?id, ?root, "controller group created");
        id
    }

    /// Deactivate and drop a group, detaching all of its controllers
    pub fn destroy_group(&mut self, graph: &mut ElementGraph, id: GroupId) {
        if let Some(mut group) = self.groups.remove(id) {
            group.set_active(graph, false);
            debug!(?id, "controller group destroyed");
        }
    }

    pub fn group(&self, id: GroupId) -> Option<&ElementControllerGroup> {
        self.groups.get(id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut ElementControllerGroup> {
        self.groups.get_mut(id)
    }

    /// Apply pending graph mutations to every group
    pub fn update(&mut self, graph: &mut ElementGraph) {
        for (_, group) in self.groups.iter_mut() {
            group.update(graph);
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Filtered elements across all groups (an element in two groups counts twice)
    pub fn filtered_count(&self) -> usize {
        self.groups.values().map(|g| g.filtered_len()).sum()
    }
}
