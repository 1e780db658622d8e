//! Player runtime - owns every subsystem and drives them once per tick

use crate::config::PlayerConfig;
use enklu_anchor::{
    AnchorCache, AnchorMachine, AnchorNotification, AnchorProvider, AnchorRecord,
    FileAnchorCache, MemoryAnchorCache,
};
use enklu_controllers::{ElementControllerGroup, ElementControllerManager, GroupId};
use enklu_core::{CoreError, ElementGraph, ElementId, GraphEvent, HttpService, SubscriptionId};
use enklu_proximity::ProximityChecker;
use slotmap::{new_key_type, SlotMap};
use std::sync::Arc;
use tracing::{debug, info};

new_key_type! {
    /// Handle to an anchor driven by the player
    pub struct AnchorHandle;
}

struct AnchorSlot {
    element: ElementId,
    machine: AnchorMachine,
}

/// The player core for one scene
pub struct Player {
    config: PlayerConfig,
    graph: ElementGraph,
    controllers: ElementControllerManager,
    proximity: ProximityChecker,
    anchors: SlotMap<AnchorHandle, AnchorSlot>,
    provider: Arc<dyn AnchorProvider>,
    http: Arc<dyn HttpService>,
    cache: Arc<dyn AnchorCache>,
    graph_events: SubscriptionId,
    notifications: Vec<(AnchorHandle, AnchorNotification)>,
    ticks: u64,
}

impl Player {
    /// Create a player with an empty scene
    ///
    /// The anchor cache lives under `[anchors] cache_dir` when configured
    /// and in memory otherwise.
    pub fn new(
        config: PlayerConfig,
        provider: Arc<dyn AnchorProvider>,
        http: Arc<dyn HttpService>,
    ) -> Self {
        let cache: Arc<dyn AnchorCache> = match &config.anchors.cache_dir {
            Some(dir) => Arc::new(FileAnchorCache::new(dir.clone())),
            None => Arc::new(MemoryAnchorCache::new()),
        };
        Self::with_cache(config, provider, http, cache)
    }

    pub fn with_cache(
        config: PlayerConfig,
        provider: Arc<dyn AnchorProvider>,
        http: Arc<dyn HttpService>,
        cache: Arc<dyn AnchorCache>,
    ) -> Self {
        let mut graph = ElementGraph::new();
        let graph_events = graph.subscribe();
        let proximity = ProximityChecker::new(config.proximity);

        info!(
            app = %config.trellis.app_id,
            scene = %config.trellis.scene_id,
            "player created"
        );

        Self {
            config,
            graph,
            controllers: ElementControllerManager::new(),
            proximity,
            anchors: SlotMap::with_key(),
            provider,
            http,
            cache,
            graph_events,
            notifications: Vec::new(),
            ticks: 0,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn graph(&self) -> &ElementGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ElementGraph {
        &mut self.graph
    }

    pub fn controllers(&self) -> &ElementControllerManager {
        &self.controllers
    }

    pub fn proximity(&self) -> &ProximityChecker {
        &self.proximity
    }

    pub fn proximity_mut(&mut self) -> &mut ProximityChecker {
        &mut self.proximity
    }

    // =========================================================================
    // Controller groups
    // =========================================================================

    /// Create an active controller group over `root`'s subtree
    pub fn create_group(&mut self, root: ElementId) -> GroupId {
        self.controllers.create_group(&mut self.graph, root)
    }

    pub fn destroy_group(&mut self, id: GroupId) {
        self.controllers.destroy_group(&mut self.graph, id);
    }

    /// Run `f` with a group and the graph it operates on
    pub fn with_group<R>(
        &mut self,
        id: GroupId,
        f: impl FnOnce(&mut ElementControllerGroup, &mut ElementGraph) -> R,
    ) -> Option<R> {
        let group = self.controllers.group_mut(id)?;
        Some(f(group, &mut self.graph))
    }

    // =========================================================================
    // Anchors
    // =========================================================================

    /// Start driving an anchor attached to `element`
    pub fn add_anchor(
        &mut self,
        element: ElementId,
        record: AnchorRecord,
    ) -> enklu_core::Result<AnchorHandle> {
        if !self.graph.contains(element) {
            return Err(CoreError::UnknownElement(element));
        }

        let machine = AnchorMachine::new(
            record,
            self.config.endpoints(),
            Arc::clone(&self.provider),
            Arc::clone(&self.http),
            Arc::clone(&self.cache),
        );
        debug!(anchor = machine.id(), ?element, "anchor added");
        Ok(self.anchors.insert(AnchorSlot { element, machine }))
    }

    /// Start driving the anchor described by an element's schema
    ///
    /// The element's guid is the anchor id.
    pub fn add_element_anchor(&mut self, element: ElementId) -> enklu_core::Result<AnchorHandle> {
        let record = {
            let data = self
                .graph
                .get(element)
                .ok_or(CoreError::UnknownElement(element))?;
            AnchorRecord::from_schema(data.guid.clone(), &data.schema)
        };
        self.add_anchor(element, record)
    }

    /// Stop driving an anchor, aborting its in-flight work
    pub fn remove_anchor(&mut self, handle: AnchorHandle) -> Option<AnchorRecord> {
        self.anchors
            .remove(handle)
            .map(|slot| slot.machine.record().clone())
    }

    pub fn anchor(&self, handle: AnchorHandle) -> Option<&AnchorMachine> {
        self.anchors.get(handle).map(|slot| &slot.machine)
    }

    pub fn anchor_mut(&mut self, handle: AnchorHandle) -> Option<&mut AnchorMachine> {
        self.anchors.get_mut(handle).map(|slot| &mut slot.machine)
    }

    pub fn anchor_element(&self, handle: AnchorHandle) -> Option<ElementId> {
        self.anchors.get(handle).map(|slot| slot.element)
    }

    /// Anchor notifications gathered since the last call
    pub fn take_anchor_notifications(&mut self) -> Vec<(AnchorHandle, AnchorNotification)> {
        std::mem::take(&mut self.notifications)
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Advance one frame: controller groups, then anchors, then proximity
    pub fn tick(&mut self) {
        self.ticks += 1;

        self.controllers.update(&mut self.graph);
        self.drop_destroyed_anchors();
        self.update_anchors();
        self.proximity.update(&self.graph);
    }

    fn drop_destroyed_anchors(&mut self) {
        for event in self.graph.drain_events(self.graph_events) {
            let GraphEvent::ChildRemoved {
                subtree,
                destroyed: true,
                ..
            } = event
            else {
                continue;
            };
            self.anchors.retain(|handle, slot| {
                let keep = !subtree.contains(&slot.element);
                if !keep {
                    debug!(?handle, anchor = slot.machine.id(), "anchor element destroyed");
                }
                keep
            });
        }
    }

    fn update_anchors(&mut self) {
        for (handle, slot) in self.anchors.iter_mut() {
            slot.machine.update();

            for notification in slot.machine.take_notifications() {
                if let AnchorNotification::Saved { .. } = notification {
                    if let Some(element) = self.graph.get_mut(slot.element) {
                        slot.machine.record().write_schema(&mut element.schema);
                    }
                }
                self.notifications.push((handle, notification));
            }
        }
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            ticks: self.ticks,
            elements: self.graph.len(),
            groups: self.controllers.len(),
            filtered_elements: self.controllers.filtered_count(),
            anchors: self.anchors.len(),
            tracked_elements: self.proximity.tracked_len(),
            collisions: self.proximity.collision_count(),
        }
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player").field("stats", &self.stats()).finish()
    }
}

/// Statistics about the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub ticks: u64,
    pub elements: usize,
    pub groups: usize,
    pub filtered_elements: usize,
    pub anchors: usize,
    pub tracked_elements: usize,
    pub collisions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use enklu_anchor::testing::{FakeAnchorProvider, FakeHttpService};
    use enklu_anchor::AnchorState;
    use enklu_core::Vec3;

    fn player() -> (Player, Arc<FakeAnchorProvider>, Arc<FakeHttpService>) {
        let provider = Arc::new(FakeAnchorProvider::new());
        let http = Arc::new(FakeHttpService::new());
        let player = Player::new(PlayerConfig::default(), provider.clone(), http.clone());
        (player, provider, http)
    }

    #[test]
    fn test_new_player_is_empty() {
        let (player, _, _) = player();
        let stats = player.stats();
        assert_eq!(stats.elements, 1);
        assert_eq!(stats.groups, 0);
        assert_eq!(stats.anchors, 0);
        assert_eq!(stats.ticks, 0);
    }

    #[test]
    fn test_add_anchor_requires_element() {
        let (mut player, _, _) = player();
        let root = player.graph().root();
        let element = player.graph_mut().create(root, "anchor", "anchor").unwrap();
        player.graph_mut().destroy(element);

        let result = player.add_anchor(element, AnchorRecord::new("a"));
        assert!(matches!(result, Err(CoreError::UnknownElement(_))));
    }

    #[test]
    fn test_anchor_dropped_with_its_element() {
        let (mut player, _, http) = player();
        let root = player.graph().root();
        let element = player.graph_mut().create(root, "a1", "anchor").unwrap();

        let record = AnchorRecord::new("a1").with_version(1, "https://cdn.test/a1");
        let handle = player.add_anchor(element, record).unwrap();
        let (_, download) = http.take_request().unwrap();
        assert_eq!(player.anchor(handle).unwrap().state(), AnchorState::Loading);

        player.graph_mut().destroy(element);
        player.tick();

        assert!(player.anchor(handle).is_none());
        assert!(download.is_aborted());
    }

    #[test]
    fn test_element_anchor_reads_schema() {
        let (mut player, _, http) = player();
        let root = player.graph().root();
        let element = player.graph_mut().create(root, "anchor-7", "anchor").unwrap();
        AnchorRecord::new("ignored")
            .with_version(2, "https://cdn.test/anchor-7.v2")
            .write_schema(&mut player.graph_mut().get_mut(element).unwrap().schema);

        let handle = player.add_element_anchor(element).unwrap();
        let anchor = player.anchor(handle).unwrap();
        assert_eq!(anchor.id(), "anchor-7");
        assert_eq!(anchor.record().version, 2);
        assert_eq!(http.history()[0].url, "https://cdn.test/anchor-7.v2");
    }

    #[test]
    fn test_tick_runs_proximity() {
        let (mut player, _, _) = player();
        let root = player.graph().root();
        let a = player.graph_mut().create(root, "a", "asset").unwrap();
        let b = player.graph_mut().create(root, "b", "asset").unwrap();
        player.graph_mut().get_mut(b).unwrap().position = Vec3::new(10.0, 0.0, 0.0);

        player.proximity_mut().set_element_state(a, true, false);
        player.proximity_mut().set_element_state(b, false, true);
        player.tick();
        assert_eq!(player.stats().collisions, 0);

        player.graph_mut().get_mut(b).unwrap().position = Vec3::new(0.3, 0.0, 0.0);
        player.tick();
        assert_eq!(player.stats().collisions, 1);
        assert_eq!(player.stats().tracked_elements, 2);
        assert_eq!(player.stats().ticks, 2);
    }
}
