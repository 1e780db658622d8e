//! Pairwise proximity detection between tracked elements
//!
//! Every tick the checker compares each pair of tracked elements on the
//! horizontal plane. A pair collides once the sum of their inner radii
//! reaches past their distance, and stays colliding until the sum of their
//! outer radii no longer does. The gap between the two radii keeps a pair
//! from flickering at the boundary.
//!
//! Callbacks receive `(listener, trigger)`. A pair where each side both
//! listens and triggers dispatches in both directions.

use crate::settings::{EntityConfig, ProximitySettings};
use enklu_core::{ElementGraph, ElementId};
use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::{debug, warn};

/// Callback invoked with `(listener, trigger)`
pub type ProximityCallback = Box<dyn FnMut(ElementId, ElementId)>;

/// Unordered element pair, stored low key first
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PairKey(ElementId, ElementId);

impl PairKey {
    fn new(a: ElementId, b: ElementId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    fn involves(&self, id: ElementId) -> bool {
        self.0 == id || self.1 == id
    }
}

/// An active collision and the directions it dispatches in
#[derive(Clone, Copy, Debug)]
struct Collision {
    a: ElementId,
    b: ElementId,
    /// `a` listens, `b` triggers
    a_listens: bool,
    /// `b` listens, `a` triggers
    b_listens: bool,
}

impl Collision {
    fn dispatch(&self, callback: &mut Option<ProximityCallback>) {
        let Some(callback) = callback else {
            return;
        };
        if self.a_listens {
            callback(self.a, self.b);
        }
        if self.b_listens {
            callback(self.b, self.a);
        }
    }
}

/// Fires enter/stay/exit callbacks for nearby listener/trigger pairs
pub struct ProximityChecker {
    settings: ProximitySettings,
    entities: IndexMap<ElementId, EntityConfig>,
    collisions: IndexMap<PairKey, Collision>,
    on_enter: Option<ProximityCallback>,
    on_stay: Option<ProximityCallback>,
    on_exit: Option<ProximityCallback>,
}

impl Default for ProximityChecker {
    fn default() -> Self {
        Self::new(ProximitySettings::default())
    }
}

impl ProximityChecker {
    pub fn new(settings: ProximitySettings) -> Self {
        Self {
            settings,
            entities: IndexMap::new(),
            collisions: IndexMap::new(),
            on_enter: None,
            on_stay: None,
            on_exit: None,
        }
    }

    pub fn settings(&self) -> &ProximitySettings {
        &self.settings
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Called once when a pair starts colliding
    pub fn on_enter<F>(&mut self, callback: F)
    where
        F: FnMut(ElementId, ElementId) + 'static,
    {
        self.on_enter = Some(Box::new(callback));
    }

    /// Called on every later tick the pair is still colliding
    pub fn on_stay<F>(&mut self, callback: F)
    where
        F: FnMut(ElementId, ElementId) + 'static,
    {
        self.on_stay = Some(Box::new(callback));
    }

    /// Called once when a pair stops colliding, including forced exits
    pub fn on_exit<F>(&mut self, callback: F)
    where
        F: FnMut(ElementId, ElementId) + 'static,
    {
        self.on_exit = Some(Box::new(callback));
    }

    // =========================================================================
    // Tracking
    // =========================================================================

    /// Track an element with the given roles
    ///
    /// Radii of an already tracked element are kept. Clearing both roles
    /// stops tracking and exits every collision the element is part of.
    pub fn set_element_state(&mut self, element: ElementId, is_listening: bool, is_trigger: bool) {
        if !is_listening && !is_trigger {
            if self.entities.shift_remove(&element).is_some() {
                debug!("proximity: untracked {:?}", element);
                self.force_exit(element);
            }
            return;
        }

        let settings = self.settings;
        let config = self.entities.entry(element).or_insert_with(|| {
            let (inner, outer) =
                settings.clamp(settings.default_inner_radius, settings.default_outer_radius);
            EntityConfig {
                element,
                is_listening,
                is_trigger,
                inner,
                outer,
            }
        });
        config.is_listening = is_listening;
        config.is_trigger = is_trigger;
    }

    /// Set the enter/exit radii of a tracked element
    pub fn set_element_radii(&mut self, element: ElementId, inner: f32, outer: f32) {
        let (inner, outer) = self.settings.clamp(inner, outer);
        match self.entities.get_mut(&element) {
            Some(config) => {
                config.inner = inner;
                config.outer = outer;
            }
            None => warn!("proximity: radii set on untracked element {:?}", element),
        }
    }

    pub fn is_tracked(&self, element: ElementId) -> bool {
        self.entities.contains_key(&element)
    }

    pub fn config(&self, element: ElementId) -> Option<&EntityConfig> {
        self.entities.get(&element)
    }

    pub fn tracked_len(&self) -> usize {
        self.entities.len()
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    pub fn is_colliding(&self, a: ElementId, b: ElementId) -> bool {
        self.collisions.contains_key(&PairKey::new(a, b))
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Run one pairwise scan against current element positions
    pub fn update(&mut self, graph: &ElementGraph) {
        let destroyed: SmallVec<[ElementId; 4]> = self
            .entities
            .keys()
            .copied()
            .filter(|id| !graph.contains(*id))
            .collect();
        for element in destroyed {
            debug!("proximity: tracked element {:?} was destroyed", element);
            self.entities.shift_remove(&element);
            self.force_exit(element);
        }

        let count = self.entities.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let (Some((_, a)), Some((_, b))) =
                    (self.entities.get_index(i), self.entities.get_index(j))
                else {
                    continue;
                };
                let (a, b) = (*a, *b);
                self.check_pair(graph, &a, &b);
            }
        }
    }

    fn check_pair(&mut self, graph: &ElementGraph, a: &EntityConfig, b: &EntityConfig) {
        let key = PairKey::new(a.element, b.element);
        let a_listens = a.listens_to(b);
        let b_listens = b.listens_to(a);

        let eligible = (a_listens || b_listens) && !graph.is_related(a.element, b.element);
        if !eligible {
            if let Some(collision) = self.collisions.shift_remove(&key) {
                collision.dispatch(&mut self.on_exit);
            }
            return;
        }

        let (Some(element_a), Some(element_b)) = (graph.get(a.element), graph.get(b.element))
        else {
            return;
        };
        let distance_sq = element_a
            .position
            .horizontal_distance_squared(element_b.position);

        match self.collisions.get(&key).copied() {
            None => {
                let inner = a.inner + b.inner;
                if inner * inner > distance_sq {
                    let collision = Collision {
                        a: a.element,
                        b: b.element,
                        a_listens,
                        b_listens,
                    };
                    self.collisions.insert(key, collision);
                    collision.dispatch(&mut self.on_enter);
                }
            }
            Some(mut collision) => {
                // Dispatch follows the current roles, not the ones at enter
                if collision.a == a.element {
                    collision.a_listens = a_listens;
                    collision.b_listens = b_listens;
                } else {
                    collision.a_listens = b_listens;
                    collision.b_listens = a_listens;
                }

                let outer = a.outer + b.outer;
                if outer * outer > distance_sq {
                    self.collisions.insert(key, collision);
                    collision.dispatch(&mut self.on_stay);
                } else {
                    self.collisions.shift_remove(&key);
                    collision.dispatch(&mut self.on_exit);
                }
            }
        }
    }

    /// Exit every collision involving `element`
    fn force_exit(&mut self, element: ElementId) {
        let keys: SmallVec<[PairKey; 4]> = self
            .collisions
            .keys()
            .filter(|key| key.involves(element))
            .copied()
            .collect();
        for key in keys {
            if let Some(collision) = self.collisions.shift_remove(&key) {
                collision.dispatch(&mut self.on_exit);
            }
        }
    }
}

impl std::fmt::Debug for ProximityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProximityChecker")
            .field("settings", &self.settings)
            .field("tracked", &self.entities.len())
            .field("collisions", &self.collisions.len())
            .finish()
    }
}
