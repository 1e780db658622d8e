//! Proximity defaults and per-element configuration

use enklu_core::ElementId;
use serde::{Deserialize, Serialize};

/// Radii applied to newly tracked elements and the clamp margin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximitySettings {
    pub default_inner_radius: f32,
    pub default_outer_radius: f32,
    /// Minimum gap between an element's inner and outer radius
    pub margin: f32,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            default_inner_radius: 0.5,
            default_outer_radius: 0.75,
            margin: 0.25,
        }
    }
}

impl ProximitySettings {
    /// Clamp a radius pair: inner ≥ 0, outer ≥ inner + margin
    pub fn clamp(&self, inner: f32, outer: f32) -> (f32, f32) {
        let inner = inner.max(0.0);
        let outer = outer.max(inner + self.margin);
        (inner, outer)
    }
}

/// Tracking state of one element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityConfig {
    pub element: ElementId,
    /// Receives callbacks when a trigger comes close
    pub is_listening: bool,
    /// Causes callbacks on nearby listeners
    pub is_trigger: bool,
    /// Enter radius
    pub inner: f32,
    /// Exit radius
    pub outer: f32,
}

impl EntityConfig {
    /// Whether `self` listens to `other`
    pub fn listens_to(&self, other: &EntityConfig) -> bool {
        self.is_listening && other.is_trigger
    }
}
