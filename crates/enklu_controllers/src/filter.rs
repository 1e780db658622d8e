//! Inclusion predicates for controller groups

use enklu_core::{Element, ElementGraph, ElementId, Vec3};
use smallvec::SmallVec;

/// Decides whether an element belongs to a group's filtered set
///
/// Plain closures over `&Element` implement this trait, so ad hoc filters do
/// not need a named type:
///
/// ```ignore
/// group.filter(&mut graph, |e: &Element| e.schema.get_bool("visible") == Some(true));
/// ```
pub trait ElementFilter {
    fn include(&self, graph: &ElementGraph, id: ElementId, element: &Element) -> bool;
}

impl<F> ElementFilter for F
where
    F: Fn(&Element) -> bool,
{
    fn include(&self, _graph: &ElementGraph, _id: ElementId, element: &Element) -> bool {
        self(element)
    }
}

/// Matches elements whose kind is in an allowed set
#[derive(Clone, Debug)]
pub struct TypeFilter {
    kinds: SmallVec<[String; 2]>,
}

impl TypeFilter {
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }
}

impl ElementFilter for TypeFilter {
    fn include(&self, _graph: &ElementGraph, _id: ElementId, element: &Element) -> bool {
        self.kinds.iter().any(|kind| *kind == element.kind)
    }
}

/// Matches elements within `max_distance` of `origin`
#[derive(Clone, Copy, Debug)]
pub struct DistanceFilter {
    pub origin: Vec3,
    pub max_distance: f32,
}

impl DistanceFilter {
    pub fn new(origin: Vec3, max_distance: f32) -> Self {
        Self {
            origin,
            max_distance: max_distance.max(0.0),
        }
    }
}

impl ElementFilter for DistanceFilter {
    fn include(&self, _graph: &ElementGraph, _id: ElementId, element: &Element) -> bool {
        element.position.distance_squared(self.origin) <= self.max_distance * self.max_distance
    }
}

/// Matches elements whose boolean schema property equals `expected`
///
/// A missing or non-boolean property reads as `false`.
#[derive(Clone, Debug)]
pub struct PropertyFilter {
    key: String,
    expected: bool,
}

impl PropertyFilter {
    pub fn new(key: impl Into<String>, expected: bool) -> Self {
        Self {
            key: key.into(),
            expected,
        }
    }
}

impl ElementFilter for PropertyFilter {
    fn include(&self, _graph: &ElementGraph, _id: ElementId, element: &Element) -> bool {
        element.schema.get_bool(&self.key).unwrap_or(false) == self.expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(filter: &dyn ElementFilter, graph: &ElementGraph, id: ElementId) -> bool {
        let element = graph.get(id).unwrap();
        filter.include(graph, id, element)
    }

    #[test]
    fn test_type_filter() {
        let mut graph = ElementGraph::new();
        let root = graph.root();
        let asset = graph.create(root, "a", "asset").unwrap();
        let light = graph.create(root, "l", "light").unwrap();

        let filter = TypeFilter::new(["asset", "scan"]);
        assert!(check(&filter, &graph, asset));
        assert!(!check(&filter, &graph, light));
    }

    #[test]
    fn test_distance_filter() {
        let mut graph = ElementGraph::new();
        let root = graph.root();
        let near = graph.create(root, "near", "asset").unwrap();
        let far = graph.create(root, "far", "asset").unwrap();
        graph.get_mut(near).unwrap().position = Vec3::new(1.0, 0.0, 1.0);
        graph.get_mut(far).unwrap().position = Vec3::new(10.0, 0.0, 0.0);

        let filter = DistanceFilter::new(Vec3::ZERO, 2.0);
        assert!(check(&filter, &graph, near));
        assert!(!check(&filter, &graph, far));
    }

    #[test]
    fn test_property_and_closure_filters() {
        let mut graph = ElementGraph::new();
        let root = graph.root();
        let shown = graph.create(root, "shown", "asset").unwrap();
        let hidden = graph.create(root, "hidden", "asset").unwrap();
        graph.get_mut(shown).unwrap().schema.set("visible", true);

        let visible = PropertyFilter::new("visible", true);
        assert!(check(&visible, &graph, shown));
        assert!(!check(&visible, &graph, hidden));

        let named = |e: &Element| e.guid.starts_with("hid");
        assert!(check(&named, &graph, hidden));
        assert!(!check(&named, &graph, shown));
    }
}
