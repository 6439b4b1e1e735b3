//! Registry module - canonical storage for story points.
//!
//! The registry consists of:
//! - **Points**: an arena of [`StoryPoint`]s indexed by [`PointId`], in registration order
//! - **Names**: an index from unique name to id
//! - **Edges**: parent/child id lists stored on the points themselves
//!
//! Every edge recorded here is write-once. The registry refuses edges that would
//! close a cycle, so the structure stays a DAG for the life of the graph.

mod point;

pub use point::*;

use std::collections::{HashMap, HashSet};

use crate::error::{GraphError, GraphResult};

/// Table from story point name to its single canonical instance.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    /// All points, indexed by `PointId`.
    points: Vec<StoryPoint>,

    /// Index: name -> point.
    by_name: HashMap<String, PointId>,

    root: Option<PointId>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the root of the story. It starts out enabled.
    ///
    /// Fails with [`GraphError::AlreadyInitialized`] when a root already exists.
    pub fn register_root(&mut self, name: &str, fan_in: u32) -> GraphResult<PointId> {
        if let Some(root) = self.root {
            return Err(GraphError::AlreadyInitialized {
                root: self.points[root.index()].name.clone(),
            });
        }

        // Children need a registered parent, so the registry is empty here.
        let id = self.insert(name, fan_in);
        self.points[id.index()].state = PointState::Enabled;
        self.root = Some(id);

        tracing::debug!(point = name, fan_in, "registered story root");
        Ok(id)
    }

    /// Attach `name` as a child of `parent_name`, creating it on first mention.
    ///
    /// When `name` already exists its original fan-in is kept and `fan_in` is
    /// ignored; only the new parent edge is added.
    pub fn register_child(
        &mut self,
        parent_name: &str,
        name: &str,
        fan_in: u32,
    ) -> GraphResult<PointId> {
        let parent = self
            .find(parent_name)
            .ok_or_else(|| GraphError::UnknownParent {
                parent: parent_name.to_string(),
                child: name.to_string(),
            })?;

        let child = match self.find(name) {
            Some(existing) => {
                if existing == parent || self.descendant_ids(existing).contains(&parent) {
                    return Err(GraphError::WouldCycle {
                        parent: parent_name.to_string(),
                        child: name.to_string(),
                    });
                }
                existing
            }
            None => self.insert(name, fan_in),
        };

        self.link(parent, child);

        tracing::debug!(
            parent = parent_name,
            point = name,
            fan_in = self.points[child.index()].fan_in,
            "registered story point"
        );
        Ok(child)
    }

    /// Look up a point by name.
    pub fn find(&self, name: &str) -> Option<PointId> {
        self.by_name.get(name).copied()
    }

    /// Get a point by id. `None` for an id this registry did not hand out.
    pub fn point(&self, id: PointId) -> Option<&StoryPoint> {
        self.points.get(id.index())
    }

    /// Resolve an id this registry handed out.
    pub(crate) fn node(&self, id: PointId) -> &StoryPoint {
        &self.points[id.index()]
    }

    pub(crate) fn point_mut(&mut self, id: PointId) -> &mut StoryPoint {
        &mut self.points[id.index()]
    }

    /// Get a point by name.
    pub fn get(&self, name: &str) -> Option<&StoryPoint> {
        self.find(name).map(|id| self.node(id))
    }

    /// Names of all points in registration order.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.name.as_str())
    }

    /// All points in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &StoryPoint> {
        self.points.iter()
    }

    pub fn root(&self) -> Option<PointId> {
        self.root
    }

    /// Whether a root has been registered, i.e. the run phase may begin.
    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Names of the parents of `name`; empty for an unknown name.
    pub fn parents_of(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|p| self.names(&p.parents))
            .unwrap_or_default()
    }

    /// Names of the children of `name`; empty for an unknown name.
    pub fn children_of(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .map(|p| self.names(&p.children))
            .unwrap_or_default()
    }

    /// Every point reachable from `id` through child edges, excluding `id`.
    ///
    /// Points are reported once each in depth-first preorder, even where
    /// several paths re-converge on them.
    pub(crate) fn descendant_ids(&self, id: PointId) -> Vec<PointId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<PointId> = self.node(id).children.iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            if !visited.insert(next) {
                continue;
            }
            order.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }

        order
    }

    /// Number of parents of `id` currently in the succeeded state.
    pub(crate) fn succeeded_parents(&self, id: PointId) -> usize {
        self.node(id)
            .parents
            .iter()
            .filter(|parent| self.node(**parent).has_succeeded())
            .count()
    }

    pub(crate) fn names(&self, ids: &[PointId]) -> Vec<&str> {
        ids.iter().map(|id| self.node(*id).name.as_str()).collect()
    }

    fn insert(&mut self, name: &str, fan_in: u32) -> PointId {
        let id = PointId(self.points.len());
        self.points.push(StoryPoint::new(id, name, fan_in));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Record `parent -> child` and its back edge, once.
    fn link(&mut self, parent: PointId, child: PointId) {
        let children = &mut self.points[parent.index()].children;
        if children.contains(&child) {
            return;
        }
        children.push(child);
        self.points[child.index()].parents.push(parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Registry {
        let mut registry = Registry::new();
        registry.register_root("R", 1).unwrap();
        registry.register_child("R", "A", 1).unwrap();
        registry.register_child("R", "B", 1).unwrap();
        registry.register_child("A", "C", 2).unwrap();
        registry.register_child("B", "C", 2).unwrap();
        registry
    }

    #[test]
    fn test_register_root_enables_it() {
        let mut registry = Registry::new();
        assert!(!registry.is_initialized());

        let root = registry.register_root("start35", 1).unwrap();

        assert!(registry.is_initialized());
        assert_eq!(registry.root(), Some(root));
        assert_eq!(registry.point(root).unwrap().state(), PointState::Enabled);
    }

    #[test]
    fn test_second_root_is_rejected() {
        let mut registry = Registry::new();
        registry.register_root("start35", 1).unwrap();

        let err = registry.register_root("other", 1).unwrap_err();
        assert_eq!(
            err,
            GraphError::AlreadyInitialized {
                root: "start35".into()
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let mut registry = Registry::new();
        registry.register_root("R", 1).unwrap();

        let err = registry.register_child("missing", "A", 1).unwrap_err();
        assert!(matches!(err, GraphError::UnknownParent { .. }));
        assert!(registry.find("A").is_none());
    }

    #[test]
    fn test_child_registered_before_root_has_no_parent() {
        let mut registry = Registry::new();
        let err = registry.register_child("R", "A", 1).unwrap_err();
        assert!(matches!(err, GraphError::UnknownParent { .. }));
    }

    #[test]
    fn test_shared_child_keeps_first_fan_in() {
        let registry = diamond();

        let c = registry.get("C").unwrap();
        assert_eq!(c.fan_in, 2);
        assert_eq!(registry.parents_of("C"), vec!["A", "B"]);
        assert_eq!(registry.len(), 4);

        let mut registry = registry;
        registry.register_child("R", "C", 7).unwrap();
        assert_eq!(registry.get("C").unwrap().fan_in, 2);
        assert_eq!(registry.parents_of("C"), vec!["A", "B", "R"]);
    }

    #[test]
    fn test_duplicate_edge_is_recorded_once() {
        let mut registry = Registry::new();
        registry.register_root("R", 1).unwrap();
        registry.register_child("R", "A", 1).unwrap();
        registry.register_child("R", "A", 1).unwrap();

        assert_eq!(registry.children_of("R"), vec!["A"]);
        assert_eq!(registry.parents_of("A"), vec!["R"]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut registry = diamond();

        let err = registry.register_child("C", "A", 1).unwrap_err();
        assert_eq!(
            err,
            GraphError::WouldCycle {
                parent: "C".into(),
                child: "A".into()
            }
        );

        let err = registry.register_child("A", "A", 1).unwrap_err();
        assert!(matches!(err, GraphError::WouldCycle { .. }));
        assert!(registry.children_of("C").is_empty());
    }

    #[test]
    fn test_all_names_in_insertion_order() {
        let registry = diamond();
        let names: Vec<_> = registry.all_names().collect();
        assert_eq!(names, vec!["R", "A", "B", "C"]);
    }

    #[test]
    fn test_descendants_reported_once() {
        let registry = diamond();
        let root = registry.find("R").unwrap();

        let names = registry.names(&registry.descendant_ids(root));
        assert_eq!(names, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_foreign_id_is_none() {
        let registry = diamond();
        let mut small = Registry::new();
        small.register_root("only", 1).unwrap();

        let c = registry.find("C").unwrap();
        assert!(small.point(c).is_none());
        assert!(registry.point(c).is_some());
        assert!(registry.point(PointId(7)).is_none());
    }

    #[test]
    fn test_unknown_name_lookups() {
        let registry = diamond();
        assert!(registry.find("nope").is_none());
        assert!(registry.parents_of("nope").is_empty());
        assert!(registry.children_of("nope").is_empty());
    }
}
