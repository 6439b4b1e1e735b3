//! Read-only queries the control script polls every tick.

use super::StoryGraph;
use crate::registry::{PointState, StoryPoint};

impl StoryGraph {
    /// Get a point by name.
    pub fn get(&self, name: &str) -> Option<&StoryPoint> {
        self.registry.get(name)
    }

    /// Current state of the named point, if it exists.
    pub fn state(&self, name: &str) -> Option<PointState> {
        self.get(name).map(StoryPoint::state)
    }

    /// Whether the named point is active. False for unknown names.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(StoryPoint::is_enabled)
    }

    pub fn has_succeeded(&self, name: &str) -> bool {
        self.get(name).is_some_and(StoryPoint::has_succeeded)
    }

    pub fn has_failed(&self, name: &str) -> bool {
        self.get(name).is_some_and(StoryPoint::has_failed)
    }

    /// Every point reachable from `name` through child edges, each named once.
    ///
    /// Empty for an unknown name or a leaf.
    pub fn descendants(&self, name: &str) -> Vec<&str> {
        self.registry
            .find(name)
            .map(|id| self.registry.names(&self.registry.descendant_ids(id)))
            .unwrap_or_default()
    }

    /// Names of all enabled points, root included, in registration order.
    pub fn active_points(&self) -> Vec<&str> {
        self.registry
            .iter()
            .filter(|p| p.is_enabled())
            .map(|p| p.name.as_str())
            .collect()
    }

    /// Names of all points in registration order.
    pub fn all_names(&self) -> Vec<&str> {
        self.registry.all_names().collect()
    }

    pub fn parents_of(&self, name: &str) -> Vec<&str> {
        self.registry.parents_of(name)
    }

    pub fn children_of(&self, name: &str) -> Vec<&str> {
        self.registry.children_of(name)
    }
}
