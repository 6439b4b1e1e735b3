//! Graph Engine - the story point state machine.
//!
//! A point moves through its states as follows:
//! 1. **Disabled**: the initial state of every point except the root
//! 2. **PreSucceeded**: `succeed` arrived early; honored on the next enable
//! 3. **Enabled**: the point is active and the control script acts on it
//! 4. **Succeeded**: completion cascades an enable check to every child
//! 5. **Failed**: inert until a replay resets it
//!
//! A child is enabled by the cascade once at least `fan_in` of its parents have
//! succeeded. Every command settles its whole cascade before it returns, so
//! callers never observe a half-propagated graph.

mod policy;
mod query;
mod snapshot;

pub use policy::*;
pub use snapshot::*;

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use uuid::Uuid;

use crate::error::GraphResult;
use crate::registry::{PointId, PointState, Registry};

/// Identifier of one story run, attached to log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil run ID (useful for deterministic output).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The story graph: registry plus state machine in one explicit context.
///
/// Commands take point names and return `false` when the name is unknown, so a
/// control loop may reference points defensively without checking first.
#[derive(Debug, Clone)]
pub struct StoryGraph {
    registry: Registry,
    config: EngineConfig,
    run_id: RunId,
}

impl Default for StoryGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryGraph {
    /// Create an empty graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty graph with the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: Registry::new(),
            config,
            run_id: RunId::new(),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read access to the underlying registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether a root has been registered, i.e. the run phase may begin.
    pub fn is_initialized(&self) -> bool {
        self.registry.is_initialized()
    }

    /// Register the root point; it starts enabled.
    pub fn register_root(&mut self, name: &str, fan_in: u32) -> GraphResult<PointId> {
        self.registry.register_root(name, fan_in).inspect_err(|e| {
            tracing::error!(run = %self.run_id, error = %e, "story setup failed");
        })
    }

    /// Register `name` as a child of `parent_name`.
    pub fn register_child(
        &mut self,
        parent_name: &str,
        name: &str,
        fan_in: u32,
    ) -> GraphResult<PointId> {
        self.registry
            .register_child(parent_name, name, fan_in)
            .inspect_err(|e| {
                tracing::error!(run = %self.run_id, error = %e, "story setup failed");
            })
    }

    /// Succeed the named point.
    ///
    /// An enabled point succeeds and enables every child whose fan-in is now met.
    /// A disabled point is marked pre-succeeded and completes once enabled.
    pub fn succeed(&mut self, name: &str) -> bool {
        match self.resolve(name, "succeed") {
            Some(id) => {
                self.succeed_point(id);
                true
            }
            None => false,
        }
    }

    /// Fail the named point. Children are only touched under
    /// [`FailPolicy::CascadeToChildren`].
    pub fn fail(&mut self, name: &str) -> bool {
        match self.resolve(name, "fail") {
            Some(id) => {
                self.fail_point(id);
                true
            }
            None => false,
        }
    }

    /// Replay from the named point: disable all of its descendants, then enable it.
    pub fn continue_at(&mut self, name: &str) -> bool {
        match self.resolve(name, "continue_at") {
            Some(id) => {
                self.continue_at_point(id);
                true
            }
            None => false,
        }
    }

    fn resolve(&self, name: &str, command: &'static str) -> Option<PointId> {
        let id = self.registry.find(name);
        if id.is_none() {
            tracing::debug!(run = %self.run_id, point = name, command, "unknown story point");
        }
        id
    }

    fn succeed_point(&mut self, id: PointId) {
        match self.registry.node(id).state() {
            PointState::Disabled => self.set_state(id, PointState::PreSucceeded),
            PointState::Enabled => {
                let mut pending = VecDeque::new();
                self.complete(id, &mut pending);
                self.settle(pending);
            }
            PointState::PreSucceeded | PointState::Succeeded | PointState::Failed => {}
        }
    }

    fn enable_point(&mut self, id: PointId) {
        self.settle(VecDeque::from([id]));
    }

    /// Enable each queued point, following every cascade until nothing is left.
    fn settle(&mut self, mut pending: VecDeque<PointId>) {
        while let Some(id) = pending.pop_front() {
            let previous = self.registry.node(id).state();
            if previous == PointState::Enabled {
                continue;
            }

            self.set_state(id, PointState::Enabled);
            if previous == PointState::PreSucceeded {
                self.complete(id, &mut pending);
            }
        }
    }

    /// Move an enabled point to succeeded and queue children whose fan-in is met.
    fn complete(&mut self, id: PointId, pending: &mut VecDeque<PointId>) {
        self.set_state(id, PointState::Succeeded);

        let children = self.registry.node(id).children().to_vec();
        for child in children {
            let point = self.registry.node(child);
            if matches!(
                point.state(),
                PointState::Enabled | PointState::Succeeded | PointState::Failed
            ) || pending.contains(&child)
            {
                continue;
            }

            let fan_in = point.fan_in as usize;
            if self.registry.succeeded_parents(child) >= fan_in {
                pending.push_back(child);
            }
        }
    }

    fn fail_point(&mut self, id: PointId) {
        self.set_state(id, PointState::Failed);

        if self.config.fail_policy == FailPolicy::CascadeToChildren {
            let children = self.registry.node(id).children().to_vec();
            for child in children {
                self.set_state(child, PointState::Failed);
            }
        }
    }

    fn continue_at_point(&mut self, id: PointId) {
        tracing::debug!(
            run = %self.run_id,
            point = %self.registry.node(id).name,
            "continuing story"
        );
        self.disable_descendants(id);
        self.enable_point(id);
    }

    fn disable_descendants(&mut self, id: PointId) {
        for descendant in self.registry.descendant_ids(id) {
            self.set_state(descendant, PointState::Disabled);
        }
    }

    fn set_state(&mut self, id: PointId, state: PointState) {
        let point = self.registry.point_mut(id);
        if point.state == state {
            return;
        }
        tracing::trace!(
            run = %self.run_id,
            point = %point.name,
            from = %point.state,
            to = %state,
            "story point transition"
        );
        point.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> StoryGraph {
        let mut graph = StoryGraph::new();
        graph.register_root("R", 1).unwrap();
        graph.register_child("R", "A", 1).unwrap();
        graph.register_child("R", "B", 1).unwrap();
        graph.register_child("A", "C", 2).unwrap();
        graph.register_child("B", "C", 2).unwrap();
        graph
    }

    fn state(graph: &StoryGraph, name: &str) -> PointState {
        graph.state(name).unwrap()
    }

    #[test]
    fn test_root_starts_enabled() {
        let graph = diamond();
        assert!(graph.is_enabled("R"));
        assert_eq!(state(&graph, "A"), PointState::Disabled);
        assert_eq!(state(&graph, "C"), PointState::Disabled);
    }

    #[test]
    fn test_fan_in_join() {
        let mut graph = diamond();

        assert!(graph.succeed("R"));
        assert!(graph.is_enabled("A"));
        assert!(graph.is_enabled("B"));
        assert!(!graph.is_enabled("C"));

        graph.succeed("A");
        assert_eq!(state(&graph, "C"), PointState::Disabled);

        graph.succeed("B");
        assert!(graph.is_enabled("C"));
        assert_eq!(graph.active_points(), vec!["C"]);
    }

    #[test]
    fn test_fan_in_join_in_reverse_order() {
        let mut graph = diamond();
        graph.succeed("R");
        graph.succeed("B");
        assert!(!graph.is_enabled("C"));
        graph.succeed("A");
        assert!(graph.is_enabled("C"));
    }

    #[test]
    fn test_succeed_while_disabled_is_deferred() {
        let mut graph = diamond();

        graph.succeed("A");
        assert_eq!(state(&graph, "A"), PointState::PreSucceeded);
        assert!(!graph.is_enabled("A"));
        assert!(!graph.has_succeeded("A"));

        graph.succeed("R");
        assert!(graph.has_succeeded("A"));
        assert!(graph.is_enabled("B"));
        assert!(!graph.is_enabled("C"));
    }

    #[test]
    fn test_deferred_success_cascades_through_chain() {
        let mut graph = StoryGraph::new();
        graph.register_root("R", 1).unwrap();
        graph.register_child("R", "A", 1).unwrap();
        graph.register_child("A", "B", 1).unwrap();
        graph.register_child("B", "C", 1).unwrap();

        graph.succeed("C");
        graph.succeed("B");
        graph.succeed("A");
        graph.succeed("R");

        assert!(graph.has_succeeded("A"));
        assert!(graph.has_succeeded("B"));
        assert!(graph.has_succeeded("C"));
        assert!(graph.active_points().is_empty());
    }

    #[test]
    fn test_repeated_succeed_is_noop() {
        let mut graph = diamond();
        graph.succeed("R");
        graph.succeed("A");
        graph.succeed("A");
        assert!(graph.has_succeeded("A"));

        graph.succeed("C");
        graph.succeed("C");
        assert_eq!(state(&graph, "C"), PointState::PreSucceeded);
    }

    #[test]
    fn test_fail_is_isolated_by_default() {
        let mut graph = diamond();
        graph.succeed("R");

        assert!(graph.fail("A"));
        assert!(graph.has_failed("A"));
        assert!(graph.has_succeeded("R"));
        assert!(graph.is_enabled("B"));
        assert_eq!(state(&graph, "C"), PointState::Disabled);
    }

    #[test]
    fn test_failed_point_is_inert() {
        let mut graph = diamond();
        graph.succeed("R");
        graph.fail("A");

        graph.succeed("A");
        assert!(graph.has_failed("A"));

        graph.succeed("B");
        assert!(!graph.is_enabled("C"));
    }

    #[test]
    fn test_failed_child_is_skipped_by_cascade() {
        let mut graph = diamond();
        graph.fail("A");
        graph.succeed("R");
        assert!(graph.has_failed("A"));
        assert!(graph.is_enabled("B"));
    }

    #[test]
    fn test_fail_can_cascade_to_children() {
        let mut graph =
            StoryGraph::with_config(EngineConfig::with_fail_policy(FailPolicy::CascadeToChildren));
        graph.register_root("R", 1).unwrap();
        graph.register_child("R", "A", 1).unwrap();
        graph.register_child("A", "B", 1).unwrap();
        graph.register_child("B", "C", 1).unwrap();

        graph.fail("A");
        assert!(graph.has_failed("A"));
        assert!(graph.has_failed("B"));
        assert_eq!(state(&graph, "C"), PointState::Disabled);
        assert!(graph.is_enabled("R"));
    }

    #[test]
    fn test_continue_at_resets_descendants() {
        let mut graph = diamond();
        graph.succeed("R");
        graph.succeed("A");
        graph.fail("B");

        assert!(graph.continue_at("R"));

        assert!(graph.is_enabled("R"));
        assert_eq!(state(&graph, "A"), PointState::Disabled);
        assert_eq!(state(&graph, "B"), PointState::Disabled);
        assert_eq!(state(&graph, "C"), PointState::Disabled);

        graph.succeed("R");
        assert!(graph.is_enabled("A"));
        assert!(graph.is_enabled("B"));
    }

    #[test]
    fn test_continue_at_discards_deferred_success() {
        let mut graph = diamond();
        graph.succeed("C");
        graph.continue_at("R");
        assert_eq!(state(&graph, "C"), PointState::Disabled);
    }

    #[test]
    fn test_continue_at_loops_back() {
        let mut graph = StoryGraph::new();
        graph.register_root("start", 1).unwrap();
        graph.register_child("start", "forward", 1).unwrap();
        graph.register_child("forward", "back", 1).unwrap();

        graph.succeed("start");
        graph.succeed("forward");
        assert!(graph.is_enabled("back"));

        graph.continue_at("forward");
        assert!(graph.is_enabled("forward"));
        assert!(!graph.is_enabled("back"));
        assert!(graph.has_succeeded("start"));
    }

    #[test]
    fn test_continue_at_revives_failed_point() {
        let mut graph = diamond();
        graph.succeed("R");
        graph.fail("A");

        graph.continue_at("A");
        assert!(graph.is_enabled("A"));
    }

    #[test]
    fn test_continue_at_completes_pre_succeeded_point() {
        let mut graph = StoryGraph::new();
        graph.register_root("start", 1).unwrap();
        graph.register_child("start", "forward", 1).unwrap();
        graph.register_child("forward", "back", 1).unwrap();

        graph.succeed("forward");
        assert_eq!(state(&graph, "forward"), PointState::PreSucceeded);

        assert!(graph.continue_at("forward"));
        assert!(graph.has_succeeded("forward"));
        assert!(graph.is_enabled("back"));
        assert!(graph.is_enabled("start"));
    }

    #[test]
    fn test_unknown_names_are_noops() {
        let mut graph = diamond();
        assert!(!graph.succeed("ghost"));
        assert!(!graph.fail("ghost"));
        assert!(!graph.continue_at("ghost"));
        assert!(graph.is_enabled("R"));
    }

    #[test]
    fn test_run_ids_differ() {
        assert_ne!(StoryGraph::new().run_id(), StoryGraph::new().run_id());
        assert_eq!(RunId::nil().to_string(), "00000000-0000-0000-0000-000000000000");
    }
}
