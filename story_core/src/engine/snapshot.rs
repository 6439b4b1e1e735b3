//! Point-in-time view of the whole story graph.

use serde::{Deserialize, Serialize};

use super::{RunId, StoryGraph};
use crate::registry::{PointId, PointState};

/// State and edges of a single point, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointSnapshot {
    pub name: String,
    pub state: PointState,
    pub fan_in: u32,
    pub parents: Vec<String>,
    pub children: Vec<String>,
}

/// Every point of a story graph, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySnapshot {
    pub run_id: RunId,
    pub root: Option<String>,
    pub points: Vec<PointSnapshot>,
}

impl StoryGraph {
    /// Capture the current state of every point.
    pub fn snapshot(&self) -> StorySnapshot {
        let registry = self.registry();
        let owned = |ids: &[PointId]| -> Vec<String> {
            registry.names(ids).into_iter().map(String::from).collect()
        };

        StorySnapshot {
            run_id: self.run_id(),
            root: registry.root().map(|id| registry.node(id).name.clone()),
            points: registry
                .iter()
                .map(|p| PointSnapshot {
                    name: p.name.clone(),
                    state: p.state(),
                    fan_in: p.fan_in,
                    parents: owned(p.parents()),
                    children: owned(p.children()),
                })
                .collect(),
        }
    }
}

impl StorySnapshot {
    /// Look up a point by name.
    pub fn point(&self, name: &str) -> Option<&PointSnapshot> {
        self.points.iter().find(|p| p.name == name)
    }

    /// Points in a given state.
    pub fn in_state(&self, state: PointState) -> impl Iterator<Item = &PointSnapshot> {
        self.points.iter().filter(move |p| p.state == state)
    }

    /// Render the snapshot as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl std::fmt::Display for StorySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "story run {}", self.run_id)?;
        for point in &self.points {
            writeln!(f, "{} [{}] fan-in {}", point.name, point.state, point.fan_in)?;
            writeln!(f, "    children: {}", point.children.join(" "))?;
            writeln!(f, "    parents:  {}", point.parents.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> StoryGraph {
        let mut graph = StoryGraph::new();
        graph.register_root("R", 1).unwrap();
        graph.register_child("R", "A", 1).unwrap();
        graph.register_child("R", "B", 1).unwrap();
        graph.register_child("A", "C", 2).unwrap();
        graph.register_child("B", "C", 2).unwrap();
        graph
    }

    #[test]
    fn test_snapshot_captures_states_and_edges() {
        let mut graph = graph();
        graph.succeed("R");

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.root.as_deref(), Some("R"));
        assert_eq!(snapshot.points.len(), 4);
        assert_eq!(snapshot.run_id, graph.run_id());

        let c = snapshot.point("C").unwrap();
        assert_eq!(c.parents, vec!["A", "B"]);
        assert_eq!(c.state, PointState::Disabled);
        assert_eq!(snapshot.in_state(PointState::Enabled).count(), 2);
    }

    #[test]
    fn test_snapshot_is_detached_from_graph() {
        let mut graph = graph();
        let before = graph.snapshot();
        graph.succeed("R");
        assert_eq!(before.point("R").unwrap().state, PointState::Enabled);
        assert_ne!(before, graph.snapshot());
    }

    #[test]
    fn test_snapshot_display_lists_tree() {
        let text = graph().snapshot().to_string();
        assert!(text.contains("R [enabled] fan-in 1"));
        assert!(text.contains("    children: A B"));
        assert!(text.contains("    parents:  A B"));
    }

    #[test]
    fn test_snapshot_json() {
        let json = graph().snapshot().to_json_pretty().unwrap();
        let parsed: StorySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.points[0].state, PointState::Enabled);
        assert!(json.contains("\"state\": \"disabled\""));
    }
}
