//! Story point definitions - the nodes of the story graph.

use serde::{Deserialize, Serialize};

/// Dense index of a story point inside its registry.
///
/// Ids are handed out in registration order and stay valid for the lifetime of
/// the graph, since points are never removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub(crate) usize);

impl PointId {
    /// Position of the point in registration order.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Progress of a single story point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PointState {
    /// Not reachable yet.
    #[default]
    Disabled,
    /// Succeeded before it was reachable; completes as soon as it is enabled.
    PreSucceeded,
    /// Active; the control script acts on it.
    Enabled,
    Succeeded,
    Failed,
}

impl PointState {
    /// Human-readable label used in tree listings.
    pub fn label(&self) -> &'static str {
        match self {
            PointState::Disabled => "disabled",
            PointState::PreSucceeded => "pre-succeeded",
            PointState::Enabled => "enabled",
            PointState::Succeeded => "succeeded",
            PointState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for PointState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named checkpoint in the story graph.
///
/// `parents` and `children` hold ids resolved through the owning registry, so
/// there is exactly one live copy of each point's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryPoint {
    pub id: PointId,

    /// Unique name used by the control script.
    pub name: String,

    /// Number of parents that must succeed before this point enables itself.
    pub fan_in: u32,

    pub(crate) state: PointState,

    /// Points that list this one as a child, in attachment order.
    pub(crate) parents: Vec<PointId>,

    /// Points this one was given as children, in attachment order.
    pub(crate) children: Vec<PointId>,
}

impl StoryPoint {
    pub(crate) fn new(id: PointId, name: impl Into<String>, fan_in: u32) -> Self {
        Self {
            id,
            name: name.into(),
            fan_in,
            state: PointState::Disabled,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Current state of the point.
    pub fn state(&self) -> PointState {
        self.state
    }

    pub fn parents(&self) -> &[PointId] {
        &self.parents
    }

    pub fn children(&self) -> &[PointId] {
        &self.children
    }

    pub fn is_enabled(&self) -> bool {
        self.state == PointState::Enabled
    }

    pub fn has_succeeded(&self) -> bool {
        self.state == PointState::Succeeded
    }

    pub fn has_failed(&self) -> bool {
        self.state == PointState::Failed
    }
}
