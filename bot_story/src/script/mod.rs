//! Behavior script - the story layout and the per-tick behaviors of a robot.
//!
//! A script is a TOML document:
//! - **engine**: optional [`EngineConfig`] for the story graph
//! - **story**: the root, the child registrations, and the points succeeded at start
//! - **behavior**: ordered "while this point is active, do this" blocks
//! - **rover**: optional simulated sensor readings

mod behavior;

pub use behavior::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use story_core::{EngineConfig, StoryGraph};

use crate::error::{ScriptError, ScriptResult};
use crate::naming::unique_point_name;

fn default_fan_in() -> u32 {
    1
}

/// A parsed behavior script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptConfig {
    #[serde(default)]
    pub engine: EngineConfig,

    pub story: StoryDefinition,

    #[serde(default, rename = "behavior")]
    pub behaviors: Vec<Behavior>,

    #[serde(default)]
    pub rover: RoverConfig,
}

/// Story graph layout, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDefinition {
    pub root: String,

    #[serde(default = "default_fan_in")]
    pub root_fan_in: u32,

    #[serde(default, rename = "point")]
    pub points: Vec<PointDefinition>,

    /// Points succeeded once setup is complete, usually just the root.
    #[serde(default)]
    pub start: Vec<String>,
}

/// Registration of one child point under one parent.
///
/// The point is named either directly by `name`, or by generator-style `text`
/// plus `id` (see [`unique_point_name`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointDefinition {
    pub parent: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Display text of the point in the story editor.
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub id: Option<u32>,

    #[serde(default = "default_fan_in")]
    pub fan_in: u32,
}

impl PointDefinition {
    /// The registered name; `None` if neither `name` nor `text` and `id` are given.
    pub fn point_name(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| Some(unique_point_name(self.text.as_deref()?, self.id?)))
    }

    fn registered_name(&self, index: usize) -> ScriptResult<String> {
        self.point_name().ok_or_else(|| ScriptError::InvalidPoint {
            index,
            reason: "needs either `name` or both `text` and `id`".to_string(),
        })
    }
}

/// Simulated rover settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoverConfig {
    /// Sonar readings in centimetres, replayed one per reading.
    pub ranges_cm: Vec<f32>,
}

impl ScriptConfig {
    /// Parse and validate a script from TOML text.
    pub fn from_toml_str(text: &str) -> ScriptResult<Self> {
        let script: ScriptConfig = toml::from_str(text)?;
        script.validate()?;
        Ok(script)
    }

    /// Read, parse and validate a script file.
    pub fn load(path: impl AsRef<Path>) -> ScriptResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded behavior script");
        Self::from_toml_str(&text)
    }

    /// Check behavior values the robot could not act on.
    ///
    /// Names of unregistered points are only warned about, since the control
    /// script is allowed to reference points defensively.
    pub fn validate(&self) -> ScriptResult<()> {
        let names = self
            .story
            .points
            .iter()
            .enumerate()
            .map(|(index, point)| point.registered_name(index))
            .collect::<ScriptResult<Vec<_>>>()?;
        let known = |name: &str| name == self.story.root || names.iter().any(|n| n == name);

        for (index, behavior) in self.behaviors.iter().enumerate() {
            let invalid = |reason: &str| ScriptError::InvalidBehavior {
                index,
                point: behavior.when.clone(),
                reason: reason.to_string(),
            };

            if let Some(secs) = behavior.outcome.as_ref().and_then(Outcome::delay_secs) {
                if Duration::try_from_secs_f32(secs).is_err() {
                    return Err(invalid("delay must be a non-negative number of seconds"));
                }
            }
            if let Some(distance) = behavior.obstacle_within {
                if !distance.is_finite() || distance < 0.0 {
                    return Err(invalid("obstacle distance must be non-negative"));
                }
            }

            if !known(&behavior.when) {
                tracing::warn!(
                    index,
                    point = %behavior.when,
                    "behavior guarded by unknown story point"
                );
            }
            if let Some(outcome) = &behavior.outcome {
                if !known(outcome.point()) {
                    tracing::warn!(
                        index,
                        point = outcome.point(),
                        "behavior targets unknown story point"
                    );
                }
            }
        }

        Ok(())
    }

    /// Build the story graph: register every point, then issue the start succeeds.
    pub fn build_graph(&self) -> ScriptResult<StoryGraph> {
        let mut graph = StoryGraph::with_config(self.engine.clone());
        let story = &self.story;

        graph.register_root(&story.root, story.root_fan_in)?;
        for (index, point) in story.points.iter().enumerate() {
            let name = point.registered_name(index)?;
            graph.register_child(&point.parent, &name, point.fan_in)?;
        }

        for name in &story.start {
            if !graph.succeed(name) {
                tracing::warn!(point = %name, "start names unknown story point");
            }
        }

        tracing::info!(
            run = %graph.run_id(),
            points = graph.registry().len(),
            behaviors = self.behaviors.len(),
            "story graph ready"
        );
        Ok(graph)
    }
}
