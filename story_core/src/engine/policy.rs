//! Engine configuration.

use serde::{Deserialize, Serialize};

/// How `fail` treats the children of the failed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailPolicy {
    /// Only the targeted point fails.
    #[default]
    Isolated,
    /// The targeted point and each of its direct children fail.
    CascadeToChildren,
}

/// Tunables for the story graph engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fail_policy: FailPolicy,
}

impl EngineConfig {
    /// Configuration with the given fail policy.
    pub fn with_fail_policy(fail_policy: FailPolicy) -> Self {
        Self { fail_policy }
    }
}
