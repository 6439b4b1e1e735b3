//! Errors raised while loading a behavior script.

use std::path::PathBuf;

use story_core::GraphError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("story setup failed: {0}")]
    Graph(#[from] GraphError),

    /// A story point entry carries no usable name.
    #[error("story point {index}: {reason}")]
    InvalidPoint { index: usize, reason: String },

    /// A behavior carries a value no robot could act on.
    #[error("behavior {index} (when '{point}'): {reason}")]
    InvalidBehavior {
        index: usize,
        point: String,
        reason: String,
    },
}

pub type ScriptResult<T> = Result<T, ScriptError>;
