//! Errors raised while building the story graph.
//!
//! Only the setup phase can fail. Run-phase commands against unknown names are
//! answered locally with `false` and never surface here.

use thiserror::Error;

/// Structural problems with the story graph being registered.
///
/// Any of these means the generated script is malformed, so graph construction
/// should be abandoned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// `register_root` was called after a root already exists.
    #[error("story already initialized with root '{root}'")]
    AlreadyInitialized { root: String },

    /// `register_child` named a parent that has not been registered.
    #[error("cannot attach '{child}': parent '{parent}' is not registered")]
    UnknownParent { parent: String, child: String },

    /// The edge `parent -> child` would close a cycle in the registered graph.
    #[error("edge '{parent}' -> '{child}' would create a cycle")]
    WouldCycle { parent: String, child: String },
}

/// Result alias for graph setup operations.
pub type GraphResult<T> = Result<T, GraphError>;
