//! # Story Core
//!
//! The story point graph that drives a generated robot behavior script. Named
//! checkpoints ("story points") become active once enough of their parents have
//! completed, and the control script polls them each tick to decide what to do.
//!
//! ## Core Components
//!
//! - **registry**: Canonical storage for story points, keyed by unique name
//! - **engine**: The success/failure/replay state machine and graph queries
//! - **error**: Setup-phase errors raised while the graph is being built
//!
//! ## Design Philosophy
//!
//! - **One canonical point per name**: parents and children are arena ids, never copies
//! - **Always settled**: every command finishes its cascade before returning
//! - **Forgiving run phase**: unknown names are answered with `false`, never an error

pub mod engine;
pub mod error;
pub mod registry;

pub use engine::*;
pub use error::*;
pub use registry::*;
