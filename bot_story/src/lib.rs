//! # Bot Story
//!
//! Plays a story-driven robot behavior script against a [`story_core::StoryGraph`],
//! one tick at a time, the way the generated control loop on the robot would.
//!
//! ## Core Components
//!
//! - **script**: The TOML behavior script - story layout plus per-point behaviors
//! - **driver**: Motion and ranging traits, with a simulated rover
//! - **runner**: The tick loop and its elapsed-time clock
//! - **naming**: Identifiers the script generator gives story points

pub mod driver;
pub mod error;
pub mod naming;
pub mod runner;
pub mod script;

pub use driver::*;
pub use error::*;
pub use naming::*;
pub use runner::*;
pub use script::*;
