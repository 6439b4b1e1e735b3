//! Per-point behaviors: what the robot does while a story point is active.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::driver::{MotionDriver, MoveDirection, TurnDirection, Wheel};

/// One "if story point is active" block of the control script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Behavior {
    /// Story point that must be enabled for the behavior to fire.
    pub when: String,

    /// Also require an obstacle within this many centimetres.
    #[serde(default)]
    pub obstacle_within: Option<f32>,

    #[serde(default)]
    pub action: Option<Action>,

    #[serde(default)]
    pub outcome: Option<Outcome>,
}

/// A motion primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move { speed: f32, direction: MoveDirection },
    Turn { direction: TurnDirection },
    TurnDegrees { degrees: f32, direction: TurnDirection },
    TurnRandomly,
    AdjustWheel { wheel: Wheel, amount: f32 },
    Delay,
}

impl Action {
    /// Perform the action, returning how long it kept the robot busy.
    pub fn perform(&self, driver: &mut impl MotionDriver) -> Duration {
        match self {
            Action::Move { speed, direction } => driver.move_straight(*speed, *direction),
            Action::Turn { direction } => driver.turn(*direction),
            Action::TurnDegrees { degrees, direction } => driver.turn_degrees(*degrees, *direction),
            Action::TurnRandomly => driver.turn_randomly(),
            Action::AdjustWheel { wheel, amount } => driver.adjust_wheel(*wheel, *amount),
            Action::Delay => driver.delay(),
        }
    }
}

/// The story command a behavior issues after acting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Succeed { point: String },
    /// Succeed once the script clock reaches `secs`.
    SucceedAfter { point: String, secs: f32 },
    ContinueAt { point: String },
    /// Continue at `point` once the script clock reaches `secs`.
    ContinueAtAfter { point: String, secs: f32 },
    Fail { point: String },
}

impl Outcome {
    /// Story point the outcome targets.
    pub fn point(&self) -> &str {
        match self {
            Outcome::Succeed { point }
            | Outcome::SucceedAfter { point, .. }
            | Outcome::ContinueAt { point }
            | Outcome::ContinueAtAfter { point, .. }
            | Outcome::Fail { point } => point,
        }
    }

    /// Seconds the clock must reach first, for timed outcomes.
    pub fn delay_secs(&self) -> Option<f32> {
        match self {
            Outcome::SucceedAfter { secs, .. } | Outcome::ContinueAtAfter { secs, .. } => {
                Some(*secs)
            }
            _ => None,
        }
    }
}
