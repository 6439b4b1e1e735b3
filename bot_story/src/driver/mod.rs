//! Driver seams between the behavior script and the robot hardware.
//!
//! Every motion primitive reports how long it kept the robot busy; the runner
//! feeds that into the script clock that timed outcomes are measured against.

mod simulated;

pub use simulated::*;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Direction of straight-line travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveDirection {
    Forward,
    Backward,
}

/// Direction of an in-place turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

/// Which drive wheel to trim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wheel {
    Left,
    Right,
}

/// Servo motion primitives.
pub trait MotionDriver {
    /// Drive in a straight line. `speed` ranges over 0.0 (stopped) to 1.0 (full).
    fn move_straight(&mut self, speed: f32, direction: MoveDirection) -> Duration;

    fn turn(&mut self, direction: TurnDirection) -> Duration;

    fn turn_degrees(&mut self, degrees: f32, direction: TurnDirection) -> Duration;

    /// Turn left or right, chosen by the driver.
    fn turn_randomly(&mut self) -> Duration;

    /// Trim the stopping point of one wheel's servo.
    fn adjust_wheel(&mut self, wheel: Wheel, amount: f32) -> Duration;

    fn delay(&mut self) -> Duration;
}

/// Sonar ranging.
pub trait RangeSensor {
    /// Whether an obstacle is within `distance_cm` of the robot.
    fn obstacle_within(&mut self, distance_cm: f32) -> bool;
}

/// A complete robot: motion plus ranging.
pub trait Rover: MotionDriver + RangeSensor {}

impl<T: MotionDriver + RangeSensor> Rover for T {}
