//! A rover that only keeps time, for running scripts off the robot.

use std::collections::VecDeque;
use std::time::Duration;

use super::{MotionDriver, MoveDirection, RangeSensor, TurnDirection, Wheel};

const MOVE_TIME: Duration = Duration::from_millis(250);
const TURN_TIME: Duration = Duration::from_millis(450);
const MILLIS_PER_DEGREE: f32 = 5.0;
const DELAY_TIME: Duration = Duration::from_millis(250);

/// Simulated rover with the timings of the physical one.
///
/// Range readings are replayed in order; once they run out every reading is clear.
#[derive(Debug, Clone, Default)]
pub struct SimulatedRover {
    ranges_cm: VecDeque<f32>,
    turn_right_next: bool,
    actions: Vec<String>,
}

impl SimulatedRover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rover whose sensor reports these distances, one per reading.
    pub fn with_ranges(ranges_cm: impl IntoIterator<Item = f32>) -> Self {
        Self {
            ranges_cm: ranges_cm.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Log of every primitive performed so far.
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    fn record(&mut self, action: String, elapsed: Duration) -> Duration {
        tracing::debug!(action = %action, elapsed_ms = elapsed.as_millis() as u64, "rover action");
        self.actions.push(action);
        elapsed
    }
}

impl MotionDriver for SimulatedRover {
    fn move_straight(&mut self, speed: f32, direction: MoveDirection) -> Duration {
        self.record(format!("move {direction:?} at {speed}"), MOVE_TIME)
    }

    fn turn(&mut self, direction: TurnDirection) -> Duration {
        self.record(format!("turn {direction:?}"), TURN_TIME)
    }

    fn turn_degrees(&mut self, degrees: f32, direction: TurnDirection) -> Duration {
        let elapsed = Duration::from_millis((degrees.max(0.0) * MILLIS_PER_DEGREE).round() as u64);
        self.record(format!("turn {direction:?} by {degrees}"), elapsed)
    }

    fn turn_randomly(&mut self) -> Duration {
        // Alternates so simulated runs stay reproducible.
        let direction = if self.turn_right_next {
            TurnDirection::Right
        } else {
            TurnDirection::Left
        };
        self.turn_right_next = !self.turn_right_next;
        self.record(format!("turn randomly {direction:?}"), MOVE_TIME)
    }

    fn adjust_wheel(&mut self, wheel: Wheel, amount: f32) -> Duration {
        self.record(format!("adjust {wheel:?} by {amount}"), Duration::ZERO)
    }

    fn delay(&mut self) -> Duration {
        self.record("delay".to_string(), DELAY_TIME)
    }
}

impl RangeSensor for SimulatedRover {
    fn obstacle_within(&mut self, distance_cm: f32) -> bool {
        self.ranges_cm
            .pop_front()
            .is_some_and(|range| range <= distance_cm)
    }
}
