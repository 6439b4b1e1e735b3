//! Tick runner - plays the behavior script against the story graph.
//!
//! Each tick walks the behaviors in script order:
//! 1. **Guard**: skip unless the guard point is enabled (and an obstacle is in range, if asked)
//! 2. **Act**: perform the motion primitive and advance the script clock
//! 3. **Report**: issue the outcome command once its time has come
//!
//! The story graph itself never sees time; the clock lives here.

use std::time::Duration;

use story_core::{StoryGraph, StorySnapshot};

use crate::driver::{Rover, SimulatedRover};
use crate::error::ScriptResult;
use crate::script::{Behavior, Outcome, ScriptConfig};

/// Time the robot has spent acting since the last story command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptClock {
    elapsed: Duration,
}

impl ScriptClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn advance(&mut self, by: Duration) {
        self.elapsed += by;
    }

    /// Restart timing; called whenever the script issues a story command.
    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }

    /// Whether at least `secs` seconds have elapsed.
    pub fn after_secs(&self, secs: f32) -> bool {
        Duration::try_from_secs_f32(secs).is_ok_and(|threshold| self.elapsed >= threshold)
    }
}

/// Drives a story graph with a behavior script, one tick at a time.
#[derive(Debug)]
pub struct TickRunner<R: Rover = SimulatedRover> {
    graph: StoryGraph,
    behaviors: Vec<Behavior>,
    rover: R,
    clock: ScriptClock,
    ticks: u64,
}

impl TickRunner<SimulatedRover> {
    /// Build a runner on a simulated rover fed with the script's range readings.
    pub fn simulated(script: &ScriptConfig) -> ScriptResult<Self> {
        let rover = SimulatedRover::with_ranges(script.rover.ranges_cm.iter().copied());
        Self::from_script(script, rover)
    }
}

impl<R: Rover> TickRunner<R> {
    /// Build the story graph from the script and attach the rover.
    ///
    /// Fails if the story layout is malformed; the run never starts in that case.
    pub fn from_script(script: &ScriptConfig, rover: R) -> ScriptResult<Self> {
        Ok(Self {
            graph: script.build_graph()?,
            behaviors: script.behaviors.clone(),
            rover,
            clock: ScriptClock::new(),
            ticks: 0,
        })
    }

    pub fn graph(&self) -> &StoryGraph {
        &self.graph
    }

    pub fn rover(&self) -> &R {
        &self.rover
    }

    pub fn clock(&self) -> ScriptClock {
        self.clock
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn snapshot(&self) -> StorySnapshot {
        self.graph.snapshot()
    }

    /// Run one pass over every behavior. Returns how many behaviors fired.
    pub fn tick(&mut self) -> usize {
        self.ticks += 1;
        let mut fired = 0;

        for index in 0..self.behaviors.len() {
            let behavior = &self.behaviors[index];
            if !self.graph.is_enabled(&behavior.when) {
                continue;
            }
            if let Some(distance) = behavior.obstacle_within {
                if !self.rover.obstacle_within(distance) {
                    continue;
                }
            }

            fired += 1;
            if let Some(action) = &behavior.action {
                let elapsed = action.perform(&mut self.rover);
                self.clock.advance(elapsed);
            }
            if let Some(outcome) = behavior.outcome.clone() {
                self.report(&outcome);
            }
        }

        tracing::trace!(tick = self.ticks, fired, "tick complete");
        fired
    }

    /// Run `ticks` ticks. Returns the total number of behaviors fired.
    pub fn run(&mut self, ticks: u64) -> usize {
        let fired: usize = (0..ticks).map(|_| self.tick()).sum();
        tracing::info!(
            run = %self.graph.run_id(),
            ticks,
            fired,
            active = ?self.graph.active_points(),
            "script run finished"
        );
        fired
    }

    fn report(&mut self, outcome: &Outcome) {
        if let Some(secs) = outcome.delay_secs() {
            if !self.clock.after_secs(secs) {
                return;
            }
        }

        match outcome {
            Outcome::Succeed { point } | Outcome::SucceedAfter { point, .. } => {
                self.graph.succeed(point);
            }
            Outcome::ContinueAt { point } | Outcome::ContinueAtAfter { point, .. } => {
                self.graph.continue_at(point);
            }
            Outcome::Fail { point } => {
                self.graph.fail(point);
            }
        }
        tracing::debug!(tick = self.ticks, point = outcome.point(), "story command issued");
        self.clock.reset();
    }
}
