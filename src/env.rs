//! Environment collaborator contract
//!
//! The environment owns all simulator-internal state; the trial engine only
//! touches it through `reset`, `step`, and (when the session requests
//! rendering) `render`. An environment instance is exclusively owned by its
//! trial for the trial's lifetime and released by the caller afterwards.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::trial::error::{EnvResult, EnvironmentError};
use crate::trial::observation::RenderedFrame;

/// Result of stepping the environment once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvStep {
    /// Raw state after applying the action
    pub state: Value,
    /// Reward for this step; `None` when the environment defines no reward
    pub reward: Option<f64>,
    /// Whether the environment reports the episode as finished
    pub done: bool,
}

/// An episodic environment driven by the trial engine
///
/// All calls are synchronous relative to one trial; failures are fatal to
/// the trial and propagate as [`EnvironmentError`].
pub trait Environment: Send {
    /// Reset the environment and return the initial raw state
    fn reset(&mut self) -> EnvResult<Value>;

    /// Apply the effective action and advance one step
    fn step(&mut self, action: &Value) -> EnvResult<EnvStep>;

    /// Render a snapshot of the current state at the given width.
    ///
    /// Only called when the session requested rendering; environments that
    /// cannot render should return [`EnvironmentError::Render`].
    fn render(&mut self, width: u32) -> EnvResult<RenderedFrame>;
}

/// A deterministic 1-D walk environment.
///
/// The walker starts at zero on the interval `[-bound, bound]` and moves by
/// the signed integer it receives as an action. Reaching either bound ends
/// the episode with reward 1.0; every other step carries no reward. The
/// episode also ends, rewardless, when the step limit is hit.
///
/// Exists so the crate is runnable end to end without an external simulator.
#[derive(Debug, Clone)]
pub struct LineWorld {
    position: i64,
    bound: i64,
    steps: u64,
    max_steps: u64,
}

impl LineWorld {
    /// Create a walk on `[-bound, bound]` with the given step limit
    pub fn new(bound: i64, max_steps: u64) -> Self {
        Self {
            position: 0,
            bound: bound.max(1),
            steps: 0,
            max_steps,
        }
    }

    fn state(&self) -> Value {
        json!({ "position": self.position, "steps": self.steps })
    }
}

impl Environment for LineWorld {
    fn reset(&mut self) -> EnvResult<Value> {
        self.position = 0;
        self.steps = 0;
        Ok(self.state())
    }

    fn step(&mut self, action: &Value) -> EnvResult<EnvStep> {
        let delta = action
            .as_i64()
            .ok_or_else(|| EnvironmentError::Step(format!("non-integer action: {action}")))?;

        self.position = self
            .position
            .saturating_add(delta)
            .clamp(-self.bound, self.bound);
        self.steps += 1;

        let at_goal = self.position.abs() == self.bound;
        let out_of_steps = self.steps >= self.max_steps;

        Ok(EnvStep {
            state: self.state(),
            reward: at_goal.then_some(1.0),
            done: at_goal || out_of_steps,
        })
    }

    fn render(&mut self, width: u32) -> EnvResult<RenderedFrame> {
        // One row of pixels: 0 everywhere, 1 at the walker's cell.
        let width = width.max(1);
        let span = self.bound.saturating_mul(2).saturating_add(1) as f64;
        let offset = self.position.saturating_add(self.bound) as f64;
        let cell = (offset / span * width as f64) as usize;

        let mut data = vec![0u8; width as usize];
        data[cell.min(width as usize - 1)] = 1;

        Ok(RenderedFrame { width, data })
    }
}
