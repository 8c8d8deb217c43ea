//! Core environment trait and shared types.
//!
//! A live [`Environment`] owns its current state and advances it one action at
//! a time, so that the experience collector can drive it without knowing how
//! the world is simulated (or whether it is simulated at all).

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::{Action, WorldState};

/// The full record of one environment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentOutcome {
    /// Observation before the action.
    pub state: WorldState,
    /// The action that was executed.
    pub action: Action,
    /// Reward for the transition.
    pub reward: f64,
    /// Observation after the action.
    pub next_state: WorldState,
    /// Whether `next_state` ends the episode.
    pub terminated: bool,
}

/// A stateful environment the collector can step through.
pub trait Environment {
    /// The state the agent currently observes.
    fn current_observation(&self) -> &WorldState;

    /// Whether the current state ends the episode.
    fn is_terminal(&self) -> bool;

    /// Execute `action` and return the resulting transition.
    fn step(&mut self, action: Action) -> Result<EnvironmentOutcome>;

    /// Start a new episode.
    fn reset(&mut self) -> Result<()>;
}
