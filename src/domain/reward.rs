//! Reward and terminal functions.

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::state::WorldState;

/// Scalar reward for a transition `(s, a, s')`.
pub trait RewardFunction {
    fn reward(&self, state: &WorldState, action: Action, next_state: &WorldState) -> f64;
}

/// Whether a state ends the episode.
pub trait TerminalFunction {
    fn is_terminal(&self, state: &WorldState) -> bool;
}

// ---------------------------------------------------------------------------
// Pursuit reward
// ---------------------------------------------------------------------------

/// The reference reward shaping.
///
/// Checked in order, first match wins:
/// 1. no health left → `lost`
/// 2. no hunger left → `goal`
/// 3. health dropped → `(next_health - health) * sting + honey`
/// 4. otherwise → `default`, plus `honey` when standing on the resource
///
/// Branch 3 always adds `honey`, whether or not the agent is on the resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PursuitReward {
    pub goal: f64,
    pub lost: f64,
    pub sting: f64,
    pub honey: f64,
    #[serde(rename = "defaults")]
    pub default: f64,
}

impl Default for PursuitReward {
    fn default() -> Self {
        Self {
            goal: 1000.0,
            lost: -1000.0,
            sting: -500.0,
            honey: 200.0,
            default: -1.0,
        }
    }
}

impl RewardFunction for PursuitReward {
    fn reward(&self, state: &WorldState, _action: Action, next_state: &WorldState) -> f64 {
        if next_state.no_health() {
            return self.lost;
        }
        if next_state.no_hunger() {
            return self.goal;
        }

        let health = state.agent().health;
        let next_health = next_state.agent().health;
        if health > next_health {
            let delta = f64::from(next_health) - f64::from(health);
            return delta * self.sting + self.honey;
        }

        let honey = if next_state.agent_at_resource() {
            self.honey
        } else {
            0.0
        };
        self.default + honey
    }
}

/// `-1` for every transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformCostReward;

impl RewardFunction for UniformCostReward {
    fn reward(&self, _state: &WorldState, _action: Action, _next_state: &WorldState) -> f64 {
        -1.0
    }
}

// ---------------------------------------------------------------------------
// Terminal function
// ---------------------------------------------------------------------------

/// Episode ends once the agent is fed (`hunger == 0`) or dead (`health == 0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PursuitTerminal;

impl TerminalFunction for PursuitTerminal {
    fn is_terminal(&self, state: &WorldState) -> bool {
        state.no_hunger() || state.no_health()
    }
}

/// Never terminates; useful for fixed-length rollouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverTerminal;

impl TerminalFunction for NeverTerminal {
    fn is_terminal(&self, _state: &WorldState) -> bool {
        false
    }
}
