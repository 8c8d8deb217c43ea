//! The pursuit grid-world: an agent chases a stationary resource while
//! pursuers chase the agent.
//!
//! - [`state`] -- positions, entities, the shared obstacle map and the
//!   validated [`WorldState`] snapshot.
//! - [`action`] -- the closed five-move [`Action`] set.
//! - [`model`] -- the stochastic [`StateModel`] and its reference
//!   [`PursuitModel`], plus the [`FactoredModel`] bundle that scores it.
//! - [`reward`] -- [`RewardFunction`] / [`TerminalFunction`] and their
//!   reference implementations.
//! - [`generator`] -- initial-state generators.

pub mod action;
pub mod generator;
pub mod model;
pub mod reward;
pub mod state;

#[cfg(test)]
mod tests_proptest;

pub use action::{applicable_actions, Action, ActionParseError};
pub use generator::{ConstantStateGenerator, LayoutGenerator, StateGenerator};
pub use model::{FactoredModel, PursuitModel, StateModel, Transition, DEFAULT_P_RANDOM};
pub use reward::{
    NeverTerminal, PursuitReward, PursuitTerminal, RewardFunction, TerminalFunction,
    UniformCostReward,
};
pub use state::{Agent, ObstacleMap, Position, Pursuer, Resource, StateError, WorldState};
