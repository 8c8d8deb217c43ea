//! Initial-state generators.
//!
//! Collectors and simulated environments draw a fresh starting state from a
//! [`StateGenerator`] at the start of every rollout or reset.

use std::sync::Arc;

use crate::config::DomainConfig;

use super::state::{Agent, ObstacleMap, Position, Pursuer, Resource, StateError, WorldState};

/// Produces a fresh initial state on demand.
pub trait StateGenerator {
    fn generate_state(&mut self) -> WorldState;
}

/// Always returns a copy of the same state.
#[derive(Debug, Clone)]
pub struct ConstantStateGenerator {
    state: WorldState,
}

impl ConstantStateGenerator {
    pub fn new(state: WorldState) -> Self {
        Self { state }
    }
}

impl StateGenerator for ConstantStateGenerator {
    fn generate_state(&mut self) -> WorldState {
        self.state.clone()
    }
}

/// Builds initial states from a [`DomainConfig`] spawn layout.
///
/// The layout is validated once in [`LayoutGenerator::new`]; every generated
/// state shares the same obstacle map.
#[derive(Debug, Clone)]
pub struct LayoutGenerator {
    template: WorldState,
}

impl LayoutGenerator {
    pub fn new(config: &DomainConfig) -> Result<Self, StateError> {
        let [width, height] = config.map.size;
        let map = ObstacleMap::with_blocked(
            width,
            height,
            config.map.blocked.iter().map(|&[x, y]| Position::new(x, y)),
        )?;

        let [ax, ay] = config.agent.spawn;
        let agent = Agent::new((ax, ay), config.agent.health, config.agent.hunger);

        let [rx, ry] = config.resource.spawn;
        let resource = Resource::new("honey", (rx, ry));

        let [px, py] = config.pursuers.spawn;
        let pursuers = (0..config.pursuers.count)
            .map(|i| Pursuer::new(format!("bee{i}"), (px, py)))
            .collect();

        let template = WorldState::new(agent, Arc::new(map), resource, pursuers)?;
        Ok(Self { template })
    }

    /// The state every call to [`StateGenerator::generate_state`] returns.
    pub fn template(&self) -> &WorldState {
        &self.template
    }
}

impl StateGenerator for LayoutGenerator {
    fn generate_state(&mut self) -> WorldState {
        self.template.clone()
    }
}
