//! An [`Environment`] backed by a [`StateModel`].
//!
//! [`SimulatedEnvironment`] wraps a state generator and a [`FactoredModel`]
//! into a stateful environment. It is the live-source counterpart of
//! collecting directly from a state and a model.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::traits::{Environment, EnvironmentOutcome};
use crate::domain::{
    Action, FactoredModel, RewardFunction, StateGenerator, StateModel, TerminalFunction,
    WorldState,
};

/// A simulated pursuit environment.
pub struct SimulatedEnvironment<G, M, R, T> {
    generator: G,
    model: FactoredModel<M, R, T>,
    rng: StdRng,
    current: WorldState,
    /// Steps taken since the last reset.
    steps: usize,
}

impl<G, M, R, T> SimulatedEnvironment<G, M, R, T>
where
    G: StateGenerator,
    M: StateModel,
    R: RewardFunction,
    T: TerminalFunction,
{
    /// Create the environment and draw its first state from `generator`.
    pub fn new(mut generator: G, model: FactoredModel<M, R, T>, seed: u64) -> Self {
        let current = generator.generate_state();
        Self {
            generator,
            model,
            rng: StdRng::seed_from_u64(seed),
            current,
            steps: 0,
        }
    }

    /// Steps taken since the last reset.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Replace the current state without touching the generator.
    pub fn set_state(&mut self, state: WorldState) {
        self.current = state;
        self.steps = 0;
    }
}

impl<G, M, R, T> Environment for SimulatedEnvironment<G, M, R, T>
where
    G: StateGenerator,
    M: StateModel,
    R: RewardFunction,
    T: TerminalFunction,
{
    fn current_observation(&self) -> &WorldState {
        &self.current
    }

    fn is_terminal(&self) -> bool {
        self.model.is_terminal(&self.current)
    }

    fn step(&mut self, action: Action) -> Result<EnvironmentOutcome> {
        if self.is_terminal() {
            anyhow::bail!("cannot step in a terminated episode");
        }

        let transition = self.model.sample(&self.current, action, &mut self.rng);
        let state = std::mem::replace(&mut self.current, transition.next_state.clone());
        self.steps += 1;

        Ok(EnvironmentOutcome {
            state,
            action,
            reward: transition.reward,
            next_state: transition.next_state,
            terminated: transition.terminal,
        })
    }

    fn reset(&mut self) -> Result<()> {
        self.current = self.generator.generate_state();
        self.steps = 0;
        tracing::debug!(
            agent = %self.current.agent().position,
            pursuers = self.current.pursuers().len(),
            "simulated env reset"
        );
        Ok(())
    }
}
