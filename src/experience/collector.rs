//! SARS collection: driving a behavior policy through rollouts.
//!
//! The [`SarsCollector`] builds datasets by repeatedly:
//!   1. asking the policy for an action in the current state,
//!   2. sampling (or stepping) the transition,
//!   3. recording the `(state, action, reward, next_state)` tuple,
//!
//! until the state is terminal or the per-rollout step cap is hit.
//!
//! It supports two kinds of source:
//! - **Closed-form**: an initial state plus a [`FactoredModel`], via
//!   [`SarsCollector::collect_from_state`] or a [`ClosedFormSource`].
//! - **Live**: any [`Environment`], via [`SarsCollector::collect_from_env`]
//!   or an [`EnvironmentSource`].
//!
//! [`SarsCollector::collect_n`] repeats rollouts from a [`RolloutSource`]
//! until an exact sample budget is met.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

use crate::domain::{
    applicable_actions, FactoredModel, RewardFunction, StateGenerator, StateModel,
    TerminalFunction, WorldState,
};
use crate::env::Environment;
use crate::experience::policy::BehaviorPolicy;
use crate::experience::types::TransitionDataset;

/// Consecutive empty rollouts tolerated by [`SarsCollector::collect_n`].
pub const DEFAULT_MAX_STALLED_ROLLOUTS: usize = 64;

/// Errors raised while collecting.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Every recent rollout produced nothing, so the budget cannot be met.
    /// The records gathered so far are returned in `partial`.
    #[error(
        "sample budget unreachable: collected {collected} of {requested} records \
         before {stalled} consecutive rollouts produced nothing"
    )]
    BudgetUnreachable {
        requested: usize,
        collected: usize,
        stalled: usize,
        partial: Box<TransitionDataset>,
    },

    /// The source failed mid-collection. Records appended before the
    /// failure, including any supplied dataset, are returned in `partial`.
    #[error("environment error: {source}")]
    Environment {
        source: anyhow::Error,
        partial: Box<TransitionDataset>,
    },
}

// ---------------------------------------------------------------------------
// Rollout sources
// ---------------------------------------------------------------------------

/// Something that can run one bounded rollout into a dataset.
pub trait RolloutSource {
    /// Run at most `max_steps` transitions, appending each to `dataset`.
    /// Returns the number of records appended.
    fn rollout(
        &mut self,
        policy: &mut dyn BehaviorPolicy,
        max_steps: usize,
        dataset: &mut TransitionDataset,
    ) -> anyhow::Result<usize>;
}

/// Closed-form source: every rollout starts from a freshly generated state
/// and advances through a [`FactoredModel`].
pub struct ClosedFormSource<G, M, R, T> {
    generator: G,
    model: FactoredModel<M, R, T>,
    rng: StdRng,
}

impl<G, M, R, T> ClosedFormSource<G, M, R, T>
where
    G: StateGenerator,
    M: StateModel,
    R: RewardFunction,
    T: TerminalFunction,
{
    pub fn new(generator: G, model: FactoredModel<M, R, T>, seed: u64) -> Self {
        Self {
            generator,
            model,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn model(&self) -> &FactoredModel<M, R, T> {
        &self.model
    }
}

impl<G, M, R, T> RolloutSource for ClosedFormSource<G, M, R, T>
where
    G: StateGenerator,
    M: StateModel,
    R: RewardFunction,
    T: TerminalFunction,
{
    fn rollout(
        &mut self,
        policy: &mut dyn BehaviorPolicy,
        max_steps: usize,
        dataset: &mut TransitionDataset,
    ) -> anyhow::Result<usize> {
        let state = self.generator.generate_state();
        Ok(rollout_from_state(
            policy,
            state,
            &self.model,
            &mut self.rng,
            max_steps,
            dataset,
        ))
    }
}

/// Live source: rollouts continue from the environment's current state, and
/// the environment is reset after each one.
pub struct EnvironmentSource<E> {
    env: E,
}

impl<E: Environment> EnvironmentSource<E> {
    pub fn new(env: E) -> Self {
        Self { env }
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: Environment> RolloutSource for EnvironmentSource<E> {
    fn rollout(
        &mut self,
        policy: &mut dyn BehaviorPolicy,
        max_steps: usize,
        dataset: &mut TransitionDataset,
    ) -> anyhow::Result<usize> {
        let produced = rollout_from_env(policy, &mut self.env, max_steps, dataset)?;
        self.env.reset()?;
        Ok(produced)
    }
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Collects SARS datasets by running a behavior policy.
#[derive(Debug, Clone)]
pub struct SarsCollector<P> {
    policy: P,
    max_stalled_rollouts: usize,
}

impl<P: BehaviorPolicy> SarsCollector<P> {
    pub fn new(policy: P) -> Self {
        Self {
            policy,
            max_stalled_rollouts: DEFAULT_MAX_STALLED_ROLLOUTS,
        }
    }

    /// How many consecutive empty rollouts [`collect_n`](Self::collect_n)
    /// accepts before giving up. Values below 1 are treated as 1.
    pub fn with_max_stalled_rollouts(mut self, limit: usize) -> Self {
        self.max_stalled_rollouts = limit.max(1);
        self
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    /// Run one rollout from `state` through `model`.
    ///
    /// Stops when the terminal function accepts the current state or after
    /// `max_steps` records. Records go into `into` when given, otherwise into
    /// a new dataset.
    pub fn collect_from_state<M, R, T>(
        &mut self,
        state: WorldState,
        model: &FactoredModel<M, R, T>,
        rng: &mut dyn RngCore,
        max_steps: usize,
        into: Option<TransitionDataset>,
    ) -> TransitionDataset
    where
        M: StateModel,
        R: RewardFunction,
        T: TerminalFunction,
    {
        let mut dataset = into.unwrap_or_default();
        let produced =
            rollout_from_state(&mut self.policy, state, model, rng, max_steps, &mut dataset);
        dataset.mark_rollout();
        tracing::debug!(produced, total = dataset.len(), "closed-form rollout");
        dataset
    }

    /// Run one rollout through a live environment, starting from its current
    /// state. The environment is not reset.
    pub fn collect_from_env<E>(
        &mut self,
        env: &mut E,
        max_steps: usize,
        into: Option<TransitionDataset>,
    ) -> Result<TransitionDataset, CollectError>
    where
        E: Environment + ?Sized,
    {
        let mut dataset = into.unwrap_or_default();
        let result = rollout_from_env(&mut self.policy, env, max_steps, &mut dataset);
        dataset.mark_rollout();
        let produced = match result {
            Ok(produced) => produced,
            Err(source) => return Err(environment_error(source, dataset)),
        };
        tracing::debug!(produced, total = dataset.len(), "environment rollout");
        Ok(dataset)
    }

    /// Collect exactly `n_samples` new records from `source`.
    ///
    /// Each rollout is capped at the smaller of `max_steps` and the number of
    /// records still owed, so the budget is never overshot. Fails with
    /// [`CollectError::BudgetUnreachable`] once too many rollouts in a row
    /// produce nothing (for instance when every initial state is terminal or
    /// `max_steps` is zero).
    pub fn collect_n<S>(
        &mut self,
        source: &mut S,
        n_samples: usize,
        max_steps: usize,
        into: Option<TransitionDataset>,
    ) -> Result<TransitionDataset, CollectError>
    where
        S: RolloutSource + ?Sized,
    {
        let mut dataset = into.unwrap_or_else(|| TransitionDataset::with_capacity(n_samples));
        let mut remaining = n_samples;
        let mut stalled = 0usize;
        let mut rollout = 0usize;

        while remaining > 0 {
            let cap = remaining.min(max_steps);
            let result = source.rollout(&mut self.policy, cap, &mut dataset);
            dataset.mark_rollout();
            let produced = match result {
                Ok(produced) => produced,
                Err(source) => return Err(environment_error(source, dataset)),
            };
            remaining = remaining.saturating_sub(produced);

            tracing::debug!(rollout, produced, remaining, "rollout finished");
            rollout += 1;

            if produced == 0 {
                stalled += 1;
                tracing::warn!(stalled, remaining, "rollout produced no records");
                if stalled >= self.max_stalled_rollouts {
                    return Err(CollectError::BudgetUnreachable {
                        requested: n_samples,
                        collected: n_samples - remaining,
                        stalled,
                        partial: Box::new(dataset),
                    });
                }
            } else {
                stalled = 0;
            }
        }

        tracing::info!(
            dataset = %dataset.id(),
            collected = n_samples,
            rollouts = rollout,
            total = dataset.len(),
            "sample budget met"
        );
        Ok(dataset)
    }
}

// -- internal helpers -------------------------------------------------------

fn environment_error(source: anyhow::Error, partial: TransitionDataset) -> CollectError {
    tracing::warn!(error = %source, kept = partial.len(), "collection aborted");
    CollectError::Environment {
        source,
        partial: Box::new(partial),
    }
}

fn rollout_from_state<M, R, T>(
    policy: &mut dyn BehaviorPolicy,
    state: WorldState,
    model: &FactoredModel<M, R, T>,
    rng: &mut dyn RngCore,
    max_steps: usize,
    dataset: &mut TransitionDataset,
) -> usize
where
    M: StateModel,
    R: RewardFunction,
    T: TerminalFunction,
{
    let mut current = state;
    let mut steps = 0;
    while steps < max_steps && !model.is_terminal(&current) {
        let action = policy.select_action(&current, applicable_actions(&current));
        let transition = model.sample(&current, action, rng);
        dataset.push(current, action, transition.reward, transition.next_state.clone());
        current = transition.next_state;
        steps += 1;
    }
    steps
}

fn rollout_from_env<E>(
    policy: &mut dyn BehaviorPolicy,
    env: &mut E,
    max_steps: usize,
    dataset: &mut TransitionDataset,
) -> anyhow::Result<usize>
where
    E: Environment + ?Sized,
{
    let mut steps = 0;
    while steps < max_steps && !env.is_terminal() {
        let observation = env.current_observation();
        let action = policy.select_action(observation, applicable_actions(observation));
        let outcome = env.step(action)?;
        dataset.push(outcome.state, outcome.action, outcome.reward, outcome.next_state);
        steps += 1;
    }
    Ok(steps)
}
