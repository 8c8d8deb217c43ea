//! Behavior policies: state → action mappings used while collecting data.

use rand::seq::SliceRandom;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::{Action, WorldState};

/// Chooses the action to take in a state.
///
/// Collectors always pass a non-empty `applicable`; implementations should
/// return one of its elements. [`UniformRandomPolicy`] falls back to
/// [`Action::Idle`] when handed an empty slice.
pub trait BehaviorPolicy {
    fn select_action(&mut self, state: &WorldState, applicable: &[Action]) -> Action;
}

impl<P: BehaviorPolicy + ?Sized> BehaviorPolicy for &mut P {
    fn select_action(&mut self, state: &WorldState, applicable: &[Action]) -> Action {
        (**self).select_action(state, applicable)
    }
}

impl<P: BehaviorPolicy + ?Sized> BehaviorPolicy for Box<P> {
    fn select_action(&mut self, state: &WorldState, applicable: &[Action]) -> Action {
        (**self).select_action(state, applicable)
    }
}

// ---------------------------------------------------------------------------
// Uniform random
// ---------------------------------------------------------------------------

/// Picks uniformly among the applicable actions, or [`Action::Idle`] when
/// there are none.
#[derive(Debug, Clone)]
pub struct UniformRandomPolicy<R = StdRng> {
    rng: R,
}

impl UniformRandomPolicy<StdRng> {
    /// A policy driven by a `StdRng` seeded with `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> UniformRandomPolicy<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> BehaviorPolicy for UniformRandomPolicy<R> {
    fn select_action(&mut self, _state: &WorldState, applicable: &[Action]) -> Action {
        applicable
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Action::Idle)
    }
}

// ---------------------------------------------------------------------------
// Function policy
// ---------------------------------------------------------------------------

/// Wraps any `FnMut(&WorldState, &[Action]) -> Action` as a policy.
pub struct FnPolicy<F> {
    f: F,
}

impl<F> FnPolicy<F>
where
    F: FnMut(&WorldState, &[Action]) -> Action,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> BehaviorPolicy for FnPolicy<F>
where
    F: FnMut(&WorldState, &[Action]) -> Action,
{
    fn select_action(&mut self, state: &WorldState, applicable: &[Action]) -> Action {
        (self.f)(state, applicable)
    }
}
