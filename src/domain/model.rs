//! Stochastic transition dynamics.
//!
//! [`PursuitModel::sample`] applies one action in a fixed order:
//!
//! 1. the agent attempts its move (blocked or out-of-bounds moves are no-ops);
//! 2. each pursuer, in list order, either wanders (probability `p_random`) or
//!    closes in on the agent's *post-move* cell along a single axis;
//! 3. every pursuer on the agent's cell stings once and is removed;
//! 4. standing on the resource feeds the agent once.
//!
//! The generator is passed in on every call so that seeded runs reproduce.

use rand::{Rng, RngCore};
use tracing::trace;

use super::action::Action;
use super::reward::{RewardFunction, TerminalFunction};
use super::state::{ObstacleMap, Position, WorldState};

/// Default probability that a pursuer wanders instead of chasing.
pub const DEFAULT_P_RANDOM: f64 = 0.2;

/// A sampling transition kernel: `(state, action) → next_state`.
///
/// Repeated calls with the same input may return different states; all
/// randomness must come from `rng`.
pub trait StateModel {
    fn sample(&self, state: &WorldState, action: Action, rng: &mut dyn RngCore) -> WorldState;
}

/// The reference pursuit dynamics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PursuitModel {
    /// Probability a pursuer takes a uniformly random step.
    p_random: f64,
}

impl PursuitModel {
    /// `p_random` is clamped to `[0, 1]`; NaN is treated as 0.
    pub fn new(p_random: f64) -> Self {
        let p_random = if p_random.is_nan() {
            0.0
        } else {
            p_random.clamp(0.0, 1.0)
        };
        Self { p_random }
    }

    pub fn p_random(&self) -> f64 {
        self.p_random
    }

    // -- internal helpers ---------------------------------------------------

    /// Where a single pursuer wants to go this step.
    fn pursuer_target(&self, from: Position, agent: Position, rng: &mut dyn RngCore) -> Position {
        if rng.gen_bool(self.p_random) {
            return match rng.gen_range(0..4) {
                0 => from.offset(-1, 0),
                1 => from.offset(1, 0),
                2 => from.offset(0, -1),
                _ => from.offset(0, 1),
            };
        }

        let dx = (agent.x - from.x).signum();
        let dy = (agent.y - from.y).signum();
        if dx != 0 && dy != 0 {
            // Never diagonal: pick one axis.
            if rng.gen_bool(0.5) {
                from.offset(0, dy)
            } else {
                from.offset(dx, 0)
            }
        } else {
            from.offset(dx, dy)
        }
    }
}

impl Default for PursuitModel {
    fn default() -> Self {
        Self::new(DEFAULT_P_RANDOM)
    }
}

/// `candidate` if an entity may stand there, otherwise `current`.
fn step_or_stay(map: &ObstacleMap, current: Position, candidate: Position) -> Position {
    if map.is_open(candidate) {
        candidate
    } else {
        current
    }
}

impl StateModel for PursuitModel {
    fn sample(&self, state: &WorldState, action: Action, rng: &mut dyn RngCore) -> WorldState {
        let mut next = state.clone();
        let map = next.map_handle();

        // 1. Agent movement.
        let (dx, dy) = action.delta();
        let agent_pos = {
            let agent = next.agent_mut();
            agent.position = step_or_stay(&map, agent.position, agent.position.offset(dx, dy));
            agent.position
        };

        // 2. Pursuer movement toward the post-move agent cell.
        for pursuer in next.pursuers_mut().iter_mut() {
            let target = self.pursuer_target(pursuer.position, agent_pos, rng);
            pursuer.position = step_or_stay(&map, pursuer.position, target);
        }

        // 3. Collisions.
        let before = next.pursuers().len();
        next.pursuers_mut().retain(|p| p.position != agent_pos);
        let stings = before - next.pursuers().len();
        if stings > 0 {
            let agent = next.agent_mut();
            let stings = u32::try_from(stings).unwrap_or(u32::MAX);
            agent.health = agent.health.saturating_sub(stings);
            trace!(stings, health = agent.health, "agent stung");
        }

        // 4. Resource contact.
        if next.agent_at_resource() {
            let agent = next.agent_mut();
            agent.hunger = agent.hunger.saturating_sub(1);
            trace!(hunger = agent.hunger, "agent fed");
        }

        next
    }
}

// ---------------------------------------------------------------------------
// Factored model
// ---------------------------------------------------------------------------

/// Result of sampling a [`FactoredModel`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_state: WorldState,
    pub reward: f64,
    /// Whether `next_state` ends the episode.
    pub terminal: bool,
}

/// A transition kernel bundled with the reward and terminal functions that
/// score it. Each part is injected, so reward shaping can change without
/// touching the dynamics.
#[derive(Debug, Clone, Default)]
pub struct FactoredModel<M, R, T> {
    pub model: M,
    pub reward: R,
    pub terminal: T,
}

impl<M, R, T> FactoredModel<M, R, T>
where
    M: StateModel,
    R: RewardFunction,
    T: TerminalFunction,
{
    pub fn new(model: M, reward: R, terminal: T) -> Self {
        Self {
            model,
            reward,
            terminal,
        }
    }

    pub fn is_terminal(&self, state: &WorldState) -> bool {
        self.terminal.is_terminal(state)
    }

    /// Sample a next state and score it.
    pub fn sample(&self, state: &WorldState, action: Action, rng: &mut dyn RngCore) -> Transition {
        let next_state = self.model.sample(state, action, rng);
        let reward = self.reward.reward(state, action, &next_state);
        let terminal = self.terminal.is_terminal(&next_state);
        Transition {
            next_state,
            reward,
            terminal,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::domain::state::{Agent, Pursuer, Resource};

    fn state_with(
        map: ObstacleMap,
        agent: Agent,
        resource: (i32, i32),
        pursuers: Vec<Pursuer>,
    ) -> WorldState {
        WorldState::new(agent, Arc::new(map), Resource::new("honey", resource), pursuers).unwrap()
    }

    #[test]
    fn agent_moves_in_each_direction() {
        let model = PursuitModel::new(0.0);
        let mut rng = StdRng::seed_from_u64(1);
        let s = state_with(
            ObstacleMap::open(5, 5).unwrap(),
            Agent::new((2, 2), 3, 3),
            (4, 4),
            vec![],
        );
        let expect = [
            (Action::North, (2, 3)),
            (Action::South, (2, 1)),
            (Action::East, (3, 2)),
            (Action::West, (1, 2)),
            (Action::Idle, (2, 2)),
        ];
        for (action, pos) in expect {
            let next = model.sample(&s, action, &mut rng);
            assert_eq!(next.agent().position, pos.into(), "{action}");
        }
    }

    #[test]
    fn boundary_moves_are_noops() {
        let model = PursuitModel::default();
        let mut rng = StdRng::seed_from_u64(2);
        let s = state_with(
            ObstacleMap::open(5, 5).unwrap(),
            Agent::new((0, 0), 3, 3),
            (4, 4),
            vec![],
        );
        for action in [Action::West, Action::South] {
            let next = model.sample(&s, action, &mut rng);
            assert_eq!(next.agent().position, Position::new(0, 0));
            assert_eq!(next.agent().health, 3);
            assert_eq!(next.agent().hunger, 3);
        }
    }

    #[test]
    fn blocked_cell_stops_the_agent() {
        let model = PursuitModel::new(0.0);
        let mut rng = StdRng::seed_from_u64(3);
        let map = ObstacleMap::with_blocked(5, 5, [Position::new(3, 2)]).unwrap();
        let s = state_with(map, Agent::new((2, 2), 3, 3), (4, 4), vec![]);
        let next = model.sample(&s, Action::East, &mut rng);
        assert_eq!(next.agent().position, Position::new(2, 2));
    }

    #[test]
    fn chasing_pursuer_closes_distance_on_one_axis() {
        let model = PursuitModel::new(0.0);
        let mut rng = StdRng::seed_from_u64(4);
        let s = state_with(
            ObstacleMap::open(10, 10).unwrap(),
            Agent::new((0, 0), 3, 3),
            (9, 0),
            vec![Pursuer::new("b0", (5, 5))],
        );
        for _ in 0..50 {
            let next = model.sample(&s, Action::Idle, &mut rng);
            let p = next.pursuer("b0").unwrap().position;
            assert_eq!(p.manhattan(Position::new(5, 5)), 1);
            assert_eq!(p.manhattan(Position::new(0, 0)), 9);
        }
    }

    #[test]
    fn pursuer_targets_post_move_cell() {
        let model = PursuitModel::new(0.0);
        let mut rng = StdRng::seed_from_u64(5);
        // Pursuer in line with the agent's new cell only.
        let s = state_with(
            ObstacleMap::open(10, 10).unwrap(),
            Agent::new((2, 2), 3, 3),
            (9, 9),
            vec![Pursuer::new("b0", (6, 3))],
        );
        let next = model.sample(&s, Action::North, &mut rng);
        assert_eq!(next.agent().position, Position::new(2, 3));
        assert_eq!(next.pursuer("b0").unwrap().position, Position::new(5, 3));
    }

    #[test]
    fn every_colliding_pursuer_stings_once() {
        let model = PursuitModel::new(0.0);
        let mut rng = StdRng::seed_from_u64(6);
        let s = state_with(
            ObstacleMap::open(5, 5).unwrap(),
            Agent::new((2, 2), 5, 3),
            (4, 4),
            vec![
                Pursuer::new("b0", (2, 3)),
                Pursuer::new("b1", (2, 1)),
                Pursuer::new("b2", (4, 0)),
            ],
        );
        let next = model.sample(&s, Action::Idle, &mut rng);
        assert_eq!(next.agent().health, 3);
        assert!(next.pursuer("b0").is_none());
        assert!(next.pursuer("b1").is_none());
        assert!(next.pursuer("b2").is_some());
        // The source state is untouched.
        assert_eq!(s.pursuers().len(), 3);
        assert_eq!(s.agent().health, 5);
    }

    #[test]
    fn health_saturates_at_zero() {
        let model = PursuitModel::new(0.0);
        let mut rng = StdRng::seed_from_u64(7);
        let s = state_with(
            ObstacleMap::open(5, 5).unwrap(),
            Agent::new((2, 2), 1, 3),
            (4, 4),
            vec![Pursuer::new("b0", (2, 3)), Pursuer::new("b1", (3, 2))],
        );
        let next = model.sample(&s, Action::Idle, &mut rng);
        assert_eq!(next.agent().health, 0);
        assert!(next.pursuers().is_empty());
    }

    #[test]
    fn stepping_onto_resource_feeds_agent() {
        let model = PursuitModel::new(0.0);
        let mut rng = StdRng::seed_from_u64(8);
        let s = state_with(
            ObstacleMap::open(5, 5).unwrap(),
            Agent::new((1, 1), 3, 2),
            (2, 1),
            vec![],
        );
        let next = model.sample(&s, Action::East, &mut rng);
        assert_eq!(next.agent().hunger, 1);
        let fed_again = model.sample(&next, Action::Idle, &mut rng);
        assert_eq!(fed_again.agent().hunger, 0);
        let still_zero = model.sample(&fed_again, Action::Idle, &mut rng);
        assert_eq!(still_zero.agent().hunger, 0);
    }

    #[test]
    fn wandering_pursuer_stays_in_bounds() {
        let model = PursuitModel::new(1.0);
        let mut rng = StdRng::seed_from_u64(9);
        let mut s = state_with(
            ObstacleMap::open(2, 2).unwrap(),
            Agent::new((0, 0), 100, 100),
            (1, 0),
            vec![Pursuer::new("b0", (1, 1))],
        );
        for _ in 0..200 {
            s = model.sample(&s, Action::Idle, &mut rng);
            for p in s.pursuers() {
                assert!(s.map().is_open(p.position));
            }
        }
    }

    #[test]
    fn same_seed_same_trajectory() {
        let model = PursuitModel::default();
        let s = state_with(
            ObstacleMap::open(8, 8).unwrap(),
            Agent::new((0, 0), 5, 5),
            (7, 7),
            vec![Pursuer::new("b0", (7, 0)), Pursuer::new("b1", (0, 7))],
        );
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut cur = s.clone();
            let mut out = Vec::new();
            for a in Action::ALL.iter().cycle().take(20) {
                cur = model.sample(&cur, *a, &mut rng);
                out.push(cur.clone());
            }
            out
        };
        assert_eq!(run(11), run(11));
    }
}
