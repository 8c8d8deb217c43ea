//! Property tests for the pursuit dynamics and the collector budget.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::domain::{
        Action, Agent, ConstantStateGenerator, FactoredModel, NeverTerminal, ObstacleMap,
        Position, Pursuer, PursuitModel, PursuitReward, PursuitTerminal, Resource,
        RewardFunction, StateModel, TerminalFunction, UniformCostReward, WorldState,
    };
    use crate::experience::{ClosedFormSource, SarsCollector, UniformRandomPolicy};

    /// Fold raw draws onto a `width x height` grid. The first cell is the
    /// agent, the second the resource, the rest pursuers; walls never cover
    /// an entity.
    fn build_state(
        width: usize,
        height: usize,
        cells: &[(u16, u16)],
        walls: &[(u16, u16)],
        health: u32,
        hunger: u32,
    ) -> WorldState {
        let fold = |&(x, y): &(u16, u16)| {
            Position::new(
                (x as usize % width) as i32,
                (y as usize % height) as i32,
            )
        };
        let entities: Vec<Position> = cells.iter().map(fold).collect();
        let occupied: HashSet<Position> = entities.iter().copied().collect();
        let blocked: Vec<Position> = walls
            .iter()
            .map(fold)
            .filter(|p| !occupied.contains(p))
            .collect();

        let map = ObstacleMap::with_blocked(width, height, blocked).unwrap();
        let pursuers = entities[2..]
            .iter()
            .enumerate()
            .map(|(i, &p)| Pursuer::new(format!("bee{i}"), p))
            .collect();
        WorldState::new(
            Agent::new(entities[0], health, hunger),
            Arc::new(map),
            Resource::new("honey", entities[1]),
            pursuers,
        )
        .unwrap()
    }

    fn world() -> impl Strategy<Value = WorldState> {
        (
            1usize..12,
            1usize..12,
            prop::collection::vec((0u16..1000, 0u16..1000), 2..7),
            prop::collection::vec((0u16..1000, 0u16..1000), 0..12),
            1u32..6,
            1u32..4,
        )
            .prop_map(|(w, h, cells, walls, health, hunger)| {
                build_state(w, h, &cells, &walls, health, hunger)
            })
    }

    fn actions() -> impl Strategy<Value = Vec<Action>> {
        prop::collection::vec(prop::sample::select(Action::ALL.to_vec()), 1..40)
    }

    // =========================================================================
    // Dynamics invariants
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn entities_stay_on_open_cells(
            start in world(),
            plan in actions(),
            seed in any::<u64>(),
            p_random in 0.0f64..=1.0,
        ) {
            let model = PursuitModel::new(p_random);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = start;
            for action in plan {
                state = model.sample(&state, action, &mut rng);
                prop_assert!(state.map().is_open(state.agent().position));
                for p in state.pursuers() {
                    prop_assert!(state.map().is_open(p.position), "{} on {}", p.name, p.position);
                }
            }
        }

        #[test]
        fn vitals_and_pursuers_never_increase(
            start in world(),
            plan in actions(),
            seed in any::<u64>(),
        ) {
            let model = PursuitModel::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = start;
            for action in plan {
                let next = model.sample(&state, action, &mut rng);
                prop_assert!(next.agent().health <= state.agent().health);
                prop_assert!(next.agent().hunger <= state.agent().hunger);
                prop_assert!(next.pursuers().len() <= state.pursuers().len());
                // Every lost pursuer costs exactly one health, down to zero.
                let stung = (state.pursuers().len() - next.pursuers().len()) as u32;
                prop_assert_eq!(next.agent().health, state.agent().health.saturating_sub(stung));
                prop_assert_eq!(next.pursuers_at(next.agent().position), 0);
                state = next;
            }
        }

        #[test]
        fn terminal_matches_vitals(
            start in world(),
            plan in actions(),
            seed in any::<u64>(),
        ) {
            let model = PursuitModel::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = start;
            for action in plan {
                state = model.sample(&state, action, &mut rng);
                let agent = state.agent();
                prop_assert_eq!(
                    PursuitTerminal.is_terminal(&state),
                    agent.health == 0 || agent.hunger == 0
                );
            }
        }

        #[test]
        fn rewards_follow_the_shaping_table(
            start in world(),
            action in prop::sample::select(Action::ALL.to_vec()),
            seed in any::<u64>(),
        ) {
            let rf = PursuitReward::default();
            let mut rng = StdRng::seed_from_u64(seed);
            let next = PursuitModel::default().sample(&start, action, &mut rng);
            let r = rf.reward(&start, action, &next);

            if next.no_health() {
                prop_assert_eq!(r, -1000.0);
            } else if next.no_hunger() {
                prop_assert_eq!(r, 1000.0);
            } else if next.agent().health < start.agent().health {
                let lost = f64::from(start.agent().health - next.agent().health);
                prop_assert_eq!(r, lost * 500.0 + 200.0);
            } else if next.agent_at_resource() {
                prop_assert_eq!(r, 199.0);
            } else {
                prop_assert_eq!(r, -1.0);
            }
        }
    }

    // =========================================================================
    // Collector budget
    // =========================================================================
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn collect_n_returns_exactly_the_budget(
            start in world(),
            n_samples in 0usize..200,
            max_steps in 1usize..30,
            seed in any::<u64>(),
        ) {
            let mut source = ClosedFormSource::new(
                ConstantStateGenerator::new(start),
                FactoredModel::new(PursuitModel::default(), UniformCostReward, NeverTerminal),
                seed,
            );
            let mut collector = SarsCollector::new(UniformRandomPolicy::seeded(seed));
            let d = collector.collect_n(&mut source, n_samples, max_steps, None).unwrap();
            prop_assert_eq!(d.len(), n_samples);
            prop_assert_eq!(d.rollouts(), n_samples.div_ceil(max_steps));
        }
    }
}
