use serde::{Deserialize, Serialize};

use crate::domain::model::DEFAULT_P_RANDOM;
use crate::domain::reward::PursuitReward;
use crate::experience::collector::DEFAULT_MAX_STALLED_ROLLOUTS;

/// Complete configuration for a pursuit collection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PursuitConfig {
    pub domain: DomainConfig,
    #[serde(default)]
    pub dynamics: DynamicsConfig,
    #[serde(default)]
    pub rewards: PursuitReward,
    #[serde(default)]
    pub collection: CollectionConfig,
}

/// Spawn layout of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub map: MapConfig,
    pub agent: AgentConfig,
    pub pursuers: PursuersConfig,
    pub resource: ResourceConfig,
}

/// Grid dimensions and walls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// `[width, height]` (default: 25x25).
    pub size: [usize; 2],
    /// Blocked cells as `[x, y]` pairs (default: none).
    #[serde(default)]
    pub blocked: Vec<[i32; 2]>,
}

/// Agent starting vitals and position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Starting health (default: 4).
    pub health: u32,
    /// Starting hunger (default: 1).
    pub hunger: u32,
    /// Spawn cell `[x, y]` (default: [15, 1]).
    pub spawn: [i32; 2],
}

/// Pursuer count and shared spawn cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PursuersConfig {
    /// Number of pursuers, named `bee0..bee{count-1}` (default: 4).
    pub count: usize,
    /// Spawn cell shared by every pursuer (default: [23, 23]).
    pub spawn: [i32; 2],
}

/// Resource placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource cell `[x, y]` (default: [3, 21]).
    pub spawn: [i32; 2],
}

/// Transition-model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicsConfig {
    /// Probability a pursuer wanders instead of chasing (default: 0.2).
    pub p_random: f64,
}

/// Sample budget and reproducibility settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Number of SARS records to collect (default: 1000).
    pub samples: usize,
    /// Step cap per rollout (default: 500).
    pub max_steps: usize,
    /// Seed for the model and policy generators (default: 0).
    pub seed: u64,
    /// Consecutive empty rollouts tolerated before giving up (default: 64).
    pub max_stalled_rollouts: usize,
}

impl Default for DynamicsConfig {
    fn default() -> Self {
        Self {
            p_random: DEFAULT_P_RANDOM,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            samples: 1000,
            max_steps: 500,
            seed: 0,
            max_stalled_rollouts: DEFAULT_MAX_STALLED_ROLLOUTS,
        }
    }
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            map: MapConfig {
                size: [25, 25],
                blocked: Vec::new(),
            },
            agent: AgentConfig {
                health: 4,
                hunger: 1,
                spawn: [15, 1],
            },
            pursuers: PursuersConfig {
                count: 4,
                spawn: [23, 23],
            },
            resource: ResourceConfig { spawn: [3, 21] },
        }
    }
}

impl Default for PursuitConfig {
    fn default() -> Self {
        Self {
            domain: DomainConfig::default(),
            dynamics: DynamicsConfig::default(),
            rewards: PursuitReward::default(),
            collection: CollectionConfig::default(),
        }
    }
}
