//! Experience collection for offline learning.
//!
//! This module provides:
//! - [`types::SarsRecord`], [`types::TransitionDataset`] -- the ordered SARS
//!   records produced by a collection run, plus summary statistics.
//! - [`policy::BehaviorPolicy`] -- the action-selection seam, with a uniform
//!   random policy and a closure adapter.
//! - [`collector::SarsCollector`] -- drives a policy through closed-form or
//!   live rollouts and enforces sample budgets.

pub mod collector;
pub mod policy;
pub mod types;

pub use collector::{
    ClosedFormSource, CollectError, EnvironmentSource, RolloutSource, SarsCollector,
    DEFAULT_MAX_STALLED_ROLLOUTS,
};
pub use policy::{BehaviorPolicy, FnPolicy, UniformRandomPolicy};
pub use types::{DatasetStats, SarsRecord, TransitionDataset};
