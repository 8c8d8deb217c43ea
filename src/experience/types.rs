//! Core experience data types.
//!
//! These types capture everything an offline learner needs from a collection
//! run: the ordered SARS records and a little provenance.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Action, WorldState};

// ---------------------------------------------------------------------------
// Single record
// ---------------------------------------------------------------------------

/// One `(state, action, reward, next_state)` sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SarsRecord {
    /// State the action was taken in.
    pub state: WorldState,
    /// The action the behavior policy chose.
    pub action: Action,
    /// The scalar reward for this transition.
    pub reward: f64,
    /// State the transition produced.
    pub next_state: WorldState,
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// An append-only, insertion-ordered collection of SARS records.
///
/// Records can be read through shared references or moved out wholesale with
/// [`TransitionDataset::into_records`]; there is no way to edit one in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionDataset {
    /// Unique identifier (UUID v4).
    id: String,
    /// UTC creation time.
    created_at: DateTime<Utc>,
    /// Rollouts that contributed to this dataset (including empty ones).
    rollouts: usize,
    records: Vec<SarsRecord>,
}

impl TransitionDataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a dataset pre-allocated for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            rollouts: 0,
            records: Vec::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rollouts recorded by collectors.
    pub fn rollouts(&self) -> usize {
        self.rollouts
    }

    pub(crate) fn mark_rollout(&mut self) {
        self.rollouts += 1;
    }

    /// Append one record.
    pub fn push(&mut self, state: WorldState, action: Action, reward: f64, next_state: WorldState) {
        self.records.push(SarsRecord {
            state,
            action,
            reward,
            next_state,
        });
    }

    pub fn get(&self, index: usize) -> Option<&SarsRecord> {
        self.records.get(index)
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[SarsRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SarsRecord> {
        self.records.iter()
    }

    /// Move every record out of the dataset.
    pub fn into_records(self) -> Vec<SarsRecord> {
        self.records
    }

    /// Concatenate `other` onto the end of this dataset. Rollout counts add up.
    pub fn append(&mut self, other: TransitionDataset) {
        self.rollouts += other.rollouts;
        self.records.extend(other.records);
    }

    /// Drop all records and reset the rollout count.
    pub fn clear(&mut self) {
        self.records.clear();
        self.rollouts = 0;
    }

    /// Up to `n` distinct records chosen uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<&SarsRecord> {
        self.records.choose_multiple(rng, n).collect()
    }

    /// Summary statistics over the rewards.
    pub fn stats(&self) -> DatasetStats {
        let rewards = self.records.iter().map(|r| r.reward);
        let total_reward: f64 = rewards.clone().sum();
        let mean_reward = if self.records.is_empty() {
            0.0
        } else {
            total_reward / self.records.len() as f64
        };
        DatasetStats {
            records: self.records.len(),
            rollouts: self.rollouts,
            total_reward,
            mean_reward,
            min_reward: rewards.clone().reduce(f64::min),
            max_reward: rewards.reduce(f64::max),
        }
    }
}

impl Default for TransitionDataset {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a TransitionDataset {
    type Item = &'a SarsRecord;
    type IntoIter = std::slice::Iter<'a, SarsRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Reward summary of a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub records: usize,
    pub rollouts: usize,
    pub total_reward: f64,
    pub mean_reward: f64,
    /// `None` when the dataset is empty.
    pub min_reward: Option<f64>,
    pub max_reward: Option<f64>,
}

impl std::fmt::Display for DatasetStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Dataset: {} records from {} rollouts",
            self.records, self.rollouts
        )?;
        writeln!(f, "  Total reward: {:.2}", self.total_reward)?;
        writeln!(f, "  Mean reward:  {:.4}", self.mean_reward)?;
        match (self.min_reward, self.max_reward) {
            (Some(min), Some(max)) => writeln!(f, "  Range:        [{min:.2}, {max:.2}]"),
            _ => writeln!(f, "  Range:        n/a"),
        }
    }
}
