//! The closed action set of the pursuit domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::WorldState;

/// A textual action name that does not belong to the domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown action {0:?}")]
pub struct ActionParseError(pub String);

/// One of the five agent moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    North,
    South,
    East,
    West,
    Idle,
}

impl Action {
    /// Every action, in a fixed order.
    pub const ALL: [Action; 5] = [
        Action::North,
        Action::South,
        Action::East,
        Action::West,
        Action::Idle,
    ];

    /// Grid displacement `(dx, dy)`; north is `+y`.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::South => (0, -1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::Idle => (0, 0),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
            Self::Idle => "idle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    /// Case-insensitive parse of the action names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "north" => Ok(Self::North),
            "south" => Ok(Self::South),
            "east" => Ok(Self::East),
            "west" => Ok(Self::West),
            "idle" => Ok(Self::Idle),
            _ => Err(ActionParseError(s.to_string())),
        }
    }
}

/// Actions applicable in `state`. Every move is always applicable here;
/// blocked moves simply leave the agent in place.
pub fn applicable_actions(_state: &WorldState) -> &'static [Action] {
    &Action::ALL
}
