//! World state types for the pursuit grid-world.
//!
//! A [`WorldState`] is a plain owned value: cloning it yields a fully
//! independent snapshot. The only shared component is the [`ObstacleMap`],
//! which is immutable and held behind an [`Arc`] so that every state derived
//! from the same episode points at the same grid.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons a world state (or its map) could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The map has zero width or height.
    #[error("obstacle map must be at least 1x1, got {width}x{height}")]
    EmptyMap { width: usize, height: usize },

    /// A row of the supplied grid has a different length than the first.
    #[error("obstacle map row {row} has length {len}, expected {expected}")]
    RaggedMap { row: usize, len: usize, expected: usize },

    /// A serialized map whose cell vector does not cover the grid.
    #[error("obstacle map has {len} cells, expected {expected}")]
    CellCount { len: usize, expected: usize },

    /// An entity was placed outside the grid.
    #[error("{entity} at {position} is outside the {width}x{height} grid")]
    OutOfBounds {
        entity: String,
        position: Position,
        width: usize,
        height: usize,
    },

    /// An entity was placed on a blocked cell.
    #[error("{entity} at {position} sits on a blocked cell")]
    Blocked { entity: String, position: Position },

    /// Two pursuers share a name.
    #[error("duplicate pursuer name {0:?}")]
    DuplicatePursuer(String),

    /// No pursuer with the given name exists.
    #[error("no pursuer named {0:?}")]
    UnknownPursuer(String),
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// An integer grid coordinate. `x` grows eastward, `y` grows northward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position displaced by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Whether `other` is one of the four orthogonal neighbours.
    pub fn is_adjacent(self, other: Position) -> bool {
        self.manhattan(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Obstacle map
// ---------------------------------------------------------------------------

/// Immutable blocked/open grid, stored row-major by `y`.
///
/// Deserialization goes through the same checks as [`ObstacleMap::open`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawObstacleMap")]
pub struct ObstacleMap {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

/// Unchecked wire form of [`ObstacleMap`].
#[derive(Deserialize)]
struct RawObstacleMap {
    width: usize,
    height: usize,
    blocked: Vec<bool>,
}

impl TryFrom<RawObstacleMap> for ObstacleMap {
    type Error = StateError;

    fn try_from(raw: RawObstacleMap) -> Result<Self, Self::Error> {
        let mut map = Self::open(raw.width, raw.height)?;
        if raw.blocked.len() != map.blocked.len() {
            return Err(StateError::CellCount {
                len: raw.blocked.len(),
                expected: map.blocked.len(),
            });
        }
        map.blocked = raw.blocked;
        Ok(map)
    }
}

impl ObstacleMap {
    /// A fully open `width x height` map.
    pub fn open(width: usize, height: usize) -> Result<Self, StateError> {
        if width == 0 || height == 0 {
            return Err(StateError::EmptyMap { width, height });
        }
        Ok(Self {
            width,
            height,
            blocked: vec![false; width * height],
        })
    }

    /// An open map with the listed cells blocked.
    ///
    /// Blocked cells outside the grid are rejected rather than ignored.
    pub fn with_blocked(
        width: usize,
        height: usize,
        cells: impl IntoIterator<Item = Position>,
    ) -> Result<Self, StateError> {
        let mut map = Self::open(width, height)?;
        for pos in cells {
            let idx = map.index(pos).ok_or(StateError::OutOfBounds {
                entity: "blocked cell".into(),
                position: pos,
                width,
                height,
            })?;
            map.blocked[idx] = true;
        }
        Ok(map)
    }

    /// Build a map from rows indexed `grid[x][y]`, matching the column-major
    /// layout used by external map files. `true` marks a blocked cell.
    pub fn from_columns(grid: &[Vec<bool>]) -> Result<Self, StateError> {
        let width = grid.len();
        let height = grid.first().map(Vec::len).unwrap_or(0);
        let mut map = Self::open(width, height)?;
        for (x, column) in grid.iter().enumerate() {
            if column.len() != height {
                return Err(StateError::RaggedMap {
                    row: x,
                    len: column.len(),
                    expected: height,
                });
            }
            for (y, &cell) in column.iter().enumerate() {
                map.blocked[y * width + x] = cell;
            }
        }
        Ok(map)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Whether `pos` is blocked. Out-of-bounds positions count as blocked.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.index(pos).map_or(true, |i| self.blocked[i])
    }

    /// In bounds and not blocked: the only cells an entity may occupy.
    pub fn is_open(&self, pos: Position) -> bool {
        !self.is_blocked(pos)
    }

    /// Number of blocked cells.
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|b| **b).count()
    }

    fn index(&self, pos: Position) -> Option<usize> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    fn check(&self, entity: &str, pos: Position) -> Result<(), StateError> {
        if !self.in_bounds(pos) {
            return Err(StateError::OutOfBounds {
                entity: entity.to_string(),
                position: pos,
                width: self.width,
                height: self.height,
            });
        }
        if self.is_blocked(pos) {
            return Err(StateError::Blocked {
                entity: entity.to_string(),
                position: pos,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The controllable agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Agent {
    pub position: Position,
    /// Remaining health; each sting removes one point.
    pub health: u32,
    /// Remaining hunger; each visit to the resource removes one point.
    pub hunger: u32,
}

impl Agent {
    pub fn new(position: impl Into<Position>, health: u32, hunger: u32) -> Self {
        Self {
            position: position.into(),
            health,
            hunger,
        }
    }
}

/// A mobile adversary that stings the agent on contact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pursuer {
    pub name: String,
    pub position: Position,
}

impl Pursuer {
    pub fn new(name: impl Into<String>, position: impl Into<Position>) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
        }
    }
}

/// The stationary goal the agent feeds on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    pub position: Position,
}

impl Resource {
    pub fn new(name: impl Into<String>, position: impl Into<Position>) -> Self {
        Self {
            name: name.into(),
            position: position.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// World state
// ---------------------------------------------------------------------------

/// One snapshot of the world: agent, resource, pursuers and the shared map.
///
/// Fields are private so that the validated invariants (unique pursuer names,
/// every entity on an open in-bounds cell) cannot be broken from outside the
/// crate. The dynamics model works on a clone through the crate-private
/// mutators below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWorldState")]
pub struct WorldState {
    agent: Agent,
    map: Arc<ObstacleMap>,
    resource: Resource,
    pursuers: Vec<Pursuer>,
}

/// Unchecked wire form of [`WorldState`]; validated by [`WorldState::new`].
#[derive(Deserialize)]
struct RawWorldState {
    agent: Agent,
    map: Arc<ObstacleMap>,
    resource: Resource,
    pursuers: Vec<Pursuer>,
}

impl TryFrom<RawWorldState> for WorldState {
    type Error = StateError;

    fn try_from(raw: RawWorldState) -> Result<Self, Self::Error> {
        Self::new(raw.agent, raw.map, raw.resource, raw.pursuers)
    }
}

impl WorldState {
    /// Build and validate a world state.
    pub fn new(
        agent: Agent,
        map: Arc<ObstacleMap>,
        resource: Resource,
        pursuers: Vec<Pursuer>,
    ) -> Result<Self, StateError> {
        map.check("agent", agent.position)?;
        map.check(&resource.name, resource.position)?;

        let mut names = HashSet::with_capacity(pursuers.len());
        for p in &pursuers {
            if !names.insert(p.name.as_str()) {
                return Err(StateError::DuplicatePursuer(p.name.clone()));
            }
            map.check(&p.name, p.position)?;
        }

        Ok(Self {
            agent,
            map,
            resource,
            pursuers,
        })
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn map(&self) -> &ObstacleMap {
        &self.map
    }

    /// The shared map handle, for building further states on the same grid.
    pub fn map_handle(&self) -> Arc<ObstacleMap> {
        Arc::clone(&self.map)
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn pursuer(&self, name: &str) -> Option<&Pursuer> {
        self.pursuers.iter().find(|p| p.name == name)
    }

    /// Add a pursuer. Used when assembling states; the dynamics never add.
    pub fn add_pursuer(&mut self, pursuer: Pursuer) -> Result<(), StateError> {
        if self.pursuer(&pursuer.name).is_some() {
            return Err(StateError::DuplicatePursuer(pursuer.name));
        }
        self.map.check(&pursuer.name, pursuer.position)?;
        self.pursuers.push(pursuer);
        Ok(())
    }

    /// Remove a pursuer by name, returning it.
    pub fn remove_pursuer(&mut self, name: &str) -> Result<Pursuer, StateError> {
        let idx = self
            .pursuers
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| StateError::UnknownPursuer(name.to_string()))?;
        Ok(self.pursuers.remove(idx))
    }

    /// Replace the agent's counters, keeping its position.
    pub fn with_vitals(mut self, health: u32, hunger: u32) -> Self {
        self.agent.health = health;
        self.agent.hunger = hunger;
        self
    }

    // -- predicates ---------------------------------------------------------

    /// Agent stands on the resource cell.
    pub fn agent_at_resource(&self) -> bool {
        self.agent.position == self.resource.position
    }

    /// Some pursuer shares the agent's cell.
    pub fn agent_hit(&self) -> bool {
        self.pursuers_at(self.agent.position) > 0
    }

    /// Some pursuer is on one of the agent's four neighbouring cells.
    pub fn pursuer_adjacent(&self) -> bool {
        self.pursuers
            .iter()
            .any(|p| p.position.is_adjacent(self.agent.position))
    }

    pub fn no_health(&self) -> bool {
        self.agent.health == 0
    }

    pub fn no_hunger(&self) -> bool {
        self.agent.hunger == 0
    }

    /// Number of pursuers on `pos`.
    pub fn pursuers_at(&self, pos: Position) -> usize {
        self.pursuers.iter().filter(|p| p.position == pos).count()
    }

    // -- crate-private mutation for the dynamics model ----------------------

    pub(crate) fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }

    pub(crate) fn pursuers_mut(&mut self) -> &mut Vec<Pursuer> {
        &mut self.pursuers
    }
}
