//! The initial map snapshot handed over by a map loader.
//!
//! Parsing map files is the loader's job; the engine only receives this
//! plain data and validates that it describes a consistent match.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::{PlayerId, NUM_PLAYERS};
use crate::position::Position;
use crate::unit_kind::UnitKind;
use crate::units::UnitId;

/// Starting state of one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSpec {
    /// Player id (0 or 1).
    pub id: PlayerId,
    /// Starting minerals.
    pub minerals: u32,
}

/// Starting state of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Unit id.
    pub id: UnitId,
    /// Owner, `None` for resource patches.
    pub player: Option<PlayerId>,
    /// Unit kind.
    pub kind: UnitKind,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Starting hit points.
    pub hit_points: i32,
    /// Carried load (workers) or stock (resources).
    pub resources: u32,
}

impl UnitSpec {
    /// Cell of this unit.
    #[must_use]
    pub const fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Immutable description of a map at tick 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Row-major terrain, 0 = empty, non-zero = wall.
    pub terrain: Vec<u8>,
    /// Both players.
    pub players: Vec<PlayerSpec>,
    /// All units present at load time.
    pub units: Vec<UnitSpec>,
}

impl MapSnapshot {
    /// Check the snapshot describes a consistent two-player match.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMap`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(GameError::InvalidMap(msg));

        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "dimensions must be positive, got {}x{}",
                self.width, self.height
            ));
        }
        let cells = (self.width as usize) * (self.height as usize);
        if self.terrain.len() != cells {
            return invalid(format!(
                "terrain has {} cells, expected {cells}",
                self.terrain.len()
            ));
        }

        let mut player_ids: Vec<PlayerId> = self.players.iter().map(|p| p.id).collect();
        player_ids.sort_unstable();
        if player_ids != [0, 1] {
            return invalid(format!(
                "expected exactly {NUM_PLAYERS} players with ids 0 and 1, got {player_ids:?}"
            ));
        }

        let mut ids = HashSet::new();
        let mut cells_taken = HashSet::new();
        for unit in &self.units {
            if !ids.insert(unit.id) {
                return invalid(format!("duplicate unit id {}", unit.id));
            }
            if unit.id == UnitId::MAX {
                return invalid(format!("unit id {} is reserved", unit.id));
            }
            match (unit.kind, unit.player) {
                (UnitKind::Resource, None) => {}
                (UnitKind::Resource, Some(p)) => {
                    return invalid(format!("resource {} must be neutral, owned by {p}", unit.id));
                }
                (_, Some(p)) if (p as usize) < NUM_PLAYERS => {}
                (kind, owner) => {
                    return invalid(format!(
                        "{} {} has invalid owner {owner:?}",
                        kind.name(),
                        unit.id
                    ));
                }
            }
            if unit.hit_points <= 0 {
                return invalid(format!("unit {} starts with no hit points", unit.id));
            }

            let pos = unit.position();
            let in_bounds = pos.x >= 0
                && pos.y >= 0
                && (pos.x as u32) < self.width
                && (pos.y as u32) < self.height;
            if !in_bounds {
                return invalid(format!("unit {} at {pos:?} is off the map", unit.id));
            }
            let index = (pos.y as usize) * (self.width as usize) + (pos.x as usize);
            if self.terrain[index] != 0 {
                return invalid(format!("unit {} at {pos:?} stands on a wall", unit.id));
            }
            if !cells_taken.insert(pos) {
                return invalid(format!("unit {} at {pos:?} overlaps another unit", unit.id));
            }
        }
        Ok(())
    }
}
