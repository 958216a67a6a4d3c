//! Observation export.
//!
//! Renders the grid into a fresh array of small integers. Each call copies,
//! so observations never alias live state.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::position::Position;
use crate::state::GameState;
use crate::unit_kind::UnitKind;
use crate::units::UnitId;

/// Value exported for any blocked terrain cell.
pub const TERRAIN_BLOCKED: u8 = 1;

/// Added to the marker of cells held by the observer's side.
///
/// The observer's own cell receives it twice, so a consumer can tell
/// self, allies and foes apart.
pub const OWNED_OFFSET: u8 = UnitKind::COUNT as u8;

/// A rendered grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell values, row-major.
    pub cells: Vec<u8>,
}

impl Observation {
    /// Value at `(x, y)`, `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            self.cells
                .get((y as usize) * (self.width as usize) + (x as usize))
                .copied()
        } else {
            None
        }
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks(self.width as usize)
    }

    fn add(&mut self, pos: Position, value: u8) {
        let index = (pos.y as usize) * (self.width as usize) + (pos.x as usize);
        if let Some(cell) = self.cells.get_mut(index) {
            *cell = cell.saturating_add(value);
        }
    }
}

/// Render `state`, optionally from the point of view of one unit.
///
/// # Errors
///
/// Returns [`GameError::UnknownUnit`] if `perspective` names no unit.
pub fn render(state: &GameState, perspective: Option<UnitId>) -> Result<Observation> {
    let grid = state.grid();
    let mut obs = Observation {
        width: grid.width(),
        height: grid.height(),
        cells: grid
            .terrain()
            .map(|t| if t == 0 { 0 } else { TERRAIN_BLOCKED })
            .collect(),
    };

    for unit in state.units().alive() {
        if let Some(pos) = unit.position {
            obs.add(pos, unit.kind.encoding());
        }
    }

    let observer = match perspective {
        Some(id) => Some(state.unit(id).ok_or(GameError::UnknownUnit(id))?),
        None => None,
    };
    if let Some(observer) = observer.filter(|u| u.is_alive()) {
        if let Some(pos) = observer.position {
            obs.add(pos, OWNED_OFFSET);
        }
        if let Some(owner) = observer.player {
            for ally in state.units().alive().filter(|u| u.player == Some(owner)) {
                if let Some(pos) = ally.position {
                    obs.add(pos, OWNED_OFFSET);
                }
            }
        }
    }

    Ok(obs)
}
