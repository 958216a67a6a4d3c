//! Dense terrain grid with a parallel occupancy overlay.
//!
//! Terrain never changes after load. The occupancy overlay records which
//! unit stands on each cell and is only mutated through [`Grid::place`] and
//! [`Grid::vacate`], which [`crate::state::GameState`] always calls in pairs
//! when a unit moves.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::position::Position;
use crate::units::UnitId;

/// Terrain value of an empty cell.
pub const TERRAIN_EMPTY: u8 = 0;

/// Terrain grid plus occupancy overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Terrain stored in row-major order. Non-zero is impassable.
    terrain: Vec<u8>,
    /// Unit standing on each cell, row-major.
    occupancy: Vec<Option<UnitId>>,
}

impl Grid {
    /// Create a grid from row-major terrain values.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMap`] if a dimension is zero or the terrain
    /// length does not match `width * height`.
    pub fn new(width: u32, height: u32, terrain: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidMap(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        let cell_count = (width as usize) * (height as usize);
        if terrain.len() != cell_count {
            return Err(GameError::InvalidMap(format!(
                "terrain has {} cells, expected {cell_count}",
                terrain.len()
            )));
        }
        Ok(Self {
            width,
            height,
            terrain,
            occupancy: vec![None; cell_count],
        })
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Convert a position to a row-major index, if in bounds.
    #[inline]
    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y as usize) * (self.width as usize) + (pos.x as usize))
        } else {
            None
        }
    }

    /// Check if a position is within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Terrain value at a position. Returns `None` if out of bounds.
    #[must_use]
    pub fn terrain_at(&self, pos: Position) -> Option<u8> {
        self.index(pos).map(|i| self.terrain[i])
    }

    /// Unit standing at a position, if any.
    #[must_use]
    pub fn occupant(&self, pos: Position) -> Option<UnitId> {
        self.index(pos).and_then(|i| self.occupancy[i])
    }

    /// Check that the terrain at `pos` is clear (ignores occupancy).
    #[must_use]
    pub fn is_clear_terrain(&self, pos: Position) -> bool {
        self.terrain_at(pos) == Some(TERRAIN_EMPTY)
    }

    /// A cell is passable when it is on the map, has clear terrain and
    /// nobody stands on it.
    #[must_use]
    pub fn is_passable(&self, pos: Position) -> bool {
        self.index(pos)
            .is_some_and(|i| self.terrain[i] == TERRAIN_EMPTY && self.occupancy[i].is_none())
    }

    /// Record `unit` as standing on `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CellUnavailable`] if the cell is not passable.
    /// Legality must be established before calling this.
    pub fn place(&mut self, unit: UnitId, pos: Position) -> Result<()> {
        match self.index(pos) {
            Some(i) if self.terrain[i] == TERRAIN_EMPTY && self.occupancy[i].is_none() => {
                self.occupancy[i] = Some(unit);
                Ok(())
            }
            _ => Err(GameError::CellUnavailable { x: pos.x, y: pos.y }),
        }
    }

    /// Clear the occupant of `pos`, returning who stood there.
    pub fn vacate(&mut self, pos: Position) -> Option<UnitId> {
        self.index(pos).and_then(|i| self.occupancy[i].take())
    }

    /// Iterate over terrain values in row-major order.
    pub fn terrain(&self) -> impl Iterator<Item = u8> + '_ {
        self.terrain.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: u32, height: u32) -> Grid {
        Grid::new(width, height, vec![0; (width * height) as usize]).unwrap()
    }

    #[test]
    fn test_grid_creation() {
        let grid = open_grid(4, 3);
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert!(grid.in_bounds(Position::new(3, 2)));
        assert!(!grid.in_bounds(Position::new(4, 0)));
        assert!(!grid.in_bounds(Position::new(0, -1)));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(Grid::new(0, 4, vec![]).is_err());
        assert!(Grid::new(2, 2, vec![0; 3]).is_err());
    }

    #[test]
    fn test_walls_are_impassable() {
        let grid = Grid::new(2, 1, vec![0, 1]).unwrap();
        assert!(grid.is_passable(Position::new(0, 0)));
        assert!(!grid.is_passable(Position::new(1, 0)));
        assert!(!grid.is_passable(Position::new(2, 0)));
    }

    #[test]
    fn test_place_and_vacate() {
        let mut grid = open_grid(3, 3);
        let pos = Position::new(1, 1);

        grid.place(7, pos).unwrap();
        assert_eq!(grid.occupant(pos), Some(7));
        assert!(!grid.is_passable(pos));

        assert_eq!(grid.vacate(pos), Some(7));
        assert!(grid.is_passable(pos));
        assert_eq!(grid.vacate(pos), None);
    }

    #[test]
    fn test_place_on_occupied_cell_fails() {
        let mut grid = open_grid(2, 2);
        let pos = Position::new(0, 0);
        grid.place(1, pos).unwrap();

        assert_eq!(
            grid.place(2, pos),
            Err(GameError::CellUnavailable { x: 0, y: 0 })
        );
        assert_eq!(grid.occupant(pos), Some(1));
    }

    #[test]
    fn test_place_on_wall_or_off_map_fails() {
        let mut grid = Grid::new(2, 1, vec![0, 1]).unwrap();
        assert!(grid.place(1, Position::new(1, 0)).is_err());
        assert!(grid.place(1, Position::new(-1, 0)).is_err());
    }
}
