//! Integer grid positions and cardinal directions.

use serde::{Deserialize, Serialize};

/// A cell coordinate on the map.
///
/// Coordinates are signed so that a neighbour of an edge cell can still be
/// expressed (and then rejected by a bounds check).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another position.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The neighbouring cell in the given direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// The four cardinal directions used by action encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards row 0.
    Up,
    /// Towards higher columns.
    Right,
    /// Towards higher rows.
    Down,
    /// Towards column 0.
    Left,
}

impl Direction {
    /// All directions in encoding order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Cell offset `(dx, dy)` for this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(1, 1);
        assert_eq!(a.manhattan(Position::new(1, 1)), 0);
        assert_eq!(a.manhattan(Position::new(2, 1)), 1);
        assert_eq!(a.manhattan(Position::new(-1, 3)), 4);
    }

    #[test]
    fn test_step_directions() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::Up), Position::new(0, -1));
        assert_eq!(origin.step(Direction::Right), Position::new(1, 0));
        assert_eq!(origin.step(Direction::Down), Position::new(0, 1));
        assert_eq!(origin.step(Direction::Left), Position::new(-1, 0));
    }
}
