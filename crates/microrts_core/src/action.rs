//! Typed action intents.
//!
//! An [`Action`] is created by the caller for one unit and one tick, and is
//! consumed exactly once by the engine: queued, scheduled, then executed or
//! discarded when its unit dies.

use serde::{Deserialize, Serialize};

use crate::position::{Direction, Position};
use crate::unit_kind::UnitKind;
use crate::units::UnitId;

/// What an action does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Do nothing for the action's duration.
    Noop,
    /// Step to an adjacent free cell.
    Move,
    /// Hit the enemy unit on the target cell.
    Attack,
    /// Mine one load from the resource on the target cell.
    Harvest,
    /// Drop the carried load at the base on the target cell.
    Return,
    /// Build a new unit of the given kind on the target cell.
    Produce(UnitKind),
}

/// A timed intent for one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    /// Acting unit.
    pub unit_id: UnitId,
    /// Action type.
    pub kind: ActionKind,
    /// Target cell.
    pub target: Position,
    /// Tick the action was issued.
    pub start_time: u64,
    /// Tick the action completes.
    pub end_time: u64,
}

impl Action {
    /// Create a new action.
    #[must_use]
    pub const fn new(
        unit_id: UnitId,
        kind: ActionKind,
        target: Position,
        start_time: u64,
        end_time: u64,
    ) -> Self {
        Self {
            unit_id,
            kind,
            target,
            start_time,
            end_time,
        }
    }

    /// Shorthand for a Noop.
    #[must_use]
    pub const fn noop(unit_id: UnitId, target: Position, start_time: u64, end_time: u64) -> Self {
        Self::new(unit_id, ActionKind::Noop, target, start_time, end_time)
    }

    /// Replace this action with a Noop of identical unit and duration.
    #[must_use]
    pub const fn downgraded(&self, target: Position) -> Self {
        Self::noop(self.unit_id, target, self.start_time, self.end_time)
    }

    /// Is this a Noop?
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self.kind, ActionKind::Noop)
    }
}

/// Category of a directional encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodedKind {
    /// Move.
    Move,
    /// Attack.
    Attack,
    /// Harvest.
    Harvest,
    /// Return.
    Return,
    /// Produce the actor's default product.
    Produce,
}

/// Discrete action encoding exposed to learning agents: Noop plus one
/// entry per action category and cardinal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionEncoding {
    /// Do nothing.
    Noop,
    /// A directional action.
    Directed(EncodedKind, Direction),
}

impl ActionEncoding {
    /// Number of encodings.
    pub const COUNT: usize = 21;

    const KINDS: [EncodedKind; 5] = [
        EncodedKind::Move,
        EncodedKind::Attack,
        EncodedKind::Harvest,
        EncodedKind::Return,
        EncodedKind::Produce,
    ];

    /// Stable index of this encoding, `0..COUNT`.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Noop => 0,
            Self::Directed(kind, direction) => {
                let k = Self::KINDS.iter().position(|&c| c == kind).unwrap_or(0);
                let d = Direction::ALL
                    .iter()
                    .position(|&c| c == direction)
                    .unwrap_or(0);
                1 + k * Direction::ALL.len() + d
            }
        }
    }

    /// Encoding for an index, if in range.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        if index == 0 {
            return Some(Self::Noop);
        }
        let i = index - 1;
        let kind = *Self::KINDS.get(i / Direction::ALL.len())?;
        let direction = Direction::ALL[i % Direction::ALL.len()];
        Some(Self::Directed(kind, direction))
    }

    /// All encodings in index order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).filter_map(Self::from_index)
    }
}
