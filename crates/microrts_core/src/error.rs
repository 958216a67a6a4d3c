//! Error types for the game simulation.
//!
//! Only contract violations are errors. An illegal action submitted by an
//! agent is not: it is downgraded to a Noop by the engine.

use thiserror::Error;

use crate::player::PlayerId;
use crate::units::UnitId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// The initial map snapshot is inconsistent.
    #[error("Invalid map snapshot: {0}")]
    InvalidMap(String),

    /// The match configuration could not be parsed or is out of range.
    #[error("Invalid game configuration: {0}")]
    InvalidConfig(String),

    /// Invalid unit identifier.
    #[error("Unknown unit ID: {0}")]
    UnknownUnit(UnitId),

    /// Invalid player identifier.
    #[error("Unknown player ID: {0}")]
    UnknownPlayer(PlayerId),

    /// Tried to place a unit on a cell that is blocked, occupied or off the map.
    #[error("Cell ({x}, {y}) is not available for placement")]
    CellUnavailable {
        /// Cell column.
        x: i32,
        /// Cell row.
        y: i32,
    },

    /// An action would complete before the current tick.
    #[error("Action ending at tick {end_time} cannot be scheduled at tick {now}")]
    ScheduledInPast {
        /// Completion tick of the action.
        end_time: u64,
        /// Current simulation tick.
        now: u64,
    },

    /// An action was submitted for a tick other than the current one.
    #[error("Action starting at tick {start_time} submitted at tick {now}")]
    TickMismatch {
        /// Start tick carried by the action.
        start_time: u64,
        /// Current simulation tick.
        now: u64,
    },

    /// An action ends before it starts.
    #[error("Action ends at tick {end_time} before its start tick {start_time}")]
    InvalidDuration {
        /// Start tick.
        start_time: u64,
        /// End tick.
        end_time: u64,
    },

    /// The match has already finished.
    #[error("The match is already over")]
    GameOver,

    /// A saved match could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    Serialization(String),
}
