//! # microRTS Core
//!
//! Deterministic tick-based simulation of a two-player microRTS match,
//! intended to sit underneath a reinforcement-learning environment.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO (maps arrive as an in-memory [`snapshot::MapSnapshot`])
//! - No randomness (damage is always `max_damage`)
//! - Integer grid coordinates and integer economy
//!
//! ## Crate Structure
//!
//! - [`grid`] - Terrain grid and occupancy overlay
//! - [`unit_kind`] / [`units`] / [`player`] - Entity model
//! - [`action`] - Typed action intents and their discrete encodings
//! - [`legality`] - Action-legality validator and per-unit action masks
//! - [`scheduler`] - Look-ahead buckets of in-flight actions
//! - [`game`] - The resolution engine (`step` / `update`)
//! - [`render`] - Observation export
//! - [`config`] - Immutable match configuration

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod legality;
pub mod player;
pub mod position;
pub mod render;
pub mod scheduler;
pub mod snapshot;
pub mod state;
pub mod unit_kind;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::{Action, ActionEncoding, ActionKind};
    pub use crate::config::{GameConfig, MatchResult, Rewards};
    pub use crate::error::{GameError, Result};
    pub use crate::game::{Game, TickEvents};
    pub use crate::legality::{action_mask, is_legal, ActionMask, InFlight};
    pub use crate::player::{Player, PlayerId};
    pub use crate::position::{Direction, Position};
    pub use crate::render::Observation;
    pub use crate::snapshot::{MapSnapshot, PlayerSpec, UnitSpec};
    pub use crate::state::GameState;
    pub use crate::unit_kind::{UnitKind, UnitStats};
    pub use crate::units::{Unit, UnitId};
}
