//! Mutable match state: grid, units and players.
//!
//! Every effect the resolution engine applies goes through here, so the
//! occupancy overlay and unit positions always change together.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::grid::Grid;
use crate::player::{Player, PlayerId};
use crate::position::Position;
use crate::snapshot::MapSnapshot;
use crate::unit_kind::UnitKind;
use crate::units::{Unit, UnitId, UnitTable};

/// Amount mined by one Harvest action.
pub const HARVEST_AMOUNT: u32 = 1;

/// Result of resolving an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    /// No enemy stood on the target cell any more.
    Missed,
    /// The defender took damage and survived.
    Hit {
        /// Damaged unit.
        defender: UnitId,
        /// Damage dealt.
        damage: i32,
    },
    /// The defender was killed and removed from the map.
    Killed {
        /// Removed unit.
        defender: UnitId,
        /// Damage dealt.
        damage: i32,
    },
}

/// Grid, units and players of a running match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    grid: Grid,
    units: UnitTable,
    players: Vec<Player>,
}

impl GameState {
    /// Build the state described by a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidMap`] if the snapshot is inconsistent.
    pub fn from_snapshot(snapshot: &MapSnapshot) -> Result<Self> {
        snapshot.validate()?;

        let mut grid = Grid::new(snapshot.width, snapshot.height, snapshot.terrain.clone())?;
        let mut units = Vec::with_capacity(snapshot.units.len());
        for spec in &snapshot.units {
            grid.place(spec.id, spec.position())?;
            units.push(Unit {
                id: spec.id,
                player: spec.player,
                kind: spec.kind,
                position: Some(spec.position()),
                hit_points: spec.hit_points,
                resources: spec.resources,
                busy: false,
            });
        }

        let mut players: Vec<Player> = snapshot
            .players
            .iter()
            .map(|p| Player::new(p.id, p.minerals))
            .collect();
        players.sort_unstable_by_key(|p| p.id);

        Ok(Self {
            grid,
            units: UnitTable::from_units(units),
            players,
        })
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The unit table, dead units included.
    #[must_use]
    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    /// Both players, indexed by id.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Live unit standing on `pos`.
    #[must_use]
    pub fn unit_at(&self, pos: Position) -> Option<&Unit> {
        self.grid.occupant(pos).and_then(|id| self.units.get(id))
    }

    /// Set or clear a unit's in-flight flag.
    pub(crate) fn set_busy(&mut self, id: UnitId, busy: bool) {
        if let Some(unit) = self.units.get_mut(id) {
            unit.busy = busy;
        }
    }

    fn live_unit(&self, id: UnitId) -> Result<Option<&Unit>> {
        let unit = self.units.get(id).ok_or(GameError::UnknownUnit(id))?;
        Ok(unit.position.map(|_| unit))
    }

    /// Move a live unit onto `to`.
    ///
    /// Returns `false` without changing anything if the unit is gone or the
    /// cell is no longer passable.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown id.
    pub fn move_unit(&mut self, id: UnitId, to: Position) -> Result<bool> {
        let Some(from) = self.live_unit(id)?.and_then(|u| u.position) else {
            return Ok(false);
        };
        if !self.grid.is_passable(to) {
            return Ok(false);
        }
        self.grid.vacate(from);
        self.grid.place(id, to)?;
        if let Some(unit) = self.units.get_mut(id) {
            unit.position = Some(to);
        }
        Ok(true)
    }

    /// Take a unit off the map. It stays in the unit table as a tombstone.
    pub fn remove_unit(&mut self, id: UnitId) {
        if let Some(unit) = self.units.get_mut(id) {
            if let Some(pos) = unit.position.take() {
                self.grid.vacate(pos);
            }
        }
    }

    /// Resolve an attack by `attacker` on the unit at `target`.
    ///
    /// Damage is always the attacker's `max_damage`. Only a live enemy on
    /// the target cell can be hit.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown attacker id.
    pub fn attack(&mut self, attacker: UnitId, target: Position) -> Result<AttackOutcome> {
        let Some(attacker) = self.live_unit(attacker)? else {
            return Ok(AttackOutcome::Missed);
        };
        let damage = attacker.stats().max_damage;
        let owner = attacker.player;

        let Some(defender) = self.unit_at(target) else {
            return Ok(AttackOutcome::Missed);
        };
        if defender.kind.is_resource() || defender.player.is_none() || defender.player == owner {
            return Ok(AttackOutcome::Missed);
        }
        let defender_id = defender.id;

        let killed = match self.units.get_mut(defender_id) {
            Some(defender) => {
                defender.hit_points -= damage;
                defender.hit_points <= 0
            }
            None => return Ok(AttackOutcome::Missed),
        };
        if killed {
            self.remove_unit(defender_id);
            Ok(AttackOutcome::Killed {
                defender: defender_id,
                damage,
            })
        } else {
            Ok(AttackOutcome::Hit {
                defender: defender_id,
                damage,
            })
        }
    }

    /// Mine up to [`HARVEST_AMOUNT`] from the resource at `target`.
    ///
    /// Returns the amount mined. A depleted resource is removed.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown harvester id.
    pub fn harvest(&mut self, harvester: UnitId, target: Position) -> Result<u32> {
        if self.live_unit(harvester)?.is_none() {
            return Ok(0);
        }
        let Some(patch) = self.unit_at(target).filter(|u| u.kind.is_resource()) else {
            return Ok(0);
        };
        let patch_id = patch.id;
        let amount = patch.resources.min(HARVEST_AMOUNT);
        if amount == 0 {
            return Ok(0);
        }

        let mut depleted = false;
        if let Some(patch) = self.units.get_mut(patch_id) {
            patch.resources -= amount;
            depleted = patch.resources == 0;
        }
        if let Some(worker) = self.units.get_mut(harvester) {
            worker.resources += amount;
        }
        if depleted {
            self.remove_unit(patch_id);
        }
        Ok(amount)
    }

    /// Hand the worker's load to its own base at `target`.
    ///
    /// Returns the amount deposited.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown worker id.
    pub fn return_resources(&mut self, worker: UnitId, target: Position) -> Result<u32> {
        let Some(carrier) = self.live_unit(worker)? else {
            return Ok(0);
        };
        let (owner, load) = (carrier.player, carrier.resources);
        let Some(owner) = owner else {
            return Ok(0);
        };
        let has_base = self
            .unit_at(target)
            .is_some_and(|u| u.kind == UnitKind::Base && u.player == Some(owner));
        if !has_base || load == 0 {
            return Ok(0);
        }

        let player = self
            .players
            .get_mut(owner as usize)
            .ok_or(GameError::UnknownPlayer(owner))?;
        player.deposit(load);
        if let Some(carrier) = self.units.get_mut(worker) {
            carrier.resources = 0;
        }
        Ok(load)
    }

    /// Build a new unit of `kind` for the producer's owner on `target`.
    ///
    /// Returns the new unit's id, or `None` if the cell is taken or the
    /// owner can no longer afford it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown producer id.
    pub fn produce(
        &mut self,
        producer: UnitId,
        target: Position,
        kind: UnitKind,
    ) -> Result<Option<UnitId>> {
        let Some(owner) = self.live_unit(producer)?.and_then(|u| u.player) else {
            return Ok(None);
        };
        if !self.grid.is_passable(target) {
            return Ok(None);
        }
        let Some(id) = self.units.next_id() else {
            return Ok(None);
        };
        let player = self
            .players
            .get_mut(owner as usize)
            .ok_or(GameError::UnknownPlayer(owner))?;
        if !player.spend(kind.stats().cost) {
            return Ok(None);
        }

        self.grid.place(id, target)?;
        self.units.push(Unit::new(id, Some(owner), kind, target));
        Ok(Some(id))
    }

    /// Verify the occupancy overlay agrees with unit positions.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CellUnavailable`] naming the first cell where a
    /// live unit is not recorded, shares its cell, or stands on a wall.
    pub fn check_occupancy(&self) -> Result<()> {
        for unit in self.units.alive() {
            let Some(pos) = unit.position else { continue };
            let recorded = self.grid.occupant(pos) == Some(unit.id);
            if !recorded || !self.grid.is_clear_terrain(pos) {
                return Err(GameError::CellUnavailable { x: pos.x, y: pos.y });
            }
        }
        Ok(())
    }
}

impl Hash for GameState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.players.hash(state);
        self.units.hash(state);
    }
}
