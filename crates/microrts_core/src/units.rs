//! Units and the unit table.
//!
//! Units are never deleted during a match. A dead unit (or a mined-out
//! resource) keeps its slot with `position == None`, so ids stay stable for
//! observation consumers.

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::position::Position;
use crate::unit_kind::{UnitKind, UnitStats};

/// Unique identifier for units, stable for the lifetime of a match.
pub type UnitId = u32;

/// A unit on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique id.
    pub id: UnitId,
    /// Owning player. `None` for neutral resource patches.
    pub player: Option<PlayerId>,
    /// Unit kind.
    pub kind: UnitKind,
    /// Cell the unit stands on, `None` once removed from the map.
    pub position: Option<Position>,
    /// Remaining hit points.
    pub hit_points: i32,
    /// Carried load for workers, remaining stock for resource patches.
    pub resources: u32,
    /// Set while the unit has an action scheduled.
    pub busy: bool,
}

impl Unit {
    /// Create a fresh unit at full hit points.
    #[must_use]
    pub fn new(id: UnitId, player: Option<PlayerId>, kind: UnitKind, position: Position) -> Self {
        Self {
            id,
            player,
            kind,
            position: Some(position),
            hit_points: kind.stats().hit_points,
            resources: 0,
            busy: false,
        }
    }

    /// Static stats of this unit's kind.
    #[must_use]
    pub const fn stats(&self) -> &'static UnitStats {
        self.kind.stats()
    }

    /// A unit is alive while it is on the map.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.position.is_some()
    }

    /// Whether this unit is alive and owned by `player`.
    #[must_use]
    pub fn is_alive_for(&self, player: PlayerId) -> bool {
        self.is_alive() && self.player == Some(player)
    }
}

/// Dense unit storage ordered by id.
///
/// New ids are always `max + 1`, so appending keeps the table sorted and
/// lookups can binary search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitTable {
    units: Vec<Unit>,
}

impl UnitTable {
    /// Build a table from units in any order.
    #[must_use]
    pub fn from_units(mut units: Vec<Unit>) -> Self {
        units.sort_unstable_by_key(|u| u.id);
        Self { units }
    }

    /// Id the next produced unit will receive, `None` once ids run out.
    #[must_use]
    pub fn next_id(&self) -> Option<UnitId> {
        match self.units.last() {
            Some(unit) => unit.id.checked_add(1),
            None => Some(0),
        }
    }

    /// Append a unit. Its id must be [`Self::next_id`].
    pub fn push(&mut self, unit: Unit) {
        debug_assert_eq!(Some(unit.id), self.next_id());
        self.units.push(unit);
    }

    /// Get a unit by id.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units
            .binary_search_by_key(&id, |u| u.id)
            .ok()
            .map(|i| &self.units[i])
    }

    /// Get a mutable reference to a unit by id.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        match self.units.binary_search_by_key(&id, |u| u.id) {
            Ok(i) => Some(&mut self.units[i]),
            Err(_) => None,
        }
    }

    /// Check if a unit id exists (alive or dead).
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.get(id).is_some()
    }

    /// Number of units, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over all units in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Iterate over live units in id order.
    pub fn alive(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_alive())
    }

    /// Count live units owned by `player`.
    #[must_use]
    pub fn alive_count(&self, player: PlayerId) -> usize {
        self.alive().filter(|u| u.player == Some(player)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker(id: UnitId, x: i32) -> Unit {
        Unit::new(id, Some(0), UnitKind::Worker, Position::new(x, 0))
    }

    #[test]
    fn test_table_sorted_lookup() {
        let table = UnitTable::from_units(vec![worker(5, 0), worker(2, 1), worker(9, 2)]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2).unwrap().position, Some(Position::new(1, 0)));
        assert!(table.get(3).is_none());
        assert_eq!(table.next_id(), Some(10));

        let ids: Vec<UnitId> = table.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_empty_table_next_id() {
        let table = UnitTable::default();
        assert!(table.is_empty());
        assert_eq!(table.next_id(), Some(0));
    }

    #[test]
    fn test_next_id_exhausted() {
        let table = UnitTable::from_units(vec![worker(UnitId::MAX, 0)]);
        assert_eq!(table.next_id(), None);
    }

    #[test]
    fn test_dead_units_stay_in_table() {
        let mut table = UnitTable::from_units(vec![worker(0, 0), worker(1, 1)]);
        table.get_mut(0).unwrap().position = None;

        assert!(table.contains(0));
        assert_eq!(table.alive().count(), 1);
        assert_eq!(table.alive_count(0), 1);
    }

    #[test]
    fn test_new_unit_has_full_health() {
        let unit = Unit::new(0, Some(1), UnitKind::Heavy, Position::new(0, 0));
        assert_eq!(unit.hit_points, 8);
        assert!(unit.is_alive_for(1));
        assert!(!unit.is_alive_for(0));
    }
}
