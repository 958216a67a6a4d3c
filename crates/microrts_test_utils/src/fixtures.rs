//! Test fixtures and helpers.
//!
//! Pre-built maps and a builder for consistent test setup.

use microrts_core::config::GameConfig;
use microrts_core::game::Game;
use microrts_core::player::PlayerId;
use microrts_core::snapshot::{MapSnapshot, PlayerSpec, UnitSpec};
use microrts_core::unit_kind::UnitKind;
use microrts_core::units::UnitId;

/// Resource stock given to patches placed without an explicit amount.
pub const DEFAULT_PATCH_STOCK: u32 = 20;

/// Incremental builder for [`MapSnapshot`]s.
///
/// Unit ids are handed out in insertion order starting at 0.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    width: u32,
    height: u32,
    terrain: Vec<u8>,
    minerals: [u32; 2],
    units: Vec<UnitSpec>,
}

impl MapBuilder {
    /// Empty map of the given size, no walls, no minerals.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            terrain: vec![0; (width * height) as usize],
            minerals: [0, 0],
            units: Vec::new(),
        }
    }

    /// Block the cell at `(x, y)`.
    #[must_use]
    pub fn wall(mut self, x: i32, y: i32) -> Self {
        let index = y as usize * self.width as usize + x as usize;
        if let Some(cell) = self.terrain.get_mut(index) {
            *cell = 1;
        }
        self
    }

    /// Set a player's starting minerals.
    #[must_use]
    pub fn minerals(mut self, player: PlayerId, amount: u32) -> Self {
        self.minerals[usize::from(player)] = amount;
        self
    }

    /// Place a full-health unit for `player`.
    #[must_use]
    pub fn unit(self, kind: UnitKind, player: PlayerId, x: i32, y: i32) -> Self {
        self.push(Some(player), kind, x, y, 0)
    }

    /// Place a neutral resource patch with `stock` resources.
    #[must_use]
    pub fn resource(self, x: i32, y: i32, stock: u32) -> Self {
        self.push(None, UnitKind::Resource, x, y, stock)
    }

    fn push(
        mut self,
        player: Option<PlayerId>,
        kind: UnitKind,
        x: i32,
        y: i32,
        resources: u32,
    ) -> Self {
        let id = self.units.len() as UnitId;
        self.units.push(UnitSpec {
            id,
            player,
            kind,
            x,
            y,
            hit_points: kind.stats().hit_points,
            resources,
        });
        self
    }

    /// Finish the snapshot.
    #[must_use]
    pub fn build(self) -> MapSnapshot {
        MapSnapshot {
            width: self.width,
            height: self.height,
            terrain: self.terrain,
            players: vec![
                PlayerSpec {
                    id: 0,
                    minerals: self.minerals[0],
                },
                PlayerSpec {
                    id: 1,
                    minerals: self.minerals[1],
                },
            ],
            units: self.units,
        }
    }

    /// Finish and start a match with the given step cap.
    ///
    /// # Panics
    ///
    /// Panics if the snapshot is invalid.
    #[must_use]
    pub fn game(self, max_steps: u64) -> Game {
        Game::new(GameConfig::default().with_max_steps(max_steps), self.build())
            .expect("fixture map must be valid")
    }
}

/// The 4x4 melee map: one Light per side in opposite corners.
///
/// Unit 0 belongs to player 0, unit 1 to player 1.
#[must_use]
pub fn melee_4x4() -> MapSnapshot {
    MapBuilder::new(4, 4)
        .unit(UnitKind::Light, 0, 0, 0)
        .unit(UnitKind::Light, 1, 3, 3)
        .build()
}

/// Two adjacent Lights on a 4x4 map, facing each other.
#[must_use]
pub fn adjacent_lights() -> MapSnapshot {
    MapBuilder::new(4, 4)
        .unit(UnitKind::Light, 0, 1, 1)
        .unit(UnitKind::Light, 1, 2, 1)
        .build()
}

/// An 8x8 economy map with bases, workers, patches and a small wall.
///
/// Ids: 0 base p0, 1 worker p0, 2 base p1, 3 worker p1, 4 and 5 patches.
#[must_use]
pub fn bases_workers_8x8() -> MapSnapshot {
    MapBuilder::new(8, 8)
        .wall(3, 3)
        .wall(4, 4)
        .minerals(0, 5)
        .minerals(1, 5)
        .unit(UnitKind::Base, 0, 1, 1)
        .unit(UnitKind::Worker, 0, 2, 1)
        .unit(UnitKind::Base, 1, 6, 6)
        .unit(UnitKind::Worker, 1, 5, 6)
        .resource(0, 0, DEFAULT_PATCH_STOCK)
        .resource(7, 7, DEFAULT_PATCH_STOCK)
        .build()
}

/// A mixed army on a 6x6 map for combat-heavy runs.
#[must_use]
pub fn skirmish_6x6() -> MapSnapshot {
    MapBuilder::new(6, 6)
        .minerals(0, 10)
        .minerals(1, 10)
        .unit(UnitKind::Barracks, 0, 0, 0)
        .unit(UnitKind::Heavy, 0, 1, 1)
        .unit(UnitKind::Ranged, 0, 0, 2)
        .unit(UnitKind::Light, 0, 2, 0)
        .unit(UnitKind::Barracks, 1, 5, 5)
        .unit(UnitKind::Heavy, 1, 4, 4)
        .unit(UnitKind::Ranged, 1, 5, 3)
        .unit(UnitKind::Light, 1, 3, 5)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_are_valid() {
        for map in [melee_4x4(), adjacent_lights(), bases_workers_8x8(), skirmish_6x6()] {
            assert!(map.validate().is_ok());
        }
    }

    #[test]
    fn test_builder_assigns_sequential_ids() {
        let map = MapBuilder::new(3, 3)
            .unit(UnitKind::Worker, 0, 0, 0)
            .resource(1, 1, 4)
            .build();
        let ids: Vec<UnitId> = map.units.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(map.units[1].player, None);
        assert_eq!(map.units[1].resources, 4);
    }

    #[test]
    fn test_builder_wall() {
        let map = MapBuilder::new(2, 2).wall(1, 0).build();
        assert_eq!(map.terrain, vec![0, 1, 0, 0]);
    }
}
