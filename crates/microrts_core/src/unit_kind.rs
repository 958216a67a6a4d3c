//! Unit kinds and their static stats.
//!
//! The seven microRTS unit kinds form a closed set, so they are an enum
//! dispatched with exhaustive matches rather than a data-driven registry.
//! Stats follow the fine-tuned microRTS unit-type table.

use serde::{Deserialize, Serialize};

/// Static, per-kind unit statistics.
///
/// Times are in ticks. A zero time means the kind cannot perform the
/// corresponding action at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    /// Minerals needed to produce one unit of this kind.
    pub cost: u32,
    /// Hit points a fresh unit starts with.
    pub hit_points: i32,
    /// Minimum damage per attack.
    pub min_damage: i32,
    /// Maximum damage per attack. The engine always applies this value.
    pub max_damage: i32,
    /// Attack range in cells (Manhattan).
    pub attack_range: u32,
    /// Ticks to move one cell.
    pub move_time: u64,
    /// Ticks to complete an attack.
    pub attack_time: u64,
    /// Ticks to harvest one load.
    pub harvest_time: u64,
    /// Ticks to return a load to a base.
    pub return_time: u64,
    /// Ticks for a producer to build this kind.
    pub produce_time: u64,
    /// Sight radius in cells.
    pub sight_radius: u32,
    /// Kinds this unit can produce. Empty for non-producers.
    pub produces: &'static [UnitKind],
}

/// The fixed set of unit kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Neutral mineral patch.
    Resource,
    /// Main building; produces workers and accepts returned minerals.
    Base,
    /// Military building.
    Barracks,
    /// Harvester and builder.
    Worker,
    /// Fast melee unit.
    Light,
    /// Slow, durable melee unit.
    Heavy,
    /// Fragile unit with a long attack range.
    Ranged,
}

const RESOURCE: UnitStats = UnitStats {
    cost: 1,
    hit_points: 1,
    min_damage: 0,
    max_damage: 0,
    attack_range: 0,
    move_time: 0,
    attack_time: 0,
    harvest_time: 0,
    return_time: 0,
    produce_time: 0,
    sight_radius: 0,
    produces: &[],
};

const BASE: UnitStats = UnitStats {
    cost: 10,
    hit_points: 10,
    min_damage: 0,
    max_damage: 0,
    attack_range: 0,
    move_time: 0,
    attack_time: 0,
    harvest_time: 0,
    return_time: 0,
    produce_time: 200,
    sight_radius: 5,
    produces: &[UnitKind::Worker],
};

const BARRACKS: UnitStats = UnitStats {
    cost: 5,
    hit_points: 4,
    min_damage: 0,
    max_damage: 0,
    attack_range: 0,
    move_time: 0,
    attack_time: 0,
    harvest_time: 0,
    return_time: 0,
    produce_time: 100,
    sight_radius: 3,
    produces: &[UnitKind::Light, UnitKind::Heavy, UnitKind::Ranged],
};

const WORKER: UnitStats = UnitStats {
    cost: 1,
    hit_points: 1,
    min_damage: 1,
    max_damage: 1,
    attack_range: 1,
    move_time: 10,
    attack_time: 5,
    harvest_time: 20,
    return_time: 10,
    produce_time: 50,
    sight_radius: 3,
    produces: &[UnitKind::Base, UnitKind::Barracks],
};

const LIGHT: UnitStats = UnitStats {
    cost: 2,
    hit_points: 4,
    min_damage: 2,
    max_damage: 2,
    attack_range: 1,
    move_time: 8,
    attack_time: 5,
    harvest_time: 0,
    return_time: 0,
    produce_time: 80,
    sight_radius: 2,
    produces: &[],
};

const HEAVY: UnitStats = UnitStats {
    cost: 3,
    hit_points: 8,
    min_damage: 4,
    max_damage: 4,
    attack_range: 1,
    move_time: 12,
    attack_time: 5,
    harvest_time: 0,
    return_time: 0,
    produce_time: 120,
    sight_radius: 2,
    produces: &[],
};

const RANGED: UnitStats = UnitStats {
    cost: 2,
    hit_points: 1,
    min_damage: 1,
    max_damage: 1,
    attack_range: 3,
    move_time: 10,
    attack_time: 5,
    harvest_time: 0,
    return_time: 0,
    produce_time: 100,
    sight_radius: 3,
    produces: &[],
};

impl UnitKind {
    /// Number of unit kinds.
    pub const COUNT: usize = 7;

    /// All kinds in encoding order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Resource,
        Self::Base,
        Self::Barracks,
        Self::Worker,
        Self::Light,
        Self::Heavy,
        Self::Ranged,
    ];

    /// Static stats for this kind.
    #[must_use]
    pub const fn stats(self) -> &'static UnitStats {
        match self {
            Self::Resource => &RESOURCE,
            Self::Base => &BASE,
            Self::Barracks => &BARRACKS,
            Self::Worker => &WORKER,
            Self::Light => &LIGHT,
            Self::Heavy => &HEAVY,
            Self::Ranged => &RANGED,
        }
    }

    /// Marker written into exported observations for a cell holding this
    /// kind. Values start at 2 so they never collide with blocked terrain.
    #[must_use]
    pub const fn encoding(self) -> u8 {
        match self {
            Self::Resource => 2,
            Self::Base => 3,
            Self::Barracks => 4,
            Self::Worker => 5,
            Self::Light => 6,
            Self::Heavy => 7,
            Self::Ranged => 8,
        }
    }

    /// Resource patch?
    #[must_use]
    pub const fn is_resource(self) -> bool {
        matches!(self, Self::Resource)
    }

    /// Base or Barracks.
    #[must_use]
    pub const fn is_building(self) -> bool {
        matches!(self, Self::Base | Self::Barracks)
    }

    /// Resources and buildings never move or attack.
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        !self.is_resource() && !self.is_building()
    }

    /// Whether this kind can build anything.
    #[must_use]
    pub const fn is_producer(self) -> bool {
        !self.stats().produces.is_empty()
    }

    /// Name as used in microRTS map files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Resource => "Resource",
            Self::Base => "Base",
            Self::Barracks => "Barracks",
            Self::Worker => "Worker",
            Self::Light => "Light",
            Self::Heavy => "Heavy",
            Self::Ranged => "Ranged",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodings_are_distinct() {
        let mut codes: Vec<u8> = UnitKind::ALL.iter().map(|k| k.encoding()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), UnitKind::COUNT);
        assert!(codes.iter().all(|&c| c > 1));
    }

    #[test]
    fn test_mobility_classification() {
        assert!(!UnitKind::Resource.is_mobile());
        assert!(!UnitKind::Base.is_mobile());
        assert!(!UnitKind::Barracks.is_mobile());
        assert!(UnitKind::Worker.is_mobile());
        assert!(UnitKind::Ranged.is_mobile());
    }

    #[test]
    fn test_producers() {
        assert_eq!(UnitKind::Base.stats().produces, &[UnitKind::Worker]);
        assert!(UnitKind::Barracks.is_producer());
        assert!(UnitKind::Worker.is_producer());
        assert!(!UnitKind::Light.is_producer());
        assert!(!UnitKind::Resource.is_producer());
    }

    #[test]
    fn test_light_stats() {
        let light = UnitKind::Light.stats();
        assert_eq!(light.cost, 2);
        assert_eq!(light.hit_points, 4);
        assert_eq!(light.max_damage, 2);
        assert_eq!(light.attack_range, 1);
        assert_eq!(light.move_time, 8);
    }
}
