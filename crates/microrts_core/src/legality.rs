//! Action-legality validator and per-unit action masks.
//!
//! Legality is a pure function of the current state, the actions already in
//! flight (scheduled for later ticks or queued earlier this tick) and the
//! candidate action. It never mutates anything.

use crate::action::{Action, ActionEncoding, ActionKind, EncodedKind};
use crate::player::opponent;
use crate::position::Position;
use crate::state::GameState;
use crate::unit_kind::UnitKind;
use crate::units::{Unit, UnitId};

/// Read-only view over the actions currently in flight: those scheduled
/// for later ticks plus those queued earlier in the current tick.
#[derive(Debug, Clone, Default)]
pub struct InFlight<'a> {
    scheduled: Vec<&'a Action>,
    queued: Vec<&'a Action>,
}

impl<'a> InFlight<'a> {
    /// Build a view from the actions scheduled for completion.
    pub fn new(scheduled: impl IntoIterator<Item = &'a Action>) -> Self {
        Self {
            scheduled: scheduled.into_iter().collect(),
            queued: Vec::new(),
        }
    }

    /// Add the actions submitted earlier in the current tick.
    #[must_use]
    pub fn with_queued(mut self, queued: impl IntoIterator<Item = &'a Action>) -> Self {
        self.queued.extend(queued);
        self
    }

    /// No action in flight.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether some in-flight action belongs to `unit`.
    #[must_use]
    pub fn has_action_for(&self, unit: UnitId) -> bool {
        self.scheduled
            .iter()
            .chain(self.queued.iter())
            .any(|a| a.unit_id == unit)
    }

    /// Whether some in-flight action targets `pos`.
    #[must_use]
    pub fn targets(&self, pos: Position) -> bool {
        self.scheduled
            .iter()
            .chain(self.queued.iter())
            .any(|a| a.target == pos)
    }

    /// Number of in-flight actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scheduled.len() + self.queued.len()
    }

    /// Check if nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check whether `action` is consistent with the game rules right now.
#[must_use]
pub fn is_legal(state: &GameState, in_flight: &InFlight<'_>, action: &Action) -> bool {
    if action.is_noop() {
        return true;
    }
    let Some(actor) = state.unit(action.unit_id).filter(|u| u.is_alive()) else {
        return false;
    };
    let Some(origin) = actor.position else {
        return false;
    };
    let target = action.target;
    if !state.grid().in_bounds(target) {
        return false;
    }
    // one outstanding action per unit
    if in_flight.has_action_for(actor.id) {
        return false;
    }

    match action.kind {
        ActionKind::Noop => true,
        ActionKind::Move => {
            actor.kind.is_mobile()
                && !actor.busy
                && origin.manhattan(target) == 1
                && state.grid().is_passable(target)
                && !in_flight.targets(target)
        }
        ActionKind::Attack => {
            actor.kind.is_mobile()
                && origin.manhattan(target) <= actor.stats().attack_range
                && is_enemy_at(state, actor, target)
        }
        ActionKind::Harvest => {
            // adjacency is intentionally not required
            actor.kind == UnitKind::Worker
                && actor.resources == 0
                && state
                    .unit_at(target)
                    .is_some_and(|u| u.kind.is_resource())
        }
        ActionKind::Return => {
            actor.kind == UnitKind::Worker
                && actor.resources > 0
                && state.unit_at(target).is_some_and(|u| {
                    u.kind == UnitKind::Base && u.player.is_some() && u.player == actor.player
                })
        }
        ActionKind::Produce(kind) => {
            let affordable = actor
                .player
                .and_then(|p| state.player(p))
                .is_some_and(|p| p.can_afford(kind.stats().cost));
            actor.kind.is_producer() && affordable && state.grid().is_passable(target)
        }
    }
}

fn is_enemy_at(state: &GameState, actor: &Unit, target: Position) -> bool {
    let Some(owner) = actor.player else {
        return false;
    };
    state
        .unit_at(target)
        .is_some_and(|u| u.player == Some(opponent(owner)))
}

/// One bit per [`ActionEncoding`], set when the encoded action is legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionMask([bool; ActionEncoding::COUNT]);

impl ActionMask {
    /// Mask allowing only Noop.
    #[must_use]
    pub fn noop_only() -> Self {
        let mut bits = [false; ActionEncoding::COUNT];
        bits[ActionEncoding::Noop.index()] = true;
        Self(bits)
    }

    /// Whether the encoding is allowed.
    #[must_use]
    pub fn allows(&self, encoding: ActionEncoding) -> bool {
        self.0[encoding.index()]
    }

    /// Bits as `0`/`1` bytes in encoding order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ActionEncoding::COUNT] {
        self.0.map(u8::from)
    }

    /// Allowed encodings in index order.
    pub fn allowed(&self) -> impl Iterator<Item = ActionEncoding> + '_ {
        ActionEncoding::all().filter(|e| self.allows(*e))
    }

    /// Number of allowed encodings.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.iter().filter(|b| **b).count()
    }
}

/// Concrete action for an encoding, anchored at the unit's current cell.
///
/// Produce uses the first kind in the unit's `produces` list. Returns `None`
/// for a dead unit, or for Produce on a unit that builds nothing.
#[must_use]
pub fn synthesize(
    unit: &Unit,
    encoding: ActionEncoding,
    start_time: u64,
    end_time: u64,
) -> Option<Action> {
    let origin = unit.position?;
    let action = match encoding {
        ActionEncoding::Noop => Action::noop(unit.id, origin, start_time, end_time),
        ActionEncoding::Directed(kind, direction) => {
            let kind = match kind {
                EncodedKind::Move => ActionKind::Move,
                EncodedKind::Attack => ActionKind::Attack,
                EncodedKind::Harvest => ActionKind::Harvest,
                EncodedKind::Return => ActionKind::Return,
                EncodedKind::Produce => ActionKind::Produce(*unit.stats().produces.first()?),
            };
            Action::new(unit.id, kind, origin.step(direction), start_time, end_time)
        }
    };
    Some(action)
}

/// Build the legality mask for one unit.
///
/// A dead unit, or one that already has an action in flight, may only Noop.
#[must_use]
pub fn action_mask(state: &GameState, in_flight: &InFlight<'_>, unit_id: UnitId) -> ActionMask {
    let Some(unit) = state.unit(unit_id).filter(|u| u.is_alive()) else {
        return ActionMask::noop_only();
    };
    if unit.busy || in_flight.has_action_for(unit_id) {
        return ActionMask::noop_only();
    }

    let mut bits = [false; ActionEncoding::COUNT];
    for encoding in ActionEncoding::all() {
        bits[encoding.index()] = match encoding {
            ActionEncoding::Noop => true,
            _ => synthesize(unit, encoding, 0, 0)
                .is_some_and(|action| is_legal(state, in_flight, &action)),
        };
    }
    ActionMask(bits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;
    use crate::position::Direction;
    use crate::snapshot::{MapSnapshot, PlayerSpec, UnitSpec};

    fn spec(id: UnitId, player: Option<PlayerId>, kind: UnitKind, x: i32, y: i32) -> UnitSpec {
        UnitSpec {
            id,
            player,
            kind,
            x,
            y,
            hit_points: kind.stats().hit_points,
            resources: 0,
        }
    }

    fn state_with(terrain: Vec<u8>, units: Vec<UnitSpec>, minerals: u32) -> GameState {
        GameState::from_snapshot(&MapSnapshot {
            width: 4,
            height: 4,
            terrain,
            players: vec![
                PlayerSpec { id: 0, minerals },
                PlayerSpec { id: 1, minerals },
            ],
            units,
        })
        .unwrap()
    }

    fn state(units: Vec<UnitSpec>, minerals: u32) -> GameState {
        state_with(vec![0; 16], units, minerals)
    }

    fn act(unit: UnitId, kind: ActionKind, x: i32, y: i32) -> Action {
        Action::new(unit, kind, Position::new(x, y), 0, 1)
    }

    #[test]
    fn test_noop_always_legal() {
        let state = state(vec![], 0);
        let action = Action::noop(99, Position::new(-5, -5), 0, 0);
        assert!(is_legal(&state, &InFlight::empty(), &action));
    }

    #[test]
    fn test_move_rules() {
        let mut terrain = vec![0; 16];
        terrain[2] = 1; // wall at (2, 0)
        let state = state_with(
            terrain,
            vec![
                spec(0, Some(0), UnitKind::Light, 1, 0),
                spec(1, Some(1), UnitKind::Light, 1, 1),
                spec(2, Some(0), UnitKind::Base, 3, 3),
            ],
            0,
        );
        let none = InFlight::empty();

        assert!(is_legal(&state, &none, &act(0, ActionKind::Move, 0, 0)));
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Move, 2, 0)), "wall");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Move, 1, 1)), "occupied");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Move, 1, -1)), "off map");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Move, 3, 0)), "too far");
        assert!(!is_legal(&state, &none, &act(2, ActionKind::Move, 3, 2)), "building");
    }

    #[test]
    fn test_move_blocked_by_in_flight_target() {
        let state = state(
            vec![
                spec(0, Some(0), UnitKind::Light, 0, 0),
                spec(1, Some(0), UnitKind::Light, 2, 0),
            ],
            0,
        );
        let other = act(1, ActionKind::Move, 1, 0);
        let in_flight = InFlight::new([&other]);

        assert!(!is_legal(&state, &in_flight, &act(0, ActionKind::Move, 1, 0)));
        assert!(is_legal(&state, &in_flight, &act(0, ActionKind::Move, 0, 1)));
    }

    #[test]
    fn test_queued_move_reserves_target() {
        let state = state(
            vec![
                spec(0, Some(0), UnitKind::Light, 0, 0),
                spec(1, Some(0), UnitKind::Light, 2, 0),
            ],
            0,
        );
        let queued = act(1, ActionKind::Move, 1, 0);
        let in_flight = InFlight::empty().with_queued([&queued]);

        assert!(!is_legal(&state, &in_flight, &act(0, ActionKind::Move, 1, 0)));
        assert!(is_legal(&state, &in_flight, &act(0, ActionKind::Move, 0, 1)));
        assert!(!is_legal(&state, &in_flight, &act(1, ActionKind::Move, 3, 0)));
        assert_eq!(in_flight.len(), 1);
    }

    #[test]
    fn test_one_action_in_flight_per_unit() {
        let state = state(
            vec![
                spec(0, Some(0), UnitKind::Light, 0, 0),
                spec(1, Some(1), UnitKind::Light, 1, 0),
            ],
            0,
        );
        let pending = Action::noop(0, Position::new(0, 0), 0, 3);
        let in_flight = InFlight::new([&pending]);

        assert!(!is_legal(&state, &in_flight, &act(0, ActionKind::Attack, 1, 0)));
        assert!(is_legal(&state, &in_flight, &act(1, ActionKind::Attack, 0, 0)));
    }

    #[test]
    fn test_attack_rules() {
        let state = state(
            vec![
                spec(0, Some(0), UnitKind::Ranged, 0, 0),
                spec(1, Some(1), UnitKind::Worker, 3, 0),
                spec(2, Some(0), UnitKind::Worker, 0, 1),
                spec(3, Some(1), UnitKind::Worker, 3, 3),
                spec(4, None, UnitKind::Resource, 1, 1),
            ],
            0,
        );
        let none = InFlight::empty();

        assert!(is_legal(&state, &none, &act(0, ActionKind::Attack, 3, 0)), "range 3");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Attack, 3, 3)), "out of range");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Attack, 0, 1)), "friendly");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Attack, 1, 1)), "resource");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Attack, 2, 0)), "empty cell");
    }

    #[test]
    fn test_harvest_does_not_require_adjacency() {
        let mut patch = spec(1, None, UnitKind::Resource, 3, 3);
        patch.resources = 5;
        let mut loaded = spec(2, Some(0), UnitKind::Worker, 1, 0);
        loaded.resources = 1;
        let state = state(
            vec![
                spec(0, Some(0), UnitKind::Worker, 0, 0),
                patch,
                loaded,
                spec(3, Some(0), UnitKind::Light, 0, 1),
            ],
            0,
        );
        let none = InFlight::empty();

        assert!(is_legal(&state, &none, &act(0, ActionKind::Harvest, 3, 3)));
        assert!(!is_legal(&state, &none, &act(2, ActionKind::Harvest, 3, 3)), "full");
        assert!(!is_legal(&state, &none, &act(3, ActionKind::Harvest, 3, 3)), "not worker");
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Harvest, 2, 2)), "no resource");
    }

    #[test]
    fn test_return_rules() {
        let mut loaded = spec(0, Some(0), UnitKind::Worker, 0, 0);
        loaded.resources = 1;
        let state = state(
            vec![
                loaded,
                spec(1, Some(0), UnitKind::Base, 1, 0),
                spec(2, Some(1), UnitKind::Base, 0, 1),
                spec(3, Some(0), UnitKind::Worker, 2, 0),
            ],
            0,
        );
        let none = InFlight::empty();

        assert!(is_legal(&state, &none, &act(0, ActionKind::Return, 1, 0)));
        assert!(!is_legal(&state, &none, &act(0, ActionKind::Return, 0, 1)), "enemy base");
        assert!(!is_legal(&state, &none, &act(3, ActionKind::Return, 1, 0)), "empty hands");
    }

    #[test]
    fn test_produce_rules() {
        let state = state(
            vec![
                spec(0, Some(0), UnitKind::Base, 0, 0),
                spec(1, Some(0), UnitKind::Light, 3, 3),
                spec(2, Some(1), UnitKind::Worker, 0, 1),
            ],
            1,
        );
        let none = InFlight::empty();

        let worker = ActionKind::Produce(UnitKind::Worker);
        assert!(is_legal(&state, &none, &act(0, worker, 1, 0)));
        assert!(!is_legal(&state, &none, &act(0, worker, 0, 1)), "occupied");
        assert!(!is_legal(&state, &none, &act(1, worker, 3, 2)), "not a producer");
        let light = ActionKind::Produce(UnitKind::Light);
        assert!(!is_legal(&state, &none, &act(0, light, 1, 0)), "too expensive");
    }

    #[test]
    fn test_dead_actor_is_illegal() {
        let mut state = state(
            vec![
                spec(0, Some(0), UnitKind::Light, 0, 0),
                spec(1, Some(1), UnitKind::Light, 1, 0),
            ],
            0,
        );
        state.remove_unit(0);
        assert!(!is_legal(&state, &InFlight::empty(), &act(0, ActionKind::Move, 0, 1)));
    }

    #[test]
    fn test_mask_for_open_field_light() {
        let state = state(
            vec![
                spec(0, Some(0), UnitKind::Light, 1, 1),
                spec(1, Some(1), UnitKind::Light, 2, 1),
            ],
            0,
        );
        let mask = action_mask(&state, &InFlight::empty(), 0);

        assert!(mask.allows(ActionEncoding::Noop));
        assert!(mask.allows(ActionEncoding::Directed(EncodedKind::Move, Direction::Up)));
        assert!(!mask.allows(ActionEncoding::Directed(EncodedKind::Move, Direction::Right)));
        assert!(mask.allows(ActionEncoding::Directed(EncodedKind::Attack, Direction::Right)));
        assert!(!mask.allows(ActionEncoding::Directed(EncodedKind::Attack, Direction::Left)));
        assert!(!mask.allows(ActionEncoding::Directed(EncodedKind::Harvest, Direction::Up)));
        // noop + 3 moves + 1 attack
        assert_eq!(mask.count(), 5);
    }

    #[test]
    fn test_mask_noop_only_when_busy_or_dead() {
        let mut state = state(
            vec![
                spec(0, Some(0), UnitKind::Light, 1, 1),
                spec(1, Some(1), UnitKind::Light, 2, 2),
            ],
            0,
        );
        state.set_busy(0, true);
        assert_eq!(action_mask(&state, &InFlight::empty(), 0), ActionMask::noop_only());

        state.remove_unit(1);
        assert_eq!(action_mask(&state, &InFlight::empty(), 1), ActionMask::noop_only());
        assert_eq!(ActionMask::noop_only().to_bytes()[0], 1);
        assert_eq!(ActionMask::noop_only().count(), 1);
    }

    #[test]
    fn test_mask_produce_uses_first_product() {
        let state = state(vec![spec(0, Some(0), UnitKind::Base, 0, 0)], 1);
        let mask = action_mask(&state, &InFlight::empty(), 0);

        assert!(mask.allows(ActionEncoding::Directed(EncodedKind::Produce, Direction::Right)));
        assert!(mask.allows(ActionEncoding::Directed(EncodedKind::Produce, Direction::Down)));
        assert!(!mask.allows(ActionEncoding::Directed(EncodedKind::Produce, Direction::Up)));
        assert!(!mask.allows(ActionEncoding::Directed(EncodedKind::Move, Direction::Right)));
    }
}
