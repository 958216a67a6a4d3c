//! The resolution engine.
//!
//! A tick is driven by zero or more [`Game::step`] calls (one per acting
//! unit) followed by exactly one [`Game::update`]. All resolution is
//! deterministic: the same snapshot and the same submitted actions always
//! produce the same state.
//!
//! # Tick Order
//!
//! Each `update` runs these phases in order:
//! 1. **Contention** - actions queued this tick that target the same cell
//!    are all downgraded to Noop
//! 2. **Scheduling** - queued actions move into the scheduler bucket of
//!    their completion tick
//! 3. **Execution** - the bucket due now is executed in reverse insertion
//!    order (the microRTS tie-break: the action queued last strikes first)
//! 4. **Advance** - the clock moves on and the step cap is checked
//!
//! # Example
//!
//! ```
//! use microrts_core::prelude::*;
//!
//! let snapshot = MapSnapshot {
//!     width: 4,
//!     height: 1,
//!     terrain: vec![0; 4],
//!     players: vec![PlayerSpec { id: 0, minerals: 0 }, PlayerSpec { id: 1, minerals: 0 }],
//!     units: vec![
//!         UnitSpec { id: 0, player: Some(0), kind: UnitKind::Light, x: 0, y: 0, hit_points: 4, resources: 0 },
//!         UnitSpec { id: 1, player: Some(1), kind: UnitKind::Light, x: 3, y: 0, hit_points: 4, resources: 0 },
//!     ],
//! };
//! let mut game = Game::new(GameConfig::default(), snapshot).unwrap();
//!
//! game.step(Action::new(0, ActionKind::Move, Position::new(1, 0), 0, 0)).unwrap();
//! game.update().unwrap();
//!
//! assert_eq!(game.time(), 1);
//! assert_eq!(game.unit(0).unwrap().position, Some(Position::new(1, 0)));
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, VecDeque};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::action::{Action, ActionEncoding, ActionKind, EncodedKind};
use crate::config::{GameConfig, MatchResult};
use crate::error::{GameError, Result};
use crate::legality::{action_mask, is_legal, synthesize, ActionMask, InFlight};
use crate::player::{opponent, Player, PlayerId};
use crate::position::Position;
use crate::render::{render, Observation};
use crate::scheduler::{Scheduler, MAX_LOOKAHEAD};
use crate::snapshot::MapSnapshot;
use crate::state::{AttackOutcome, GameState};
use crate::units::{Unit, UnitId};

/// Ticks a Noop built from an encoding lasts.
pub const NOOP_DURATION: u64 = 0;

/// Events generated during one resolved tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickEvents {
    /// Actions executed this tick, in execution order.
    pub executed: Vec<Action>,
    /// Units whose queued action was cancelled by contention.
    pub cancelled: Vec<UnitId>,
    /// Units killed this tick.
    pub deaths: Vec<UnitId>,
    /// Units produced this tick.
    pub spawned: Vec<UnitId>,
    /// Set when the match ended this tick.
    pub result: Option<MatchResult>,
}

/// A two-player match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    snapshot: MapSnapshot,
    state: GameState,
    /// Current simulation tick.
    time: u64,
    result: Option<MatchResult>,
    scheduler: Scheduler,
    /// Actions submitted this tick, in submission order.
    queued: Vec<Action>,
}

impl Game {
    /// Start a match from a map snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] or [`GameError::InvalidMap`] if
    /// either input is inconsistent.
    pub fn new(config: GameConfig, snapshot: MapSnapshot) -> Result<Self> {
        config.validate()?;
        let state = GameState::from_snapshot(&snapshot)?;
        tracing::debug!(
            map = %config.map_id,
            width = snapshot.width,
            height = snapshot.height,
            units = snapshot.units.len(),
            "Match created"
        );
        Ok(Self {
            config,
            snapshot,
            state,
            time: 0,
            result: None,
            scheduler: Scheduler::new(),
            queued: Vec::new(),
        })
    }

    /// Restore the initial snapshot and rewind the clock to 0.
    pub fn reset(&mut self) {
        // `new` and `deserialize` both validate the snapshot
        if let Ok(state) = GameState::from_snapshot(&self.snapshot) {
            self.state = state;
        }
        self.time = 0;
        self.result = None;
        self.scheduler.clear();
        self.queued.clear();
    }

    /// Current tick.
    #[must_use]
    pub const fn time(&self) -> u64 {
        self.time
    }

    /// Whether the match has finished.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.result.is_some()
    }

    /// The winner, once there is one.
    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        self.result.and_then(MatchResult::winner)
    }

    /// How the match ended, if it has.
    #[must_use]
    pub const fn result(&self) -> Option<MatchResult> {
        self.result
    }

    /// Both players.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        self.state.players()
    }

    /// Look up a player.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.state.player(id)
    }

    /// Look up a unit (dead units included).
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.state.unit(id)
    }

    /// The full match state.
    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of actions scheduled for completion.
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.scheduler.len()
    }

    /// Actions scheduled for later ticks plus those queued this tick.
    #[must_use]
    pub fn in_flight(&self) -> InFlight<'_> {
        InFlight::new(self.scheduler.iter()).with_queued(self.queued.iter())
    }

    /// Submit one unit's action for the current tick.
    ///
    /// An illegal action is not an error: it is replaced with a Noop of the
    /// same unit and duration, so every submission resolves exactly once.
    ///
    /// # Errors
    ///
    /// Returns an error if the match is over, the unit is unknown, or the
    /// action's timing does not fit the current tick. An action may last at
    /// most [`MAX_LOOKAHEAD`] ticks.
    pub fn step(&mut self, action: Action) -> Result<()> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        let actor = self
            .state
            .unit(action.unit_id)
            .ok_or(GameError::UnknownUnit(action.unit_id))?;
        if action.start_time != self.time {
            return Err(GameError::TickMismatch {
                start_time: action.start_time,
                now: self.time,
            });
        }
        if action.end_time < action.start_time
            || action.end_time - action.start_time > MAX_LOOKAHEAD
        {
            return Err(GameError::InvalidDuration {
                start_time: action.start_time,
                end_time: action.end_time,
            });
        }

        let origin = actor.position.unwrap_or(action.target);
        let action = if is_legal(&self.state, &self.in_flight(), &action) {
            action
        } else {
            tracing::debug!(
                unit = action.unit_id,
                kind = ?action.kind,
                target = ?action.target,
                tick = self.time,
                "Illegal action downgraded to noop"
            );
            action.downgraded(origin)
        };
        self.queued.push(action);
        Ok(())
    }

    /// Resolve the current tick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::GameOver`] if the match has already finished.
    pub fn update(&mut self) -> Result<TickEvents> {
        if self.is_game_over() {
            return Err(GameError::GameOver);
        }
        let mut events = TickEvents::default();

        // 1. Contention
        events.cancelled = self.cancel_contended();

        // 2. Scheduling
        for action in std::mem::take(&mut self.queued) {
            self.scheduler.schedule(action, self.time)?;
            if self.state.unit(action.unit_id).is_some_and(Unit::is_alive) {
                self.state.set_busy(action.unit_id, true);
            }
        }

        // 3. Execution
        self.execute_due(&mut events)?;

        // 4. Advance
        self.time += 1;
        if self.result.is_none() && self.time >= self.config.max_steps {
            tracing::info!(tick = self.time, "Match ended in a draw at the step cap");
            self.result = Some(MatchResult::Draw);
            events.result = self.result;
        }

        tracing::debug!(
            tick = self.time,
            state_hash = self.state_hash(),
            "Simulation state hash"
        );
        Ok(events)
    }

    /// Downgrade every queued action whose target cell is wanted by more
    /// than one live unit this tick. Returns the affected units.
    fn cancel_contended(&mut self) -> Vec<UnitId> {
        let mut by_target: BTreeMap<Position, Vec<usize>> = BTreeMap::new();
        for (i, action) in self.queued.iter().enumerate() {
            if self.state.unit(action.unit_id).is_some_and(Unit::is_alive) {
                by_target.entry(action.target).or_default().push(i);
            }
        }

        let mut cancelled = Vec::new();
        for (target, indices) in by_target {
            if indices.len() < 2 {
                continue;
            }
            for i in indices {
                let action = self.queued[i];
                let origin = self
                    .state
                    .unit(action.unit_id)
                    .and_then(|u| u.position)
                    .unwrap_or(action.target);
                self.queued[i] = action.downgraded(origin);
                cancelled.push(action.unit_id);
            }
            tracing::debug!(?target, tick = self.time, "Contended target cancelled");
        }
        cancelled.sort_unstable();
        cancelled
    }

    /// Execute the bucket due now, last-inserted first.
    fn execute_due(&mut self, events: &mut TickEvents) -> Result<()> {
        let mut batch: VecDeque<Action> = self.scheduler.pop_due().into_iter().rev().collect();

        while let Some(action) = batch.pop_front() {
            let killed = self.execute(&action, events)?;
            events.executed.push(action);

            if let Some(dead) = killed {
                events.deaths.push(dead);
                self.scheduler.purge_unit(dead);
                batch.retain(|a| a.unit_id != dead);

                if let Some(player) = self.state.unit(dead).and_then(|u| u.player) {
                    if self.state.units().alive_count(player) == 0 {
                        let winner = opponent(player);
                        tracing::info!(tick = self.time, winner, "Match won");
                        self.result = Some(MatchResult::Winner(winner));
                        events.result = self.result;
                        return Ok(());
                    }
                }
            }

            let actor_alive = self.state.unit(action.unit_id).is_some_and(Unit::is_alive);
            if actor_alive && !self.scheduler.has_action_for(action.unit_id) {
                self.state.set_busy(action.unit_id, false);
            }
        }
        Ok(())
    }

    /// Apply one action. Returns the id of a unit it killed.
    fn execute(&mut self, action: &Action, events: &mut TickEvents) -> Result<Option<UnitId>> {
        tracing::trace!(
            unit = action.unit_id,
            kind = ?action.kind,
            target = ?action.target,
            tick = self.time,
            "Executing action"
        );
        let killed = match action.kind {
            ActionKind::Noop => None,
            ActionKind::Move => {
                self.state.move_unit(action.unit_id, action.target)?;
                None
            }
            ActionKind::Attack => match self.state.attack(action.unit_id, action.target)? {
                AttackOutcome::Killed { defender, .. } => Some(defender),
                AttackOutcome::Hit { .. } | AttackOutcome::Missed => None,
            },
            ActionKind::Harvest => {
                self.state.harvest(action.unit_id, action.target)?;
                None
            }
            ActionKind::Return => {
                self.state.return_resources(action.unit_id, action.target)?;
                None
            }
            ActionKind::Produce(kind) => {
                if let Some(id) = self.state.produce(action.unit_id, action.target, kind)? {
                    events.spawned.push(id);
                }
                None
            }
        };
        Ok(killed)
    }

    /// Legality mask for one unit's next action.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown id.
    pub fn get_action_mask(&self, unit_id: UnitId) -> Result<ActionMask> {
        if !self.state.units().contains(unit_id) {
            return Err(GameError::UnknownUnit(unit_id));
        }
        Ok(action_mask(&self.state, &self.in_flight(), unit_id))
    }

    /// Render the grid, optionally from one unit's point of view.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown id.
    pub fn get_state(&self, unit_id: Option<UnitId>) -> Result<Observation> {
        render(&self.state, unit_id)
    }

    /// Build a timed action for `unit_id` from a discrete encoding.
    ///
    /// The action starts now and lasts as long as the unit's stats say
    /// (the product's build time for Produce). It is not checked for
    /// legality; [`Game::step`] does that.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownUnit`] for an unknown id.
    pub fn action_for(&self, unit_id: UnitId, encoding: ActionEncoding) -> Result<Action> {
        let unit = self
            .state
            .unit(unit_id)
            .ok_or(GameError::UnknownUnit(unit_id))?;
        let stats = unit.stats();
        let duration = match encoding {
            ActionEncoding::Noop => NOOP_DURATION,
            ActionEncoding::Directed(kind, _) => match kind {
                EncodedKind::Move => stats.move_time,
                EncodedKind::Attack => stats.attack_time,
                EncodedKind::Harvest => stats.harvest_time,
                EncodedKind::Return => stats.return_time,
                EncodedKind::Produce => stats
                    .produces
                    .first()
                    .map_or(NOOP_DURATION, |k| k.stats().produce_time),
            },
        };
        let end = self.time + duration;
        Ok(synthesize(unit, encoding, self.time, end).unwrap_or_else(|| {
            // dead units and non-producers can only wait
            Action::noop(
                unit_id,
                unit.position.unwrap_or(Position::new(0, 0)),
                self.time,
                end,
            )
        }))
    }

    /// Reward for `player` at this point of the match.
    #[must_use]
    pub fn rewards_for(&self, player: PlayerId) -> f64 {
        self.config.rewards.for_player(player, self.result)
    }

    /// Save the whole match, in-flight actions included.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] if encoding fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::Serialization(format!("Failed to save match: {e}")))
    }

    /// Restore a match saved with [`Game::serialize`].
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Serialization`] if the bytes do not decode,
    /// [`GameError::InvalidConfig`] for a bad configuration, or
    /// [`GameError::InvalidMap`] if the initial snapshot is invalid or the
    /// decoded grid disagrees with its units.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let game: Self = bincode::deserialize(data)
            .map_err(|e| GameError::Serialization(format!("Failed to load match: {e}")))?;
        game.config.validate()?;
        game.snapshot.validate()?;
        game.state
            .check_occupancy()
            .map_err(|e| GameError::InvalidMap(e.to_string()))?;
        Ok(game)
    }

    /// Calculate a hash of the current simulation state.
    ///
    /// Two matches fed identical inputs produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.time.hash(&mut hasher);
        self.result.hash(&mut hasher);
        self.state.hash(&mut hasher);
        self.scheduler.hash(&mut hasher);
        hasher.finish()
    }
}
