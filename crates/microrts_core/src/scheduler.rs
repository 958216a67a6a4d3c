//! Look-ahead queue of in-flight actions.
//!
//! Bucket `i` holds the actions completing `i` ticks from now. The engine
//! pops bucket 0 exactly once per resolved tick, which keeps the relative
//! indexing aligned with the clock.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{GameError, Result};
use crate::units::UnitId;

/// Furthest an action may complete ahead of the current tick.
///
/// The slowest action in the unit table (Base production) takes 200 ticks.
pub const MAX_LOOKAHEAD: u64 = 4096;

/// Bounded-ahead buckets of scheduled actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scheduler {
    buckets: VecDeque<Vec<Action>>,
}

impl Scheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an action into the bucket of its completion tick.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ScheduledInPast`] if the action ends before `now`,
    /// or [`GameError::InvalidDuration`] if it ends more than
    /// [`MAX_LOOKAHEAD`] ticks after it.
    pub fn schedule(&mut self, action: Action, now: u64) -> Result<()> {
        let offset = action
            .end_time
            .checked_sub(now)
            .ok_or(GameError::ScheduledInPast {
                end_time: action.end_time,
                now,
            })?;
        let too_far = GameError::InvalidDuration {
            start_time: action.start_time,
            end_time: action.end_time,
        };
        if offset > MAX_LOOKAHEAD {
            return Err(too_far);
        }
        let index = usize::try_from(offset).map_err(|_| too_far.clone())?;
        let len = index.checked_add(1).ok_or(too_far)?;
        if self.buckets.len() < len {
            self.buckets.resize_with(len, Vec::new);
        }
        self.buckets[index].push(action);
        Ok(())
    }

    /// Remove and return the actions due this tick, in insertion order.
    pub fn pop_due(&mut self) -> Vec<Action> {
        self.buckets.pop_front().unwrap_or_default()
    }

    /// Drop every scheduled action of `unit`.
    pub fn purge_unit(&mut self, unit: UnitId) {
        let rebuilt: VecDeque<Vec<Action>> = self
            .buckets
            .iter()
            .map(|bucket| {
                bucket
                    .iter()
                    .filter(|a| a.unit_id != unit)
                    .copied()
                    .collect()
            })
            .collect();
        self.buckets = rebuilt;
    }

    /// Whether `unit` has any scheduled action.
    #[must_use]
    pub fn has_action_for(&self, unit: UnitId) -> bool {
        self.iter().any(|a| a.unit_id == unit)
    }

    /// Iterate over all scheduled actions, nearest bucket first.
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.buckets.iter().flatten()
    }

    /// Number of scheduled actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Check if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of buckets currently held (look-ahead horizon).
    #[must_use]
    pub fn horizon(&self) -> usize {
        self.buckets.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
