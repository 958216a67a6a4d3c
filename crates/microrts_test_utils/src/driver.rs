//! Scripted match driver.
//!
//! Plays a [`Game`] from a flat script of encoding choices, the way an
//! agent would: every tick, each live idle unit picks an action from its
//! mask and the tick is resolved.

use microrts_core::action::ActionEncoding;
use microrts_core::error::Result;
use microrts_core::game::{Game, TickEvents};
use microrts_core::units::UnitId;

/// Live units that are free to act this tick, in id order.
#[must_use]
pub fn idle_units(game: &Game) -> Vec<UnitId> {
    game.state()
        .units()
        .alive()
        .filter(|u| u.player.is_some() && !u.busy)
        .map(|u| u.id)
        .collect()
}

/// Pick the allowed encoding selected by `choice` for `unit`.
///
/// The choice indexes into the allowed set (wrapping), so any `usize` maps
/// to a legal encoding.
pub fn choose(game: &Game, unit: UnitId, choice: usize) -> Result<ActionEncoding> {
    let mask = game.get_action_mask(unit)?;
    let allowed: Vec<ActionEncoding> = mask.allowed().collect();
    Ok(allowed
        .get(choice % allowed.len().max(1))
        .copied()
        .unwrap_or(ActionEncoding::Noop))
}

/// Submit one action per idle unit, drawing choices from `choices`, then
/// resolve the tick.
///
/// `cursor` tracks the position in `choices` across ticks; the script
/// wraps around when exhausted.
pub fn play_tick(game: &mut Game, choices: &[usize], cursor: &mut usize) -> Result<TickEvents> {
    for unit in idle_units(game) {
        let choice = if choices.is_empty() {
            0
        } else {
            choices[*cursor % choices.len()]
        };
        *cursor += 1;
        let encoding = choose(game, unit, choice)?;
        let action = game.action_for(unit, encoding)?;
        game.step(action)?;
    }
    game.update()
}

/// Play until the match ends or `max_ticks` ticks have been resolved.
///
/// Returns the events of every resolved tick.
pub fn play_scripted(game: &mut Game, choices: &[usize], max_ticks: u64) -> Result<Vec<TickEvents>> {
    let mut cursor = 0;
    let mut history = Vec::new();
    for _ in 0..max_ticks {
        if game.is_game_over() {
            break;
        }
        history.push(play_tick(game, choices, &mut cursor)?);
    }
    tracing::debug!(
        ticks = history.len(),
        result = ?game.result(),
        "Scripted match finished"
    );
    Ok(history)
}
