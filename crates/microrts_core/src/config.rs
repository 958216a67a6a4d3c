//! Match configuration.
//!
//! A [`GameConfig`] is built once and handed to the engine at construction.
//! It can be written as a RON document; missing fields take the defaults.
//!
//! ```ron
//! GameConfig(
//!     map_id: "8x8_basesWorkers",
//!     max_steps: 3000,
//!     rewards: Rewards(win: 1.0, draw: 0.0, lose: -1.0, step: 0.0),
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::PlayerId;

/// Default map identifier.
pub const DEFAULT_MAP_ID: &str = "4x4_melee_light2";

/// Default step cap per match.
pub const DEFAULT_MAX_STEPS: u64 = 1500;

/// Default unit-type-table version tag.
pub const DEFAULT_UTT_VERSION: u32 = 2;

/// How a finished match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    /// The given player won.
    Winner(PlayerId),
    /// The step cap was reached without a winner.
    Draw,
}

impl MatchResult {
    /// Winning player, if any.
    #[must_use]
    pub const fn winner(self) -> Option<PlayerId> {
        match self {
            Self::Winner(player) => Some(player),
            Self::Draw => None,
        }
    }
}

/// Reward scalars echoed to the environment adapter.
///
/// The engine's mechanics never read these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rewards {
    /// Reward for winning.
    pub win: f64,
    /// Reward for a draw.
    pub draw: f64,
    /// Reward for losing.
    pub lose: f64,
    /// Reward for every tick of an unfinished match.
    pub step: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            win: 1.0,
            draw: 0.5,
            lose: 0.0,
            step: 0.0,
        }
    }
}

impl Rewards {
    /// Reward for `player` given the match result so far.
    #[must_use]
    pub fn for_player(&self, player: PlayerId, result: Option<MatchResult>) -> f64 {
        match result {
            None => self.step,
            Some(MatchResult::Draw) => self.draw,
            Some(MatchResult::Winner(winner)) if winner == player => self.win,
            Some(MatchResult::Winner(_)) => self.lose,
        }
    }
}

/// Immutable configuration of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Identifier of the map the loader should provide.
    pub map_id: String,
    /// Step cap; reaching it without a winner is a draw.
    pub max_steps: u64,
    /// Reward scalars.
    pub rewards: Rewards,
    /// Unit-type-table version. Reserved: every version currently uses the
    /// same stats.
    pub utt_version: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_id: DEFAULT_MAP_ID.to_string(),
            max_steps: DEFAULT_MAX_STEPS,
            rewards: Rewards::default(),
            utt_version: DEFAULT_UTT_VERSION,
        }
    }
}

impl GameConfig {
    /// Config with a different step cap.
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Parse a RON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if parsing or validation fails.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(source).map_err(|e| GameError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] for a zero step cap or an empty map id.
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            return Err(GameError::InvalidConfig(
                "max_steps must be at least 1".into(),
            ));
        }
        if self.map_id.is_empty() {
            return Err(GameError::InvalidConfig("map_id must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.map_id, "4x4_melee_light2");
        assert_eq!(config.max_steps, 1500);
        assert_eq!(config.utt_version, 2);
        assert!(approx(config.rewards.draw, 0.5));
    }

    #[test]
    fn test_parse_partial_ron() {
        let config = GameConfig::from_ron_str(
            "GameConfig(max_steps: 20, rewards: Rewards(lose: -1.0))",
        )
        .unwrap();
        assert_eq!(config.max_steps, 20);
        assert_eq!(config.map_id, DEFAULT_MAP_ID);
        assert!(approx(config.rewards.lose, -1.0));
        assert!(approx(config.rewards.win, 1.0));
    }

    #[test]
    fn test_rejects_zero_step_cap() {
        let result = GameConfig::from_ron_str("GameConfig(max_steps: 0)");
        assert!(matches!(result, Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_malformed_ron() {
        assert!(GameConfig::from_ron_str("GameConfig(max_steps: \"ten\")").is_err());
    }

    #[test]
    fn test_rewards_for_player() {
        let rewards = Rewards::default();
        assert!(approx(rewards.for_player(0, None), 0.0));
        assert!(approx(rewards.for_player(0, Some(MatchResult::Winner(0))), 1.0));
        assert!(approx(rewards.for_player(1, Some(MatchResult::Winner(0))), 0.0));
        assert!(approx(rewards.for_player(1, Some(MatchResult::Draw)), 0.5));
    }
}
