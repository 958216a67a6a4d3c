//! Players and their mineral stockpiles.

use serde::{Deserialize, Serialize};

/// Player identifier. A match always has exactly players 0 and 1.
pub type PlayerId = u8;

/// Number of players in a match.
pub const NUM_PLAYERS: usize = 2;

/// The other player in a two-player match.
#[must_use]
pub const fn opponent(player: PlayerId) -> PlayerId {
    1 - player
}

/// A player's economy state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    /// Player id (0 or 1).
    pub id: PlayerId,
    /// Mineral stockpile.
    pub minerals: u32,
}

impl Player {
    /// Create a new player.
    #[must_use]
    pub const fn new(id: PlayerId, minerals: u32) -> Self {
        Self { id, minerals }
    }

    /// Check if the player can afford a cost.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.minerals >= cost
    }

    /// Spend minerals if available.
    ///
    /// Returns true if the transaction succeeded.
    pub fn spend(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.minerals -= cost;
            true
        } else {
            false
        }
    }

    /// Add returned minerals to the stockpile.
    pub fn deposit(&mut self, amount: u32) {
        self.minerals = self.minerals.saturating_add(amount);
    }
}
