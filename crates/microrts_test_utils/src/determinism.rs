//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a match produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! The engine must be fully deterministic so that recorded matches replay
//! exactly and parallel environments agree. Sources of non-determinism
//! to watch for:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Resolution always walks units and targets in sorted order.
//!
//! - **System randomness**: damage is always `max_damage`, nothing rolls.
//!
//! - **Ordering of simultaneous actions**: the execution order of a batch
//!   is fixed by submission order.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual effects (move, attack, harvest, produce)
//! 2. **Property tests**: Random scripts must still produce reproducible outputs
//! 3. **Integration tests**: Full match scenarios are reproducible
//! 4. **Parallel tests**: Running N matches on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use microrts_core::game::Game;

use crate::driver::play_tick;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the match was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use microrts_core::config::GameConfig;
/// use microrts_core::game::Game;
/// use microrts_test_utils::determinism::verify_determinism;
/// use microrts_test_utils::fixtures::melee_4x4;
///
/// let result = verify_determinism(
///     3,
///     20,
///     || Game::new(GameConfig::default(), melee_4x4()).unwrap(),
///     |game| {
///         game.update().unwrap();
///     },
///     Game::state_hash,
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        tracing::warn!(runs, ticks, "Determinism check found diverging runs");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Play a scripted match to completion (or `max_ticks`) and return its
/// final state hash.
///
/// # Panics
///
/// Panics if the engine rejects a scripted action.
pub fn scripted_hash(mut game: Game, choices: &[usize], max_ticks: u64) -> u64 {
    let mut cursor = 0;
    for _ in 0..max_ticks {
        if game.is_game_over() {
            break;
        }
        play_tick(&mut game, choices, &mut cursor).expect("scripted tick failed");
    }
    game.state_hash()
}

/// Play the same script on `num_matches` threads and collect final hashes.
///
/// Uses scoped threads so the setup function need not be `'static`.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_matches<F>(
    setup_fn: F,
    choices: &[usize],
    num_matches: usize,
    max_ticks: u64,
) -> DeterminismResult
where
    F: Fn() -> Game + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_matches)
            .map(|_| s.spawn(|| scripted_hash(setup_fn(), choices, max_ticks)))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("match thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: max_ticks,
    }
}

/// Compare two scripted runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` if they diverge at
/// that tick.
///
/// # Panics
///
/// Panics if the engine rejects a scripted action.
pub fn find_first_divergence<F>(setup_fn: F, choices: &[usize], num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Game,
{
    let mut game1 = setup_fn();
    let mut game2 = setup_fn();
    let (mut cursor1, mut cursor2) = (0, 0);

    if game1.state_hash() != game2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        if game1.is_game_over() || game2.is_game_over() {
            break;
        }
        play_tick(&mut game1, choices, &mut cursor1).expect("scripted tick failed");
        play_tick(&mut game2, choices, &mut cursor2).expect("scripted tick failed");

        if game1.state_hash() != game2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Verify that a save/load round trip preserves the match exactly, and
/// that the restored match keeps evolving identically.
///
/// # Panics
///
/// Panics if the engine rejects a scripted action.
pub fn verify_serialization_determinism<F>(setup_fn: F, choices: &[usize], num_ticks: u64) -> bool
where
    F: Fn() -> Game,
{
    let mut game = setup_fn();
    let mut cursor = 0;
    for _ in 0..num_ticks {
        if game.is_game_over() {
            break;
        }
        play_tick(&mut game, choices, &mut cursor).expect("scripted tick failed");
    }

    let Ok(bytes) = game.serialize() else {
        return false;
    };
    let Ok(mut restored) = Game::deserialize(&bytes) else {
        return false;
    };
    if restored.state_hash() != game.state_hash() {
        return false;
    }

    let mut restored_cursor = cursor;
    for _ in 0..num_ticks {
        if game.is_game_over() {
            break;
        }
        play_tick(&mut game, choices, &mut cursor).expect("scripted tick failed");
        play_tick(&mut restored, choices, &mut restored_cursor).expect("scripted tick failed");
    }
    restored.state_hash() == game.state_hash()
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the engine.
pub mod strategies {
    use microrts_core::action::ActionEncoding;
    use microrts_core::position::Direction;
    use microrts_core::unit_kind::UnitKind;
    use proptest::prelude::*;

    use crate::fixtures::MapBuilder;
    use microrts_core::snapshot::MapSnapshot;

    /// Generate any action encoding.
    pub fn arb_encoding() -> impl Strategy<Value = ActionEncoding> {
        (0..ActionEncoding::COUNT).prop_filter_map("encoding index", ActionEncoding::from_index)
    }

    /// Generate a cardinal direction.
    pub fn arb_direction() -> impl Strategy<Value = Direction> {
        prop::sample::select(Direction::ALL.to_vec())
    }

    /// Generate a script of choices for the match driver.
    pub fn arb_script(max_len: usize) -> impl Strategy<Value = Vec<usize>> {
        prop::collection::vec(0usize..ActionEncoding::COUNT, 1..max_len)
    }

    /// Generate a unit kind an agent controls.
    pub fn arb_owned_kind() -> impl Strategy<Value = UnitKind> {
        prop::sample::select(vec![
            UnitKind::Worker,
            UnitKind::Light,
            UnitKind::Heavy,
            UnitKind::Ranged,
            UnitKind::Base,
            UnitKind::Barracks,
        ])
    }

    /// Generate a small valid map: one army per side on opposite halves,
    /// plus a patch in the middle column.
    pub fn arb_map() -> impl Strategy<Value = MapSnapshot> {
        (
            prop::collection::vec(arb_owned_kind(), 1..4),
            prop::collection::vec(arb_owned_kind(), 1..4),
            0u32..6,
            1u32..5,
        )
            .prop_map(|(left, right, minerals, stock)| {
                let mut builder = MapBuilder::new(6, 4).minerals(0, minerals).minerals(1, minerals);
                for (i, kind) in left.into_iter().enumerate() {
                    builder = builder.unit(kind, 0, (i % 2) as i32, (i / 2) as i32);
                }
                for (i, kind) in right.into_iter().enumerate() {
                    builder = builder.unit(kind, 1, 5 - (i % 2) as i32, 3 - (i / 2) as i32);
                }
                builder.resource(2, 3, stock).build()
            })
    }
}
