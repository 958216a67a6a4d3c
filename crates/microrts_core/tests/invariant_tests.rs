//! Property tests over randomly scripted matches.
//!
//! Every tick of every generated match must keep the grid consistent,
//! conserve resources and only ever offer legal actions in a mask.

use microrts_core::action::EncodedKind;
use microrts_core::prelude::*;

use microrts_test_utils::determinism::strategies::{
    arb_direction, arb_encoding, arb_map, arb_script,
};
use microrts_test_utils::determinism::{compute_hash, find_first_divergence, scripted_hash};
use microrts_test_utils::driver::{choose, idle_units, play_tick};
use microrts_test_utils::fixtures::bases_workers_8x8;
use microrts_test_utils::proptest::prelude::*;

const MAX_TICKS: u64 = 300;

/// Minerals in the bank, plus resources carried or still in patches, plus
/// the cost of everything produced so far.
fn resource_total(game: &Game, produced_cost: u32) -> u32 {
    let banked: u32 = game.players().iter().map(|p| p.minerals).sum();
    let held: u32 = game.state().units().iter().map(|u| u.resources).sum();
    banked + held + produced_cost
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn occupancy_and_conservation_hold(map in arb_map(), script in arb_script(64)) {
        let mut game = Game::new(GameConfig::default().with_max_steps(MAX_TICKS), map).unwrap();
        let mut cursor = 0;
        let mut produced_cost = 0;
        let total = resource_total(&game, 0);

        while !game.is_game_over() {
            let events = play_tick(&mut game, &script, &mut cursor).unwrap();
            for id in &events.spawned {
                produced_cost += game.unit(*id).unwrap().kind.stats().cost;
            }

            prop_assert!(game.state().check_occupancy().is_ok());
            prop_assert_eq!(resource_total(&game, produced_cost), total);
            for unit in game.state().units().iter() {
                if unit.kind == UnitKind::Resource && !unit.is_alive() {
                    prop_assert_eq!(unit.resources, 0);
                }
            }
        }
        prop_assert!(game.time() <= MAX_TICKS);
    }

    #[test]
    fn mask_only_offers_legal_actions(map in arb_map(), script in arb_script(64)) {
        let mut game = Game::new(GameConfig::default().with_max_steps(120), map).unwrap();
        let mut cursor = 0;

        while !game.is_game_over() {
            for unit in game.state().units().iter() {
                let mask = game.get_action_mask(unit.id).unwrap();
                if !unit.is_alive() || unit.busy {
                    prop_assert_eq!(mask, ActionMask::noop_only());
                    continue;
                }
                for encoding in mask.allowed() {
                    let action = game.action_for(unit.id, encoding).unwrap();
                    prop_assert!(is_legal(game.state(), &game.in_flight(), &action));
                }
            }

            // Submit one unit at a time so queued actions shape later masks.
            for unit in idle_units(&game) {
                let choice = script[cursor % script.len()];
                cursor += 1;
                let encoding = choose(&game, unit, choice).unwrap();
                let action = game.action_for(unit, encoding).unwrap();
                game.step(action).unwrap();
                prop_assert_eq!(game.get_action_mask(unit).unwrap(), ActionMask::noop_only());
            }
            game.update().unwrap();
        }
    }

    #[test]
    fn scripted_matches_are_reproducible(map in arb_map(), script in arb_script(32)) {
        let setup = || Game::new(GameConfig::default().with_max_steps(MAX_TICKS), map.clone()).unwrap();
        prop_assert_eq!(
            scripted_hash(setup(), &script, MAX_TICKS),
            scripted_hash(setup(), &script, MAX_TICKS)
        );
        prop_assert_eq!(find_first_divergence(setup, &script, 100), None);

        let observe = || {
            let mut game = setup();
            let mut cursor = 0;
            while !game.is_game_over() && game.time() < 60 {
                play_tick(&mut game, &script, &mut cursor).unwrap();
            }
            compute_hash(&game.get_state(Some(0)).unwrap())
        };
        prop_assert_eq!(observe(), observe());
    }

    #[test]
    fn encoded_actions_start_now_next_to_the_unit(
        encoding in arb_encoding(),
        direction in arb_direction(),
    ) {
        let game = Game::new(GameConfig::default(), bases_workers_8x8()).unwrap();
        let origin = game.unit(1).unwrap().position.unwrap();

        let action = game.action_for(1, encoding).unwrap();
        prop_assert_eq!(action.unit_id, 1);
        prop_assert_eq!(action.start_time, 0);
        match encoding {
            ActionEncoding::Noop => {
                prop_assert!(action.is_noop());
                prop_assert_eq!(action.end_time, 0);
            }
            ActionEncoding::Directed(_, toward) => {
                prop_assert_eq!(action.target, origin.step(toward));
            }
        }

        let step = game
            .action_for(1, ActionEncoding::Directed(EncodedKind::Move, direction))
            .unwrap();
        prop_assert_eq!(origin.manhattan(step.target), 1);
        prop_assert_eq!(step.end_time, UnitKind::Worker.stats().move_time);
    }
}

#[test]
fn matches_end_by_cap_or_elimination() {
    let mut game = Game::new(
        GameConfig::default().with_max_steps(50),
        microrts_test_utils::fixtures::skirmish_6x6(),
    )
    .unwrap();
    let mut cursor = 0;
    let script = [1, 2, 3, 5, 8, 13];

    while !game.is_game_over() {
        play_tick(&mut game, &script, &mut cursor).unwrap();
    }
    match game.result() {
        Some(MatchResult::Draw) => assert_eq!(game.time(), 50),
        Some(MatchResult::Winner(p)) => {
            assert_eq!(game.state().units().alive_count(1 - p), 0);
        }
        None => unreachable!("loop exits only once the match is over"),
    }
}
