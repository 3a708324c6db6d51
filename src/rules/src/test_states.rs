// Copyright © arrakis 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Deterministic game-state factories for tests.

use data::catalog::{spice_cards, treachery_cards};
use data::core::primitives::{FactionId, GameId, Phase, Sector, STORM_START};
use data::game_states::decks::{Deck, Decks};
use data::game_states::faction_state::{FactionState, Factions};
use data::game_states::game_state::{GameConfiguration, GameState};
use data::game_states::phase_state::PhaseState;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;
use uuid::Uuid;

use crate::queries::turn_order;

/// A fixed seed used by every test factory.
pub const TEST_SEED: u64 = 0xD00D_5EED;

/// Creates a six-faction basic-rules game on turn 1 with starting garrisons
/// placed, unshuffled decks, and the storm at the start sector.
///
/// Decks are deliberately left in catalogue order so tests can predict
/// draws; shuffle them with the state RNG when randomness matters.
pub fn basic_game() -> GameState {
    game_with(GameConfiguration::default())
}

/// Like [basic_game] with advanced rules switched on.
pub fn advanced_game() -> GameState {
    game_with(GameConfiguration { advanced_rules: true, ..GameConfiguration::default() })
}

fn game_with(config: GameConfiguration) -> GameState {
    let ids: Vec<FactionId> = enum_iterator::all::<FactionId>().collect();
    let seats = turn_order::default_seats(ids.len());
    let states: Vec<FactionState> = ids
        .iter()
        .copied()
        .zip(seats)
        .map(|(faction, seat)| FactionState::new(faction, seat))
        .collect();

    let spice_deck = spice_cards::full_deck();
    let decks = Decks {
        spice_a: Deck::new(spice_deck.clone()),
        spice_b: if config.advanced_rules { Deck::new(spice_deck) } else { Deck::default() },
        treachery: Deck::new(treachery_cards::full_deck()),
        traitor: Deck::default(),
        storm: Deck::new(vec![1, 2, 3, 4, 5, 6]),
    };

    let mut game = GameState {
        id: GameId(Uuid::nil()),
        config,
        turn: 1,
        phase: Phase::Storm,
        setup_complete: true,
        factions: Factions::new(states),
        storm_order: vec![],
        storm_sector: STORM_START,
        shield_wall_destroyed: false,
        worm_count: 0,
        decks,
        spice_on_board: vec![],
        worms_on_board: vec![],
        pending_deals: vec![],
        deal_history: vec![],
        winner: None,
        action_log: vec![],
        phase_state: PhaseState::Idle,
        ornithopter_overrides: vec![],
        rng: Xoshiro256StarStar::seed_from_u64(TEST_SEED),
    };
    game.storm_order = turn_order::storm_order(&game);
    for faction in ids {
        for (territory, sector, count) in faction.def().starting_garrison {
            crate::mutations::forces::ship_from_reserves(
                &mut game,
                faction,
                *territory,
                Sector(*sector),
                *count,
                0,
            )
            .expect("starting garrison fits in reserves");
        }
    }
    game
}
