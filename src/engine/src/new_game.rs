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

use data::catalog::{spice_cards, treachery_cards};
use data::core::primitives::{FactionId, GameId, Phase, STORM_START};
use data::game_states::decks::{Deck, Decks};
use data::game_states::faction_state::{FactionState, Factions};
use data::game_states::game_state::{GameConfiguration, GameState};
use data::game_states::phase_state::PhaseState;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use uuid::Uuid;
use rules::queries::turn_order;
use tracing::info;
use utils::outcome::Value;
use utils::verify;

/// Creates a fresh game before setup: factions seated in the given order,
/// decks built and shuffled from the seed, storm at the start sector.
///
/// The setup phase places garrisons, deals traitors and treachery cards,
/// and takes the opening decisions.
pub fn create(
    factions: &[FactionId],
    config: GameConfiguration,
    seed: u64,
) -> Value<GameState> {
    verify!(factions.len() >= 2, "A game needs at least two factions");
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);

    let seats = turn_order::default_seats(factions.len());
    let states: Vec<FactionState> = factions
        .iter()
        .copied()
        .zip(seats)
        .map(|(faction, seat)| FactionState::new(faction, seat))
        .collect();

    let mut decks = Decks {
        spice_a: Deck::new(spice_cards::full_deck()),
        spice_b: if config.advanced_rules {
            Deck::new(spice_cards::full_deck())
        } else {
            Deck::default()
        },
        treachery: Deck::new(treachery_cards::full_deck()),
        traitor: Deck::default(),
        storm: Deck::new(vec![1, 2, 3, 4, 5, 6]),
    };
    decks.spice_a.shuffle(&mut rng);
    decks.spice_b.shuffle(&mut rng);
    decks.treachery.shuffle(&mut rng);
    decks.storm.shuffle(&mut rng);

    // Derive the id from the seed so identical seeds give identical games.
    let id = GameId(Uuid::from_u64_pair(rng.gen(), rng.gen()));
    let mut game = GameState {
        id,
        config,
        turn: 0,
        phase: Phase::Setup,
        setup_complete: false,
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
        rng,
    };
    game.storm_order = turn_order::storm_order(&game);
    info!(game_id = %game.id, factions = factions.len(), "Created new game");
    Ok(game)
}
