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

use agents::scripted::{AlwaysPass, ScriptedProvider};
use data::catalog::territories::TerritoryId;
use data::core::primitives::{FactionId, Sector};
use data::events::GameEvent;
use data::game_states::game_state::{GameConfiguration, GameState, VictoryKind};
use data::requests::{RequestKind, ResponseData};
use engine::new_game;
use engine::phase_manager::{PhaseManager, RunOptions};

const SEED: u64 = 156_562_599_311_216_480;

fn all_factions() -> Vec<FactionId> {
    enum_iterator::all::<FactionId>().collect()
}

fn run(provider: impl FnOnce() -> ScriptedProvider) -> (GameState, Vec<GameEvent>) {
    let state = new_game::create(
        &all_factions(),
        GameConfiguration { max_turns: 3, ..GameConfiguration::default() },
        SEED,
    )
    .unwrap();
    let result = PhaseManager::new(Box::new(provider()))
        .run(state, RunOptions::default())
        .expect("game runs to termination");
    (result.state, result.events)
}

fn script() -> ScriptedProvider {
    ScriptedProvider::new()
        .on_repeat(
            FactionId::Fremen,
            RequestKind::DistributeForces,
            ResponseData::DistributeForces {
                placements: vec![
                    (TerritoryId::SietchTabr, Sector(13), 6),
                    (TerritoryId::FalseWallSouth, Sector(4), 4),
                ],
            },
            1,
        )
        .on_repeat(
            FactionId::Harkonnen,
            RequestKind::BidOrPass,
            ResponseData::Bid { amount: 1 },
            2,
        )
        .on_repeat(
            FactionId::Atreides,
            RequestKind::DialStorm,
            ResponseData::DialStorm { dial: 2 },
            4,
        )
}

#[test]
fn game_is_deterministic() {
    let (state, events) = run(script);
    for _ in 0..10 {
        let (next_state, next_events) = run(script);
        assert_eq!(state, next_state);
        assert_eq!(events, next_events);
    }
}

#[test]
fn all_pass_game_reaches_the_turn_limit() {
    let state = new_game::create(
        &all_factions(),
        GameConfiguration { max_turns: 2, ..GameConfiguration::default() },
        SEED,
    )
    .unwrap();
    let result = PhaseManager::new(Box::new(AlwaysPass))
        .run(state, RunOptions::default())
        .expect("game runs to termination");

    let winner = result.winner.expect("the turn limit resolves a winner");
    // The Spacing Guild takes an unresolved game.
    assert_eq!(winner.kind, VictoryKind::GuildDefault);
    assert_eq!(winner.factions, vec![FactionId::SpacingGuild]);
    assert!(result.events.iter().any(|e| matches!(e, GameEvent::GameEnded { .. })));
    assert!(result.state.winner.is_some());
}

#[test]
fn finished_games_ignore_further_phase_calls() {
    let state = new_game::create(&all_factions(), GameConfiguration::default(), SEED).unwrap();
    let mut manager = PhaseManager::new(Box::new(AlwaysPass));
    let result = manager
        .run(state, RunOptions::default())
        .unwrap();
    assert!(result.state.winner.is_some());

    let before = result.state.clone();
    let after = manager
        .run_phase(result.state, data::core::primitives::Phase::Storm)
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn advanced_rules_use_the_fremen_storm_deck() {
    let state = new_game::create(
        &all_factions(),
        GameConfiguration { advanced_rules: true, max_turns: 2, ..GameConfiguration::default() },
        SEED,
    )
    .unwrap();
    let result = PhaseManager::new(Box::new(AlwaysPass))
        .run(state, RunOptions::default())
        .expect("game runs to termination");

    // From turn 2 nobody dials; the face-down card moves the storm.
    let turn_two_dials = result
        .events
        .iter()
        .skip_while(|e| !matches!(e, GameEvent::TurnStarted { turn: 2 }))
        .filter(|e| matches!(e, GameEvent::StormDialRevealed { .. }))
        .count();
    assert_eq!(turn_two_dials, 0);
    assert!(result
        .state
        .faction(FactionId::Fremen)
        .flags
        .fremen_storm_card
        .is_some());
}
