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

use std::sync::{Arc, Mutex};

use agents::scripted::ScriptedProvider;
use data::catalog::leaders::LeaderId;
use data::catalog::spice_cards::SpiceCardId;
use data::catalog::territories::TerritoryId;
use data::core::primitives::{FactionId, Phase, Sector};
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::BattleLeader;
use data::requests::{BattlePlanSpec, RequestKind, ResponseData};
use engine::phase_manager::PhaseManager;
use rules::mutations::forces;
use rules::queries::turn_order;
use rules::test_states;

fn run_phase_collecting(
    provider: ScriptedProvider,
    state: GameState,
    phase: Phase,
) -> (GameState, Vec<GameEvent>) {
    let events = Arc::new(Mutex::new(vec![]));
    let sink = events.clone();
    let mut manager = PhaseManager::new(Box::new(provider))
        .with_listener(move |event| sink.lock().unwrap().push(event.clone()));
    let state = manager.run_phase(state, phase).expect("phase runs to completion");
    let events = events.lock().unwrap().clone();
    (state, events)
}

#[test]
fn storm_wraps_around_the_board() {
    let mut game = test_states::basic_game();
    game.storm_sector = Sector(17);
    game.storm_order = turn_order::storm_order(&game);

    let provider = ScriptedProvider::new()
        .on(FactionId::Atreides, RequestKind::DialStorm, ResponseData::DialStorm { dial: 2 })
        .on(FactionId::BeneGesserit, RequestKind::DialStorm, ResponseData::DialStorm { dial: 1 });
    let (game, events) = run_phase_collecting(provider, game, Phase::Storm);

    assert_eq!(game.storm_sector, Sector(2));
    assert!(events.contains(&GameEvent::StormMoved { from: Sector(17), to: Sector(2), sectors: 3 }));
}

#[test]
fn turn_one_shai_hulud_is_set_aside_and_reshuffled() {
    let mut game = test_states::basic_game();
    // Stack the deck: the worm comes up first, then the Cielago North blow.
    let worm = SpiceCardId(15);
    let cielago_north = SpiceCardId(0);
    game.decks.spice_a.draw = vec![cielago_north, worm];

    let (game, events) = run_phase_collecting(ScriptedProvider::new(), game, Phase::SpiceBlow);

    let cache = game
        .spice_at(TerritoryId::CielagoNorth, Sector(1))
        .expect("the blow landed");
    assert_eq!(cache.amount, 8);
    assert_eq!(game.worm_count, 0);
    assert!(game.decks.spice_a.draw.contains(&worm), "the worm went back into the deck");
    assert!(events.contains(&GameEvent::ShaiHuludAppeared { devour_territory: None }));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::NexusStarted)));
}

#[test]
fn emperor_grant_funds_ally_revivals() {
    let mut game = test_states::basic_game();
    rules::mutations::alliances::form(&mut game, FactionId::Emperor, FactionId::Harkonnen)
        .unwrap();
    game.faction_mut(FactionId::Emperor).spice = 20;
    {
        let harkonnen = game.faction_mut(FactionId::Harkonnen);
        harkonnen.reserves.regular -= 10;
        harkonnen.tanks.regular += 10;
        // Harkonnen's own allowance is already spent this turn.
        harkonnen.flags.force_revivals_used = 3;
    }

    let provider = ScriptedProvider::new()
        .on(
            FactionId::Emperor,
            RequestKind::GrantFremenRevivalBoost,
            ResponseData::GrantRevivalBoost { count: 3 },
        )
        .on(
            FactionId::Harkonnen,
            RequestKind::ReviveForces,
            ResponseData::ReviveForces { regular: 2, elite: 0 },
        );
    let (game, events) = run_phase_collecting(provider, game, Phase::Revival);

    assert_eq!(game.faction(FactionId::Emperor).spice, 16);
    assert_eq!(game.faction(FactionId::Harkonnen).reserves.regular, 2);
    assert_eq!(game.faction(FactionId::Harkonnen).tanks.regular, 8);
    let flags = &game.faction(FactionId::Harkonnen).flags;
    assert_eq!(flags.emperor_ally_revivals_used, 2);
    assert_eq!(flags.emperor_ally_revivals_granted - flags.emperor_ally_revivals_used, 1);
    assert!(events.contains(&GameEvent::ForcesRevived {
        faction: FactionId::Harkonnen,
        regular: 2,
        elite: 0,
        paid: 4,
    }));
}

#[test]
fn full_hands_are_skipped_in_the_auction() {
    let mut game = test_states::basic_game();
    // Everyone but Atreides is stuffed to the hand limit.
    let mut filler = game.decks.treachery.draw.clone().into_iter();
    let ids: Vec<FactionId> = game.factions.ids().collect();
    for faction in ids {
        if faction == FactionId::Atreides {
            continue;
        }
        while !game.faction(faction).hand_is_full() {
            let card = filler.next().expect("enough cards to fill hands");
            game.decks.treachery.draw.retain(|c| *c != card);
            game.faction_mut(faction).hand.push(card);
        }
    }

    let provider = ScriptedProvider::new().on(
        FactionId::Atreides,
        RequestKind::BidOrPass,
        ResponseData::Bid { amount: 1 },
    );
    let (game, events) = run_phase_collecting(provider, game, Phase::Bidding);

    // One buyer, one card: Atreides wins it for 1, paid to the Emperor.
    assert_eq!(game.faction(FactionId::Atreides).hand.len(), 1);
    assert_eq!(game.faction(FactionId::Atreides).spice, 9);
    assert_eq!(game.faction(FactionId::Emperor).spice, 11);
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::CardWon { faction: FactionId::Atreides, paid: 1, .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, GameEvent::BidPlaced { faction, .. } if *faction != FactionId::Atreides)));
}

#[test]
fn atreides_peeks_even_with_a_full_hand() {
    let mut game = test_states::basic_game();
    // Atreides cannot bid, but the auction continues for everyone else.
    let mut filler = game.decks.treachery.draw.clone().into_iter();
    while !game.faction(FactionId::Atreides).hand_is_full() {
        let card = filler.next().expect("enough cards to fill a hand");
        game.decks.treachery.draw.retain(|c| *c != card);
        game.faction_mut(FactionId::Atreides).hand.push(card);
    }

    let (_, events) = run_phase_collecting(ScriptedProvider::new(), game, Phase::Bidding);

    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::CardPeeked { faction: FactionId::Atreides, .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, GameEvent::BidPassed { faction: FactionId::Atreides })));
}

#[test]
fn unsold_cards_return_to_the_deck() {
    let game = test_states::basic_game();
    let deck_before = game.decks.treachery.draw.len();

    // Nobody bids on anything.
    let (game, events) = run_phase_collecting(ScriptedProvider::new(), game, Phase::Bidding);

    assert_eq!(game.decks.treachery.draw.len(), deck_before);
    assert!(events.iter().any(|e| matches!(e, GameEvent::CardReturnedToDeck { .. })));
    assert!(events.iter().any(|e| matches!(e, GameEvent::BiddingComplete { cards_sold: 0 })));

    // Atreides is shown each card exactly once.
    let mut peeked: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::CardPeeked { card_index, .. } => Some(*card_index),
            _ => None,
        })
        .collect();
    let total = peeked.len();
    peeked.dedup();
    assert_eq!(peeked.len(), total);
}

#[test]
fn traitor_reveal_keeps_the_winners_spice() {
    let mut game = test_states::basic_game();
    // Atreides must be the aggressor: put the storm just behind its seat.
    game.storm_sector = Sector(17);
    game.storm_order = turn_order::storm_order(&game);
    assert_eq!(game.storm_order.first(), Some(&FactionId::Atreides));

    let feyd = LeaderId(5);
    let thufir = LeaderId(0);
    game.faction_mut(FactionId::Atreides).traitors = vec![feyd];
    forces::ship_from_reserves(
        &mut game,
        FactionId::Harkonnen,
        TerritoryId::Arrakeen,
        Sector(9),
        3,
        0,
    )
    .unwrap();

    let provider = ScriptedProvider::new()
        .on(
            FactionId::Atreides,
            RequestKind::CreateBattlePlan,
            ResponseData::CreateBattlePlan {
                plan: BattlePlanSpec {
                    leader: BattleLeader::Leader(thufir),
                    forces_dialed: 2,
                    spice_dialed: 2,
                    weapon: None,
                    defense: None,
                    kwisatz_haderach: false,
                },
            },
        )
        .on(
            FactionId::Harkonnen,
            RequestKind::CreateBattlePlan,
            ResponseData::CreateBattlePlan {
                plan: BattlePlanSpec {
                    leader: BattleLeader::Leader(feyd),
                    forces_dialed: 3,
                    spice_dialed: 3,
                    weapon: None,
                    defense: None,
                    kwisatz_haderach: false,
                },
            },
        )
        .on(FactionId::Atreides, RequestKind::CallTraitor, ResponseData::CallTraitor);
    let (game, events) = run_phase_collecting(provider, game, Phase::Battle);

    // Rule 1.13.05: the traitor reveal lets Atreides keep its dialed spice.
    assert_eq!(game.faction(FactionId::Atreides).spice, 10);
    assert_eq!(game.faction(FactionId::Harkonnen).spice, 7);
    assert!(game
        .faction(FactionId::Harkonnen)
        .stack_at(TerritoryId::Arrakeen, Sector(9))
        .is_none());
    assert_eq!(game.faction(FactionId::Harkonnen).tanks.regular, 3);
    // Atreides lost nothing.
    assert_eq!(
        game.faction(FactionId::Atreides)
            .stack_at(TerritoryId::Arrakeen, Sector(9))
            .unwrap()
            .regular,
        10
    );
    assert!(events.contains(&GameEvent::TraitorRevealed {
        caller: FactionId::Atreides,
        leader: feyd,
    }));
    assert!(events.contains(&GameEvent::LeaderKilled {
        faction: FactionId::Harkonnen,
        leader: feyd,
    }));
}

#[test]
fn shai_hulud_occupation_doubles_collection() {
    let mut game = test_states::basic_game();
    rules::mutations::spice::place_on_board(&mut game, TerritoryId::RedChasm, Sector(6), 10);
    forces::ship_from_reserves(&mut game, FactionId::Emperor, TerritoryId::RedChasm, Sector(6), 3, 0)
        .unwrap();
    game.worms_on_board.push(TerritoryId::RedChasm);

    let provider = ScriptedProvider::new().on(
        FactionId::Emperor,
        RequestKind::CollectSpice,
        ResponseData::CollectSpice,
    );
    let (game, events) = run_phase_collecting(provider, game, Phase::SpiceCollection);

    // Three fighters harvest at the doubled worm rate.
    assert_eq!(game.faction(FactionId::Emperor).spice, 16);
    assert_eq!(game.spice_at(TerritoryId::RedChasm, Sector(6)).unwrap().amount, 4);
    assert!(events.contains(&GameEvent::SpiceCollected {
        faction: FactionId::Emperor,
        territory: TerritoryId::RedChasm,
        amount: 6,
    }));
}

#[test]
fn one_shipment_and_one_move_per_faction() {
    let mut game = test_states::basic_game();
    game.faction_mut(FactionId::Emperor).spice = 20;

    let provider = ScriptedProvider::new()
        .on(
            FactionId::Emperor,
            RequestKind::ShipForces,
            ResponseData::ShipForces {
                territory: TerritoryId::HabbanyaSietch,
                sector: Sector(16),
                regular: 4,
                elite: 0,
            },
        )
        .on(
            FactionId::Emperor,
            RequestKind::MoveForces,
            ResponseData::MoveForces {
                from: (TerritoryId::HabbanyaSietch, Sector(16)),
                to: (TerritoryId::HabbanyaErg, Sector(16)),
                regular: 2,
                elite: 0,
                advisors: 0,
            },
        )
        // A second move must be ignored; the MOVE state is never re-entered.
        .on(
            FactionId::Emperor,
            RequestKind::MoveForces,
            ResponseData::MoveForces {
                from: (TerritoryId::HabbanyaErg, Sector(16)),
                to: (TerritoryId::HabbanyaRidgeFlat, Sector(16)),
                regular: 2,
                elite: 0,
                advisors: 0,
            },
        );
    let (game, events) = run_phase_collecting(provider, game, Phase::ShipmentAndMovement);

    // Stronghold shipping costs one per force; the Guild is in play and
    // collects the fee.
    assert_eq!(game.faction(FactionId::Emperor).spice, 16);
    assert_eq!(game.faction(FactionId::SpacingGuild).spice, 9);
    assert_eq!(
        game.faction(FactionId::Emperor)
            .stack_at(TerritoryId::HabbanyaErg, Sector(16))
            .unwrap()
            .regular,
        2
    );
    let moves = events
        .iter()
        .filter(|e| matches!(e, GameEvent::ForcesMoved { faction: FactionId::Emperor, .. }))
        .count();
    assert_eq!(moves, 1);
}
