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

use data::catalog::treachery_cards::TreacheryCardId;
use data::core::primitives::FactionId;
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::{fail, verify};

/// Draws the top treachery card into a faction's hand.
///
/// Reshuffles the discard pile into the deck when the draw pile is empty.
/// Returns the card drawn, or None if no cards remain anywhere.
pub fn draw_treachery(game: &mut GameState, faction: FactionId) -> Option<TreacheryCardId> {
    if game.decks.treachery.draw.is_empty() && !game.decks.treachery.discard.is_empty() {
        let discard = std::mem::take(&mut game.decks.treachery.discard);
        game.decks.treachery.draw = discard;
        game.decks.treachery.shuffle(&mut game.rng);
    }
    let card = game.decks.treachery.draw_top()?;
    game.faction_mut(faction).hand.push(card);
    Some(card)
}

/// Moves a card from a faction's hand to the treachery discard pile.
pub fn discard_treachery(
    game: &mut GameState,
    faction: FactionId,
    card: TreacheryCardId,
) -> Outcome {
    take_from_hand(game, faction, card)?;
    game.decks.treachery.discard(card);
    OK
}

/// Removes a card from a faction's hand and from the game entirely
/// (Family Atomics, traded Karama).
pub fn remove_from_game(
    game: &mut GameState,
    faction: FactionId,
    card: TreacheryCardId,
) -> Outcome {
    take_from_hand(game, faction, card)
}

/// Removes a card from a hand without discarding it; the caller decides where
/// it goes.
pub fn take_from_hand(
    game: &mut GameState,
    faction: FactionId,
    card: TreacheryCardId,
) -> Outcome {
    let hand = &mut game.faction_mut(faction).hand;
    let Some(index) = hand.iter().position(|c| *c == card) else {
        fail!("{faction} does not hold {}", card.name());
    };
    hand.remove(index);
    OK
}

/// Adds a card to a faction's hand, enforcing the hand-size bound.
pub fn add_to_hand(game: &mut GameState, faction: FactionId, card: TreacheryCardId) -> Outcome {
    let state = game.faction_mut(faction);
    verify!(
        state.hand.len() < faction.max_hand_size(),
        "{faction} hand is full ({} cards)",
        state.hand.len()
    );
    state.hand.push(card);
    OK
}
