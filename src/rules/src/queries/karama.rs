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

use data::catalog::treachery_cards::{TreacheryCardId, TreacheryKind};
use data::core::primitives::FactionId;
use data::game_states::game_state::GameState;

/// Whether a faction may play the given card as Karama.
///
/// Any Karama card qualifies; Bene Gesserit may additionally play any
/// worthless card in Karama's place.
pub fn can_use_karama(game: &GameState, faction: FactionId, card: TreacheryCardId) -> bool {
    if !game.faction(faction).hand.contains(&card) {
        return false;
    }
    match card.kind() {
        TreacheryKind::Karama => true,
        TreacheryKind::Worthless => faction == FactionId::BeneGesserit,
        _ => false,
    }
}

/// The first Karama-capable card in a faction's hand, if any.
pub fn karama_card(game: &GameState, faction: FactionId) -> Option<TreacheryCardId> {
    game.faction(faction)
        .hand
        .iter()
        .copied()
        .find(|c| can_use_karama(game, faction, *c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn worthless_is_karama_only_for_bene_gesserit() {
        let mut game = test_states::basic_game();
        // Card 20 is the baliset, a worthless card.
        let baliset = TreacheryCardId(20);
        game.faction_mut(FactionId::BeneGesserit).hand.push(baliset);
        assert!(can_use_karama(&game, FactionId::BeneGesserit, baliset));

        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::Atreides).hand.push(baliset);
        assert!(!can_use_karama(&game, FactionId::Atreides, baliset));
    }

    #[test]
    fn cards_not_in_hand_never_qualify() {
        let game = test_states::basic_game();
        assert!(!can_use_karama(&game, FactionId::BeneGesserit, TreacheryCardId(20)));
    }
}
