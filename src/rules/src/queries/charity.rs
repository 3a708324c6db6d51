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

use data::core::primitives::{FactionId, SpiceAmount};
use data::game_states::game_state::GameState;

/// CHOAM charity due to a faction this turn, zero when ineligible.
///
/// Factions holding 0 or 1 spice are topped up to 2. Under advanced rules
/// Bene Gesserit always collects the full 2 regardless of treasury.
pub fn charity_due(game: &GameState, faction: FactionId) -> SpiceAmount {
    let state = game.faction(faction);
    if game.config.advanced_rules && faction == FactionId::BeneGesserit {
        return 2;
    }
    2u32.saturating_sub(state.spice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn poor_factions_top_up_to_two() {
        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::Emperor).spice = 1;
        assert_eq!(charity_due(&game, FactionId::Emperor), 1);
        game.faction_mut(FactionId::Emperor).spice = 0;
        assert_eq!(charity_due(&game, FactionId::Emperor), 2);
        game.faction_mut(FactionId::Emperor).spice = 5;
        assert_eq!(charity_due(&game, FactionId::Emperor), 0);
    }

    #[test]
    fn bene_gesserit_always_collect_under_advanced_rules() {
        let mut game = test_states::basic_game();
        game.config.advanced_rules = true;
        game.faction_mut(FactionId::BeneGesserit).spice = 9;
        assert_eq!(charity_due(&game, FactionId::BeneGesserit), 2);
    }
}
