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

use data::catalog::territories::all_territories;
use data::core::primitives::NUM_SECTORS;
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::verify;

use crate::queries::shipment;

/// Checks every engine invariant over a state.
///
/// The phase manager runs this after every handler step; a failure is an
/// engine bug and halts the game.
pub fn check(game: &GameState) -> Outcome {
    verify!(
        game.storm_sector.0 < NUM_SECTORS,
        "Storm sector {} out of range",
        game.storm_sector.0
    );

    for state in game.factions.iter() {
        let faction = state.faction;
        verify!(
            state.total_forces() == faction.total_forces(),
            "Force conservation broken for {faction}: {} != {}",
            state.total_forces(),
            faction.total_forces()
        );
        for stack in &state.on_board {
            verify!(
                stack.total() > 0,
                "{faction} has an empty stack at {:?} {}",
                stack.territory,
                stack.sector
            );
        }
        verify!(
            state.hand.len() <= faction.max_hand_size(),
            "{faction} hand exceeds its limit of {}",
            faction.max_hand_size()
        );
        if let Some(ally) = state.ally {
            verify!(ally != faction, "{faction} is allied with itself");
            verify!(
                game.faction(ally).ally == Some(faction),
                "Alliance between {faction} and {ally} is not symmetric"
            );
        }
    }

    for territory in all_territories().filter(|t| t.is_stronghold()) {
        let occupants = shipment::occupants(game, territory);
        verify!(
            occupants.len() <= 2,
            "Stronghold {:?} holds {} factions",
            territory,
            occupants.len()
        );
    }
    OK
}

#[cfg(test)]
mod tests {
    use data::core::primitives::{FactionId, Sector};

    use super::*;
    use crate::test_states;

    #[test]
    fn fresh_game_satisfies_every_invariant() {
        let game = test_states::basic_game();
        check(&game).unwrap();
    }

    #[test]
    fn force_drift_is_detected() {
        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::Atreides).tanks.regular += 1;
        assert!(check(&game).is_err());
    }

    #[test]
    fn asymmetric_alliance_is_detected() {
        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::Atreides).ally = Some(FactionId::Fremen);
        assert!(check(&game).is_err());
    }

    #[test]
    fn storm_sector_out_of_range_is_detected() {
        let mut game = test_states::basic_game();
        game.storm_sector = Sector(18);
        assert!(check(&game).is_err());
    }
}
