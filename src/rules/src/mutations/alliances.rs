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

use data::core::primitives::FactionId;
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::verify;

/// Forms an alliance between two factions. The relation is always written
/// symmetrically.
pub fn form(game: &mut GameState, a: FactionId, b: FactionId) -> Outcome {
    verify!(a != b, "{a} cannot ally with itself");
    verify!(game.faction(a).ally.is_none(), "{a} already has an ally");
    verify!(game.faction(b).ally.is_none(), "{b} already has an ally");
    game.faction_mut(a).ally = Some(b);
    game.faction_mut(b).ally = Some(a);
    OK
}

/// Dissolves a faction's alliance, clearing both sides. Returns the former
/// partner, if there was one.
pub fn dissolve(game: &mut GameState, faction: FactionId) -> Option<FactionId> {
    let partner = game.faction_mut(faction).ally.take()?;
    game.faction_mut(partner).ally = None;
    Some(partner)
}

/// Whether two factions are allied to each other.
pub fn allied(game: &GameState, a: FactionId, b: FactionId) -> bool {
    game.faction(a).ally == Some(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn alliances_are_symmetric() {
        let mut game = test_states::basic_game();
        form(&mut game, FactionId::Emperor, FactionId::Harkonnen).unwrap();
        assert!(allied(&game, FactionId::Emperor, FactionId::Harkonnen));
        assert!(allied(&game, FactionId::Harkonnen, FactionId::Emperor));

        assert!(form(&mut game, FactionId::Emperor, FactionId::Atreides).is_err());

        assert_eq!(dissolve(&mut game, FactionId::Harkonnen), Some(FactionId::Emperor));
        assert!(game.faction(FactionId::Emperor).ally.is_none());
        assert!(game.faction(FactionId::Harkonnen).ally.is_none());
    }
}
