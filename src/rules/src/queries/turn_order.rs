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

use data::core::primitives::{FactionId, Sector, NUM_SECTORS};
use data::game_states::game_state::GameState;
use itertools::Itertools;
use utils::outcome::Value;
use utils::verify;

/// Computes the faction ordering for the current storm position.
///
/// The first faction is the one whose seat the storm will reach next moving
/// counterclockwise; a faction seated exactly on the storm sector was just
/// passed and goes last.
pub fn storm_order(game: &GameState) -> Vec<FactionId> {
    game.factions
        .iter()
        .map(|f| (order_key(game.storm_sector, f.seat), f.faction))
        .sorted()
        .map(|(_, faction)| faction)
        .collect()
}

fn order_key(storm: Sector, seat: Sector) -> u8 {
    (storm.distance_ccw(seat) + NUM_SECTORS - 1) % NUM_SECTORS
}

/// Selects the factions that dial for storm movement: the nearest seat on
/// each side of the storm position.
///
/// A faction seated exactly on the storm dials together with the next
/// faction in storm order. If the two picks collapse to one faction, the two
/// nearest distinct factions dial instead.
pub fn storm_dialers(game: &GameState) -> Value<Vec<FactionId>> {
    verify!(game.factions.len() >= 2, "Storm dialing requires at least two factions");
    let storm = game.storm_sector;

    if let Some(on_storm) =
        game.factions.iter().find(|f| f.seat == storm).map(|f| f.faction)
    {
        let order = storm_order(game);
        let next = order.iter().copied().find(|f| *f != on_storm).expect("two factions exist");
        return Ok(vec![on_storm, next]);
    }

    let ccw = game
        .factions
        .iter()
        .min_by_key(|f| storm.distance_ccw(f.seat))
        .map(|f| f.faction)
        .expect("at least two factions");
    let cw = game
        .factions
        .iter()
        .filter(|f| f.faction != ccw)
        .min_by_key(|f| storm.distance_cw(f.seat))
        .map(|f| f.faction)
        .expect("at least two factions");
    Ok(vec![ccw, cw])
}

/// Evenly spaced seat positions for `count` factions, in seating order.
pub fn default_seats(count: usize) -> Vec<Sector> {
    (0..count)
        .map(|i| Sector(((i * NUM_SECTORS as usize) / count) as u8))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn faction_on_storm_sector_goes_last() {
        let mut game = test_states::basic_game();
        // Seats in the test game are 0, 3, 6, 9, 12, 15 in seating order.
        game.storm_sector = Sector(0);
        let order = storm_order(&game);
        assert_eq!(order.last(), Some(&FactionId::Atreides));
        assert_eq!(order.first(), Some(&FactionId::Harkonnen));
    }

    #[test]
    fn dialers_straddle_the_storm() {
        let mut game = test_states::basic_game();
        game.storm_sector = Sector(1);
        let dialers = storm_dialers(&game).unwrap();
        assert_eq!(dialers, vec![FactionId::Harkonnen, FactionId::Atreides]);
    }

    #[test]
    fn on_storm_seat_dials_with_next_in_order() {
        let mut game = test_states::basic_game();
        game.storm_sector = Sector(3);
        let dialers = storm_dialers(&game).unwrap();
        assert_eq!(dialers[0], FactionId::Harkonnen);
        assert_eq!(dialers[1], FactionId::Emperor);
    }
}
