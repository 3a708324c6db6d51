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

use data::catalog::territories::TerritoryId;
use data::core::primitives::{FactionId, Sector, SpiceAmount};
use data::game_states::game_state::{GameState, SpiceCache};
use utils::outcome::{Outcome, OK};
use utils::verify;

/// Debits a faction's treasury.
///
/// Spending beyond the treasury is an engine bug: decision sites validate
/// affordability before committing.
pub fn pay(game: &mut GameState, faction: FactionId, amount: SpiceAmount) -> Outcome {
    let state = game.faction_mut(faction);
    verify!(
        state.spice >= amount,
        "{faction} cannot pay {amount} spice, treasury holds {}",
        state.spice
    );
    state.spice -= amount;
    OK
}

/// Credits a faction's treasury.
pub fn gain(game: &mut GameState, faction: FactionId, amount: SpiceAmount) {
    game.faction_mut(faction).spice += amount;
}

/// Moves spice between two treasuries.
pub fn transfer(
    game: &mut GameState,
    from: FactionId,
    to: FactionId,
    amount: SpiceAmount,
) -> Outcome {
    pay(game, from, amount)?;
    gain(game, to, amount);
    OK
}

/// Adds spice to the board at the given territory and sector, merging with
/// any spice already there.
pub fn place_on_board(
    game: &mut GameState,
    territory: TerritoryId,
    sector: Sector,
    amount: SpiceAmount,
) {
    if amount == 0 {
        return;
    }
    match game
        .spice_on_board
        .iter_mut()
        .find(|c| c.territory == territory && c.sector == sector)
    {
        Some(cache) => cache.amount += amount,
        None => game.spice_on_board.push(SpiceCache { territory, sector, amount }),
    }
}

/// Removes up to `amount` spice from the board, returning how much was
/// actually taken.
pub fn take_from_board(
    game: &mut GameState,
    territory: TerritoryId,
    sector: Sector,
    amount: SpiceAmount,
) -> SpiceAmount {
    let Some(index) = game
        .spice_on_board
        .iter()
        .position(|c| c.territory == territory && c.sector == sector)
    else {
        return 0;
    };
    let cache = &mut game.spice_on_board[index];
    let taken = cache.amount.min(amount);
    cache.amount -= taken;
    if cache.amount == 0 {
        game.spice_on_board.remove(index);
    }
    taken
}

/// Destroys all spice at the given territory and sector, returning the
/// amount destroyed.
pub fn destroy_at(game: &mut GameState, territory: TerritoryId, sector: Sector) -> SpiceAmount {
    take_from_board(game, territory, sector, SpiceAmount::MAX)
}

/// Destroys all spice anywhere in a territory, returning the total destroyed.
pub fn destroy_in_territory(game: &mut GameState, territory: TerritoryId) -> SpiceAmount {
    let mut destroyed = 0;
    game.spice_on_board.retain(|cache| {
        if cache.territory == territory {
            destroyed += cache.amount;
            false
        } else {
            true
        }
    });
    destroyed
}

#[cfg(test)]
mod tests {
    use data::catalog::territories::TerritoryId;
    use data::core::primitives::Sector;

    use super::*;
    use crate::test_states;

    #[test]
    fn pay_then_refund_is_identity() {
        let mut game = test_states::basic_game();
        let before = game.faction(FactionId::Atreides).spice;
        pay(&mut game, FactionId::Atreides, 4).unwrap();
        gain(&mut game, FactionId::Atreides, 4);
        assert_eq!(game.faction(FactionId::Atreides).spice, before);
    }

    #[test]
    fn overspending_is_an_error() {
        let mut game = test_states::basic_game();
        let treasury = game.faction(FactionId::Atreides).spice;
        assert!(pay(&mut game, FactionId::Atreides, treasury + 1).is_err());
    }

    #[test]
    fn board_spice_merges_and_empties() {
        let mut game = test_states::basic_game();
        place_on_board(&mut game, TerritoryId::RedChasm, Sector(6), 5);
        place_on_board(&mut game, TerritoryId::RedChasm, Sector(6), 3);
        assert_eq!(game.spice_at(TerritoryId::RedChasm, Sector(6)).unwrap().amount, 8);
        assert_eq!(take_from_board(&mut game, TerritoryId::RedChasm, Sector(6), 10), 8);
        assert!(game.spice_at(TerritoryId::RedChasm, Sector(6)).is_none());
    }
}
