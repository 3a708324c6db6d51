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
use data::core::primitives::{FactionId, Sector};
use data::game_states::faction_state::ForceStack;
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::verify;

/// Places forces from a faction's reserves onto the board.
pub fn ship_from_reserves(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
    regular: u32,
    elite: u32,
) -> Outcome {
    verify!(regular + elite > 0, "Shipment must move at least one force");
    let state = game.faction_mut(faction);
    verify!(
        state.reserves.regular >= regular && state.reserves.elite >= elite,
        "{faction} reserves cannot cover {regular} regular + {elite} elite"
    );
    state.reserves.regular -= regular;
    state.reserves.elite -= elite;
    add_to_stack(game, faction, territory, sector, regular, elite, 0);
    OK
}

/// Places Bene Gesserit advisors from reserves into a sector.
pub fn send_advisors(
    game: &mut GameState,
    territory: TerritoryId,
    sector: Sector,
    count: u32,
) -> Outcome {
    verify!(count > 0, "Must send at least one advisor");
    let state = game.faction_mut(FactionId::BeneGesserit);
    verify!(
        state.reserves.regular >= count,
        "Bene Gesserit reserves cannot cover {count} advisors"
    );
    state.reserves.regular -= count;
    add_to_stack(game, FactionId::BeneGesserit, territory, sector, 0, 0, count);
    OK
}

/// Moves forces between two board positions.
pub fn move_forces(
    game: &mut GameState,
    faction: FactionId,
    from: (TerritoryId, Sector),
    to: (TerritoryId, Sector),
    regular: u32,
    elite: u32,
    advisors: u32,
) -> Outcome {
    verify!(regular + elite + advisors > 0, "Move must include at least one force");
    let state = game.faction_mut(faction);
    let Some(stack) = state.stack_at_mut(from.0, from.1) else {
        utils::fail!("{faction} has no forces at {:?} {}", from.0, from.1);
    };
    verify!(
        stack.regular >= regular && stack.elite >= elite && stack.advisors >= advisors,
        "{faction} stack at {:?} {} cannot cover the requested move",
        from.0,
        from.1
    );
    stack.regular -= regular;
    stack.elite -= elite;
    stack.advisors -= advisors;
    remove_if_empty(state, from.0, from.1);
    add_to_stack(game, faction, to.0, to.1, regular, elite, advisors);
    OK
}

/// Sends an entire stack to the Tleilaxu Tanks, returning the number of
/// forces killed. Advisors die like fighters.
pub fn send_stack_to_tanks(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
) -> u32 {
    let state = game.faction_mut(faction);
    let Some(index) = state
        .on_board
        .iter()
        .position(|s| s.territory == territory && s.sector == sector)
    else {
        return 0;
    };
    let stack = state.on_board.remove(index);
    state.tanks.regular += stack.regular + stack.advisors;
    state.tanks.elite += stack.elite;
    stack.total()
}

/// Kills part of a stack, regulars first, returning the number killed.
pub fn kill_forces(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
    count: u32,
) -> u32 {
    let state = game.faction_mut(faction);
    let Some(stack) = state.stack_at_mut(territory, sector) else {
        return 0;
    };
    let mut remaining = count.min(stack.total());
    let killed = remaining;

    let from_advisors = remaining.min(stack.advisors);
    stack.advisors -= from_advisors;
    remaining -= from_advisors;
    let from_regular = remaining.min(stack.regular);
    stack.regular -= from_regular;
    remaining -= from_regular;
    let from_elite = remaining.min(stack.elite);
    stack.elite -= from_elite;

    state.tanks.regular += from_advisors + from_regular;
    state.tanks.elite += from_elite;
    remove_if_empty(state, territory, sector);
    killed
}

/// Returns forces from the tanks to reserves.
pub fn revive(game: &mut GameState, faction: FactionId, regular: u32, elite: u32) -> Outcome {
    let state = game.faction_mut(faction);
    verify!(
        state.tanks.regular >= regular && state.tanks.elite >= elite,
        "{faction} tanks cannot cover reviving {regular} regular + {elite} elite"
    );
    state.tanks.regular -= regular;
    state.tanks.elite -= elite;
    state.reserves.regular += regular;
    state.reserves.elite += elite;
    OK
}

/// Returns an entire stack to reserves (Spacing Guild reverse shipment).
pub fn return_to_reserves(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
) -> Outcome {
    let state = game.faction_mut(faction);
    let Some(index) = state
        .on_board
        .iter()
        .position(|s| s.territory == territory && s.sector == sector)
    else {
        utils::fail!("{faction} has no forces at {:?} {}", territory, sector);
    };
    let stack = state.on_board.remove(index);
    state.reserves.regular += stack.regular + stack.advisors;
    state.reserves.elite += stack.elite;
    OK
}

/// Flips a Bene Gesserit stack between advisors and fighters.
pub fn flip_advisors(
    game: &mut GameState,
    territory: TerritoryId,
    sector: Sector,
    to_fighters: bool,
) -> u32 {
    let state = game.faction_mut(FactionId::BeneGesserit);
    let Some(stack) = state.stack_at_mut(territory, sector) else {
        return 0;
    };
    if to_fighters {
        let flipped = stack.advisors;
        stack.regular += flipped;
        stack.advisors = 0;
        flipped
    } else {
        let flipped = stack.regular;
        stack.advisors += flipped;
        stack.regular = 0;
        flipped
    }
}

fn add_to_stack(
    game: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
    regular: u32,
    elite: u32,
    advisors: u32,
) {
    let state = game.faction_mut(faction);
    match state.stack_at_mut(territory, sector) {
        Some(stack) => {
            stack.regular += regular;
            stack.elite += elite;
            stack.advisors += advisors;
        }
        None => state.on_board.push(ForceStack {
            territory,
            sector,
            regular,
            elite,
            advisors,
        }),
    }
}

fn remove_if_empty(
    state: &mut data::game_states::faction_state::FactionState,
    territory: TerritoryId,
    sector: Sector,
) {
    state
        .on_board
        .retain(|s| !(s.territory == territory && s.sector == sector && s.total() == 0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn shipping_conserves_forces() {
        let mut game = test_states::basic_game();
        let before = game.faction(FactionId::Emperor).total_forces();
        ship_from_reserves(&mut game, FactionId::Emperor, TerritoryId::Carthag, Sector(10), 3, 1)
            .unwrap();
        assert_eq!(game.faction(FactionId::Emperor).total_forces(), before);
        let stack =
            game.faction(FactionId::Emperor).stack_at(TerritoryId::Carthag, Sector(10)).unwrap();
        assert_eq!(stack.regular, 3);
        assert_eq!(stack.elite, 1);
    }

    #[test]
    fn killing_part_of_a_stack_sends_it_to_tanks() {
        let mut game = test_states::basic_game();
        let killed =
            kill_forces(&mut game, FactionId::Atreides, TerritoryId::Arrakeen, Sector(9), 4);
        assert_eq!(killed, 4);
        let state = game.faction(FactionId::Atreides);
        assert_eq!(state.tanks.regular, 4);
        assert_eq!(state.stack_at(TerritoryId::Arrakeen, Sector(9)).unwrap().regular, 6);
    }

    #[test]
    fn emptied_stacks_are_removed() {
        let mut game = test_states::basic_game();
        send_stack_to_tanks(&mut game, FactionId::Atreides, TerritoryId::Arrakeen, Sector(9));
        assert!(game.faction(FactionId::Atreides).stack_at(TerritoryId::Arrakeen, Sector(9)).is_none());
        assert_eq!(game.faction(FactionId::Atreides).tanks.regular, 10);
    }
}
