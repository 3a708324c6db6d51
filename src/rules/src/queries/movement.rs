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

use std::collections::{HashSet, VecDeque};

use data::catalog::territories::TerritoryId;
use data::core::primitives::{FactionId, Sector};
use data::game_states::game_state::GameState;

use crate::mutations::storm;
use crate::queries::shipment;
use crate::validation::ValidationResult;

/// Movement range in territories for one faction this turn.
///
/// Range is 1 by default, 3 for Fremen, and 3 with ornithopter access. The
/// access flag is locked into the faction's turn flags at the start of its
/// shipment-and-movement turn.
pub fn movement_range(game: &GameState, faction: FactionId) -> u32 {
    if faction == FactionId::Fremen || game.faction(faction).flags.ornithopters {
        3
    } else {
        1
    }
}

/// Whether a faction has forces in Arrakeen or Carthag, granting ornithopter
/// access for the turn.
pub fn has_ornithopter_access(game: &GameState, faction: FactionId) -> bool {
    if let Some((_, access)) = game
        .ornithopter_overrides
        .iter()
        .find(|(f, _)| *f == faction)
    {
        return *access;
    }
    let state = game.faction(faction);
    state.fighters_in(TerritoryId::Arrakeen) > 0 || state.fighters_in(TerritoryId::Carthag) > 0
}

/// Territories reachable from `from` within `range` moves.
///
/// Breadth-first search over territory adjacency. A territory cannot be
/// entered or crossed while the storm sits in one of its sectors (storm
/// protection honoured), and a stronghold already holding two other factions
/// cannot be entered at all.
pub fn reachable(
    game: &GameState,
    faction: FactionId,
    from: TerritoryId,
    range: u32,
) -> Vec<TerritoryId> {
    let mut seen: HashSet<TerritoryId> = HashSet::new();
    let mut result = vec![];
    let mut queue: VecDeque<(TerritoryId, u32)> = VecDeque::new();
    seen.insert(from);
    queue.push_back((from, 0));

    while let Some((territory, distance)) = queue.pop_front() {
        if distance >= range {
            continue;
        }
        for &next in territory.def().adjacent {
            if seen.contains(&next) || blocked(game, faction, next) {
                continue;
            }
            seen.insert(next);
            result.push(next);
            queue.push_back((next, distance + 1));
        }
    }
    result
}

fn blocked(game: &GameState, faction: FactionId, territory: TerritoryId) -> bool {
    if territory_stormed(game, territory) {
        return true;
    }
    territory.is_stronghold() && shipment::stronghold_full(game, faction, territory)
}

fn territory_stormed(game: &GameState, territory: TerritoryId) -> bool {
    !storm::storm_protected(game, territory) && territory.contains_sector(game.storm_sector)
}

/// Validates a proposed force move.
pub fn validate_move(
    game: &GameState,
    faction: FactionId,
    from: (TerritoryId, Sector),
    to: (TerritoryId, Sector),
    regular: u32,
    elite: u32,
    advisors: u32,
) -> ValidationResult {
    if regular + elite + advisors == 0 {
        return ValidationResult::error("empty_move", "A move must include at least one force");
    }
    let state = game.faction(faction);
    let Some(stack) = state.stack_at(from.0, from.1) else {
        return ValidationResult::error(
            "no_forces_at_origin",
            format!("No forces at {} {}", from.0.name(), from.1),
        );
    };
    if stack.regular < regular || stack.elite < elite || stack.advisors < advisors {
        return ValidationResult::error(
            "insufficient_forces",
            format!("Stack at {} {} is smaller than the requested move", from.0.name(), from.1),
        );
    }
    if !to.0.contains_sector(to.1) {
        return ValidationResult::error(
            "invalid_sector",
            format!("{} does not span {}", to.0.name(), to.1),
        );
    }
    if game.sector_stormed(to.0, to.1) {
        return ValidationResult::error(
            "destination_in_storm",
            format!("{} of {} is in storm", to.1, to.0.name()),
        );
    }

    let range = movement_range(game, faction);
    if from.0 == to.0 {
        // Shifting between sectors of one territory is not a move between
        // territories and is always in range.
        return ValidationResult::ok();
    }
    if !reachable(game, faction, from.0, range).contains(&to.0) {
        return ValidationResult::error_with_suggestion(
            "unreachable",
            format!("{} is not reachable from {} this turn", to.0.name(), from.0.name()),
            format!("Range this turn is {range}"),
        );
    }
    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn base_range_is_one_territory() {
        let game = test_states::basic_game();
        let reachable = reachable(&game, FactionId::Atreides, TerritoryId::Arrakeen, 1);
        assert!(reachable.contains(&TerritoryId::ImperialBasin));
        assert!(!reachable.contains(&TerritoryId::Carthag));
    }

    #[test]
    fn ornithopters_extend_range() {
        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::Atreides).flags.ornithopters = true;
        let reachable =
            reachable(&game, FactionId::Atreides, TerritoryId::Arrakeen, movement_range(&game, FactionId::Atreides));
        assert!(reachable.contains(&TerritoryId::Carthag));
    }

    #[test]
    fn storm_blocks_traversal() {
        let mut game = test_states::basic_game();
        game.storm_sector = Sector(9);
        // Imperial Basin is protected; Old Gap (8..10) is not.
        let reachable = reachable(&game, FactionId::Harkonnen, TerritoryId::Carthag, 2);
        assert!(!reachable.contains(&TerritoryId::OldGap));
        assert!(reachable.contains(&TerritoryId::ImperialBasin));
    }

    #[test]
    fn full_strongholds_cannot_be_entered() {
        let mut game = test_states::basic_game();
        crate::mutations::forces::ship_from_reserves(
            &mut game,
            FactionId::Emperor,
            TerritoryId::Arrakeen,
            Sector(9),
            2,
            0,
        )
        .unwrap();
        crate::mutations::forces::ship_from_reserves(
            &mut game,
            FactionId::Harkonnen,
            TerritoryId::ImperialBasin,
            Sector(9),
            2,
            0,
        )
        .unwrap();
        let reachable = reachable(&game, FactionId::Harkonnen, TerritoryId::ImperialBasin, 1);
        assert!(!reachable.contains(&TerritoryId::Arrakeen));
    }
}
