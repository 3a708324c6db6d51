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

use data::catalog::territories::{TerritoryId, TerritoryKind};
use data::core::primitives::{FactionId, Sector, SpiceAmount};
use data::game_states::game_state::GameState;

use crate::validation::ValidationResult;

/// Base shipping cost per force into one sector of a territory.
pub fn sector_cost(territory: TerritoryId) -> SpiceAmount {
    if territory.is_stronghold() {
        1
    } else {
        2
    }
}

/// Full cost for a faction to ship `count` forces into a destination.
///
/// The base cost doubles into a stronghold held by a non-allied faction;
/// Guild shipments are half price, rounded up; Fremen ship free into sand.
pub fn shipment_cost(
    game: &GameState,
    faction: FactionId,
    territory: TerritoryId,
    count: u32,
) -> SpiceAmount {
    if faction == FactionId::Fremen && fremen_free_destination(territory) {
        return 0;
    }
    let mut cost = count * sector_cost(territory);
    if territory.is_stronghold() && held_by_enemy(game, faction, territory) {
        cost *= 2;
    }
    if faction == FactionId::SpacingGuild {
        cost = (cost + 1) / 2;
    }
    cost
}

/// Who receives a shipping payment: the Guild when it is in play and is not
/// the shipper, otherwise the bank.
pub fn payment_recipient(game: &GameState, shipper: FactionId) -> Option<FactionId> {
    if shipper != FactionId::SpacingGuild && game.has_faction(FactionId::SpacingGuild) {
        Some(FactionId::SpacingGuild)
    } else {
        None
    }
}

/// Whether a stronghold already holds stacks from two factions other than
/// the arriving one. Advisor-only Bene Gesserit stacks do not count.
pub fn stronghold_full(game: &GameState, arriving: FactionId, territory: TerritoryId) -> bool {
    occupants(game, territory)
        .iter()
        .filter(|f| **f != arriving)
        .count()
        >= 2
}

/// Factions with fighters anywhere in a territory.
pub fn occupants(game: &GameState, territory: TerritoryId) -> Vec<FactionId> {
    game.factions
        .iter()
        .filter(|f| f.fighters_in(territory) > 0)
        .map(|f| f.faction)
        .collect()
}

fn held_by_enemy(game: &GameState, faction: FactionId, territory: TerritoryId) -> bool {
    let ally = game.faction(faction).ally;
    occupants(game, territory)
        .iter()
        .any(|f| *f != faction && Some(*f) != ally)
}

fn fremen_free_destination(territory: TerritoryId) -> bool {
    matches!(territory.kind(), TerritoryKind::Sand | TerritoryKind::Rock)
        && !territory.is_stronghold()
}

/// Validates a shipment from reserves.
pub fn validate_shipment(
    game: &GameState,
    faction: FactionId,
    territory: TerritoryId,
    sector: Sector,
    regular: u32,
    elite: u32,
) -> ValidationResult {
    let count = regular + elite;
    if count == 0 {
        return ValidationResult::error("empty_shipment", "Must ship at least one force");
    }
    let state = game.faction(faction);
    if state.reserves.regular < regular || state.reserves.elite < elite {
        return ValidationResult::error(
            "insufficient_reserves",
            format!("Reserves hold {} regular, {} elite", state.reserves.regular, state.reserves.elite),
        );
    }
    if !territory.contains_sector(sector) {
        return ValidationResult::error(
            "invalid_sector",
            format!("{} does not span {}", territory.name(), sector),
        );
    }
    if game.sector_stormed(territory, sector) {
        return ValidationResult::error(
            "destination_in_storm",
            format!("{} of {} is in storm", sector, territory.name()),
        );
    }
    if territory.is_stronghold() && stronghold_full(game, faction, territory) {
        return ValidationResult::error(
            "stronghold_full",
            format!("{} already holds two factions", territory.name()),
        );
    }
    if faction == FactionId::Fremen && !fremen_free_destination(territory) {
        return ValidationResult::error(
            "fremen_destination",
            "Fremen reinforcements arrive only in open desert",
        );
    }
    let cost = shipment_cost(game, faction, territory, count);
    if state.spice < cost {
        return ValidationResult::error_with_suggestion(
            "insufficient_spice",
            format!("Shipment costs {cost}, treasury holds {}", state.spice),
            format!("At most {} forces are affordable", affordable(game, faction, territory)),
        );
    }
    ValidationResult::ok()
}

fn affordable(game: &GameState, faction: FactionId, territory: TerritoryId) -> u32 {
    let per_force = shipment_cost(game, faction, territory, 1).max(1);
    game.faction(faction).spice / per_force
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn stronghold_costs_one_per_force() {
        let game = test_states::basic_game();
        assert_eq!(shipment_cost(&game, FactionId::Emperor, TerritoryId::HabbanyaSietch, 4), 4);
        assert_eq!(shipment_cost(&game, FactionId::Emperor, TerritoryId::FuneralPlain, 4), 8);
    }

    #[test]
    fn enemy_held_stronghold_doubles() {
        let game = test_states::basic_game();
        // Arrakeen holds Atreides forces in the test game.
        assert_eq!(shipment_cost(&game, FactionId::Emperor, TerritoryId::Arrakeen, 4), 8);
    }

    #[test]
    fn guild_ships_half_price_rounded_up() {
        let game = test_states::basic_game();
        assert_eq!(shipment_cost(&game, FactionId::SpacingGuild, TerritoryId::FuneralPlain, 3), 3);
    }

    #[test]
    fn fremen_ship_free_to_sand() {
        let game = test_states::basic_game();
        assert_eq!(shipment_cost(&game, FactionId::Fremen, TerritoryId::TheGreatFlat, 10), 0);
        let result = validate_shipment(
            &game,
            FactionId::Fremen,
            TerritoryId::HabbanyaSietch,
            Sector(16),
            2,
            0,
        );
        assert!(!result.valid);
    }

    #[test]
    fn shipping_into_storm_is_rejected() {
        let mut game = test_states::basic_game();
        game.storm_sector = Sector(6);
        let result =
            validate_shipment(&game, FactionId::Emperor, TerritoryId::RedChasm, Sector(6), 2, 0);
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, "destination_in_storm");
    }
}
