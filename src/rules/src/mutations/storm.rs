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

use data::catalog::territories::{all_territories, TerritoryId};
use data::core::primitives::{FactionId, Sector, SpiceAmount, NUM_SECTORS};
use data::game_states::game_state::GameState;

use crate::mutations::{forces, spice};
use crate::queries::turn_order;

/// The sectors a storm move touches: where it starts, every sector it passes
/// through, and where it ends.
pub fn affected_sectors(from: Sector, movement: u8) -> Vec<Sector> {
    let steps = movement.min(NUM_SECTORS - 1);
    (0..=steps).map(|step| from.advance(step)).collect()
}

/// Summary of the damage one storm movement inflicted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StormDamage {
    pub kills: Vec<(FactionId, TerritoryId, Sector, u32)>,
    pub spice_destroyed: Vec<(TerritoryId, Sector, SpiceAmount)>,
}

/// Moves the storm and applies its damage: forces in swept sectors of
/// unprotected territories go to the tanks (Fremen lose only half, rounded
/// up) and spice in swept sectors is destroyed. Recomputes the storm order.
pub fn move_storm(game: &mut GameState, movement: u8) -> StormDamage {
    let affected = affected_sectors(game.storm_sector, movement);
    game.storm_sector = game.storm_sector.advance(movement);

    let mut damage = StormDamage::default();
    for territory in all_territories() {
        if storm_protected(game, territory) {
            continue;
        }
        for sector in territory.sectors().filter(|s| affected.contains(s)).collect::<Vec<_>>() {
            kill_stacks_in_sector(game, territory, sector, &mut damage);
            let destroyed = spice::destroy_at(game, territory, sector);
            if destroyed > 0 {
                damage.spice_destroyed.push((territory, sector, destroyed));
            }
        }
    }

    game.storm_order = turn_order::storm_order(game);
    damage
}

/// Whether the storm currently passes over this territory without effect.
pub fn storm_protected(game: &GameState, territory: TerritoryId) -> bool {
    let def = territory.def();
    if !def.protected_from_storm {
        return false;
    }
    !(game.shield_wall_destroyed && territory.protected_by_shield_wall())
}

fn kill_stacks_in_sector(
    game: &mut GameState,
    territory: TerritoryId,
    sector: Sector,
    damage: &mut StormDamage,
) {
    let factions: Vec<FactionId> = game.factions.ids().collect();
    for faction in factions {
        let Some(stack) = game.faction(faction).stack_at(territory, sector) else {
            continue;
        };
        let total = stack.total();
        let to_kill = if faction == FactionId::Fremen { (total + 1) / 2 } else { total };
        if to_kill == 0 {
            continue;
        }
        let killed = forces::kill_forces(game, faction, territory, sector, to_kill);
        damage.kills.push((faction, territory, sector, killed));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_states;

    #[test]
    fn full_wrap_affects_every_sector() {
        let affected = affected_sectors(Sector(0), 18);
        assert_eq!(affected.len(), 18);
    }

    #[test]
    fn movement_is_modular() {
        let mut a = test_states::basic_game();
        let mut b = a.clone();
        move_storm(&mut a, 4);
        move_storm(&mut b, 4 + NUM_SECTORS);
        assert_eq!(a.storm_sector, b.storm_sector);
    }

    #[test]
    fn storm_wrap_scenario() {
        let mut game = test_states::basic_game();
        game.storm_sector = Sector(17);
        let affected = affected_sectors(game.storm_sector, 3);
        assert_eq!(affected, vec![Sector(17), Sector(0), Sector(1), Sector(2)]);
        move_storm(&mut game, 3);
        assert_eq!(game.storm_sector, Sector(2));
    }

    #[test]
    fn fremen_lose_half_rounded_up() {
        let mut game = test_states::basic_game();
        crate::mutations::forces::ship_from_reserves(
            &mut game,
            FactionId::Fremen,
            TerritoryId::TheGreatFlat,
            Sector(14),
            5,
            0,
        )
        .unwrap();
        game.storm_sector = Sector(13);
        let damage = move_storm(&mut game, 1);
        assert!(damage
            .kills
            .contains(&(FactionId::Fremen, TerritoryId::TheGreatFlat, Sector(14), 3)));
        let stack =
            game.faction(FactionId::Fremen).stack_at(TerritoryId::TheGreatFlat, Sector(14));
        assert_eq!(stack.unwrap().regular, 2);
    }
}
