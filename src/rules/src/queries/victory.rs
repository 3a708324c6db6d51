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

use data::catalog::factions::{VICTORY_STRONGHOLDS_ALLIED, VICTORY_STRONGHOLDS_SOLO};
use data::catalog::territories::{all_territories, TerritoryId};
use data::core::primitives::FactionId;
use data::game_states::game_state::{GameState, Victory, VictoryKind};
use itertools::Itertools;

/// Strongholds a faction controls: it has fighters there and no non-allied
/// faction does.
pub fn controlled_strongholds(game: &GameState, faction: FactionId) -> Vec<TerritoryId> {
    let ally = game.faction(faction).ally;
    all_territories()
        .filter(|t| {
            t.is_stronghold()
                || (game.config.variants.shield_wall_stronghold
                    && *t == TerritoryId::ShieldWall
                    && game.worm_count
                        >= data::catalog::factions::SHIELD_WALL_WORM_THRESHOLD)
        })
        .filter(|t| {
            let occupants = crate::queries::shipment::occupants(game, *t);
            occupants.contains(&faction)
                && occupants.iter().all(|f| *f == faction || Some(*f) == ally)
        })
        .collect()
}

/// Evaluates the stronghold-control victory predicate at the Mentat Pause.
///
/// Factions are checked in storm order; a lone faction wins on
/// [VICTORY_STRONGHOLDS_SOLO], an alliance wins jointly on
/// [VICTORY_STRONGHOLDS_ALLIED] distinct strongholds. A Bene Gesserit
/// prediction of the winning faction and turn overrides the win.
pub fn check_victory(game: &GameState) -> Option<Victory> {
    for faction in game.storm_order.iter().copied() {
        let own = controlled_strongholds(game, faction);
        if own.len() >= VICTORY_STRONGHOLDS_SOLO {
            return Some(finalize(game, vec![faction]));
        }
        if let Some(ally) = game.faction(faction).ally {
            let combined: Vec<TerritoryId> = own
                .iter()
                .copied()
                .chain(controlled_strongholds(game, ally))
                .unique()
                .collect();
            if combined.len() >= VICTORY_STRONGHOLDS_ALLIED {
                return Some(finalize(game, vec![faction, ally]));
            }
        }
    }
    None
}

/// Resolves the game at turn-limit exhaustion: Fremen win if they guard the
/// desert (Sietch Tabr and Habbanya Sietch held, Tuek's Sietch free of
/// non-Fremen occupants), otherwise the Spacing Guild wins if in play,
/// otherwise the richest faction takes it.
pub fn turn_limit_victory(game: &GameState) -> Victory {
    if game.has_faction(FactionId::Fremen) && fremen_default_holds(game) {
        return Victory {
            factions: vec![FactionId::Fremen],
            turn: game.turn,
            kind: VictoryKind::FremenDefault,
        };
    }
    if game.has_faction(FactionId::SpacingGuild) {
        return Victory {
            factions: vec![FactionId::SpacingGuild],
            turn: game.turn,
            kind: VictoryKind::GuildDefault,
        };
    }
    let richest = game
        .factions
        .iter()
        .max_by_key(|f| f.spice)
        .map(|f| f.faction)
        .expect("games have factions");
    Victory { factions: vec![richest], turn: game.turn, kind: VictoryKind::SpiceDefault }
}

fn fremen_default_holds(game: &GameState) -> bool {
    let fremen = controlled_strongholds(game, FactionId::Fremen);
    let tueks_occupants = crate::queries::shipment::occupants(game, TerritoryId::TueksSietch);
    fremen.contains(&TerritoryId::SietchTabr)
        && fremen.contains(&TerritoryId::HabbanyaSietch)
        && tueks_occupants.iter().all(|f| *f == FactionId::Fremen)
}

fn finalize(game: &GameState, factions: Vec<FactionId>) -> Victory {
    // A correct Bene Gesserit prediction steals the victory.
    if game.has_faction(FactionId::BeneGesserit)
        && !factions.contains(&FactionId::BeneGesserit)
    {
        if let Some((predicted, turn)) = game.faction(FactionId::BeneGesserit).prediction {
            if factions.contains(&predicted) && turn == game.turn {
                return Victory {
                    factions: vec![FactionId::BeneGesserit],
                    turn: game.turn,
                    kind: VictoryKind::Prediction,
                };
            }
        }
    }
    Victory { factions, turn: game.turn, kind: VictoryKind::StrongholdControl }
}

#[cfg(test)]
mod tests {
    use data::core::primitives::Sector;

    use super::*;
    use crate::mutations::forces;
    use crate::test_states;

    #[test]
    fn three_strongholds_win_solo() {
        let mut game = test_states::basic_game();
        for (territory, sector) in
            [(TerritoryId::SietchTabr, 13), (TerritoryId::HabbanyaSietch, 16)]
        {
            forces::ship_from_reserves(
                &mut game,
                FactionId::Atreides,
                territory,
                Sector(sector),
                2,
                0,
            )
            .unwrap();
        }
        let victory = check_victory(&game).expect("Atreides should win");
        assert_eq!(victory.factions, vec![FactionId::Atreides]);
        assert_eq!(victory.kind, VictoryKind::StrongholdControl);
    }

    #[test]
    fn prediction_steals_the_win() {
        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::BeneGesserit).prediction =
            Some((FactionId::Atreides, game.turn));
        for (territory, sector) in
            [(TerritoryId::SietchTabr, 13), (TerritoryId::HabbanyaSietch, 16)]
        {
            forces::ship_from_reserves(
                &mut game,
                FactionId::Atreides,
                territory,
                Sector(sector),
                2,
                0,
            )
            .unwrap();
        }
        let victory = check_victory(&game).expect("someone wins");
        assert_eq!(victory.factions, vec![FactionId::BeneGesserit]);
        assert_eq!(victory.kind, VictoryKind::Prediction);
    }

    #[test]
    fn no_winner_without_enough_strongholds() {
        let game = test_states::basic_game();
        assert!(check_victory(&game).is_none());
    }
}
