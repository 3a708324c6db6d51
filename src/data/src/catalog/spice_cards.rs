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

use serde::{Deserialize, Serialize};

use crate::catalog::territories::TerritoryId;
use crate::core::primitives::{Sector, SpiceAmount};

/// Index into the spice card catalogue.
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct SpiceCardId(pub u8);

/// What a revealed spice card does.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum SpiceCardKind {
    /// Place `amount` spice at the printed territory and sector.
    Territory { territory: TerritoryId, sector: Sector, amount: SpiceAmount },
    /// Shai-Hulud: the worm devours at the last spice blow location.
    ShaiHulud,
}

/// Static definition of one spice card.
#[derive(Debug, Clone, Copy)]
pub struct SpiceCardDef {
    pub id: SpiceCardId,
    pub name: &'static str,
    pub kind: SpiceCardKind,
}

impl SpiceCardId {
    pub fn def(self) -> &'static SpiceCardDef {
        spice_card(self)
    }

    pub fn is_shai_hulud(self) -> bool {
        self.def().kind == SpiceCardKind::ShaiHulud
    }
}

const fn territory_card(
    id: u8,
    name: &'static str,
    territory: TerritoryId,
    sector: u8,
    amount: SpiceAmount,
) -> SpiceCardDef {
    SpiceCardDef {
        id: SpiceCardId(id),
        name,
        kind: SpiceCardKind::Territory { territory, sector: Sector(sector), amount },
    }
}

const fn shai_hulud(id: u8, name: &'static str) -> SpiceCardDef {
    SpiceCardDef { id: SpiceCardId(id), name, kind: SpiceCardKind::ShaiHulud }
}

const CARDS: &[SpiceCardDef] = &[
    territory_card(0, "cielago_north", TerritoryId::CielagoNorth, 1, 8),
    territory_card(1, "cielago_south", TerritoryId::CielagoSouth, 1, 12),
    territory_card(2, "broken_land", TerritoryId::BrokenLand, 11, 8),
    territory_card(3, "hagga_basin", TerritoryId::HaggaBasin, 12, 6),
    territory_card(4, "old_gap", TerritoryId::OldGap, 9, 6),
    territory_card(5, "red_chasm", TerritoryId::RedChasm, 6, 8),
    territory_card(6, "the_minor_erg", TerritoryId::TheMinorErg, 7, 8),
    territory_card(7, "sihaya_ridge", TerritoryId::SihayaRidge, 8, 6),
    territory_card(8, "south_mesa", TerritoryId::SouthMesa, 7, 10),
    territory_card(9, "funeral_plain", TerritoryId::FuneralPlain, 14, 6),
    territory_card(10, "the_great_flat", TerritoryId::TheGreatFlat, 14, 10),
    territory_card(11, "habbanya_erg", TerritoryId::HabbanyaErg, 15, 8),
    territory_card(12, "habbanya_ridge_flat", TerritoryId::HabbanyaRidgeFlat, 17, 10),
    territory_card(13, "rock_outcroppings", TerritoryId::RockOutcroppings, 13, 6),
    territory_card(14, "wind_pass_north", TerritoryId::WindPassNorth, 16, 6),
    shai_hulud(15, "shai_hulud_1"),
    shai_hulud(16, "shai_hulud_2"),
    shai_hulud(17, "shai_hulud_3"),
    shai_hulud(18, "shai_hulud_4"),
    shai_hulud(19, "shai_hulud_5"),
    shai_hulud(20, "shai_hulud_6"),
];

/// Looks up the static definition of a spice card.
pub fn spice_card(id: SpiceCardId) -> &'static SpiceCardDef {
    &CARDS[id.0 as usize]
}

/// The full spice deck in catalogue order, prior to shuffling.
pub fn full_deck() -> Vec<SpiceCardId> {
    CARDS.iter().map(|c| c.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_positions() {
        for (index, card) in CARDS.iter().enumerate() {
            assert_eq!(card.id.0 as usize, index);
        }
    }

    #[test]
    fn blow_sectors_lie_within_their_territory() {
        for card in CARDS {
            if let SpiceCardKind::Territory { territory, sector, .. } = card.kind {
                assert!(territory.contains_sector(sector), "{}", card.name);
            }
        }
    }

    #[test]
    fn six_worms() {
        assert_eq!(CARDS.iter().filter(|c| c.id.is_shai_hulud()).count(), 6);
    }
}
