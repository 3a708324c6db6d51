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

use crate::core::primitives::FactionId;

/// Index into the leader catalogue.
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct LeaderId(pub u8);

/// Static definition of one leader disc.
#[derive(Debug, Clone, Copy)]
pub struct LeaderDef {
    pub id: LeaderId,
    pub name: &'static str,
    pub faction: FactionId,
    pub strength: u32,
}

impl LeaderId {
    pub fn def(self) -> &'static LeaderDef {
        leader(self)
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn strength(self) -> u32 {
        self.def().strength
    }

    pub fn faction(self) -> FactionId {
        self.def().faction
    }
}

const fn l(id: u8, name: &'static str, faction: FactionId, strength: u32) -> LeaderDef {
    LeaderDef { id: LeaderId(id), name, faction, strength }
}

const LEADERS: &[LeaderDef] = &[
    l(0, "thufir_hawat", FactionId::Atreides, 5),
    l(1, "lady_jessica", FactionId::Atreides, 5),
    l(2, "gurney_halleck", FactionId::Atreides, 4),
    l(3, "duncan_idaho", FactionId::Atreides, 2),
    l(4, "dr_wellington_yueh", FactionId::Atreides, 1),
    l(5, "feyd_rautha", FactionId::Harkonnen, 6),
    l(6, "beast_rabban", FactionId::Harkonnen, 4),
    l(7, "piter_de_vries", FactionId::Harkonnen, 3),
    l(8, "captain_iakin_nefud", FactionId::Harkonnen, 2),
    l(9, "umman_kudu", FactionId::Harkonnen, 1),
    l(10, "hasimir_fenring", FactionId::Emperor, 6),
    l(11, "captain_aramsham", FactionId::Emperor, 5),
    l(12, "caid", FactionId::Emperor, 3),
    l(13, "burseg", FactionId::Emperor, 3),
    l(14, "bashar", FactionId::Emperor, 2),
    l(15, "staban_tuek", FactionId::SpacingGuild, 5),
    l(16, "master_bewt", FactionId::SpacingGuild, 3),
    l(17, "esmar_tuek", FactionId::SpacingGuild, 3),
    l(18, "soo_soo_sook", FactionId::SpacingGuild, 2),
    l(19, "guild_rep", FactionId::SpacingGuild, 1),
    l(20, "stilgar", FactionId::Fremen, 7),
    l(21, "chani", FactionId::Fremen, 6),
    l(22, "otheym", FactionId::Fremen, 5),
    l(23, "shadout_mapes", FactionId::Fremen, 3),
    l(24, "jamis", FactionId::Fremen, 2),
    l(25, "alia", FactionId::BeneGesserit, 5),
    l(26, "margot_lady_fenring", FactionId::BeneGesserit, 5),
    l(27, "princess_irulan", FactionId::BeneGesserit, 5),
    l(28, "mother_ramallo", FactionId::BeneGesserit, 5),
    l(29, "wanna_marcus", FactionId::BeneGesserit, 5),
];

/// Looks up the static definition of a leader.
pub fn leader(id: LeaderId) -> &'static LeaderDef {
    &LEADERS[id.0 as usize]
}

/// The five leaders belonging to a faction, in catalogue order.
pub fn faction_leaders(faction: FactionId) -> impl Iterator<Item = LeaderId> {
    LEADERS.iter().filter(move |d| d.faction == faction).map(|d| d.id)
}

/// Every leader in the game, used to build the traitor deck.
pub fn all_leaders() -> impl Iterator<Item = LeaderId> {
    LEADERS.iter().map(|d| d.id)
}

#[cfg(test)]
mod tests {
    use enum_iterator::all;

    use super::*;

    #[test]
    fn five_leaders_per_faction() {
        for faction in all::<FactionId>() {
            assert_eq!(faction_leaders(faction).count(), 5, "{faction}");
        }
    }

    #[test]
    fn ids_match_positions() {
        for (index, def) in LEADERS.iter().enumerate() {
            assert_eq!(def.id.0 as usize, index);
        }
    }
}
