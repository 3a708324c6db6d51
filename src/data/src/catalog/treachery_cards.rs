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

/// Index into the treachery card catalogue.
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct TreacheryCardId(pub u8);

/// Functional classification of a treachery card.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum TreacheryKind {
    ProjectileWeapon,
    PoisonWeapon,
    Lasgun,
    /// Defends against projectile weapons.
    Shield,
    /// Defends against poison weapons.
    Snooper,
    /// Playable as a zero-strength leader in a battle plan.
    CheapHero,
    /// No effect; for Bene Gesserit, playable as Karama.
    Worthless,
    Karama,
    FamilyAtomics,
    WeatherControl,
    /// Take an extra force movement during the movement round.
    Hajr,
    /// Revive up to 5 forces or one leader for free.
    TleilaxuGhola,
    /// Ask one player a yes/no question which must be answered truthfully.
    Truthtrance,
}

impl TreacheryKind {
    pub fn is_weapon(self) -> bool {
        matches!(
            self,
            TreacheryKind::ProjectileWeapon | TreacheryKind::PoisonWeapon | TreacheryKind::Lasgun
        )
    }

    pub fn is_defense(self) -> bool {
        matches!(self, TreacheryKind::Shield | TreacheryKind::Snooper)
    }
}

/// Static definition of one treachery card.
#[derive(Debug, Clone, Copy)]
pub struct TreacheryCardDef {
    pub id: TreacheryCardId,
    pub name: &'static str,
    pub kind: TreacheryKind,
}

impl TreacheryCardId {
    pub fn def(self) -> &'static TreacheryCardDef {
        treachery_card(self)
    }

    pub fn name(self) -> &'static str {
        self.def().name
    }

    pub fn kind(self) -> TreacheryKind {
        self.def().kind
    }
}

const CARDS: &[TreacheryCardDef] = &[
    TreacheryCardDef { id: TreacheryCardId(0), name: "crysknife", kind: TreacheryKind::ProjectileWeapon },
    TreacheryCardDef { id: TreacheryCardId(1), name: "maula_pistol", kind: TreacheryKind::ProjectileWeapon },
    TreacheryCardDef { id: TreacheryCardId(2), name: "slip_tip", kind: TreacheryKind::ProjectileWeapon },
    TreacheryCardDef { id: TreacheryCardId(3), name: "stunner", kind: TreacheryKind::ProjectileWeapon },
    TreacheryCardDef { id: TreacheryCardId(4), name: "chaumas", kind: TreacheryKind::PoisonWeapon },
    TreacheryCardDef { id: TreacheryCardId(5), name: "chaumurky", kind: TreacheryKind::PoisonWeapon },
    TreacheryCardDef { id: TreacheryCardId(6), name: "ellaca_drug", kind: TreacheryKind::PoisonWeapon },
    TreacheryCardDef { id: TreacheryCardId(7), name: "gom_jabbar", kind: TreacheryKind::PoisonWeapon },
    TreacheryCardDef { id: TreacheryCardId(8), name: "lasgun", kind: TreacheryKind::Lasgun },
    TreacheryCardDef { id: TreacheryCardId(9), name: "shield_1", kind: TreacheryKind::Shield },
    TreacheryCardDef { id: TreacheryCardId(10), name: "shield_2", kind: TreacheryKind::Shield },
    TreacheryCardDef { id: TreacheryCardId(11), name: "shield_3", kind: TreacheryKind::Shield },
    TreacheryCardDef { id: TreacheryCardId(12), name: "shield_4", kind: TreacheryKind::Shield },
    TreacheryCardDef { id: TreacheryCardId(13), name: "snooper_1", kind: TreacheryKind::Snooper },
    TreacheryCardDef { id: TreacheryCardId(14), name: "snooper_2", kind: TreacheryKind::Snooper },
    TreacheryCardDef { id: TreacheryCardId(15), name: "snooper_3", kind: TreacheryKind::Snooper },
    TreacheryCardDef { id: TreacheryCardId(16), name: "snooper_4", kind: TreacheryKind::Snooper },
    TreacheryCardDef { id: TreacheryCardId(17), name: "cheap_hero_1", kind: TreacheryKind::CheapHero },
    TreacheryCardDef { id: TreacheryCardId(18), name: "cheap_hero_2", kind: TreacheryKind::CheapHero },
    TreacheryCardDef { id: TreacheryCardId(19), name: "cheap_heroine", kind: TreacheryKind::CheapHero },
    TreacheryCardDef { id: TreacheryCardId(20), name: "baliset", kind: TreacheryKind::Worthless },
    TreacheryCardDef { id: TreacheryCardId(21), name: "jubba_cloak", kind: TreacheryKind::Worthless },
    TreacheryCardDef { id: TreacheryCardId(22), name: "kulon", kind: TreacheryKind::Worthless },
    TreacheryCardDef { id: TreacheryCardId(23), name: "la_la_la", kind: TreacheryKind::Worthless },
    TreacheryCardDef { id: TreacheryCardId(24), name: "trip_to_gamont", kind: TreacheryKind::Worthless },
    TreacheryCardDef { id: TreacheryCardId(25), name: "karama_1", kind: TreacheryKind::Karama },
    TreacheryCardDef { id: TreacheryCardId(26), name: "karama_2", kind: TreacheryKind::Karama },
    TreacheryCardDef { id: TreacheryCardId(27), name: "family_atomics", kind: TreacheryKind::FamilyAtomics },
    TreacheryCardDef { id: TreacheryCardId(28), name: "weather_control", kind: TreacheryKind::WeatherControl },
    TreacheryCardDef { id: TreacheryCardId(29), name: "hajr", kind: TreacheryKind::Hajr },
    TreacheryCardDef { id: TreacheryCardId(30), name: "tleilaxu_ghola", kind: TreacheryKind::TleilaxuGhola },
    TreacheryCardDef { id: TreacheryCardId(31), name: "truthtrance_1", kind: TreacheryKind::Truthtrance },
    TreacheryCardDef { id: TreacheryCardId(32), name: "truthtrance_2", kind: TreacheryKind::Truthtrance },
];

/// Looks up the static definition of a treachery card.
pub fn treachery_card(id: TreacheryCardId) -> &'static TreacheryCardDef {
    &CARDS[id.0 as usize]
}

/// The full deck in catalogue order, prior to shuffling.
pub fn full_deck() -> Vec<TreacheryCardId> {
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
    fn deck_composition() {
        let weapons = CARDS.iter().filter(|c| c.kind.is_weapon()).count();
        let defenses = CARDS.iter().filter(|c| c.kind.is_defense()).count();
        let worthless =
            CARDS.iter().filter(|c| c.kind == TreacheryKind::Worthless).count();
        assert_eq!(weapons, 9);
        assert_eq!(defenses, 8);
        assert_eq!(worthless, 5);
        assert_eq!(CARDS.len(), 33);
    }
}
