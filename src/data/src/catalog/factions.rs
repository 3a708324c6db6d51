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

use crate::catalog::territories::TerritoryId;
use crate::core::primitives::{FactionId, SpiceAmount};

/// Static, rules-level constants for one faction.
#[derive(Debug, Clone, Copy)]
pub struct FactionDef {
    pub id: FactionId,
    /// Total regular force tokens in the faction's pool.
    pub regular_forces: u32,
    /// Elite force tokens (Sardaukar, Fedaykin) included in the pool.
    pub elite_forces: u32,
    pub starting_spice: SpiceAmount,
    /// Free revivals per turn.
    pub free_revivals: u32,
    pub max_hand_size: usize,
    /// Forces placed on the board during setup, when fixed.
    ///
    /// Fremen distribute their starting forces by choice and Bene Gesserit
    /// place a single token anywhere, so their entries are empty here and
    /// handled by the setup phase.
    pub starting_garrison: &'static [(TerritoryId, u8, u32)],
}

impl FactionId {
    pub fn def(self) -> &'static FactionDef {
        faction(self)
    }

    pub fn total_forces(self) -> u32 {
        let def = self.def();
        def.regular_forces + def.elite_forces
    }

    pub fn max_hand_size(self) -> usize {
        self.def().max_hand_size
    }
}

/// Looks up the static constants for a faction.
pub fn faction(id: FactionId) -> &'static FactionDef {
    match id {
        FactionId::Atreides => &FactionDef {
            id: FactionId::Atreides,
            regular_forces: 20,
            elite_forces: 0,
            starting_spice: 10,
            free_revivals: 2,
            max_hand_size: 4,
            starting_garrison: &[(TerritoryId::Arrakeen, 9, 10)],
        },
        FactionId::Harkonnen => &FactionDef {
            id: FactionId::Harkonnen,
            regular_forces: 20,
            elite_forces: 0,
            starting_spice: 10,
            free_revivals: 2,
            max_hand_size: 8,
            starting_garrison: &[(TerritoryId::Carthag, 10, 10)],
        },
        FactionId::Emperor => &FactionDef {
            id: FactionId::Emperor,
            regular_forces: 15,
            elite_forces: 5,
            starting_spice: 10,
            free_revivals: 1,
            max_hand_size: 4,
            starting_garrison: &[],
        },
        FactionId::SpacingGuild => &FactionDef {
            id: FactionId::SpacingGuild,
            regular_forces: 20,
            elite_forces: 0,
            starting_spice: 5,
            free_revivals: 1,
            max_hand_size: 4,
            starting_garrison: &[(TerritoryId::TueksSietch, 4, 5)],
        },
        FactionId::Fremen => &FactionDef {
            id: FactionId::Fremen,
            regular_forces: 17,
            elite_forces: 3,
            starting_spice: 3,
            free_revivals: 3,
            max_hand_size: 4,
            // Distributed across Sietch Tabr, False Wall South and False
            // Wall West by a setup decision.
            starting_garrison: &[],
        },
        FactionId::BeneGesserit => &FactionDef {
            id: FactionId::BeneGesserit,
            regular_forces: 20,
            elite_forces: 0,
            starting_spice: 5,
            free_revivals: 1,
            max_hand_size: 4,
            // One advisor or fighter placed anywhere by a setup decision.
            starting_garrison: &[],
        },
    }
}

/// Number of treachery cards dealt during setup.
pub fn starting_treachery_cards(id: FactionId) -> usize {
    match id {
        FactionId::Harkonnen => 2,
        _ => 1,
    }
}

/// Territories the Fremen may distribute their starting forces across.
pub const FREMEN_STARTING_TERRITORIES: &[TerritoryId] = &[
    TerritoryId::SietchTabr,
    TerritoryId::FalseWallSouth,
    TerritoryId::FalseWallWest,
];

/// Number of forces the Fremen distribute during setup.
pub const FREMEN_STARTING_FORCES: u32 = 10;

/// Base number of paid force revivals allowed per turn.
pub const MAX_FORCE_REVIVALS_PER_TURN: u32 = 3;

/// Cost in spice of each paid force revival.
pub const FORCE_REVIVAL_COST: SpiceAmount = 2;

/// Extra paid revivals the Emperor may grant its ally per turn.
pub const EMPEROR_ALLY_REVIVAL_BOOST: u32 = 3;

/// Cumulative Shai-Hulud count at which the Shield Wall stronghold variant
/// destroys the wall.
pub const SHIELD_WALL_WORM_THRESHOLD: u32 = 4;

/// Fixed strength bonus of the Kwisatz Haderach token.
pub const KWISATZ_HADERACH_BONUS: u32 = 2;

/// Strongholds required for a lone faction to win.
pub const VICTORY_STRONGHOLDS_SOLO: usize = 3;

/// Strongholds required jointly for an alliance to win.
pub const VICTORY_STRONGHOLDS_ALLIED: usize = 4;
