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

use rand_xoshiro::Xoshiro256StarStar;
use serde::{Deserialize, Serialize};

use crate::actions::ActionRecord;
use crate::catalog::territories::TerritoryId;
use crate::core::primitives::{
    FactionId, GameId, Phase, Sector, SpiceAmount, TurnNumber,
};
use crate::deals::Deal;
use crate::game_states::decks::Decks;
use crate::game_states::faction_state::{FactionState, Factions};
use crate::game_states::phase_state::PhaseState;

/// This is the state of a single ongoing game of Dune.
///
/// A self-contained snapshot: phase handlers take ownership of a snapshot and
/// return a successor, and the phase manager never shares a mutable reference
/// across handler boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Unique ID for this game
    pub id: GameId,

    /// Options controlling overall gameplay
    pub config: GameConfiguration,

    /// Current turn number, starting from 1. Turn 0 means setup has not
    /// completed.
    pub turn: TurnNumber,

    /// Phase currently being processed.
    pub phase: Phase,

    /// Whether the setup phase has run to completion.
    pub setup_complete: bool,

    /// State for the factions in this game, in seating order.
    pub factions: Factions,

    /// Faction ordering for the current turn, derived from the storm
    /// position. The first entry acts first in every phase that proceeds
    /// in player order.
    pub storm_order: Vec<FactionId>,

    /// Sector the storm currently occupies.
    pub storm_sector: Sector,

    /// Whether Family Atomics has destroyed the Shield Wall. Permanent.
    pub shield_wall_destroyed: bool,

    /// Cumulative Shai-Hulud appearances across the whole game.
    pub worm_count: u32,

    /// Every deck and discard pile.
    pub decks: Decks,

    /// Spice currently sitting on the board.
    pub spice_on_board: Vec<SpiceCache>,

    /// Territories Shai-Hulud currently occupies: the worm stays where it
    /// devoured (or where a Fremen ride carried it) until turn end, and
    /// doubles spice collection there.
    pub worms_on_board: Vec<TerritoryId>,

    /// Deals proposed but not yet resolved. Opaque to the rules engine.
    pub pending_deals: Vec<Deal>,

    /// Resolved deals, for the record.
    pub deal_history: Vec<Deal>,

    /// Terminal result. Once set, the phase manager refuses further work.
    pub winner: Option<Victory>,

    /// Append-only log of structured action records.
    pub action_log: Vec<ActionRecord>,

    /// Suspend/resume state of the phase currently being processed.
    pub phase_state: PhaseState,

    /// Test-only overrides for ornithopter access, keyed by faction.
    pub ornithopter_overrides: Vec<(FactionId, bool)>,

    /// Random number generator to use for this game
    pub rng: Xoshiro256StarStar,
}

impl GameState {
    /// Looks up a faction's state.
    pub fn faction(&self, id: FactionId) -> &FactionState {
        self.factions.get(id)
    }

    /// Mutable reference to a faction's state.
    pub fn faction_mut(&mut self, id: FactionId) -> &mut FactionState {
        self.factions.get_mut(id)
    }

    pub fn has_faction(&self, id: FactionId) -> bool {
        self.factions.contains(id)
    }

    /// Spice lying at the given territory and sector, if any.
    pub fn spice_at(&self, territory: TerritoryId, sector: Sector) -> Option<&SpiceCache> {
        self.spice_on_board
            .iter()
            .find(|c| c.territory == territory && c.sector == sector)
    }

    /// Whether the storm currently sits on any sector of the territory.
    pub fn territory_in_storm(&self, territory: TerritoryId) -> bool {
        territory.contains_sector(self.storm_sector)
    }

    /// Whether Shai-Hulud currently occupies the territory.
    pub fn worm_at(&self, territory: TerritoryId) -> bool {
        self.worms_on_board.contains(&territory)
    }

    /// Whether the given sector of the territory is currently storm-swept,
    /// taking protection and the Shield Wall into account.
    pub fn sector_stormed(&self, territory: TerritoryId, sector: Sector) -> bool {
        if sector != self.storm_sector {
            return false;
        }
        let def = territory.def();
        if !def.protected_from_storm {
            return true;
        }
        self.shield_wall_destroyed && territory.protected_by_shield_wall()
    }

    pub fn record_action(&mut self, record: ActionRecord) {
        self.action_log.push(record);
    }
}

/// A quantity of spice lying in one sector of one territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiceCache {
    pub territory: TerritoryId,
    pub sector: Sector,
    pub amount: SpiceAmount,
}

/// Terminal result of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    /// The winning faction, or both members of a winning alliance.
    pub factions: Vec<FactionId>,
    pub turn: TurnNumber,
    pub kind: VictoryKind,
}

/// How the game was won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryKind {
    /// Control of enough strongholds at the Mentat Pause.
    StrongholdControl,
    /// Bene Gesserit correctly predicted the winner and turn.
    Prediction,
    /// Fremen special condition at turn-limit exhaustion.
    FremenDefault,
    /// Spacing Guild default at turn-limit exhaustion.
    GuildDefault,
    /// Richest faction at turn-limit exhaustion.
    SpiceDefault,
}

/// Optional rule variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variants {
    /// The Shield Wall becomes a stronghold once enough worms have appeared.
    pub shield_wall_stronghold: bool,
    pub leader_skill_cards: bool,
    pub homeworlds: bool,
}

/// Options controlling overall gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfiguration {
    /// Turn at which the game ends if nobody has won.
    pub max_turns: TurnNumber,

    /// Whether advanced rules are in effect: double spice blow, spice
    /// support in battle, the Fremen storm deck, and advanced faction
    /// powers.
    pub advanced_rules: bool,

    pub variants: Variants,
}

impl Default for GameConfiguration {
    fn default() -> Self {
        Self { max_turns: 10, advanced_rules: false, variants: Variants::default() }
    }
}
