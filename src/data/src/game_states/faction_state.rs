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

use crate::catalog::factions;
use crate::catalog::leaders::{self, LeaderId};
use crate::catalog::territories::TerritoryId;
use crate::catalog::treachery_cards::TreacheryCardId;
use crate::core::primitives::{FactionId, HasFactionId, Sector, SpiceAmount, TurnNumber};

/// A pool of force tokens split by quality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcePool {
    pub regular: u32,
    pub elite: u32,
}

impl ForcePool {
    pub fn total(&self) -> u32 {
        self.regular + self.elite
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Forces of one faction standing in one sector of one territory.
///
/// The `advisors` count is only ever non-zero for Bene Gesserit; advisors
/// share the sector without contesting it and are not battle-capable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceStack {
    pub territory: TerritoryId,
    pub sector: Sector,
    pub regular: u32,
    pub elite: u32,
    pub advisors: u32,
}

impl ForceStack {
    pub fn total(&self) -> u32 {
        self.regular + self.elite + self.advisors
    }

    /// Forces which count for battle and territory control.
    pub fn fighters(&self) -> u32 {
        self.regular + self.elite
    }
}

/// Where a leader disc currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaderLocation {
    /// Available to commit to a battle.
    Available,
    /// Dead, awaiting revival.
    Tanks,
    Captured { by: FactionId },
}

/// Per-game state of one leader disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderState {
    pub id: LeaderId,
    pub location: LeaderLocation,
    /// Set when the leader survived a battle in a territory this turn; the
    /// leader remains there, immune to storm and worm, until turn end.
    pub used_in_territory: Option<TerritoryId>,
}

impl LeaderState {
    pub fn new(id: LeaderId) -> Self {
        Self { id, location: LeaderLocation::Available, used_in_territory: None }
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.location, LeaderLocation::Available | LeaderLocation::Captured { .. })
    }
}

/// Flags which reset at the start of every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnFlags {
    /// Fremen advanced storm: the face-down storm card drawn last turn.
    pub fremen_storm_card: Option<u8>,
    /// Boosted revivals already consumed by the Emperor's ally this turn.
    pub emperor_ally_revivals_used: u32,
    /// Boosted revivals granted by the Emperor this turn.
    pub emperor_ally_revivals_granted: u32,
    /// Karama played to bid beyond treasury.
    pub karama_bidding_active: bool,
    /// Karama played to take the current auction card without paying.
    pub karama_free_card_active: bool,
    /// Whether this faction has taken its one shipment this turn.
    pub shipped_this_turn: bool,
    /// Whether this faction has taken its one force move this turn.
    pub moved_this_turn: bool,
    /// Ornithopter access, locked at the start of the faction's
    /// shipment-and-movement turn.
    pub ornithopters: bool,
    /// Force revivals taken this turn, free and paid.
    pub force_revivals_used: u32,
    /// Whether a leader was revived this turn.
    pub leader_revived: bool,
}

/// State for one faction within a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionState {
    pub faction: FactionId,
    /// Player-marker position around the board edge, fixed at setup.
    pub seat: Sector,
    pub spice: SpiceAmount,
    pub reserves: ForcePool,
    pub tanks: ForcePool,
    pub on_board: Vec<ForceStack>,
    pub hand: Vec<TreacheryCardId>,
    /// Traitor cards held. Hidden information.
    pub traitors: Vec<LeaderId>,
    pub leaders: Vec<LeaderState>,
    pub ally: Option<FactionId>,
    /// Bene Gesserit victory prediction, set during setup. Hidden.
    pub prediction: Option<(FactionId, TurnNumber)>,
    /// Whether the Kwisatz Haderach token is available (Atreides only).
    pub kwisatz_haderach_alive: bool,
    pub flags: TurnFlags,
}

impl FactionState {
    pub fn new(faction: FactionId, seat: Sector) -> Self {
        let def = factions::faction(faction);
        Self {
            faction,
            seat,
            spice: def.starting_spice,
            reserves: ForcePool { regular: def.regular_forces, elite: def.elite_forces },
            tanks: ForcePool::default(),
            on_board: vec![],
            hand: vec![],
            traitors: vec![],
            leaders: leaders::faction_leaders(faction).map(LeaderState::new).collect(),
            ally: None,
            prediction: None,
            kwisatz_haderach_alive: faction == FactionId::Atreides,
            flags: TurnFlags::default(),
        }
    }

    /// Total forces across reserves, board and tanks. Constant for the whole
    /// game; checked by the force-conservation invariant.
    pub fn total_forces(&self) -> u32 {
        self.reserves.total()
            + self.tanks.total()
            + self.on_board.iter().map(ForceStack::total).sum::<u32>()
    }

    pub fn stack_at(&self, territory: TerritoryId, sector: Sector) -> Option<&ForceStack> {
        self.on_board.iter().find(|s| s.territory == territory && s.sector == sector)
    }

    pub fn stack_at_mut(
        &mut self,
        territory: TerritoryId,
        sector: Sector,
    ) -> Option<&mut ForceStack> {
        self.on_board.iter_mut().find(|s| s.territory == territory && s.sector == sector)
    }

    /// Fighters present anywhere in a territory, across all its sectors.
    pub fn fighters_in(&self, territory: TerritoryId) -> u32 {
        self.on_board
            .iter()
            .filter(|s| s.territory == territory)
            .map(ForceStack::fighters)
            .sum()
    }

    pub fn leader_state(&self, id: LeaderId) -> Option<&LeaderState> {
        self.leaders.iter().find(|l| l.id == id)
    }

    pub fn leader_state_mut(&mut self, id: LeaderId) -> Option<&mut LeaderState> {
        self.leaders.iter_mut().find(|l| l.id == id)
    }

    pub fn living_leaders(&self) -> impl Iterator<Item = &LeaderState> {
        self.leaders
            .iter()
            .filter(|l| matches!(l.location, LeaderLocation::Available))
    }

    pub fn hand_is_full(&self) -> bool {
        self.hand.len() >= self.faction.max_hand_size()
    }

    pub fn holds_card_kind(
        &self,
        kind: crate::catalog::treachery_cards::TreacheryKind,
    ) -> Option<TreacheryCardId> {
        self.hand.iter().copied().find(|c| c.kind() == kind)
    }
}

impl HasFactionId for FactionState {
    fn faction_id(&self) -> FactionId {
        self.faction
    }
}

/// The factions in a game, in seating order.
///
/// Insertion order is the seating order around the board and seeds the storm
/// order computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Factions(Vec<FactionState>);

impl Factions {
    pub fn new(states: Vec<FactionState>) -> Self {
        Self(states)
    }

    pub fn get(&self, id: FactionId) -> &FactionState {
        self.0
            .iter()
            .find(|f| f.faction == id)
            .unwrap_or_else(|| panic!("Faction {id} is not in this game"))
    }

    pub fn get_mut(&mut self, id: FactionId) -> &mut FactionState {
        self.0
            .iter_mut()
            .find(|f| f.faction == id)
            .unwrap_or_else(|| panic!("Faction {id} is not in this game"))
    }

    pub fn contains(&self, id: FactionId) -> bool {
        self.0.iter().any(|f| f.faction == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = FactionId> + '_ {
        self.0.iter().map(|f| f.faction)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FactionState> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FactionState> {
        self.0.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
