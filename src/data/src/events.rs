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

use crate::catalog::leaders::LeaderId;
use crate::catalog::spice_cards::SpiceCardId;
use crate::catalog::territories::TerritoryId;
use crate::catalog::treachery_cards::TreacheryCardId;
use crate::core::primitives::{FactionId, Phase, Sector, SpiceAmount, TurnNumber};
use crate::game_states::game_state::Victory;

/// Events emitted by phase handlers as they transform the game state.
///
/// Within a single handler step, events are emitted strictly in the order the
/// handler listed them, before the next step runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseStarted { phase: Phase, turn: TurnNumber },
    PhaseEnded { phase: Phase, turn: TurnNumber },
    PhaseSkipped { phase: Phase, turn: TurnNumber },
    TurnStarted { turn: TurnNumber },
    TurnEnded { turn: TurnNumber },

    StormDialRevealed { faction: FactionId, dial: u8 },
    StormMoved { from: Sector, to: Sector, sectors: u8 },
    ForcesKilledByStorm { faction: FactionId, territory: TerritoryId, sector: Sector, count: u32 },
    SpiceDestroyedByStorm { territory: TerritoryId, sector: Sector, amount: SpiceAmount },
    ShieldWallDestroyed,

    SpiceCardRevealed { card: SpiceCardId },
    SpicePlaced { territory: TerritoryId, sector: Sector, amount: SpiceAmount },
    ShaiHuludAppeared { devour_territory: Option<TerritoryId> },
    ForcesDevoured { faction: FactionId, territory: TerritoryId, count: u32 },
    FremenWormImmunity { territory: TerritoryId },
    WormRideTaken { from: TerritoryId, to: TerritoryId },
    NexusStarted,
    NexusEnded,
    AllianceFormed { factions: (FactionId, FactionId) },
    AllianceBroken { factions: (FactionId, FactionId) },

    CharityClaimed { faction: FactionId, amount: SpiceAmount },

    AuctionStarted { card_index: u32, total_cards: u32 },
    BidPlaced { faction: FactionId, amount: SpiceAmount },
    BidPassed { faction: FactionId },
    CardPeeked { faction: FactionId, card_index: u32 },
    CardWon { faction: FactionId, card_index: u32, paid: SpiceAmount },
    CardReturnedToDeck { card_index: u32 },
    BiddingComplete { cards_sold: u32 },

    ForcesRevived { faction: FactionId, regular: u32, elite: u32, paid: SpiceAmount },
    LeaderRevived { faction: FactionId, leader: LeaderId, paid: SpiceAmount },

    ForcesShipped {
        faction: FactionId,
        territory: TerritoryId,
        sector: Sector,
        count: u32,
        paid: SpiceAmount,
    },
    ForcesMoved {
        faction: FactionId,
        from: (TerritoryId, Sector),
        to: (TerritoryId, Sector),
        count: u32,
    },
    AdvisorSent { territory: TerritoryId, sector: Sector },
    AdvisorsFlipped { territory: TerritoryId, sector: Sector, count: u32, to_fighters: bool },

    BattleStarted {
        territory: TerritoryId,
        sector: Sector,
        aggressor: FactionId,
        defender: FactionId,
    },
    BattlePlanSubmitted { faction: FactionId },
    PrescienceUsed { element: crate::game_states::phase_state::PrescienceElement },
    VoiceUsed { command: crate::game_states::phase_state::VoiceCommand },
    TraitorRevealed { caller: FactionId, leader: LeaderId },
    BattleResolved {
        territory: TerritoryId,
        winner: Option<FactionId>,
        loser: Option<FactionId>,
        aggressor_strength_halves: u32,
        defender_strength_halves: u32,
    },
    LeaderKilled { faction: FactionId, leader: LeaderId },
    LeaderCaptured { by: FactionId, leader: LeaderId },
    LeaderReturned { to: FactionId, leader: LeaderId },
    LasgunShieldExplosion { territory: TerritoryId },
    KwisatzHaderachActivated,

    SpiceCollected { faction: FactionId, territory: TerritoryId, amount: SpiceAmount },

    CardDiscarded { faction: FactionId, card: TreacheryCardId },
    VictoryAchieved { victory: Victory },
    GameEnded { turn: TurnNumber },
    Error { message: String },
}
