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
use crate::catalog::territories::TerritoryId;
use crate::catalog::treachery_cards::TreacheryCardId;
use crate::core::primitives::{FactionId, Sector, SpiceAmount, TurnNumber};
use crate::game_states::phase_state::{
    BattleLeader, PrescienceElement, VoiceCommand,
};

/// Every decision the engine externalises to an agent.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum RequestKind {
    SelectTraitor,
    BgPrediction,
    DistributeForces,
    DialStorm,
    PlayWeatherControl,
    PlayFamilyAtomics,
    PlaceSandworm,
    WormRide,
    ProtectAllyFromWorm,
    AllianceDecision,
    BidOrPass,
    PeekCard,
    ReviveForces,
    ReviveLeader,
    GrantFremenRevivalBoost,
    ShipForces,
    MoveForces,
    GuildTimingDecision,
    SendAdvisor,
    FlipAdvisors,
    TakeUpArms,
    BgIntrusion,
    ChooseBattle,
    UsePrescience,
    RevealPrescienceElement,
    CreateBattlePlan,
    UseVoice,
    ComplyWithVoice,
    CallTraitor,
    CaptureLeaderChoice,
    ChooseCardsToDiscard,
    CollectSpice,
    ClaimCharity,
    UseKarama,
    RespondToDeal,
}

/// Structured context attached to a request, so an agent need not re-derive
/// the situation from the full state sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RequestContext {
    #[default]
    None,
    StormDial { turn: TurnNumber, min: u8, max: u8 },
    TraitorCandidates { candidates: Vec<LeaderId> },
    Auction { card_index: u32, total_cards: u32, high_bid: Option<(FactionId, SpiceAmount)> },
    PeekedCard { card: TreacheryCardId, card_index: u32 },
    Revival { free: u32, max_total: u32, in_tanks_regular: u32, in_tanks_elite: u32 },
    Worm { territory: TerritoryId },
    Battle { territory: TerritoryId, sector: Sector, opponent: FactionId },
    BattleChoices { battles: Vec<(TerritoryId, Sector)> },
    PrescienceQuestion { element: PrescienceElement },
    VoiceCommanded { command: VoiceCommand },
    Shipment { sector_cost: SpiceAmount },
    Intrusion { territory: TerritoryId, sector: Sector, intruder: FactionId },
    Collection { territory: TerritoryId, sector: Sector, available: SpiceAmount },
    Deal { from: FactionId, terms: String },
}

/// A single decision requested from one faction's agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub faction: FactionId,
    pub kind: RequestKind,
    /// Human-readable description of the decision.
    pub prompt: String,
    pub context: RequestContext,
    /// Action strings the agent may answer with, e.g. `["BID", "PASS"]`.
    pub available_actions: Vec<String>,
    /// Provider-enforced deadline in milliseconds. The engine itself never
    /// times out; on expiry the provider answers with a pass.
    pub timeout_ms: Option<u64>,
    pub urgent: bool,
}

impl AgentRequest {
    pub fn new(faction: FactionId, kind: RequestKind, prompt: impl Into<String>) -> Self {
        Self {
            faction,
            kind,
            prompt: prompt.into(),
            context: RequestContext::None,
            available_actions: vec![],
            timeout_ms: None,
            urgent: false,
        }
    }

    pub fn context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    pub fn actions(mut self, actions: &[&str]) -> Self {
        self.available_actions = actions.iter().map(|a| a.to_string()).collect();
        self
    }
}

/// Typed payload of an agent's answer.
///
/// A payload whose variant does not match the request it answers is treated
/// as a pass at the decision site, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseData {
    /// Explicit decline, or no meaningful payload (e.g. a peek ack).
    None,
    SelectTraitor { leader: LeaderId },
    BgPrediction { faction: FactionId, turn: TurnNumber },
    DistributeForces { placements: Vec<(TerritoryId, Sector, u32)> },
    DialStorm { dial: u8 },
    PlayWeatherControl { movement: u8 },
    PlayFamilyAtomics,
    PlaceSandworm { from: (TerritoryId, Sector), to: (TerritoryId, Sector) },
    WormRide { ride: bool },
    ProtectAllyFromWorm { protect: bool },
    FormAlliance { with: FactionId },
    BreakAlliance,
    Bid { amount: SpiceAmount },
    /// Bid beyond the treasury by committing a Karama card.
    KaramaBid { amount: SpiceAmount, karama_card: TreacheryCardId },
    /// Take the card without paying by trading a Karama card.
    KaramaFreeCard { karama_card: TreacheryCardId },
    ReviveForces { regular: u32, elite: u32 },
    ReviveLeader { leader: LeaderId },
    GrantRevivalBoost { count: u32 },
    ShipForces { territory: TerritoryId, sector: Sector, regular: u32, elite: u32 },
    /// Spacing Guild only: ship from one territory to another, or back to
    /// reserves.
    GuildShip { from: (TerritoryId, Sector), to: Option<(TerritoryId, Sector)> },
    MoveForces {
        from: (TerritoryId, Sector),
        to: (TerritoryId, Sector),
        regular: u32,
        elite: u32,
        advisors: u32,
    },
    GuildActNow,
    SendAdvisor,
    FlipAdvisors { to_fighters: bool },
    TakeUpArms { flips: Vec<(TerritoryId, Sector)> },
    BgIntrusion { become_advisors: bool },
    ChooseBattle { territory: TerritoryId, sector: Sector },
    UsePrescience { element: PrescienceElement },
    RevealLeader { leader: BattleLeader },
    RevealCard { card: Option<TreacheryCardId> },
    RevealNumber { number: u32 },
    CreateBattlePlan { plan: BattlePlanSpec },
    UseVoice { command: VoiceCommand },
    CallTraitor,
    CaptureLeader { capture: bool },
    DiscardCards { cards: Vec<TreacheryCardId> },
    CollectSpice,
    ClaimCharity,
    UseKarama { card: TreacheryCardId },
    RespondToDeal { accept: bool },
}

/// Agent-side description of a battle plan, validated by the engine before
/// becoming a committed [crate::game_states::phase_state::BattlePlan].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlanSpec {
    pub leader: BattleLeader,
    pub forces_dialed: u32,
    pub spice_dialed: SpiceAmount,
    pub weapon: Option<TreacheryCardId>,
    pub defense: Option<TreacheryCardId>,
    pub kwisatz_haderach: bool,
}

/// An agent's answer to an [AgentRequest].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub faction: FactionId,
    pub data: ResponseData,
    /// True when the agent explicitly declined, or when the provider
    /// synthesised a pass for a missing answer.
    pub passed: bool,
    pub reasoning: Option<String>,
}

impl AgentResponse {
    pub fn new(faction: FactionId, data: ResponseData) -> Self {
        Self { faction, data, passed: false, reasoning: None }
    }

    pub fn pass(faction: FactionId) -> Self {
        Self { faction, data: ResponseData::None, passed: true, reasoning: None }
    }

    pub fn is_pass(&self) -> bool {
        self.passed || self.data == ResponseData::None
    }
}

/// Finds the response from a given faction within a batch, if present.
pub fn response_from(responses: &[AgentResponse], faction: FactionId) -> Option<&AgentResponse> {
    responses.iter().find(|r| r.faction == faction)
}
