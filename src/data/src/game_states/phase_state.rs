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
use crate::core::primitives::{FactionId, Sector, SpiceAmount};
use crate::game_states::decks::SpiceDeckId;

/// Suspend/resume state of the phase currently being processed.
///
/// Each phase handler is a sub-machine which may pause awaiting agent
/// decisions; everything it needs to resume lives here, in the snapshot,
/// rather than in handler-local mutable context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PhaseState {
    /// No phase sub-machine is active.
    #[default]
    Idle,
    Setup(SetupState),
    Storm(StormState),
    SpiceBlow(SpiceBlowState),
    Charity(CharityState),
    Bidding(BiddingState),
    Revival(RevivalState),
    Shipment(ShipmentState),
    Battle(BattleState),
    Collection(CollectionState),
}

/// Steps of the setup phase, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupStage {
    /// All factions simultaneously pick one traitor from their dealt
    /// candidates (Harkonnen keeps all four).
    Traitors,
    /// Bene Gesserit predicts a faction and turn.
    Prediction,
    /// Fremen distribute their starting forces.
    FremenDistribution,
    /// Bene Gesserit places its starting token.
    BgPlacement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupState {
    pub stage: SetupStage,
    /// Traitor candidates dealt to each faction, kept until selections
    /// resolve.
    pub traitor_candidates: Vec<(FactionId, Vec<LeaderId>)>,
}

/// Steps of the storm phase, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StormStage {
    Dialing,
    FamilyAtomicsCheck,
    WeatherControlCheck,
    ApplyMovement,
}

/// The Weather Control prompt window.
///
/// A single three-state value: the window opens at most once per storm phase,
/// and any response at all (valid, invalid, missing, or a decline) closes it
/// permanently for the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WeatherControlWindow {
    #[default]
    NotOpened,
    Awaiting,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StormState {
    pub stage: StormStage,
    /// Factions asked to dial this turn.
    pub dialers: Vec<FactionId>,
    /// Dials received so far.
    pub dials: Vec<(FactionId, u8)>,
    /// Computed storm movement, before any Weather Control override.
    pub movement: u8,
    pub weather: WeatherControlWindow,
}

/// What the spice blow phase is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpiceBlowAwaiting {
    /// Drawing cards from the current deck; no outstanding request.
    Drawing,
    /// Fremen decide whether to spare their ally from a worm.
    ProtectAlly { territory: TerritoryId },
    /// Fremen decide whether to ride the worm.
    WormRide,
    /// A moved worm ride is resolving: Fremen named a stack to carry.
    Nexus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpiceBlowState {
    /// Decks not yet resolved this phase, in play order.
    pub deck_queue: Vec<SpiceDeckId>,
    pub current_deck: Option<SpiceDeckId>,
    /// Shai-Hulud cards set aside on turn 1, reshuffled at phase end.
    pub set_aside_worms: Vec<SpiceCardId>,
    /// Whether a worm appeared and a Nexus must run once all decks resolve.
    pub nexus_pending: bool,
    /// Factions which have not yet spoken in the Nexus, in storm order.
    pub nexus_queue: Vec<FactionId>,
    pub awaiting: SpiceBlowAwaiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharityState {
    /// Eligible factions which have not yet been asked, in storm order.
    pub queue: Vec<FactionId>,
}

/// What the bidding phase is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BiddingAwaiting {
    /// Atreides is being shown the card about to be auctioned.
    Peek,
    /// A faction is deciding whether to bid.
    Bid { bidder: FactionId },
    /// No outstanding request; advance the auction.
    Advancing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiddingState {
    /// Total cards on offer this phase.
    pub cards_total: u32,
    /// Zero-based index of the auction in progress.
    pub auction_index: u32,
    /// Card currently under the hammer.
    pub current_card: Option<TreacheryCardId>,
    /// Faction which opened bidding on the current card.
    pub opener: Option<FactionId>,
    /// Faction which opened bidding on the previous card; seed for the next
    /// opener rotation.
    pub previous_opener: Option<FactionId>,
    /// Card indices Atreides has already been shown. Guarantees the peek is
    /// offered at most once per card.
    pub peeked_indices: Vec<u32>,
    /// Factions still in the running for the current card, rotation order.
    pub active_bidders: Vec<FactionId>,
    /// Position of the next bidder within `active_bidders`.
    pub next_bidder: usize,
    pub high_bid: Option<(FactionId, SpiceAmount)>,
    /// Cards nobody bid on, returned to the deck at phase end.
    pub set_aside: Vec<TreacheryCardId>,
    pub awaiting: BiddingAwaiting,
}

/// What the revival phase is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevivalAwaiting {
    /// The Emperor is deciding how many boosted revivals to grant its ally.
    Grant,
    /// A faction is deciding which forces to revive.
    Forces(FactionId),
    /// A faction is deciding whether to revive a leader.
    Leader(FactionId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevivalState {
    /// Factions which have not yet taken their revival turn, storm order.
    pub queue: Vec<FactionId>,
    pub awaiting: RevivalAwaiting,
}

/// Steps of one faction's shipment-and-movement turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentStage {
    /// The Guild is deciding whether to act before the named faction.
    GuildTiming { before: FactionId },
    Ship,
    Move,
    /// Bene Gesserit may send an advisor after another faction's shipment.
    SendAdvisor { shipped_to: TerritoryId, shipped_sector: Sector },
    /// Bene Gesserit fighters were intruded upon and may become advisors.
    Intrusion { territory: TerritoryId, sector: Sector },
    /// Bene Gesserit choose how their own freshly landed forces stand.
    BgLanding { territory: TerritoryId, sector: Sector },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentState {
    /// Factions which have not yet acted, in storm order. The Guild is
    /// removed from this queue when it elects to act out of turn.
    pub queue: Vec<FactionId>,
    /// Faction whose turn is in progress.
    pub current: Option<FactionId>,
    pub stage: ShipmentStage,
    /// Faction whose turn resumes after a Guild out-of-turn interruption or
    /// a Bene Gesserit reaction resolves.
    pub resume: Option<FactionId>,
    pub guild_done: bool,
}

/// A territory-and-sector where two or more non-allied factions must fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBattle {
    pub territory: TerritoryId,
    pub sector: Sector,
    pub factions: Vec<FactionId>,
}

/// The element of a battle plan Prescience may reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescienceElement {
    Leader,
    Weapon,
    Defense,
    Number,
}

/// A Voice command: the opponent must play, or must not play, a kind of card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCommand {
    pub must_play: bool,
    pub card: VoiceCardKind,
}

/// Card classes nameable by the Voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceCardKind {
    ProjectileWeapon,
    PoisonWeapon,
    Lasgun,
    Shield,
    Snooper,
    Worthless,
    CheapHero,
}

/// Who leads a battle plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleLeader {
    Leader(LeaderId),
    CheapHero(TreacheryCardId),
    /// No leader committed; announced openly and worth zero strength.
    None,
}

/// One side's committed battle plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlePlan {
    pub leader: BattleLeader,
    pub forces_dialed: u32,
    /// Spice committed to support dialed forces at full strength.
    pub spice_dialed: SpiceAmount,
    pub weapon: Option<TreacheryCardId>,
    pub defense: Option<TreacheryCardId>,
    pub kwisatz_haderach: bool,
}

/// What the battle phase is currently waiting on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleAwaiting {
    /// The aggressor is choosing which of their battles to fight next.
    ChooseBattle { aggressor: FactionId },
    /// Atreides is deciding whether to use Prescience.
    Prescience,
    /// The opponent is answering a Prescience question.
    PrescienceAnswer { element: PrescienceElement },
    /// Bene Gesserit is deciding whether to use the Voice.
    Voice,
    /// Both sides are composing battle plans.
    Plans,
    /// Both sides may call traitor.
    TraitorCalls,
    /// Harkonnen is choosing whether to capture or kill a leader.
    CaptureChoice { leader: LeaderId },
    /// The winner is choosing which of their played cards to shed.
    WinnerDiscards { faction: FactionId, played: Vec<TreacheryCardId> },
    /// No outstanding request; advance to the next battle.
    Advancing,
}

/// The opponent's committed answer to a Prescience question. Binding on
/// their final plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrescienceAnswer {
    Leader(BattleLeader),
    /// The weapon or defense to be played, or None for "not playing".
    Card(Option<TreacheryCardId>),
    Number(u32),
}

/// A battle in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBattle {
    pub territory: TerritoryId,
    pub sector: Sector,
    pub aggressor: FactionId,
    pub defender: FactionId,
    /// Element Atreides asked about, once asked.
    pub prescience_asked: Option<PrescienceElement>,
    /// The opponent's committed answer.
    pub prescience_answer: Option<PrescienceAnswer>,
    pub voice: Option<VoiceCommand>,
    pub aggressor_plan: Option<BattlePlan>,
    pub defender_plan: Option<BattlePlan>,
    pub aggressor_called_traitor: bool,
    pub defender_called_traitor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    /// Battles not yet fought.
    pub battles: Vec<PendingBattle>,
    pub current: Option<ActiveBattle>,
    pub awaiting: BattleAwaiting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    /// Factions with spice to collect which have not yet been asked,
    /// in storm order.
    pub queue: Vec<FactionId>,
}
