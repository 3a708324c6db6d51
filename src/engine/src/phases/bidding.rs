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

use data::core::primitives::{FactionId, Phase, SpiceAmount};
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{BiddingAwaiting, BiddingState, PhaseState};
use data::requests::{
    response_from, AgentRequest, AgentResponse, RequestContext, RequestKind, ResponseData,
};
use rules::mutations::{cards, spice};
use rules::queries::karama;
use tracing::debug;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// The treachery card auction.
pub struct BiddingPhase;

impl PhaseHandler for BiddingPhase {
    fn phase(&self) -> Phase {
        Phase::Bidding
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let cards_total = state
            .storm_order
            .iter()
            .filter(|f| !state.faction(**f).hand_is_full())
            .count() as u32;
        state.phase_state = PhaseState::Bidding(BiddingState {
            cards_total,
            auction_index: 0,
            current_card: None,
            opener: None,
            previous_opener: None,
            peeked_indices: vec![],
            active_bidders: vec![],
            next_bidder: 0,
            high_bid: None,
            set_aside: vec![],
            awaiting: BiddingAwaiting::Advancing,
        });
        self.advance_auction(state, vec![])
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Bidding(mut bidding) = state.phase_state.clone() else {
            fail!("Bidding phase state is missing");
        };
        match bidding.awaiting.clone() {
            BiddingAwaiting::Advancing => {
                state.phase_state = PhaseState::Bidding(bidding);
                self.advance_auction(state, vec![])
            }
            BiddingAwaiting::Peek => {
                let mut events = vec![];
                if let Some(response) = response_from(responses, FactionId::Atreides) {
                    debug!(passed = response.passed, "Atreides finished peeking");
                    events.push(GameEvent::CardPeeked {
                        faction: FactionId::Atreides,
                        card_index: bidding.auction_index,
                    });
                }
                bidding.awaiting = BiddingAwaiting::Advancing;
                self.open_bidding(state, bidding, events)
            }
            BiddingAwaiting::Bid { bidder } => {
                self.handle_bid(state, bidding, bidder, responses)
            }
        }
    }

    fn cleanup(&self, mut state: GameState) -> Value<GameState> {
        // Unsold cards return to the deck, which is then shuffled.
        if let PhaseState::Bidding(bidding) = state.phase_state.clone() {
            if !bidding.set_aside.is_empty() {
                for card in bidding.set_aside {
                    state.decks.treachery.return_to_draw(card);
                }
                state.decks.treachery.shuffle(&mut state.rng);
            }
        }
        Ok(state)
    }
}

impl BiddingPhase {
    /// Starts the next auction, or completes the phase when every card has
    /// been offered.
    fn advance_auction(
        &self,
        mut state: GameState,
        mut events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        let PhaseState::Bidding(mut bidding) = state.phase_state.clone() else {
            fail!("Bidding phase state is missing");
        };

        if bidding.auction_index >= bidding.cards_total {
            events.push(GameEvent::BiddingComplete {
                cards_sold: bidding.auction_index.saturating_sub(bidding.set_aside.len() as u32),
            });
            state.phase_state = PhaseState::Bidding(bidding);
            return Ok(StepResult::complete(state, events));
        }

        // Eligibility is hand-size at auction start.
        let eligible: Vec<FactionId> = state
            .storm_order
            .iter()
            .copied()
            .filter(|f| !state.faction(*f).hand_is_full())
            .collect();
        if eligible.is_empty() {
            // Everyone is full; the remaining cards stay in the deck.
            events.push(GameEvent::BiddingComplete {
                cards_sold: bidding.auction_index.saturating_sub(bidding.set_aside.len() as u32),
            });
            state.phase_state = PhaseState::Bidding(bidding);
            return Ok(StepResult::complete(state, events));
        }

        let Some(card) = state.decks.treachery.draw_top() else {
            events.push(GameEvent::BiddingComplete {
                cards_sold: bidding.auction_index.saturating_sub(bidding.set_aside.len() as u32),
            });
            state.phase_state = PhaseState::Bidding(bidding);
            return Ok(StepResult::complete(state, events));
        };

        let opener = starting_bidder(&state.storm_order, &eligible, bidding.previous_opener);
        bidding.current_card = Some(card);
        bidding.opener = Some(opener);
        bidding.active_bidders = rotate_from(&eligible, opener);
        bidding.next_bidder = 0;
        bidding.high_bid = None;
        events.push(GameEvent::AuctionStarted {
            card_index: bidding.auction_index,
            total_cards: bidding.cards_total,
        });

        // Atreides sees each card before bidding opens, once per card
        // index. The peek is purely informational, so it happens whether or
        // not Atreides can bid on the card.
        if state.has_faction(FactionId::Atreides)
            && !bidding.peeked_indices.contains(&bidding.auction_index)
        {
            bidding.peeked_indices.push(bidding.auction_index);
            bidding.awaiting = BiddingAwaiting::Peek;
            let request = AgentRequest::new(
                FactionId::Atreides,
                RequestKind::PeekCard,
                "You foresee the card about to be auctioned",
            )
            .context(RequestContext::PeekedCard { card, card_index: bidding.auction_index });
            state.phase_state = PhaseState::Bidding(bidding);
            return Ok(StepResult::suspend(state, vec![request], events));
        }

        self.open_bidding(state, bidding, events)
    }

    fn open_bidding(
        &self,
        mut state: GameState,
        mut bidding: BiddingState,
        events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        let bidder = bidding.active_bidders[bidding.next_bidder % bidding.active_bidders.len()];
        bidding.awaiting = BiddingAwaiting::Bid { bidder };
        let request = bid_request(&bidding, bidder);
        state.phase_state = PhaseState::Bidding(bidding);
        Ok(StepResult::suspend(state, vec![request], events))
    }

    fn handle_bid(
        &self,
        mut state: GameState,
        mut bidding: BiddingState,
        bidder: FactionId,
        responses: &[AgentResponse],
    ) -> Value<StepResult> {
        let mut events = vec![];
        let response = response_from(responses, bidder);
        let action = classify_bid(&state, &bidding, bidder, response);

        match action {
            BidAction::KaramaFreeCard { karama_card } => {
                cards::remove_from_game(&mut state, bidder, karama_card)?;
                state.faction_mut(bidder).flags.karama_free_card_active = true;
                return self.resolve_auction(state, bidding, bidder, 0, events);
            }
            BidAction::Bid { amount, karama } => {
                if karama {
                    state.faction_mut(bidder).flags.karama_bidding_active = true;
                }
                bidding.high_bid = Some((bidder, amount));
                events.push(GameEvent::BidPlaced { faction: bidder, amount });
                advance_rotation(&mut bidding);
            }
            BidAction::Pass => {
                events.push(GameEvent::BidPassed { faction: bidder });
                bidding.active_bidders.retain(|f| *f != bidder);
                if bidding.next_bidder >= bidding.active_bidders.len() {
                    bidding.next_bidder = 0;
                }
            }
        }

        // Auction ends when the high bidder is the only one left standing,
        // or when everyone has passed.
        match (&bidding.high_bid, bidding.active_bidders.len()) {
            (Some((winner, amount)), 1) if bidding.active_bidders[0] == *winner => {
                let (winner, amount) = (*winner, *amount);
                self.resolve_auction(state, bidding, winner, amount, events)
            }
            (None, 0) => {
                // Nobody wanted it; set the card aside for phase end.
                let card = bidding.current_card.take().expect("an auction is open");
                bidding.set_aside.push(card);
                events.push(GameEvent::CardReturnedToDeck { card_index: bidding.auction_index });
                bidding.previous_opener = bidding.opener;
                bidding.auction_index += 1;
                bidding.awaiting = BiddingAwaiting::Advancing;
                state.phase_state = PhaseState::Bidding(bidding);
                self.advance_auction(state, events)
            }
            _ => self.open_bidding(state, bidding, events),
        }
    }

    fn resolve_auction(
        &self,
        mut state: GameState,
        mut bidding: BiddingState,
        winner: FactionId,
        amount: SpiceAmount,
        mut events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        let card = bidding.current_card.take().expect("an auction is open");
        let free = state.faction(winner).flags.karama_free_card_active;

        // Hand overflow here is defensive only; eligibility was checked at
        // auction start.
        if state.faction(winner).hand_is_full() {
            state.decks.treachery.return_to_draw(card);
            state.decks.treachery.shuffle(&mut state.rng);
            events.push(GameEvent::CardReturnedToDeck { card_index: bidding.auction_index });
        } else {
            let paid = if free {
                0
            } else if state.faction(winner).flags.karama_bidding_active {
                // Karama bids may exceed the treasury; the winner pays what
                // it actually holds.
                amount.min(state.faction(winner).spice)
            } else {
                amount
            };
            if paid > 0 {
                spice::pay(&mut state, winner, paid)?;
                match payment_recipient(&state, winner) {
                    Some(emperor) => spice::gain(&mut state, emperor, paid),
                    None => {}
                }
            }
            cards::add_to_hand(&mut state, winner, card)?;
            events.push(GameEvent::CardWon {
                faction: winner,
                card_index: bidding.auction_index,
                paid,
            });

            // Harkonnen draw a free extra card with every purchase.
            if winner == FactionId::Harkonnen && !state.faction(winner).hand_is_full() {
                let bonus = cards::draw_treachery(&mut state, winner);
                debug!(?bonus, "Harkonnen took the top card");
            }
        }

        let flags = &mut state.faction_mut(winner).flags;
        flags.karama_bidding_active = false;
        flags.karama_free_card_active = false;

        bidding.previous_opener = bidding.opener;
        bidding.auction_index += 1;
        bidding.awaiting = BiddingAwaiting::Advancing;
        state.phase_state = PhaseState::Bidding(bidding);
        self.advance_auction(state, events)
    }
}

enum BidAction {
    Bid { amount: SpiceAmount, karama: bool },
    KaramaFreeCard { karama_card: data::catalog::treachery_cards::TreacheryCardId },
    Pass,
}

fn classify_bid(
    state: &GameState,
    bidding: &BiddingState,
    bidder: FactionId,
    response: Option<&AgentResponse>,
) -> BidAction {
    let floor = bidding.high_bid.map(|(_, amount)| amount + 1).unwrap_or(1);
    match response.map(|r| &r.data) {
        Some(ResponseData::Bid { amount }) => {
            if *amount >= floor && *amount <= state.faction(bidder).spice {
                BidAction::Bid { amount: *amount, karama: false }
            } else {
                BidAction::Pass
            }
        }
        Some(ResponseData::KaramaBid { amount, karama_card }) => {
            if *amount >= floor && karama::can_use_karama(state, bidder, *karama_card) {
                BidAction::Bid { amount: *amount, karama: true }
            } else {
                BidAction::Pass
            }
        }
        Some(ResponseData::KaramaFreeCard { karama_card }) => {
            if karama::can_use_karama(state, bidder, *karama_card) {
                BidAction::KaramaFreeCard { karama_card: *karama_card }
            } else {
                BidAction::Pass
            }
        }
        _ => BidAction::Pass,
    }
}

fn bid_request(bidding: &BiddingState, bidder: FactionId) -> AgentRequest {
    AgentRequest::new(bidder, RequestKind::BidOrPass, "Bid on the treachery card or pass")
        .context(RequestContext::Auction {
            card_index: bidding.auction_index,
            total_cards: bidding.cards_total,
            high_bid: bidding.high_bid,
        })
        .actions(&["BID", "PASS", "KARAMA_BID", "KARAMA_FREE_CARD"])
}

/// First auction: the first eligible faction in storm order. Later auctions:
/// the first eligible faction after the faction which opened the previous
/// auction, walking the storm order circularly.
fn starting_bidder(
    storm_order: &[FactionId],
    eligible: &[FactionId],
    previous_opener: Option<FactionId>,
) -> FactionId {
    let Some(previous) = previous_opener else {
        return eligible[0];
    };
    let start = storm_order.iter().position(|f| *f == previous).unwrap_or(0);
    for offset in 1..=storm_order.len() {
        let candidate = storm_order[(start + offset) % storm_order.len()];
        if eligible.contains(&candidate) {
            return candidate;
        }
    }
    eligible[0]
}

fn rotate_from(eligible: &[FactionId], opener: FactionId) -> Vec<FactionId> {
    let start = eligible.iter().position(|f| *f == opener).unwrap_or(0);
    let mut rotation = eligible.to_vec();
    rotation.rotate_left(start);
    rotation
}

fn advance_rotation(bidding: &mut BiddingState) {
    if !bidding.active_bidders.is_empty() {
        bidding.next_bidder = (bidding.next_bidder + 1) % bidding.active_bidders.len();
    }
}

fn payment_recipient(state: &GameState, winner: FactionId) -> Option<FactionId> {
    if winner != FactionId::Emperor && state.has_faction(FactionId::Emperor) {
        Some(FactionId::Emperor)
    } else {
        None
    }
}
