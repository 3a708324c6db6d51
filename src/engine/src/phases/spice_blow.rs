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

use data::catalog::factions::SHIELD_WALL_WORM_THRESHOLD;
use data::catalog::spice_cards::{SpiceCardId, SpiceCardKind};
use data::catalog::territories::TerritoryId;
use data::core::primitives::{FactionId, Phase, Sector};
use data::events::GameEvent;
use data::game_states::decks::SpiceDeckId;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{PhaseState, SpiceBlowAwaiting, SpiceBlowState};
use data::requests::{
    AgentRequest, AgentResponse, RequestContext, RequestKind, ResponseData,
};
use rules::mutations::{alliances, forces, spice};
use rules::queries::shipment;
use tracing::debug;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// The spice blow: reveal cards, place spice, resolve Shai-Hulud, and run
/// the Nexus when a worm has appeared.
pub struct SpiceBlowPhase;

impl PhaseHandler for SpiceBlowPhase {
    fn phase(&self) -> Phase {
        Phase::SpiceBlow
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let mut deck_queue = vec![SpiceDeckId::A];
        if state.config.advanced_rules {
            deck_queue.push(SpiceDeckId::B);
        }
        let current_deck = Some(deck_queue.remove(0));
        state.phase_state = PhaseState::SpiceBlow(SpiceBlowState {
            deck_queue,
            current_deck,
            set_aside_worms: vec![],
            nexus_pending: false,
            nexus_queue: vec![],
            awaiting: SpiceBlowAwaiting::Drawing,
        });
        self.process_step(state, &[])
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::SpiceBlow(mut blow) = state.phase_state.clone() else {
            fail!("Spice blow phase state is missing");
        };
        match blow.awaiting.clone() {
            SpiceBlowAwaiting::Drawing => self.draw(state, blow, vec![]),
            SpiceBlowAwaiting::ProtectAlly { territory } => {
                let mut events = vec![];
                let protect = matches!(
                    responses.first().map(|r| &r.data),
                    Some(ResponseData::ProtectAllyFromWorm { protect: true })
                );
                if let Some(ally) = state.faction(FactionId::Fremen).ally {
                    if !protect {
                        devour_faction(&mut state, ally, territory, &mut events);
                    }
                }
                blow.awaiting = SpiceBlowAwaiting::Drawing;
                self.draw(state, blow, events)
            }
            SpiceBlowAwaiting::WormRide => match responses.first().map(|r| &r.data) {
                Some(ResponseData::WormRide { ride: true }) => {
                    let request = AgentRequest::new(
                        FactionId::Fremen,
                        RequestKind::PlaceSandworm,
                        "Choose a force stack to carry and its destination",
                    );
                    state.phase_state = PhaseState::SpiceBlow(blow);
                    Ok(StepResult::suspend(state, vec![request], vec![]))
                }
                Some(ResponseData::PlaceSandworm { from, to }) => {
                    let mut events = vec![];
                    if let Some(moved) = execute_worm_ride(&mut state, *from, *to) {
                        events.push(GameEvent::WormRideTaken { from: from.0, to: to.0 });
                        debug!(count = moved, "Fremen rode the worm");
                    }
                    self.enter_nexus(state, blow, events)
                }
                _ => self.enter_nexus(state, blow, vec![]),
            },
            SpiceBlowAwaiting::Nexus => {
                let mut events = vec![];
                if let Some(faction) = blow.nexus_queue.first().copied() {
                    apply_alliance_decision(
                        &mut state,
                        faction,
                        responses.first(),
                        &mut events,
                    );
                    blow.nexus_queue.remove(0);
                }
                match blow.nexus_queue.first().copied() {
                    Some(next) => {
                        state.phase_state = PhaseState::SpiceBlow(blow);
                        let request = nexus_request(next);
                        Ok(StepResult::suspend(state, vec![request], events))
                    }
                    None => {
                        events.push(GameEvent::NexusEnded);
                        state.phase_state = PhaseState::SpiceBlow(blow);
                        Ok(StepResult::complete(state, events))
                    }
                }
            }
        }
    }
}

impl SpiceBlowPhase {
    /// Draws from the current deck until a Territory Card resolves the
    /// deck's blow, suspending for worm decisions along the way.
    fn draw(
        &self,
        mut state: GameState,
        mut blow: SpiceBlowState,
        mut events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        while let Some(deck_id) = blow.current_deck {
            let Some(card) = draw_spice_card(&mut state, deck_id) else {
                blow.current_deck = advance_deck(&mut blow);
                continue;
            };
            events.push(GameEvent::SpiceCardRevealed { card });

            match card.def().kind {
                SpiceCardKind::Territory { territory, sector, amount } => {
                    state.decks.spice_mut(deck_id).discard(card);
                    if state.sector_stormed(territory, sector) {
                        debug!(?territory, "Spice blow lost to the storm");
                    } else {
                        spice::place_on_board(&mut state, territory, sector, amount);
                        events.push(GameEvent::SpicePlaced { territory, sector, amount });
                    }
                    blow.current_deck = advance_deck(&mut blow);
                }
                SpiceCardKind::ShaiHulud if state.turn <= 1 => {
                    // Turn-1 worms are set aside and reshuffled at phase end.
                    events.push(GameEvent::ShaiHuludAppeared { devour_territory: None });
                    blow.set_aside_worms.push(card);
                }
                SpiceCardKind::ShaiHulud => {
                    state.worm_count += 1;
                    if state.config.variants.shield_wall_stronghold
                        && state.worm_count >= SHIELD_WALL_WORM_THRESHOLD
                        && !state.shield_wall_destroyed
                    {
                        state.shield_wall_destroyed = true;
                        events.push(GameEvent::ShieldWallDestroyed);
                    }
                    let devour = topmost_territory_card(&state, deck_id);
                    state.decks.spice_mut(deck_id).discard(card);
                    blow.nexus_pending = true;
                    events.push(GameEvent::ShaiHuludAppeared { devour_territory: devour });

                    if let Some(territory) = devour {
                        // The worm stays put until turn end, doubling spice
                        // collection where it surfaced.
                        state.worms_on_board.push(territory);
                        if self.devour(&mut state, territory, &mut events) {
                            blow.awaiting = SpiceBlowAwaiting::ProtectAlly { territory };
                            let request = AgentRequest::new(
                                FactionId::Fremen,
                                RequestKind::ProtectAllyFromWorm,
                                "Shai-Hulud strikes your ally's position. Protect them?",
                            )
                            .context(RequestContext::Worm { territory })
                            .actions(&["PROTECT", "PASS"]);
                            state.phase_state = PhaseState::SpiceBlow(blow);
                            return Ok(StepResult::suspend(state, vec![request], events));
                        }
                    }
                }
            }
        }
        self.finish_decks(state, blow, events)
    }

    /// Resolves a worm devouring a territory. Returns true when the Fremen
    /// must still decide whether to protect their ally there.
    fn devour(
        &self,
        state: &mut GameState,
        territory: TerritoryId,
        events: &mut Vec<GameEvent>,
    ) -> bool {
        spice::destroy_in_territory(state, territory);

        let fremen_ally = if state.has_faction(FactionId::Fremen) {
            state.faction(FactionId::Fremen).ally
        } else {
            None
        };
        let ids: Vec<FactionId> = state.factions.ids().collect();
        let mut ally_present = false;
        for faction in ids {
            if faction == FactionId::Fremen {
                if state.faction(faction).fighters_in(territory) > 0 {
                    events.push(GameEvent::FremenWormImmunity { territory });
                }
                continue;
            }
            if Some(faction) == fremen_ally
                && state
                    .faction(faction)
                    .on_board
                    .iter()
                    .any(|s| s.territory == territory)
            {
                ally_present = true;
                continue;
            }
            devour_faction(state, faction, territory, events);
        }
        ally_present
    }

    /// All decks have resolved: reshuffle turn-1 worms, then run the Nexus
    /// if one is pending.
    fn finish_decks(
        &self,
        mut state: GameState,
        mut blow: SpiceBlowState,
        events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        if !blow.set_aside_worms.is_empty() {
            let worms = std::mem::take(&mut blow.set_aside_worms);
            let use_b = state.config.advanced_rules;
            for (index, worm) in worms.into_iter().enumerate() {
                let deck_id = if use_b && index % 2 == 1 { SpiceDeckId::B } else { SpiceDeckId::A };
                state.decks.spice_mut(deck_id).return_to_draw(worm);
            }
            state.decks.spice_a.shuffle(&mut state.rng);
            state.decks.spice_b.shuffle(&mut state.rng);
        }

        if blow.nexus_pending && state.turn >= 2 {
            if state.has_faction(FactionId::Fremen)
                && !state.faction(FactionId::Fremen).on_board.is_empty()
            {
                blow.awaiting = SpiceBlowAwaiting::WormRide;
                let request = AgentRequest::new(
                    FactionId::Fremen,
                    RequestKind::WormRide,
                    "Ride Shai-Hulud or let it roam?",
                )
                .actions(&["RIDE", "DEVOUR"]);
                state.phase_state = PhaseState::SpiceBlow(blow);
                return Ok(StepResult::suspend(state, vec![request], events));
            }
            return self.enter_nexus(state, blow, events);
        }
        state.phase_state = PhaseState::SpiceBlow(blow);
        Ok(StepResult::complete(state, events))
    }

    fn enter_nexus(
        &self,
        mut state: GameState,
        mut blow: SpiceBlowState,
        mut events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        events.push(GameEvent::NexusStarted);
        blow.awaiting = SpiceBlowAwaiting::Nexus;
        blow.nexus_queue = state.storm_order.clone();
        let Some(first) = blow.nexus_queue.first().copied() else {
            events.push(GameEvent::NexusEnded);
            state.phase_state = PhaseState::SpiceBlow(blow);
            return Ok(StepResult::complete(state, events));
        };
        state.phase_state = PhaseState::SpiceBlow(blow);
        Ok(StepResult::suspend(state, vec![nexus_request(first)], events))
    }
}

fn nexus_request(faction: FactionId) -> AgentRequest {
    AgentRequest::new(
        faction,
        RequestKind::AllianceDecision,
        "The Nexus is open: form or break an alliance",
    )
    .actions(&["FORM_ALLIANCE", "BREAK_ALLIANCE", "PASS"])
}

fn apply_alliance_decision(
    state: &mut GameState,
    faction: FactionId,
    response: Option<&AgentResponse>,
    events: &mut Vec<GameEvent>,
) {
    match response.map(|r| &r.data) {
        Some(ResponseData::FormAlliance { with }) => {
            let target = *with;
            if state.has_faction(target)
                && target != faction
                && state.faction(faction).ally.is_none()
                && state.faction(target).ally.is_none()
            {
                if alliances::form(state, faction, target).is_ok() {
                    events.push(GameEvent::AllianceFormed { factions: (faction, target) });
                }
            }
        }
        Some(ResponseData::BreakAlliance) => {
            if let Some(partner) = alliances::dissolve(state, faction) {
                events.push(GameEvent::AllianceBroken { factions: (faction, partner) });
            }
        }
        _ => {}
    }
}

fn devour_faction(
    state: &mut GameState,
    faction: FactionId,
    territory: TerritoryId,
    events: &mut Vec<GameEvent>,
) {
    let sectors: Vec<Sector> = state
        .faction(faction)
        .on_board
        .iter()
        .filter(|s| s.territory == territory)
        .map(|s| s.sector)
        .collect();
    let mut total = 0;
    for sector in sectors {
        total += forces::send_stack_to_tanks(state, faction, territory, sector);
    }
    if total > 0 {
        events.push(GameEvent::ForcesDevoured { faction, territory, count: total });
    }
}

/// Top card of the deck's discard pile that is a Territory Card; where the
/// worm devours, whether or not that card's spice was actually placed.
fn topmost_territory_card(state: &GameState, deck: SpiceDeckId) -> Option<TerritoryId> {
    state
        .decks
        .spice(deck)
        .discard
        .iter()
        .rev()
        .find_map(|card| match card.def().kind {
            SpiceCardKind::Territory { territory, .. } => Some(territory),
            SpiceCardKind::ShaiHulud => None,
        })
}

fn draw_spice_card(state: &mut GameState, deck: SpiceDeckId) -> Option<SpiceCardId> {
    if state.decks.spice(deck).draw.is_empty() {
        let discard = std::mem::take(&mut state.decks.spice_mut(deck).discard);
        state.decks.spice_mut(deck).draw = discard;
        state.decks.spice_mut(deck).shuffle(&mut state.rng);
    }
    state.decks.spice_mut(deck).draw_top()
}

fn advance_deck(blow: &mut SpiceBlowState) -> Option<SpiceDeckId> {
    if blow.deck_queue.is_empty() {
        None
    } else {
        Some(blow.deck_queue.remove(0))
    }
}

fn execute_worm_ride(
    state: &mut GameState,
    from: (TerritoryId, Sector),
    to: (TerritoryId, Sector),
) -> Option<u32> {
    let stack = state.faction(FactionId::Fremen).stack_at(from.0, from.1).copied()?;
    if !to.0.contains_sector(to.1)
        || state.sector_stormed(to.0, to.1)
        || (to.0.is_stronghold() && shipment::stronghold_full(state, FactionId::Fremen, to.0))
    {
        return None;
    }
    forces::move_forces(
        state,
        FactionId::Fremen,
        from,
        to,
        stack.regular,
        stack.elite,
        stack.advisors,
    )
    .ok()?;
    // The ridden worm travels with them.
    if let Some(worm) = state.worms_on_board.last_mut() {
        *worm = to.0;
    }
    Some(stack.total())
}
