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

use data::catalog::territories::TerritoryId;
use data::core::primitives::{FactionId, Phase, Sector};
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{PhaseState, ShipmentStage, ShipmentState};
use data::requests::{
    response_from, AgentRequest, AgentResponse, RequestContext, RequestKind, ResponseData,
};
use rules::mutations::{forces, spice};
use rules::queries::{movement, shipment};
use tracing::debug;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// Shipment and movement: every faction gets one shipment and one force
/// move, in storm order, with the Spacing Guild free to act out of turn.
pub struct ShipmentPhase;

impl PhaseHandler for ShipmentPhase {
    fn phase(&self) -> Phase {
        Phase::ShipmentAndMovement
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let queue = state.storm_order.clone();
        let guild_done = !state.has_faction(FactionId::SpacingGuild);
        state.phase_state = PhaseState::Shipment(ShipmentState {
            queue,
            current: None,
            stage: ShipmentStage::Ship,
            resume: None,
            guild_done,
        });
        self.next_faction(state, vec![])
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Shipment(mut ship_state) = state.phase_state.clone() else {
            fail!("Shipment phase state is missing");
        };
        match ship_state.stage.clone() {
            ShipmentStage::GuildTiming { before } => {
                let act_now = matches!(
                    response_from(responses, FactionId::SpacingGuild).map(|r| &r.data),
                    Some(ResponseData::GuildActNow)
                );
                if act_now {
                    ship_state.queue.retain(|f| *f != FactionId::SpacingGuild);
                    ship_state.resume = Some(before);
                    state.phase_state = PhaseState::Shipment(ship_state);
                    self.start_faction_turn(state, FactionId::SpacingGuild, vec![])
                } else {
                    ship_state.queue.retain(|f| *f != before);
                    state.phase_state = PhaseState::Shipment(ship_state);
                    self.start_faction_turn(state, before, vec![])
                }
            }
            ShipmentStage::Ship => {
                let faction = ship_state.current.expect("a faction turn is in progress");
                self.handle_shipment(state, ship_state, faction, responses)
            }
            ShipmentStage::SendAdvisor { shipped_to, shipped_sector } => {
                let mut events = vec![];
                if matches!(
                    response_from(responses, FactionId::BeneGesserit).map(|r| &r.data),
                    Some(ResponseData::SendAdvisor)
                ) && forces::send_advisors(&mut state, shipped_to, shipped_sector, 1).is_ok()
                {
                    events.push(GameEvent::AdvisorSent {
                        territory: shipped_to,
                        sector: shipped_sector,
                    });
                }
                let faction = ship_state.current.expect("a faction turn is in progress");
                self.enter_move(state, ship_state, faction, events)
            }
            ShipmentStage::Intrusion { territory, sector } => {
                let mut events = vec![];
                if matches!(
                    response_from(responses, FactionId::BeneGesserit).map(|r| &r.data),
                    Some(ResponseData::BgIntrusion { become_advisors: true })
                ) {
                    let flipped = forces::flip_advisors(&mut state, territory, sector, false);
                    if flipped > 0 {
                        events.push(GameEvent::AdvisorsFlipped {
                            territory,
                            sector,
                            count: flipped,
                            to_fighters: false,
                        });
                    }
                }
                let faction = ship_state.current.expect("a faction turn is in progress");
                self.enter_move(state, ship_state, faction, events)
            }
            ShipmentStage::BgLanding { territory, sector } => {
                let mut events = vec![];
                if matches!(
                    response_from(responses, FactionId::BeneGesserit).map(|r| &r.data),
                    Some(ResponseData::FlipAdvisors { to_fighters: false })
                ) {
                    let flipped = forces::flip_advisors(&mut state, territory, sector, false);
                    if flipped > 0 {
                        events.push(GameEvent::AdvisorsFlipped {
                            territory,
                            sector,
                            count: flipped,
                            to_fighters: false,
                        });
                    }
                }
                self.enter_move(state, ship_state, FactionId::BeneGesserit, events)
            }
            ShipmentStage::Move => {
                let faction = ship_state.current.expect("a faction turn is in progress");
                self.handle_move(state, ship_state, faction, responses)
            }
        }
    }
}

impl ShipmentPhase {
    /// Advances to the next faction in the queue, interposing the Guild's
    /// elective timing decision, and closing with the Guild if it deferred
    /// to the end.
    fn next_faction(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Shipment(mut ship_state) = state.phase_state.clone() else {
            fail!("Shipment phase state is missing");
        };

        if let Some(resume) = ship_state.resume.take() {
            // A Guild interruption finished; the pre-empted faction acts now.
            ship_state.queue.retain(|f| *f != resume);
            state.phase_state = PhaseState::Shipment(ship_state);
            return self.start_faction_turn(state, resume, events);
        }

        let Some(front) = ship_state.queue.first().copied() else {
            if !ship_state.guild_done {
                state.phase_state = PhaseState::Shipment(ship_state);
                return self.start_faction_turn(state, FactionId::SpacingGuild, events);
            }
            state.phase_state = PhaseState::Shipment(ship_state);
            return Ok(StepResult::complete(state, events));
        };

        if front == FactionId::SpacingGuild {
            ship_state.queue.remove(0);
            state.phase_state = PhaseState::Shipment(ship_state);
            return self.start_faction_turn(state, FactionId::SpacingGuild, events);
        }

        if !ship_state.guild_done {
            ship_state.stage = ShipmentStage::GuildTiming { before: front };
            state.phase_state = PhaseState::Shipment(ship_state);
            let request = AgentRequest::new(
                FactionId::SpacingGuild,
                RequestKind::GuildTimingDecision,
                format!("Act before {front} or keep waiting?"),
            )
            .actions(&["ACT_NOW", "DEFER"]);
            return Ok(StepResult::suspend(state, vec![request], events));
        }

        ship_state.queue.remove(0);
        state.phase_state = PhaseState::Shipment(ship_state);
        self.start_faction_turn(state, front, events)
    }

    fn start_faction_turn(
        &self,
        mut state: GameState,
        faction: FactionId,
        events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        let PhaseState::Shipment(mut ship_state) = state.phase_state.clone() else {
            fail!("Shipment phase state is missing");
        };
        if faction == FactionId::SpacingGuild {
            ship_state.guild_done = true;
        }
        ship_state.current = Some(faction);
        ship_state.stage = ShipmentStage::Ship;

        // Ornithopter access is locked in at the start of the faction's
        // turn, before any shipment lands.
        let access = movement::has_ornithopter_access(&state, faction);
        state.faction_mut(faction).flags.ornithopters = access;

        state.phase_state = PhaseState::Shipment(ship_state);
        let request = AgentRequest::new(faction, RequestKind::ShipForces, "Ship forces?")
            .actions(&["SHIP", "PASS"]);
        Ok(StepResult::suspend(state, vec![request], events))
    }

    fn handle_shipment(
        &self,
        mut state: GameState,
        ship_state: ShipmentState,
        faction: FactionId,
        responses: &[AgentResponse],
    ) -> Value<StepResult> {
        let mut events = vec![];
        let mut landed: Option<(TerritoryId, Sector)> = None;

        match response_from(responses, faction).map(|r| &r.data) {
            Some(ResponseData::ShipForces { territory, sector, regular, elite }) => {
                let (territory, sector, regular, elite) =
                    (*territory, *sector, *regular, *elite);
                let result =
                    shipment::validate_shipment(&state, faction, territory, sector, regular, elite);
                if result.valid {
                    let count = regular + elite;
                    let cost = shipment::shipment_cost(&state, faction, territory, count);
                    spice::pay(&mut state, faction, cost)?;
                    if let Some(guild) = shipment::payment_recipient(&state, faction) {
                        spice::gain(&mut state, guild, cost);
                    }
                    forces::ship_from_reserves(
                        &mut state, faction, territory, sector, regular, elite,
                    )?;
                    state.faction_mut(faction).flags.shipped_this_turn = true;
                    landed = Some((territory, sector));
                    events.push(GameEvent::ForcesShipped {
                        faction,
                        territory,
                        sector,
                        count,
                        paid: cost,
                    });
                } else {
                    debug!(?faction, errors = ?result.errors, "Shipment rejected, passing");
                }
            }
            Some(ResponseData::GuildShip { from, to }) if faction == FactionId::SpacingGuild => {
                self.guild_ship(&mut state, *from, *to, &mut events)?;
            }
            _ => {}
        }

        self.after_shipment(state, ship_state, faction, landed, events)
    }

    /// Spacing Guild cross-shipment: board to board, or board back to
    /// reserves, at the Guild's half rate.
    fn guild_ship(
        &self,
        state: &mut GameState,
        from: (TerritoryId, Sector),
        to: Option<(TerritoryId, Sector)>,
        events: &mut Vec<GameEvent>,
    ) -> Value<()> {
        let guild = FactionId::SpacingGuild;
        let Some(stack) = state.faction(guild).stack_at(from.0, from.1).copied() else {
            return Ok(());
        };
        let count = stack.fighters();
        match to {
            Some(to) => {
                if !to.0.contains_sector(to.1)
                    || state.sector_stormed(to.0, to.1)
                    || (to.0.is_stronghold() && shipment::stronghold_full(state, guild, to.0))
                {
                    return Ok(());
                }
                let cost = shipment::shipment_cost(state, guild, to.0, count);
                if state.faction(guild).spice < cost {
                    return Ok(());
                }
                spice::pay(state, guild, cost)?;
                forces::move_forces(state, guild, from, to, stack.regular, stack.elite, 0)?;
                state.faction_mut(guild).flags.shipped_this_turn = true;
                events.push(GameEvent::ForcesShipped {
                    faction: guild,
                    territory: to.0,
                    sector: to.1,
                    count,
                    paid: cost,
                });
            }
            None => {
                let cost = (count * shipment::sector_cost(from.0) + 1) / 2;
                if state.faction(guild).spice < cost {
                    return Ok(());
                }
                spice::pay(state, guild, cost)?;
                forces::return_to_reserves(state, guild, from.0, from.1)?;
                state.faction_mut(guild).flags.shipped_this_turn = true;
                events.push(GameEvent::ForcesShipped {
                    faction: guild,
                    territory: from.0,
                    sector: from.1,
                    count,
                    paid: cost,
                });
            }
        }
        Ok(())
    }

    /// Routes Bene Gesserit reactions to a completed shipment, then enters
    /// the mover's movement step.
    fn after_shipment(
        &self,
        mut state: GameState,
        mut ship_state: ShipmentState,
        faction: FactionId,
        landed: Option<(TerritoryId, Sector)>,
        events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        let bg_active = state.config.advanced_rules && state.has_faction(FactionId::BeneGesserit);
        if let Some((territory, sector)) = landed {
            if bg_active && faction == FactionId::BeneGesserit {
                ship_state.stage = ShipmentStage::BgLanding { territory, sector };
                state.phase_state = PhaseState::Shipment(ship_state);
                let request = AgentRequest::new(
                    FactionId::BeneGesserit,
                    RequestKind::FlipAdvisors,
                    "Do your landed forces stand as fighters or advisors?",
                )
                .actions(&["FIGHTERS", "ADVISORS"]);
                return Ok(StepResult::suspend(state, vec![request], events));
            }
            if bg_active && faction != FactionId::BeneGesserit {
                let bg = state.faction(FactionId::BeneGesserit);
                let bg_fighters_here = bg
                    .stack_at(territory, sector)
                    .map(|s| s.fighters())
                    .unwrap_or(0);
                if bg_fighters_here > 0 {
                    ship_state.stage = ShipmentStage::Intrusion { territory, sector };
                    state.phase_state = PhaseState::Shipment(ship_state);
                    let request = AgentRequest::new(
                        FactionId::BeneGesserit,
                        RequestKind::BgIntrusion,
                        "Enemy forces land beside your fighters. Become advisors?",
                    )
                    .context(RequestContext::Intrusion {
                        territory,
                        sector,
                        intruder: faction,
                    })
                    .actions(&["BECOME_ADVISORS", "STAY"]);
                    return Ok(StepResult::suspend(state, vec![request], events));
                }
                let bg_in_territory =
                    bg.on_board.iter().any(|s| s.territory == territory);
                if !bg_in_territory && bg.reserves.regular > 0 {
                    ship_state.stage = ShipmentStage::SendAdvisor {
                        shipped_to: territory,
                        shipped_sector: sector,
                    };
                    state.phase_state = PhaseState::Shipment(ship_state);
                    let request = AgentRequest::new(
                        FactionId::BeneGesserit,
                        RequestKind::SendAdvisor,
                        "Send an advisor to accompany the shipment?",
                    )
                    .actions(&["SEND", "PASS"]);
                    return Ok(StepResult::suspend(state, vec![request], events));
                }
            }
        }
        self.enter_move(state, ship_state, faction, events)
    }

    fn enter_move(
        &self,
        mut state: GameState,
        mut ship_state: ShipmentState,
        faction: FactionId,
        events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        ship_state.stage = ShipmentStage::Move;
        ship_state.current = Some(faction);
        state.phase_state = PhaseState::Shipment(ship_state);
        let request = AgentRequest::new(faction, RequestKind::MoveForces, "Move forces?")
            .actions(&["MOVE", "TAKE_UP_ARMS", "PASS"]);
        Ok(StepResult::suspend(state, vec![request], events))
    }

    fn handle_move(
        &self,
        mut state: GameState,
        mut ship_state: ShipmentState,
        faction: FactionId,
        responses: &[AgentResponse],
    ) -> Value<StepResult> {
        let mut events = vec![];
        match response_from(responses, faction).map(|r| &r.data) {
            Some(ResponseData::MoveForces { from, to, regular, elite, advisors }) => {
                let (from, to) = (*from, *to);
                let (regular, elite, advisors) = (*regular, *elite, *advisors);
                let result = movement::validate_move(
                    &state, faction, from, to, regular, elite, advisors,
                );
                if result.valid {
                    forces::move_forces(&mut state, faction, from, to, regular, elite, advisors)?;
                    state.faction_mut(faction).flags.moved_this_turn = true;
                    events.push(GameEvent::ForcesMoved {
                        faction,
                        from,
                        to,
                        count: regular + elite + advisors,
                    });
                    if faction == FactionId::BeneGesserit && advisors > 0 {
                        self.bg_arrival_flips(&mut state, to, &mut events);
                    }
                } else {
                    debug!(?faction, errors = ?result.errors, "Move rejected, passing");
                }
            }
            Some(ResponseData::TakeUpArms { flips }) if faction == FactionId::BeneGesserit => {
                for (territory, sector) in flips.clone() {
                    let flipped = forces::flip_advisors(&mut state, territory, sector, true);
                    if flipped > 0 {
                        state.faction_mut(faction).flags.moved_this_turn = true;
                        events.push(GameEvent::AdvisorsFlipped {
                            territory,
                            sector,
                            count: flipped,
                            to_fighters: true,
                        });
                    }
                }
            }
            _ => {}
        }

        ship_state.current = None;
        state.phase_state = PhaseState::Shipment(ship_state);
        self.next_faction(state, events)
    }

    /// Enlistment and Adaptive Force: advisors arriving where Bene Gesserit
    /// fighters stand, or where enemy fighters stand, turn into fighters.
    fn bg_arrival_flips(
        &self,
        state: &mut GameState,
        to: (TerritoryId, Sector),
        events: &mut Vec<GameEvent>,
    ) {
        let bg = FactionId::BeneGesserit;
        let own_fighters = state
            .faction(bg)
            .stack_at(to.0, to.1)
            .map(|s| s.regular + s.elite)
            .unwrap_or(0);
        let enemy_fighters = state
            .factions
            .iter()
            .filter(|f| f.faction != bg)
            .filter_map(|f| f.stack_at(to.0, to.1))
            .map(|s| s.fighters())
            .sum::<u32>();
        if own_fighters > 0 || enemy_fighters > 0 {
            let flipped = forces::flip_advisors(state, to.0, to.1, true);
            if flipped > 0 {
                events.push(GameEvent::AdvisorsFlipped {
                    territory: to.0,
                    sector: to.1,
                    count: flipped,
                    to_fighters: true,
                });
            }
        }
    }
}
