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
use data::catalog::treachery_cards::TreacheryKind;
use data::core::primitives::{FactionId, Phase, Sector};
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{
    PhaseState, StormStage, StormState, WeatherControlWindow,
};
use data::requests::{
    response_from, AgentRequest, AgentResponse, RequestContext, RequestKind, ResponseData,
};
use rules::mutations::{cards, forces, storm};
use rules::queries::turn_order;
use tracing::debug;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// Turn-1 dials range over `0..=20`; later turns over `1..=3`.
fn dial_range(turn: u32) -> (u8, u8) {
    if turn <= 1 {
        (0, 20)
    } else {
        (1, 3)
    }
}

/// The storm: dialing, Family Atomics, Weather Control, then movement and
/// its damage.
pub struct StormPhase;

impl PhaseHandler for StormPhase {
    fn phase(&self) -> Phase {
        Phase::Storm
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        // Fremen advanced storm: from turn 2 the face-down storm card moves
        // the storm and nobody dials.
        if state.turn >= 2
            && state.config.advanced_rules
            && state.has_faction(FactionId::Fremen)
        {
            let movement = state
                .faction(FactionId::Fremen)
                .flags
                .fremen_storm_card
                .unwrap_or(1);
            let storm_state = StormState {
                stage: StormStage::FamilyAtomicsCheck,
                dialers: vec![],
                dials: vec![],
                movement,
                weather: WeatherControlWindow::NotOpened,
            };
            state.phase_state = PhaseState::Storm(storm_state);
            return self.process_step(state, &[]);
        }

        let dialers = turn_order::storm_dialers(&state)?;
        let (min, max) = dial_range(state.turn);
        let requests = dialers
            .iter()
            .map(|faction| {
                AgentRequest::new(*faction, RequestKind::DialStorm, "Dial the storm")
                    .context(RequestContext::StormDial { turn: state.turn, min, max })
            })
            .collect();
        state.phase_state = PhaseState::Storm(StormState {
            stage: StormStage::Dialing,
            dialers,
            dials: vec![],
            movement: 0,
            weather: WeatherControlWindow::NotOpened,
        });
        Ok(StepResult::suspend_simultaneous(state, requests, vec![]))
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Storm(mut storm_state) = state.phase_state.clone() else {
            fail!("Storm phase state is missing");
        };
        match storm_state.stage {
            StormStage::Dialing => {
                let (min, max) = dial_range(state.turn);
                let mut events = vec![];
                for faction in storm_state.dialers.clone() {
                    let dial = match response_from(responses, faction).map(|r| &r.data) {
                        Some(ResponseData::DialStorm { dial }) => (*dial).clamp(min, max),
                        // A missing dial becomes the minimum.
                        _ => min,
                    };
                    storm_state.dials.push((faction, dial));
                    events.push(GameEvent::StormDialRevealed { faction, dial });
                }
                storm_state.movement =
                    storm_state.dials.iter().map(|(_, dial)| *dial).sum::<u8>();
                storm_state.stage = StormStage::FamilyAtomicsCheck;
                state.phase_state = PhaseState::Storm(storm_state);
                Ok(StepResult::advance(state, events))
            }
            StormStage::FamilyAtomicsCheck => {
                self.family_atomics(state, storm_state, responses)
            }
            StormStage::WeatherControlCheck => {
                self.weather_control(state, storm_state, responses)
            }
            StormStage::ApplyMovement => self.apply_movement(state, storm_state),
        }
    }
}

impl StormPhase {
    fn family_atomics(
        &self,
        mut state: GameState,
        mut storm_state: StormState,
        responses: &[AgentResponse],
    ) -> Value<StepResult> {
        // The check happens exactly once per storm phase: either we are
        // returning with responses, or we issue the requests now.
        if !responses.is_empty() {
            let played = responses.iter().find(|r| {
                matches!(r.data, ResponseData::PlayFamilyAtomics) && !r.passed
            });
            if let Some(response) = played {
                return self.detonate(state, storm_state, response.faction);
            }
            storm_state.stage = StormStage::WeatherControlCheck;
            state.phase_state = PhaseState::Storm(storm_state);
            return self.process_step(state, &[]);
        }

        let holders: Vec<FactionId> = if state.turn >= 2 && !state.shield_wall_destroyed {
            state
                .storm_order
                .iter()
                .copied()
                .filter(|f| {
                    state
                        .faction(*f)
                        .holds_card_kind(TreacheryKind::FamilyAtomics)
                        .is_some()
                        && can_reach_shield_wall(&state, *f)
                })
                .collect()
        } else {
            vec![]
        };
        if holders.is_empty() {
            storm_state.stage = StormStage::WeatherControlCheck;
            state.phase_state = PhaseState::Storm(storm_state);
            return self.process_step(state, &[]);
        }
        let requests = holders
            .iter()
            .map(|faction| {
                AgentRequest::new(
                    *faction,
                    RequestKind::PlayFamilyAtomics,
                    "Detonate Family Atomics and destroy the Shield Wall?",
                )
                .actions(&["PLAY", "PASS"])
            })
            .collect();
        state.phase_state = PhaseState::Storm(storm_state);
        Ok(StepResult::suspend(state, requests, vec![]))
    }

    fn detonate(
        &self,
        mut state: GameState,
        mut storm_state: StormState,
        player: FactionId,
    ) -> Value<StepResult> {
        let card = state
            .faction(player)
            .holds_card_kind(TreacheryKind::FamilyAtomics)
            .expect("eligibility requires the card");
        cards::remove_from_game(&mut state, player, card)?;
        state.shield_wall_destroyed = true;

        let mut events = vec![GameEvent::ShieldWallDestroyed];
        let ids: Vec<FactionId> = state.factions.ids().collect();
        for faction in ids {
            let stacks: Vec<Sector> = state
                .faction(faction)
                .on_board
                .iter()
                .filter(|s| s.territory == TerritoryId::ShieldWall)
                .map(|s| s.sector)
                .collect();
            for sector in stacks {
                let killed = forces::send_stack_to_tanks(
                    &mut state,
                    faction,
                    TerritoryId::ShieldWall,
                    sector,
                );
                events.push(GameEvent::ForcesKilledByStorm {
                    faction,
                    territory: TerritoryId::ShieldWall,
                    sector,
                    count: killed,
                });
            }
        }

        debug!(?player, "Family Atomics detonated");
        storm_state.stage = StormStage::WeatherControlCheck;
        state.phase_state = PhaseState::Storm(storm_state);
        Ok(StepResult::advance(state, events))
    }

    fn weather_control(
        &self,
        mut state: GameState,
        mut storm_state: StormState,
        responses: &[AgentResponse],
    ) -> Value<StepResult> {
        match storm_state.weather {
            WeatherControlWindow::NotOpened => {
                let holder = if state.turn >= 2 {
                    state.storm_order.iter().copied().find(|f| {
                        state
                            .faction(*f)
                            .holds_card_kind(TreacheryKind::WeatherControl)
                            .is_some()
                    })
                } else {
                    None
                };
                let Some(holder) = holder else {
                    storm_state.stage = StormStage::ApplyMovement;
                    state.phase_state = PhaseState::Storm(storm_state);
                    return self.process_step(state, &[]);
                };
                storm_state.weather = WeatherControlWindow::Awaiting;
                let request = AgentRequest::new(
                    holder,
                    RequestKind::PlayWeatherControl,
                    "Override the storm movement with Weather Control?",
                )
                .actions(&["PLAY", "PASS"]);
                state.phase_state = PhaseState::Storm(storm_state);
                Ok(StepResult::suspend(state, vec![request], vec![]))
            }
            WeatherControlWindow::Awaiting => {
                // One-shot window: whatever came back, it closes now.
                storm_state.weather = WeatherControlWindow::Closed;
                if let Some(response) = responses.first() {
                    if let ResponseData::PlayWeatherControl { movement } = response.data {
                        if movement <= 10 && !response.passed {
                            let card = state
                                .faction(response.faction)
                                .holds_card_kind(TreacheryKind::WeatherControl);
                            if let Some(card) = card {
                                cards::discard_treachery(&mut state, response.faction, card)?;
                                storm_state.movement = movement;
                            }
                        }
                    }
                }
                storm_state.stage = StormStage::ApplyMovement;
                state.phase_state = PhaseState::Storm(storm_state);
                self.process_step(state, &[])
            }
            WeatherControlWindow::Closed => {
                storm_state.stage = StormStage::ApplyMovement;
                state.phase_state = PhaseState::Storm(storm_state);
                self.process_step(state, &[])
            }
        }
    }

    fn apply_movement(&self, mut state: GameState, storm_state: StormState) -> Value<StepResult> {
        let from = state.storm_sector;
        let damage = storm::move_storm(&mut state, storm_state.movement);

        let mut events = vec![GameEvent::StormMoved {
            from,
            to: state.storm_sector,
            sectors: storm_state.movement,
        }];
        for (faction, territory, sector, count) in damage.kills {
            events.push(GameEvent::ForcesKilledByStorm { faction, territory, sector, count });
        }
        for (territory, sector, amount) in damage.spice_destroyed {
            events.push(GameEvent::SpiceDestroyedByStorm { territory, sector, amount });
        }

        // Fremen advanced storm: recycle the revealed card and draw the next
        // one face-down for the coming turn.
        if state.config.advanced_rules && state.has_faction(FactionId::Fremen) {
            if let Some(card) = state.faction(FactionId::Fremen).flags.fremen_storm_card {
                state.decks.storm.return_to_draw(card);
            }
            state.decks.storm.shuffle(&mut state.rng);
            let next = state.decks.storm.draw_top();
            state.faction_mut(FactionId::Fremen).flags.fremen_storm_card = next;
        }

        Ok(StepResult::complete(state, events))
    }
}

/// Family Atomics eligibility: forces on the Shield Wall, or on an adjacent
/// territory in a sector with no storm between it and the Wall.
fn can_reach_shield_wall(state: &GameState, faction: FactionId) -> bool {
    let faction_state = state.faction(faction);
    if faction_state.fighters_in(TerritoryId::ShieldWall) > 0 {
        return true;
    }
    TerritoryId::ShieldWall
        .def()
        .adjacent
        .iter()
        .any(|adjacent| {
            faction_state
                .on_board
                .iter()
                .filter(|s| s.territory == *adjacent && s.fighters() > 0)
                .any(|s| no_storm_between(state.storm_sector, s.sector))
        })
}

/// Whether the storm does not sit on the shorter arc between a sector and
/// the Shield Wall's sectors, endpoints included.
fn no_storm_between(storm: Sector, from: Sector) -> bool {
    TerritoryId::ShieldWall.sectors().any(|wall| {
        let (ccw, cw) = (from.distance_ccw(wall), from.distance_cw(wall));
        if ccw <= cw {
            (0..=ccw).all(|step| from.advance(step) != storm)
        } else {
            (0..=cw).all(|step| wall.advance(step) != storm)
        }
    })
}
