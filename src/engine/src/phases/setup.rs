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

use data::catalog::factions::{
    starting_treachery_cards, FREMEN_STARTING_FORCES, FREMEN_STARTING_TERRITORIES,
};
use data::catalog::leaders::all_leaders;
use data::catalog::territories::TerritoryId;
use data::core::primitives::{FactionId, Phase, Sector};
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{PhaseState, SetupStage, SetupState};
use data::requests::{
    response_from, AgentRequest, AgentResponse, RequestContext, RequestKind, ResponseData,
};
use rules::mutations::{cards, forces};
use rules::queries::turn_order;
use tracing::debug;
use utils::outcome::Value;
use utils::{fail, verify};

use crate::handler::{PhaseHandler, StepResult};

/// Game setup: traitor selection, the Bene Gesserit prediction, starting
/// garrisons, and the opening card deals.
pub struct SetupPhase;

impl PhaseHandler for SetupPhase {
    fn phase(&self) -> Phase {
        Phase::Setup
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        verify!(!state.setup_complete, "Setup has already run");

        // Build and deal the traitor deck.
        let mut traitor_deck: Vec<_> = all_leaders()
            .filter(|l| state.has_faction(l.faction()))
            .collect();
        {
            use rand::seq::SliceRandom;
            traitor_deck.shuffle(&mut state.rng);
        }
        let mut candidates = vec![];
        let ids: Vec<FactionId> = state.factions.ids().collect();
        for faction in ids {
            let dealt: Vec<_> = (0..4).filter_map(|_| traitor_deck.pop()).collect();
            if faction == FactionId::Harkonnen {
                // Harkonnen keeps every candidate.
                state.faction_mut(FactionId::Harkonnen).traitors = dealt;
            } else {
                candidates.push((faction, dealt));
            }
        }
        state.decks.traitor.draw = traitor_deck;

        let requests = candidates
            .iter()
            .map(|(faction, dealt)| {
                AgentRequest::new(*faction, RequestKind::SelectTraitor, "Choose one traitor to keep")
                    .context(RequestContext::TraitorCandidates { candidates: dealt.clone() })
            })
            .collect();
        state.phase_state =
            PhaseState::Setup(SetupState { stage: SetupStage::Traitors, traitor_candidates: candidates });
        Ok(StepResult::suspend_simultaneous(state, requests, vec![]))
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Setup(setup) = state.phase_state.clone() else {
            fail!("Setup phase state is missing");
        };
        match setup.stage {
            SetupStage::Traitors => {
                for (faction, dealt) in &setup.traitor_candidates {
                    let chosen = match response_from(responses, *faction).map(|r| &r.data) {
                        Some(ResponseData::SelectTraitor { leader }) if dealt.contains(leader) => {
                            *leader
                        }
                        // Traitor selection cannot be declined; default to
                        // the first candidate dealt.
                        _ => *dealt.first().expect("four candidates were dealt"),
                    };
                    state.faction_mut(*faction).traitors = vec![chosen];
                    for unchosen in dealt.iter().filter(|l| **l != chosen) {
                        state.decks.traitor.discard(*unchosen);
                    }
                }
                self.enter_prediction(state, setup)
            }
            SetupStage::Prediction => {
                if let Some(ResponseData::BgPrediction { faction, turn }) =
                    response_from(responses, FactionId::BeneGesserit).map(|r| &r.data)
                {
                    if *faction != FactionId::BeneGesserit
                        && state.has_faction(*faction)
                        && (1..=state.config.max_turns).contains(turn)
                    {
                        state.faction_mut(FactionId::BeneGesserit).prediction =
                            Some((*faction, *turn));
                    }
                }
                self.enter_fremen_distribution(state, setup)
            }
            SetupStage::FremenDistribution => {
                if !state.has_faction(FactionId::Fremen) {
                    return self.enter_bg_placement(state, setup);
                }
                let placements = match response_from(responses, FactionId::Fremen).map(|r| &r.data)
                {
                    Some(ResponseData::DistributeForces { placements })
                        if valid_fremen_distribution(placements) =>
                    {
                        placements.clone()
                    }
                    _ => vec![(TerritoryId::SietchTabr, Sector(13), FREMEN_STARTING_FORCES)],
                };
                for (territory, sector, count) in placements {
                    forces::ship_from_reserves(
                        &mut state,
                        FactionId::Fremen,
                        territory,
                        sector,
                        count,
                        0,
                    )?;
                }
                self.enter_bg_placement(state, setup)
            }
            SetupStage::BgPlacement => {
                let (territory, sector) =
                    match response_from(responses, FactionId::BeneGesserit).map(|r| &r.data) {
                        Some(ResponseData::DistributeForces { placements })
                            if placements.len() == 1
                                && placements[0].2 == 1
                                && placements[0].0.contains_sector(placements[0].1) =>
                        {
                            (placements[0].0, placements[0].1)
                        }
                        _ => (TerritoryId::PolarSink, Sector(0)),
                    };
                forces::send_advisors(&mut state, territory, sector, 1)?;
                self.finish(state)
            }
        }
    }

    fn cleanup(&self, mut state: GameState) -> Value<GameState> {
        verify!(state.setup_complete, "Setup did not run to completion");
        Ok(state)
    }
}

impl SetupPhase {
    fn enter_prediction(&self, mut state: GameState, mut setup: SetupState) -> Value<StepResult> {
        setup.stage = SetupStage::Prediction;
        state.phase_state = PhaseState::Setup(setup.clone());
        if !state.has_faction(FactionId::BeneGesserit) {
            return self.process_step(state, &[]);
        }
        let request = AgentRequest::new(
            FactionId::BeneGesserit,
            RequestKind::BgPrediction,
            "Predict the winning faction and turn",
        );
        Ok(StepResult::suspend(state, vec![request], vec![]))
    }

    fn enter_fremen_distribution(
        &self,
        mut state: GameState,
        mut setup: SetupState,
    ) -> Value<StepResult> {
        setup.stage = SetupStage::FremenDistribution;
        state.phase_state = PhaseState::Setup(setup.clone());
        if !state.has_faction(FactionId::Fremen) {
            return self.process_step(state, &[]);
        }
        let request = AgentRequest::new(
            FactionId::Fremen,
            RequestKind::DistributeForces,
            "Distribute ten forces across Sietch Tabr, False Wall South and False Wall West",
        );
        Ok(StepResult::suspend(state, vec![request], vec![]))
    }

    fn enter_bg_placement(&self, mut state: GameState, mut setup: SetupState) -> Value<StepResult> {
        setup.stage = SetupStage::BgPlacement;
        state.phase_state = PhaseState::Setup(setup.clone());
        if !state.has_faction(FactionId::BeneGesserit) {
            return self.finish(state);
        }
        let request = AgentRequest::new(
            FactionId::BeneGesserit,
            RequestKind::DistributeForces,
            "Place your starting advisor anywhere on the board",
        );
        Ok(StepResult::suspend(state, vec![request], vec![]))
    }

    fn finish(&self, mut state: GameState) -> Value<StepResult> {
        // Fixed starting garrisons.
        let ids: Vec<FactionId> = state.factions.ids().collect();
        for faction in ids.iter().copied() {
            for (territory, sector, count) in faction.def().starting_garrison {
                forces::ship_from_reserves(
                    &mut state,
                    faction,
                    *territory,
                    Sector(*sector),
                    *count,
                    0,
                )?;
            }
        }

        // Opening treachery deal.
        for faction in ids.iter().copied() {
            for _ in 0..starting_treachery_cards(faction) {
                let drawn = cards::draw_treachery(&mut state, faction);
                debug!(?faction, ?drawn, "Dealt starting treachery card");
            }
        }

        // The Fremen storm deck starts with one face-down card.
        if state.config.advanced_rules && state.has_faction(FactionId::Fremen) {
            let card = state.decks.storm.draw_top();
            state.faction_mut(FactionId::Fremen).flags.fremen_storm_card = card;
        }

        state.turn = 1;
        state.setup_complete = true;
        state.storm_order = turn_order::storm_order(&state);
        Ok(StepResult::complete(state, vec![]))
    }
}

fn valid_fremen_distribution(placements: &[(TerritoryId, Sector, u32)]) -> bool {
    placements.iter().map(|(_, _, count)| count).sum::<u32>() == FREMEN_STARTING_FORCES
        && placements.iter().all(|(territory, sector, _)| {
            FREMEN_STARTING_TERRITORIES.contains(territory) && territory.contains_sector(*sector)
        })
}
