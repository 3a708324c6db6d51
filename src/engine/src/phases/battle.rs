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
use data::catalog::treachery_cards::{TreacheryCardId, TreacheryKind};
use data::core::primitives::{FactionId, Phase, Sector};
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{
    ActiveBattle, BattleAwaiting, BattleLeader, BattlePlan, BattleState, PhaseState,
    PrescienceAnswer, PrescienceElement, VoiceCardKind,
};
use data::requests::{
    response_from, AgentRequest, AgentResponse, BattlePlanSpec, RequestContext, RequestKind,
    ResponseData,
};
use rules::mutations::{cards, forces, leaders, spice};
use rules::queries::battle as battle_rules;
use tracing::debug;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// The battle phase: every contested territory is fought out, aggressors in
/// storm order.
pub struct BattlePhase;

impl PhaseHandler for BattlePhase {
    fn phase(&self) -> Phase {
        Phase::Battle
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let battles = battle_rules::pending_battles(&state);
        state.phase_state = PhaseState::Battle(BattleState {
            battles,
            current: None,
            awaiting: BattleAwaiting::Advancing,
        });
        self.next_battle(state, vec![])
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Battle(mut battle_state) = state.phase_state.clone() else {
            fail!("Battle phase state is missing");
        };
        match battle_state.awaiting.clone() {
            BattleAwaiting::Advancing => {
                state.phase_state = PhaseState::Battle(battle_state);
                self.next_battle(state, vec![])
            }
            BattleAwaiting::ChooseBattle { aggressor } => {
                let options = battle_rules::battles_for(&battle_state.battles, aggressor);
                let chosen = match response_from(responses, aggressor).map(|r| &r.data) {
                    Some(ResponseData::ChooseBattle { territory, sector }) => options
                        .iter()
                        .find(|b| b.territory == *territory && b.sector == *sector)
                        .cloned(),
                    _ => None,
                }
                .or_else(|| options.first().cloned());
                let Some(battle) = chosen else {
                    state.phase_state = PhaseState::Battle(battle_state);
                    return self.next_battle(state, vec![]);
                };
                state.phase_state = PhaseState::Battle(battle_state);
                self.start_battle(state, battle.territory, battle.sector, aggressor)
            }
            BattleAwaiting::Prescience => {
                let battle = current(&battle_state)?;
                let atreides_side = FactionId::Atreides;
                match response_from(responses, atreides_side).map(|r| &r.data) {
                    Some(ResponseData::UsePrescience { element }) => {
                        let element = *element;
                        let mut battle = battle.clone();
                        battle.prescience_asked = Some(element);
                        let opponent = opponent_of(&battle, atreides_side);
                        battle_state.current = Some(battle);
                        battle_state.awaiting = BattleAwaiting::PrescienceAnswer { element };
                        state.phase_state = PhaseState::Battle(battle_state);
                        let request = AgentRequest::new(
                            opponent,
                            RequestKind::RevealPrescienceElement,
                            "Answer the prescient question truthfully",
                        )
                        .context(RequestContext::PrescienceQuestion { element });
                        Ok(StepResult::suspend(
                            state,
                            vec![request],
                            vec![GameEvent::PrescienceUsed { element }],
                        ))
                    }
                    _ => {
                        battle_state.awaiting = BattleAwaiting::Advancing;
                        state.phase_state = PhaseState::Battle(battle_state);
                        self.enter_voice(state, vec![])
                    }
                }
            }
            BattleAwaiting::PrescienceAnswer { element } => {
                let battle = current(&battle_state)?;
                let opponent = opponent_of(battle, FactionId::Atreides);
                // An answer that does not address the question asked is no
                // answer at all.
                let answer = match (element, response_from(responses, opponent).map(|r| &r.data)) {
                    (
                        PrescienceElement::Leader,
                        Some(ResponseData::RevealLeader { leader }),
                    ) => Some(PrescienceAnswer::Leader(*leader)),
                    (
                        PrescienceElement::Weapon | PrescienceElement::Defense,
                        Some(ResponseData::RevealCard { card }),
                    ) => Some(PrescienceAnswer::Card(*card)),
                    (
                        PrescienceElement::Number,
                        Some(ResponseData::RevealNumber { number }),
                    ) => Some(PrescienceAnswer::Number(*number)),
                    _ => None,
                };
                let mut battle = battle.clone();
                battle.prescience_answer = answer;
                battle_state.current = Some(battle);
                state.phase_state = PhaseState::Battle(battle_state);
                self.enter_voice(state, vec![])
            }
            BattleAwaiting::Voice => {
                let battle = current(&battle_state)?;
                let mut battle = battle.clone();
                if let Some(ResponseData::UseVoice { command }) =
                    response_from(responses, FactionId::BeneGesserit).map(|r| &r.data)
                {
                    battle.voice = Some(*command);
                    battle_state.current = Some(battle);
                    state.phase_state = PhaseState::Battle(battle_state);
                    return self.enter_plans(
                        state,
                        vec![GameEvent::VoiceUsed { command: *command }],
                    );
                }
                battle_state.current = Some(battle);
                state.phase_state = PhaseState::Battle(battle_state);
                self.enter_plans(state, vec![])
            }
            BattleAwaiting::Plans => self.handle_plans(state, battle_state, responses),
            BattleAwaiting::TraitorCalls => {
                self.handle_traitor_calls(state, battle_state, responses)
            }
            BattleAwaiting::CaptureChoice { leader } => {
                let mut events = vec![];
                let capture = matches!(
                    response_from(responses, FactionId::Harkonnen).map(|r| &r.data),
                    Some(ResponseData::CaptureLeader { capture: true })
                );
                let owner = leader.faction();
                if capture {
                    leaders::capture(&mut state, owner, FactionId::Harkonnen, leader)?;
                    events.push(GameEvent::LeaderCaptured {
                        by: FactionId::Harkonnen,
                        leader,
                    });
                } else {
                    leaders::kill(&mut state, owner, leader)?;
                    spice::gain(&mut state, FactionId::Harkonnen, leader.strength());
                    events.push(GameEvent::LeaderKilled { faction: owner, leader });
                }
                self.release_prisoners(&mut state, &mut events);
                battle_state.awaiting = BattleAwaiting::Advancing;
                state.phase_state = PhaseState::Battle(battle_state);
                self.finish_battle(state, events)
            }
            BattleAwaiting::WinnerDiscards { faction, played } => {
                let mut events = vec![];
                if let Some(ResponseData::DiscardCards { cards: chosen }) =
                    response_from(responses, faction).map(|r| &r.data)
                {
                    for card in chosen.iter().filter(|c| played.contains(c)) {
                        if cards::discard_treachery(&mut state, faction, *card).is_ok() {
                            events.push(GameEvent::CardDiscarded { faction, card: *card });
                        }
                    }
                }
                battle_state.awaiting = BattleAwaiting::Advancing;
                state.phase_state = PhaseState::Battle(battle_state);
                self.finish_battle(state, events)
            }
        }
    }
}

impl BattlePhase {
    /// Picks the next battle: the first faction in storm order with a fight
    /// on its hands becomes the aggressor.
    fn next_battle(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Battle(mut battle_state) = state.phase_state.clone() else {
            fail!("Battle phase state is missing");
        };
        battle_state.current = None;

        let aggressor = state
            .storm_order
            .iter()
            .copied()
            .find(|f| !battle_rules::battles_for(&battle_state.battles, *f).is_empty());
        let Some(aggressor) = aggressor else {
            state.phase_state = PhaseState::Battle(battle_state);
            return Ok(StepResult::complete(state, events));
        };

        let options = battle_rules::battles_for(&battle_state.battles, aggressor);
        if options.len() == 1 {
            let battle = options[0].clone();
            state.phase_state = PhaseState::Battle(battle_state);
            return self.start_battle_with_events(
                state,
                battle.territory,
                battle.sector,
                aggressor,
                events,
            );
        }
        battle_state.awaiting = BattleAwaiting::ChooseBattle { aggressor };
        state.phase_state = PhaseState::Battle(battle_state);
        let request = AgentRequest::new(
            aggressor,
            RequestKind::ChooseBattle,
            "Choose which of your battles to fight first",
        )
        .context(RequestContext::BattleChoices {
            battles: options.iter().map(|b| (b.territory, b.sector)).collect(),
        });
        Ok(StepResult::suspend(state, vec![request], events))
    }

    fn start_battle(
        &self,
        state: GameState,
        territory: TerritoryId,
        sector: Sector,
        aggressor: FactionId,
    ) -> Value<StepResult> {
        self.start_battle_with_events(state, territory, sector, aggressor, vec![])
    }

    fn start_battle_with_events(
        &self,
        mut state: GameState,
        territory: TerritoryId,
        sector: Sector,
        aggressor: FactionId,
        mut events: Vec<GameEvent>,
    ) -> Value<StepResult> {
        let PhaseState::Battle(mut battle_state) = state.phase_state.clone() else {
            fail!("Battle phase state is missing");
        };
        let battle = battle_state
            .battles
            .iter()
            .find(|b| b.territory == territory && b.sector == sector)
            .cloned();
        let Some(battle) = battle else {
            fail!("No pending battle at {:?} {}", territory, sector);
        };
        let defender = battle
            .factions
            .iter()
            .copied()
            .find(|f| *f != aggressor)
            .expect("battles have two sides");

        events.push(GameEvent::BattleStarted { territory, sector, aggressor, defender });
        battle_state.current = Some(ActiveBattle {
            territory,
            sector,
            aggressor,
            defender,
            prescience_asked: None,
            prescience_answer: None,
            voice: None,
            aggressor_plan: None,
            defender_plan: None,
            aggressor_called_traitor: false,
            defender_called_traitor: false,
        });

        // Prescience comes first when Atreides is fighting.
        let atreides_fighting =
            aggressor == FactionId::Atreides || defender == FactionId::Atreides;
        if atreides_fighting {
            battle_state.awaiting = BattleAwaiting::Prescience;
            state.phase_state = PhaseState::Battle(battle_state);
            let request = AgentRequest::new(
                FactionId::Atreides,
                RequestKind::UsePrescience,
                "Ask about one element of the enemy battle plan?",
            )
            .actions(&["LEADER", "WEAPON", "DEFENSE", "NUMBER", "PASS"]);
            return Ok(StepResult::suspend(state, vec![request], events));
        }
        state.phase_state = PhaseState::Battle(battle_state);
        self.enter_voice(state, events)
    }

    fn enter_voice(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Battle(mut battle_state) = state.phase_state.clone() else {
            fail!("Battle phase state is missing");
        };
        let battle = current(&battle_state)?.clone();
        let bg_fighting = battle.aggressor == FactionId::BeneGesserit
            || battle.defender == FactionId::BeneGesserit;
        if bg_fighting {
            battle_state.awaiting = BattleAwaiting::Voice;
            state.phase_state = PhaseState::Battle(battle_state);
            let request = AgentRequest::new(
                FactionId::BeneGesserit,
                RequestKind::UseVoice,
                "Command your opponent's battle plan with the Voice?",
            )
            .actions(&["COMMAND", "PASS"]);
            return Ok(StepResult::suspend(state, vec![request], events));
        }
        state.phase_state = PhaseState::Battle(battle_state);
        self.enter_plans(state, events)
    }

    fn enter_plans(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Battle(mut battle_state) = state.phase_state.clone() else {
            fail!("Battle phase state is missing");
        };
        let battle = current(&battle_state)?.clone();
        battle_state.awaiting = BattleAwaiting::Plans;
        state.phase_state = PhaseState::Battle(battle_state);
        let requests = [battle.aggressor, battle.defender]
            .into_iter()
            .map(|faction| {
                let opponent = opponent_of(&battle, faction);
                let mut request = AgentRequest::new(
                    faction,
                    RequestKind::CreateBattlePlan,
                    "Commit your battle plan",
                )
                .context(RequestContext::Battle {
                    territory: battle.territory,
                    sector: battle.sector,
                    opponent,
                });
                if Some(faction) == voiced_side(&battle) {
                    if let Some(command) = battle.voice {
                        request = request.context(RequestContext::VoiceCommanded { command });
                    }
                }
                request
            })
            .collect();
        Ok(StepResult::suspend_simultaneous(state, requests, events))
    }

    fn handle_plans(
        &self,
        mut state: GameState,
        mut battle_state: BattleState,
        responses: &[AgentResponse],
    ) -> Value<StepResult> {
        let mut battle = current(&battle_state)?.clone();
        let mut events = vec![];

        for side in [battle.aggressor, battle.defender] {
            let spec = match response_from(responses, side).map(|r| &r.data) {
                Some(ResponseData::CreateBattlePlan { plan }) => Some(plan.clone()),
                _ => None,
            };
            let mut plan = self.accept_plan(&state, &battle, side, spec);
            if Some(side) == voiced_side(&battle) {
                if let Some(command) = battle.voice {
                    enforce_voice(&state, side, &mut plan, command);
                }
            }
            if Some(side) == prescient_target(&battle) {
                enforce_prescience(&battle, &mut plan);
            }
            if plan.kwisatz_haderach {
                events.push(GameEvent::KwisatzHaderachActivated);
            }
            events.push(GameEvent::BattlePlanSubmitted { faction: side });
            if side == battle.aggressor {
                battle.aggressor_plan = Some(plan);
            } else {
                battle.defender_plan = Some(plan);
            }
        }

        // Traitor calls, where either side holds the right card.
        let aggressor_can = battle_rules::traitor_call_valid(
            &state,
            battle.aggressor,
            battle.defender_plan.as_ref().expect("plan just set"),
        );
        let defender_can = battle_rules::traitor_call_valid(
            &state,
            battle.defender,
            battle.aggressor_plan.as_ref().expect("plan just set"),
        );
        if aggressor_can || defender_can {
            let mut requests = vec![];
            for (side, can) in
                [(battle.aggressor, aggressor_can), (battle.defender, defender_can)]
            {
                if can {
                    requests.push(
                        AgentRequest::new(
                            side,
                            RequestKind::CallTraitor,
                            "The enemy leader may be in your pay. Call traitor?",
                        )
                        .actions(&["CALL", "PASS"]),
                    );
                }
            }
            battle_state.current = Some(battle);
            battle_state.awaiting = BattleAwaiting::TraitorCalls;
            state.phase_state = PhaseState::Battle(battle_state);
            return Ok(StepResult::suspend_simultaneous(state, requests, events));
        }

        battle_state.current = Some(battle);
        state.phase_state = PhaseState::Battle(battle_state);
        self.resolve(state, events)
    }

    fn accept_plan(
        &self,
        state: &GameState,
        battle: &ActiveBattle,
        side: FactionId,
        spec: Option<BattlePlanSpec>,
    ) -> BattlePlan {
        if let Some(spec) = spec {
            let result = battle_rules::validate_plan(
                state,
                side,
                battle.territory,
                battle.sector,
                &spec,
            );
            if result.valid {
                return BattlePlan {
                    leader: spec.leader,
                    forces_dialed: spec.forces_dialed,
                    spice_dialed: spec.spice_dialed,
                    weapon: spec.weapon,
                    defense: spec.defense,
                    kwisatz_haderach: spec.kwisatz_haderach,
                };
            }
            debug!(?side, errors = ?result.errors, "Battle plan rejected, using default");
        }
        battle_rules::default_plan(state, side, battle.territory, battle.sector)
    }

    fn handle_traitor_calls(
        &self,
        mut state: GameState,
        mut battle_state: BattleState,
        responses: &[AgentResponse],
    ) -> Value<StepResult> {
        let mut battle = current(&battle_state)?.clone();
        for response in responses {
            if matches!(response.data, ResponseData::CallTraitor) && !response.passed {
                if response.faction == battle.aggressor {
                    battle.aggressor_called_traitor = true;
                } else if response.faction == battle.defender {
                    battle.defender_called_traitor = true;
                }
            }
        }
        battle_state.current = Some(battle);
        state.phase_state = PhaseState::Battle(battle_state);
        self.resolve(state, vec![])
    }

    /// Resolves the current battle to completion, suspending only for the
    /// Harkonnen capture choice and the winner's discard window.
    fn resolve(&self, mut state: GameState, mut events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Battle(mut battle_state) = state.phase_state.clone() else {
            fail!("Battle phase state is missing");
        };
        let battle = current(&battle_state)?.clone();
        let ap = battle.aggressor_plan.clone().expect("plans are committed");
        let dp = battle.defender_plan.clone().expect("plans are committed");

        let aggressor_call = battle.aggressor_called_traitor
            && battle_rules::traitor_call_valid(&state, battle.aggressor, &dp);
        let defender_call = battle.defender_called_traitor
            && battle_rules::traitor_call_valid(&state, battle.defender, &ap);

        if aggressor_call && defender_call {
            // Two traitors: both plans fail and both sides lose everything.
            for (side, plan) in
                [(battle.aggressor, &dp), (battle.defender, &ap)]
            {
                let leader = battle_rules::named_leader(plan).expect("traitor calls need leaders");
                events.push(GameEvent::TraitorRevealed { caller: side, leader });
            }
            for (side, plan) in [(battle.aggressor, &ap), (battle.defender, &dp)] {
                if let Some(leader) = battle_rules::named_leader(plan) {
                    leaders::kill(&mut state, side, leader)?;
                    events.push(GameEvent::LeaderKilled { faction: side, leader });
                }
                spice::pay(&mut state, side, plan.spice_dialed)?;
                self.lose_battle(&mut state, side, &battle, plan, &mut events)?;
            }
            events.push(GameEvent::BattleResolved {
                territory: battle.territory,
                winner: None,
                loser: None,
                aggressor_strength_halves: 0,
                defender_strength_halves: 0,
            });
            self.release_prisoners(&mut state, &mut events);
            battle_state.awaiting = BattleAwaiting::Advancing;
            state.phase_state = PhaseState::Battle(battle_state);
            return self.finish_battle(state, events);
        }

        if aggressor_call || defender_call {
            let (winner, loser) = if aggressor_call {
                (battle.aggressor, battle.defender)
            } else {
                (battle.defender, battle.aggressor)
            };
            let (winner_plan, loser_plan) = if aggressor_call { (&ap, &dp) } else { (&dp, &ap) };
            let traitor =
                battle_rules::named_leader(loser_plan).expect("traitor calls need leaders");
            events.push(GameEvent::TraitorRevealed { caller: winner, leader: traitor });
            leaders::kill(&mut state, loser, traitor)?;
            events.push(GameEvent::LeaderKilled { faction: loser, leader: traitor });

            // Rule 1.13.05: a revealed traitor lets the winner keep their
            // dialed spice. The loser still pays.
            spice::pay(&mut state, loser, loser_plan.spice_dialed)?;
            self.lose_battle(&mut state, loser, &battle, loser_plan, &mut events)?;
            self.mark_survivors(&mut state, winner, winner_plan, battle.territory)?;
            events.push(GameEvent::BattleResolved {
                territory: battle.territory,
                winner: Some(winner),
                loser: Some(loser),
                aggressor_strength_halves: 0,
                defender_strength_halves: 0,
            });
            self.release_prisoners(&mut state, &mut events);
            battle_state.awaiting = BattleAwaiting::Advancing;
            state.phase_state = PhaseState::Battle(battle_state);
            return self.finish_battle(state, events);
        }

        // The weapon exchange.
        let exchange = battle_rules::resolve_weapons(&ap, &dp);
        if exchange.lasgun_explosion {
            events.push(GameEvent::LasgunShieldExplosion { territory: battle.territory });
            for (side, plan) in [(battle.aggressor, &ap), (battle.defender, &dp)] {
                if let Some(leader) = battle_rules::named_leader(plan) {
                    leaders::kill(&mut state, side, leader)?;
                    events.push(GameEvent::LeaderKilled { faction: side, leader });
                }
                spice::pay(&mut state, side, plan.spice_dialed)?;
                self.lose_battle(&mut state, side, &battle, plan, &mut events)?;
            }
            // The blast levels everything else in the territory too.
            let ids: Vec<FactionId> = state.factions.ids().collect();
            for faction in ids {
                let sectors: Vec<Sector> = state
                    .faction(faction)
                    .on_board
                    .iter()
                    .filter(|s| s.territory == battle.territory)
                    .map(|s| s.sector)
                    .collect();
                for sector in sectors {
                    let killed =
                        forces::send_stack_to_tanks(&mut state, faction, battle.territory, sector);
                    if killed > 0 {
                        events.push(GameEvent::ForcesDevoured {
                            faction,
                            territory: battle.territory,
                            count: killed,
                        });
                    }
                }
            }
            spice::destroy_in_territory(&mut state, battle.territory);
            events.push(GameEvent::BattleResolved {
                territory: battle.territory,
                winner: None,
                loser: None,
                aggressor_strength_halves: 0,
                defender_strength_halves: 0,
            });
            self.release_prisoners(&mut state, &mut events);
            battle_state.awaiting = BattleAwaiting::Advancing;
            state.phase_state = PhaseState::Battle(battle_state);
            return self.finish_battle(state, events);
        }

        let aggressor_halves = battle_rules::strength_halves(
            &state,
            battle.aggressor,
            &ap,
            exchange.aggressor_leader_killed,
        );
        let defender_halves = battle_rules::strength_halves(
            &state,
            battle.defender,
            &dp,
            exchange.defender_leader_killed,
        );
        // Ties go to the aggressor.
        let aggressor_wins = aggressor_halves >= defender_halves;
        let (winner, winner_plan, winner_leader_killed, loser, loser_plan, loser_leader_killed) =
            if aggressor_wins {
                (battle.aggressor, &ap, exchange.aggressor_leader_killed, battle.defender, &dp, exchange.defender_leader_killed)
            } else {
                (battle.defender, &dp, exchange.defender_leader_killed, battle.aggressor, &ap, exchange.aggressor_leader_killed)
            };

        // Both sides' dialed spice goes to the bank in a normal resolution.
        spice::pay(&mut state, winner, winner_plan.spice_dialed)?;
        spice::pay(&mut state, loser, loser_plan.spice_dialed)?;

        // The winner's own killed leader dies and pays its strength to the
        // winner; the loser's killed leader may instead be captured by a
        // Harkonnen winner.
        if winner_leader_killed {
            if let Some(leader) = battle_rules::named_leader(winner_plan) {
                leaders::kill(&mut state, winner, leader)?;
                spice::gain(&mut state, winner, leader.strength());
                events.push(GameEvent::LeaderKilled { faction: winner, leader });
            }
        }

        // Loser: every force in the territory, every played card.
        self.lose_battle(&mut state, loser, &battle, loser_plan, &mut events)?;

        // Winner: loses the forces dialed, keeps the field.
        forces::kill_forces(
            &mut state,
            winner,
            battle.territory,
            battle.sector,
            winner_plan.forces_dialed,
        );
        self.mark_survivors(&mut state, winner, winner_plan, battle.territory)?;

        events.push(GameEvent::BattleResolved {
            territory: battle.territory,
            winner: Some(winner),
            loser: Some(loser),
            aggressor_strength_halves: aggressor_halves,
            defender_strength_halves: defender_halves,
        });

        if loser_leader_killed {
            if let Some(leader) = battle_rules::named_leader(loser_plan) {
                if winner == FactionId::Harkonnen {
                    battle_state.awaiting = BattleAwaiting::CaptureChoice { leader };
                    state.phase_state = PhaseState::Battle(battle_state);
                    let request = AgentRequest::new(
                        FactionId::Harkonnen,
                        RequestKind::CaptureLeaderChoice,
                        format!("Capture {} or kill for the bounty?", leader.name()),
                    )
                    .actions(&["CAPTURE", "KILL"]);
                    return Ok(StepResult::suspend(state, vec![request], events));
                }
                leaders::kill(&mut state, loser, leader)?;
                spice::gain(&mut state, winner, leader.strength());
                events.push(GameEvent::LeaderKilled { faction: loser, leader });
            }
        }

        self.release_prisoners(&mut state, &mut events);

        // The winner may shed the cards they played.
        let played: Vec<TreacheryCardId> = [winner_plan.weapon, winner_plan.defense]
            .into_iter()
            .flatten()
            .collect();
        if !played.is_empty() {
            battle_state.awaiting =
                BattleAwaiting::WinnerDiscards { faction: winner, played: played.clone() };
            state.phase_state = PhaseState::Battle(battle_state);
            let request = AgentRequest::new(
                winner,
                RequestKind::ChooseCardsToDiscard,
                "Discard any of the cards you played?",
            );
            return Ok(StepResult::suspend(state, vec![request], events));
        }

        battle_state.awaiting = BattleAwaiting::Advancing;
        state.phase_state = PhaseState::Battle(battle_state);
        self.finish_battle(state, events)
    }

    /// The loser's fate: every force in the territory to the tanks, every
    /// played card discarded.
    fn lose_battle(
        &self,
        state: &mut GameState,
        loser: FactionId,
        battle: &ActiveBattle,
        plan: &BattlePlan,
        events: &mut Vec<GameEvent>,
    ) -> Value<()> {
        let sectors: Vec<Sector> = state
            .faction(loser)
            .on_board
            .iter()
            .filter(|s| s.territory == battle.territory)
            .map(|s| s.sector)
            .collect();
        for sector in sectors {
            forces::send_stack_to_tanks(state, loser, battle.territory, sector);
        }

        let mut discards: Vec<TreacheryCardId> =
            [plan.weapon, plan.defense].into_iter().flatten().collect();
        if let BattleLeader::CheapHero(card) = plan.leader {
            discards.push(card);
        }
        for card in discards {
            cards::discard_treachery(state, loser, card)?;
            events.push(GameEvent::CardDiscarded { faction: loser, card });
        }
        Ok(())
    }

    /// The winner's surviving leader stays in the territory, immune to storm
    /// and worm for the rest of the turn. Cheap heroes are spent either way.
    fn mark_survivors(
        &self,
        state: &mut GameState,
        winner: FactionId,
        plan: &BattlePlan,
        territory: TerritoryId,
    ) -> Value<()> {
        match plan.leader {
            BattleLeader::Leader(leader) => {
                if state
                    .faction(winner)
                    .leader_state(leader)
                    .map(|l| l.is_alive())
                    .unwrap_or(false)
                {
                    leaders::mark_used(state, winner, leader, territory)?;
                }
            }
            BattleLeader::CheapHero(card) => {
                cards::discard_treachery(state, winner, card)?;
            }
            BattleLeader::None => {}
        }
        Ok(())
    }

    /// Prison Break: factions with no living leaders recover their captured
    /// ones.
    fn release_prisoners(&self, state: &mut GameState, events: &mut Vec<GameEvent>) {
        let ids: Vec<FactionId> = state.factions.ids().collect();
        for faction in ids {
            for leader in leaders::prison_break(state, faction) {
                events.push(GameEvent::LeaderReturned { to: faction, leader });
            }
        }
    }

    /// Recomputes the battle list after a resolution and moves on.
    fn finish_battle(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Battle(mut battle_state) = state.phase_state.clone() else {
            fail!("Battle phase state is missing");
        };
        battle_state.current = None;
        battle_state.battles = battle_rules::pending_battles(&state);
        battle_state.awaiting = BattleAwaiting::Advancing;
        state.phase_state = PhaseState::Battle(battle_state);
        self.next_battle(state, events)
    }
}

fn current(battle_state: &BattleState) -> Value<&ActiveBattle> {
    match &battle_state.current {
        Some(battle) => Ok(battle),
        None => fail!("No battle is in progress"),
    }
}

fn opponent_of(battle: &ActiveBattle, side: FactionId) -> FactionId {
    if battle.aggressor == side {
        battle.defender
    } else {
        battle.aggressor
    }
}

/// The side constrained by a Voice command: Bene Gesserit's opponent.
fn voiced_side(battle: &ActiveBattle) -> Option<FactionId> {
    if battle.voice.is_none() {
        return None;
    }
    if battle.aggressor == FactionId::BeneGesserit {
        Some(battle.defender)
    } else if battle.defender == FactionId::BeneGesserit {
        Some(battle.aggressor)
    } else {
        None
    }
}

/// The side bound by a Prescience answer: Atreides' opponent.
fn prescient_target(battle: &ActiveBattle) -> Option<FactionId> {
    if battle.prescience_answer.is_none() {
        return None;
    }
    if battle.aggressor == FactionId::Atreides {
        Some(battle.defender)
    } else if battle.defender == FactionId::Atreides {
        Some(battle.aggressor)
    } else {
        None
    }
}

/// Corrects a plan to comply with a Voice command: a forbidden card is
/// stripped, a commanded card is played from hand when possible.
fn enforce_voice(
    state: &GameState,
    side: FactionId,
    plan: &mut BattlePlan,
    command: data::game_states::phase_state::VoiceCommand,
) {
    let matches_kind = |card: TreacheryCardId| voice_kind_matches(card.kind(), command.card);
    if command.must_play {
        let already = plan.weapon.map(&matches_kind).unwrap_or(false)
            || plan.defense.map(&matches_kind).unwrap_or(false);
        if already {
            return;
        }
        let Some(card) = state.faction(side).hand.iter().copied().find(|c| matches_kind(*c))
        else {
            return;
        };
        if card.kind().is_weapon() {
            plan.weapon = Some(card);
        } else if card.kind().is_defense() {
            plan.defense = Some(card);
        }
    } else {
        if plan.weapon.map(&matches_kind).unwrap_or(false) {
            plan.weapon = None;
        }
        if plan.defense.map(&matches_kind).unwrap_or(false) {
            plan.defense = None;
        }
    }
}

fn voice_kind_matches(kind: TreacheryKind, voiced: VoiceCardKind) -> bool {
    matches!(
        (kind, voiced),
        (TreacheryKind::ProjectileWeapon, VoiceCardKind::ProjectileWeapon)
            | (TreacheryKind::PoisonWeapon, VoiceCardKind::PoisonWeapon)
            | (TreacheryKind::Lasgun, VoiceCardKind::Lasgun)
            | (TreacheryKind::Shield, VoiceCardKind::Shield)
            | (TreacheryKind::Snooper, VoiceCardKind::Snooper)
            | (TreacheryKind::Worthless, VoiceCardKind::Worthless)
            | (TreacheryKind::CheapHero, VoiceCardKind::CheapHero)
    )
}

/// Binds a plan to the Prescience answer its side committed to.
fn enforce_prescience(battle: &ActiveBattle, plan: &mut BattlePlan) {
    let Some(answer) = &battle.prescience_answer else {
        return;
    };
    match (battle.prescience_asked, answer) {
        (Some(PrescienceElement::Leader), PrescienceAnswer::Leader(leader)) => {
            plan.leader = *leader;
        }
        (Some(PrescienceElement::Weapon), PrescienceAnswer::Card(card)) => {
            plan.weapon = *card;
        }
        (Some(PrescienceElement::Defense), PrescienceAnswer::Card(card)) => {
            plan.defense = *card;
        }
        (Some(PrescienceElement::Number), PrescienceAnswer::Number(number)) => {
            plan.forces_dialed = *number;
        }
        _ => {}
    }
}
