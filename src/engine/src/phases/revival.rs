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

use data::catalog::factions::EMPEROR_ALLY_REVIVAL_BOOST;
use data::core::primitives::{FactionId, Phase};
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{PhaseState, RevivalAwaiting, RevivalState};
use data::requests::{
    response_from, AgentRequest, AgentResponse, RequestContext, RequestKind, ResponseData,
};
use rules::mutations::{forces, leaders, spice};
use rules::queries::revival;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// Revival: forces and leaders return from the Tleilaxu Tanks.
pub struct RevivalPhase;

impl PhaseHandler for RevivalPhase {
    fn phase(&self) -> Phase {
        Phase::Revival
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let queue: Vec<FactionId> = state
            .storm_order
            .iter()
            .copied()
            .filter(|f| {
                let tanks = &state.faction(*f).tanks;
                !tanks.is_empty() || !revival::revivable_leaders(&state, *f).is_empty()
            })
            .collect();

        // The Emperor may grant extra paid revivals to its ally before
        // anyone revives.
        let emperor_grant_possible = state.has_faction(FactionId::Emperor)
            && state.faction(FactionId::Emperor).ally.is_some()
            && queue.iter().any(|f| Some(*f) == state.faction(FactionId::Emperor).ally);
        if emperor_grant_possible {
            state.phase_state = PhaseState::Revival(RevivalState {
                queue,
                awaiting: RevivalAwaiting::Grant,
            });
            let request = AgentRequest::new(
                FactionId::Emperor,
                RequestKind::GrantFremenRevivalBoost,
                "Grant your ally extra paid revivals this turn?",
            )
            .actions(&["GRANT", "PASS"]);
            return Ok(StepResult::suspend(state, vec![request], vec![]));
        }

        state.phase_state =
            PhaseState::Revival(RevivalState { queue, awaiting: RevivalAwaiting::Grant });
        self.next_faction(state, vec![])
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Revival(mut revival_state) = state.phase_state.clone() else {
            fail!("Revival phase state is missing");
        };
        match revival_state.awaiting.clone() {
            RevivalAwaiting::Grant => {
                if let Some(ResponseData::GrantRevivalBoost { count }) =
                    response_from(responses, FactionId::Emperor).map(|r| &r.data)
                {
                    let granted = (*count).min(EMPEROR_ALLY_REVIVAL_BOOST);
                    if let Some(ally) = state.faction(FactionId::Emperor).ally {
                        state.faction_mut(ally).flags.emperor_ally_revivals_granted = granted;
                    }
                }
                state.phase_state = PhaseState::Revival(revival_state);
                self.next_faction(state, vec![])
            }
            RevivalAwaiting::Forces(faction) => {
                let mut events = vec![];
                if let Some(ResponseData::ReviveForces { regular, elite }) =
                    response_from(responses, faction).map(|r| &r.data)
                {
                    let (regular, elite) = (*regular, *elite);
                    if revival::validate_forces(&state, faction, regular, elite).valid {
                        let count = regular + elite;
                        let (own_cost, emperor_cost) =
                            revival::revival_cost(&state, faction, count);
                        spice::pay(&mut state, faction, own_cost)?;
                        if emperor_cost > 0 {
                            spice::pay(&mut state, FactionId::Emperor, emperor_cost)?;
                            let boosted = emperor_cost
                                / data::catalog::factions::FORCE_REVIVAL_COST;
                            state
                                .faction_mut(faction)
                                .flags
                                .emperor_ally_revivals_used += boosted;
                        }
                        forces::revive(&mut state, faction, regular, elite)?;
                        state.faction_mut(faction).flags.force_revivals_used += count;
                        events.push(GameEvent::ForcesRevived {
                            faction,
                            regular,
                            elite,
                            paid: own_cost + emperor_cost,
                        });
                    }
                }
                // Leader revival follows, when legal.
                if !revival::revivable_leaders(&state, faction).is_empty() {
                    revival_state.awaiting = RevivalAwaiting::Leader(faction);
                    state.phase_state = PhaseState::Revival(revival_state);
                    let request = AgentRequest::new(
                        faction,
                        RequestKind::ReviveLeader,
                        "Revive a leader from the tanks?",
                    )
                    .actions(&["REVIVE", "PASS"]);
                    return Ok(StepResult::suspend(state, vec![request], events));
                }
                state.phase_state = PhaseState::Revival(revival_state);
                self.next_faction(state, events)
            }
            RevivalAwaiting::Leader(faction) => {
                let mut events = vec![];
                if let Some(ResponseData::ReviveLeader { leader }) =
                    response_from(responses, faction).map(|r| &r.data)
                {
                    let leader = *leader;
                    if revival::validate_leader(&state, faction, leader).valid {
                        let cost = leader.strength();
                        spice::pay(&mut state, faction, cost)?;
                        leaders::revive(&mut state, faction, leader)?;
                        state.faction_mut(faction).flags.leader_revived = true;
                        events.push(GameEvent::LeaderRevived { faction, leader, paid: cost });
                    }
                }
                state.phase_state = PhaseState::Revival(revival_state);
                self.next_faction(state, events)
            }
        }
    }
}

impl RevivalPhase {
    fn next_faction(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Revival(mut revival_state) = state.phase_state.clone() else {
            fail!("Revival phase state is missing");
        };
        let Some(faction) = revival_state.queue.first().copied() else {
            state.phase_state = PhaseState::Revival(revival_state);
            return Ok(StepResult::complete(state, events));
        };
        revival_state.queue.remove(0);

        if state.faction(faction).tanks.is_empty() {
            // Only a leader revival is on offer.
            if revival::revivable_leaders(&state, faction).is_empty() {
                state.phase_state = PhaseState::Revival(revival_state);
                return self.next_faction(state, events);
            }
            revival_state.awaiting = RevivalAwaiting::Leader(faction);
            state.phase_state = PhaseState::Revival(revival_state);
            let request = AgentRequest::new(
                faction,
                RequestKind::ReviveLeader,
                "Revive a leader from the tanks?",
            )
            .actions(&["REVIVE", "PASS"]);
            return Ok(StepResult::suspend(state, vec![request], events));
        }

        revival_state.awaiting = RevivalAwaiting::Forces(faction);
        let limits = revival::limits(&state, faction);
        let tanks = state.faction(faction).tanks;
        state.phase_state = PhaseState::Revival(revival_state);
        let request = AgentRequest::new(
            faction,
            RequestKind::ReviveForces,
            "Revive forces from the tanks?",
        )
        .context(RequestContext::Revival {
            free: limits.free,
            max_total: limits.max_total,
            in_tanks_regular: tanks.regular,
            in_tanks_elite: tanks.elite,
        })
        .actions(&["REVIVE", "PASS"]);
        Ok(StepResult::suspend(state, vec![request], events))
    }
}
