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

use data::core::primitives::{FactionId, Phase};
use data::events::GameEvent;
use data::game_states::game_state::GameState;
use data::game_states::phase_state::{CharityState, PhaseState};
use data::requests::{AgentRequest, AgentResponse, RequestKind, ResponseData};
use rules::mutations::spice;
use rules::queries::charity;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// CHOAM charity: destitute factions may claim a top-up from the bank.
pub struct CharityPhase;

impl PhaseHandler for CharityPhase {
    fn phase(&self) -> Phase {
        Phase::ChoamCharity
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let queue: Vec<FactionId> = state
            .storm_order
            .iter()
            .copied()
            .filter(|f| charity::charity_due(&state, *f) > 0)
            .collect();
        state.phase_state = PhaseState::Charity(CharityState { queue });
        self.next_claim(state, vec![])
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Charity(mut charity_state) = state.phase_state.clone() else {
            fail!("Charity phase state is missing");
        };
        let mut events = vec![];
        if let Some(faction) = charity_state.queue.first().copied() {
            charity_state.queue.remove(0);
            let claimed = matches!(
                responses.first().map(|r| &r.data),
                Some(ResponseData::ClaimCharity)
            );
            if claimed {
                let due = charity::charity_due(&state, faction);
                if due > 0 {
                    spice::gain(&mut state, faction, due);
                    events.push(GameEvent::CharityClaimed { faction, amount: due });
                }
            }
        }
        state.phase_state = PhaseState::Charity(charity_state);
        self.next_claim(state, events)
    }
}

impl CharityPhase {
    fn next_claim(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Charity(charity_state) = &state.phase_state else {
            fail!("Charity phase state is missing");
        };
        match charity_state.queue.first().copied() {
            Some(faction) => {
                let request = AgentRequest::new(
                    faction,
                    RequestKind::ClaimCharity,
                    "Claim CHOAM charity?",
                )
                .actions(&["CLAIM", "PASS"]);
                Ok(StepResult::suspend(state, vec![request], events))
            }
            None => {
                state.phase_state = PhaseState::Idle;
                Ok(StepResult::complete(state, events))
            }
        }
    }
}
