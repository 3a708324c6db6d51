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
use data::game_states::phase_state::{CollectionState, PhaseState};
use data::requests::{
    response_from, AgentRequest, AgentResponse, RequestContext, RequestKind, ResponseData,
};
use rules::mutations::spice;
use utils::outcome::Value;
use utils::fail;

use crate::handler::{PhaseHandler, StepResult};

/// Spice collection: forces standing on a spice cache harvest it, one spice
/// per force — two while Shai-Hulud occupies the territory — up to what
/// lies there.
pub struct CollectionPhase;

impl PhaseHandler for CollectionPhase {
    fn phase(&self) -> Phase {
        Phase::SpiceCollection
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let queue: Vec<FactionId> = state
            .storm_order
            .iter()
            .copied()
            .filter(|f| !collectable(&state, *f).is_empty())
            .collect();
        state.phase_state = PhaseState::Collection(CollectionState { queue });
        self.next_collector(state, vec![])
    }

    fn process_step(&self, mut state: GameState, responses: &[AgentResponse]) -> Value<StepResult> {
        let PhaseState::Collection(mut collection) = state.phase_state.clone() else {
            fail!("Collection phase state is missing");
        };
        let mut events = vec![];
        if let Some(faction) = collection.queue.first().copied() {
            collection.queue.remove(0);
            let collect = matches!(
                response_from(responses, faction).map(|r| &r.data),
                Some(ResponseData::CollectSpice)
            );
            if collect {
                for (territory, sector, due) in collectable(&state, faction) {
                    let taken = spice::take_from_board(&mut state, territory, sector, due);
                    if taken > 0 {
                        spice::gain(&mut state, faction, taken);
                        events.push(GameEvent::SpiceCollected {
                            faction,
                            territory,
                            amount: taken,
                        });
                    }
                }
            }
        }
        state.phase_state = PhaseState::Collection(collection);
        self.next_collector(state, events)
    }
}

impl CollectionPhase {
    fn next_collector(&self, mut state: GameState, events: Vec<GameEvent>) -> Value<StepResult> {
        let PhaseState::Collection(mut collection) = state.phase_state.clone() else {
            fail!("Collection phase state is missing");
        };
        // An earlier collector may have emptied a shared cache; skip anyone
        // with nothing left to take.
        while let Some(faction) = collection.queue.first().copied() {
            let sites = collectable(&state, faction);
            let Some((territory, sector, available)) = sites.first().copied() else {
                collection.queue.remove(0);
                continue;
            };
            state.phase_state = PhaseState::Collection(collection);
            let request =
                AgentRequest::new(faction, RequestKind::CollectSpice, "Harvest the spice?")
                    .context(RequestContext::Collection { territory, sector, available })
                    .actions(&["COLLECT", "PASS"]);
            return Ok(StepResult::suspend(state, vec![request], events));
        }
        state.phase_state = PhaseState::Idle;
        Ok(StepResult::complete(state, events))
    }
}

/// Sites where a faction's fighters stand on spice, with the amount its
/// force count entitles it to: one spice per fighter, doubled while
/// Shai-Hulud occupies the territory.
fn collectable(
    state: &GameState,
    faction: FactionId,
) -> Vec<(data::catalog::territories::TerritoryId, data::core::primitives::Sector, u32)> {
    state
        .faction(faction)
        .on_board
        .iter()
        .filter(|stack| stack.fighters() > 0)
        .filter_map(|stack| {
            let rate = if state.worm_at(stack.territory) { 2 } else { 1 };
            state
                .spice_at(stack.territory, stack.sector)
                .map(|cache| {
                    (stack.territory, stack.sector, (stack.fighters() * rate).min(cache.amount))
                })
        })
        .collect()
}
