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

use data::core::primitives::Phase;
use data::events::GameEvent;
use data::game_states::faction_state::TurnFlags;
use data::game_states::game_state::GameState;
use data::requests::AgentResponse;
use rules::mutations::leaders;
use rules::queries::victory;
use tracing::info;
use utils::outcome::Value;

use crate::handler::{PhaseHandler, StepResult};

/// The Mentat Pause: evaluate victory and close out the turn.
pub struct MentatPausePhase;

impl PhaseHandler for MentatPausePhase {
    fn phase(&self) -> Phase {
        Phase::MentatPause
    }

    fn initialize(&self, mut state: GameState) -> Value<StepResult> {
        let mut events = vec![];
        if let Some(won) = victory::check_victory(&state) {
            info!(?won, "Victory achieved");
            events.push(GameEvent::VictoryAchieved { victory: won.clone() });
            state.winner = Some(won);
        }
        Ok(StepResult::complete(state, events))
    }

    fn process_step(&self, state: GameState, _responses: &[AgentResponse]) -> Value<StepResult> {
        Ok(StepResult::complete(state, vec![]))
    }

    fn cleanup(&self, mut state: GameState) -> Value<GameState> {
        // Close out the turn: worms sink back into the sand, battle-survivor
        // markers lapse and per-turn flags reset. The Fremen storm card
        // persists into the next storm.
        state.worms_on_board.clear();
        leaders::clear_used_markers(&mut state);
        for faction_state in state.factions.iter_mut() {
            let storm_card = faction_state.flags.fremen_storm_card;
            faction_state.flags = TurnFlags { fremen_storm_card: storm_card, ..TurnFlags::default() };
        }
        Ok(state)
    }
}
