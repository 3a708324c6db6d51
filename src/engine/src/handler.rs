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
use data::game_states::game_state::GameState;
use data::requests::{AgentRequest, AgentResponse};
use utils::outcome::Value;

/// Result of one handler step.
///
/// A step either suspends the phase awaiting agent decisions
/// (`pending_requests` non-empty), asks to be stepped again immediately, or
/// declares the phase complete.
#[derive(Debug)]
pub struct StepResult {
    /// Successor snapshot.
    pub state: GameState,

    /// Decisions the phase cannot proceed without.
    pub pending_requests: Vec<AgentRequest>,

    /// Whether the pending requests are independent and may be answered in
    /// any order, or must be answered strictly in list order.
    pub simultaneous: bool,

    /// Events describing what this step did, in emission order.
    pub events: Vec<GameEvent>,

    /// True once the phase has run to completion.
    pub phase_complete: bool,

    /// Overrides the natural phase ordering when set.
    pub next_phase: Option<Phase>,
}

impl StepResult {
    /// A step that suspends awaiting sequential responses.
    pub fn suspend(state: GameState, requests: Vec<AgentRequest>, events: Vec<GameEvent>) -> Self {
        Self {
            state,
            pending_requests: requests,
            simultaneous: false,
            events,
            phase_complete: false,
            next_phase: None,
        }
    }

    /// A step that suspends awaiting simultaneous responses.
    pub fn suspend_simultaneous(
        state: GameState,
        requests: Vec<AgentRequest>,
        events: Vec<GameEvent>,
    ) -> Self {
        Self { simultaneous: true, ..Self::suspend(state, requests, events) }
    }

    /// A step with work left to do and no outstanding requests; the manager
    /// steps the handler again immediately.
    pub fn advance(state: GameState, events: Vec<GameEvent>) -> Self {
        Self::suspend(state, vec![], events)
    }

    /// The phase is finished.
    pub fn complete(state: GameState, events: Vec<GameEvent>) -> Self {
        Self { phase_complete: true, ..Self::suspend(state, vec![], events) }
    }
}

/// One phase of the game: a sub-machine driven by the phase manager.
///
/// Handlers are stateless; everything a phase needs to resume after a
/// suspension lives in [data::game_states::phase_state::PhaseState] inside
/// the snapshot.
pub trait PhaseHandler: Send + Sync {
    fn phase(&self) -> Phase;

    /// Starts the phase, seeding its sub-state.
    fn initialize(&self, state: GameState) -> Value<StepResult>;

    /// Advances the sub-machine with the responses to the previous step's
    /// requests. Missing or malformed responses mean a pass.
    fn process_step(&self, state: GameState, responses: &[AgentResponse]) -> Value<StepResult>;

    /// Tears the phase down; runs exactly once after the final step.
    fn cleanup(&self, state: GameState) -> Value<GameState> {
        Ok(state)
    }
}
