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

use data::core::primitives::FactionId;
use data::game_states::game_state::GameState;
use data::requests::{AgentRequest, AgentResponse};
use utils::outcome::Value;

/// Answers decision requests on behalf of the factions.
///
/// The engine is the sole authority over game state: providers receive
/// read-only state syncs via [AgentProvider::update_state] and can never
/// write state back. A provider error is a protocol failure and aborts the
/// phase; a missing or malformed individual answer is merely a pass.
///
/// Providers own their timeouts. The engine never times a request out; a
/// provider that gives up on an agent answers with [AgentResponse::pass].
pub trait AgentProvider: Send {
    /// Answers a batch of requests.
    ///
    /// With `simultaneous` set, requests are independent and may be answered
    /// in any order; otherwise they must be answered one at a time in list
    /// order, since later prompts may depend on earlier answers.
    fn get_responses(
        &mut self,
        requests: &[AgentRequest],
        simultaneous: bool,
    ) -> Value<Vec<AgentResponse>>;

    /// Receives a fresh read-only snapshot before each batch of requests.
    fn update_state(&mut self, _state: &GameState) {}

    /// Test hook: overrides ornithopter access for a faction.
    fn ornithopter_access_override(&self, _faction: FactionId) -> Option<bool> {
        None
    }
}
