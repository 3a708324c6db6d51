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

use data::game_states::game_state::GameState;
use data::requests::{AgentRequest, AgentResponse};
use tokio::sync::{mpsc, oneshot};
use utils::fail;
use utils::outcome::Value;

use crate::provider::AgentProvider;

/// A batch of requests awaiting answers from the far side of the channel.
#[derive(Debug)]
pub struct RequestBatch {
    pub requests: Vec<AgentRequest>,
    pub simultaneous: bool,
    /// Latest state snapshot at dispatch time.
    pub state: Option<Box<GameState>>,
    /// Send the answers back through here.
    pub respond: oneshot::Sender<Vec<AgentResponse>>,
}

/// Bridges the synchronous engine to an async front-end over a channel.
///
/// The engine blocks on each batch; an async task (a UI, an LLM driver)
/// drains [RequestBatch]es from the receiver and answers at leisure. A
/// closed channel is a protocol failure.
#[derive(Debug)]
pub struct ChannelProvider {
    sender: mpsc::UnboundedSender<RequestBatch>,
    pending_state: Option<Box<GameState>>,
}

impl ChannelProvider {
    /// Creates the provider and the receiving end for the async side.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<RequestBatch>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender, pending_state: None }, receiver)
    }
}

impl AgentProvider for ChannelProvider {
    fn get_responses(
        &mut self,
        requests: &[AgentRequest],
        simultaneous: bool,
    ) -> Value<Vec<AgentResponse>> {
        let (respond, receive) = oneshot::channel();
        let batch = RequestBatch {
            requests: requests.to_vec(),
            simultaneous,
            state: self.pending_state.take(),
            respond,
        };
        if self.sender.send(batch).is_err() {
            fail!("Agent channel closed while sending requests");
        }
        match receive.blocking_recv() {
            Ok(responses) => Ok(responses),
            Err(_) => fail!("Agent channel closed while awaiting responses"),
        }
    }

    fn update_state(&mut self, state: &GameState) {
        self.pending_state = Some(Box::new(state.clone()));
    }
}
