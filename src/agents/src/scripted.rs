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

use std::collections::VecDeque;

use data::core::primitives::FactionId;
use data::requests::{AgentRequest, AgentResponse, RequestKind, ResponseData};
use tracing::debug;
use utils::outcome::Value;

use crate::provider::AgentProvider;

/// A provider that answers every request with a pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysPass;

impl AgentProvider for AlwaysPass {
    fn get_responses(
        &mut self,
        requests: &[AgentRequest],
        _simultaneous: bool,
    ) -> Value<Vec<AgentResponse>> {
        Ok(requests.iter().map(|r| AgentResponse::pass(r.faction)).collect())
    }
}

/// A deterministic provider driven by a pre-written script.
///
/// Each `(faction, request kind)` pair owns a FIFO queue of answers;
/// requests with no scripted answer left are passed. Two runs with the same
/// script and the same seed produce identical games.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Vec<((FactionId, RequestKind), VecDeque<ResponseData>)>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an answer for the next matching request.
    pub fn on(mut self, faction: FactionId, kind: RequestKind, data: ResponseData) -> Self {
        self.queue_for(faction, kind).push_back(data);
        self
    }

    /// Queues the same answer for the next `count` matching requests.
    pub fn on_repeat(
        mut self,
        faction: FactionId,
        kind: RequestKind,
        data: ResponseData,
        count: usize,
    ) -> Self {
        for _ in 0..count {
            self.queue_for(faction, kind).push_back(data.clone());
        }
        self
    }

    fn queue_for(
        &mut self,
        faction: FactionId,
        kind: RequestKind,
    ) -> &mut VecDeque<ResponseData> {
        let key = (faction, kind);
        if let Some(index) = self.script.iter().position(|(k, _)| *k == key) {
            &mut self.script[index].1
        } else {
            self.script.push((key, VecDeque::new()));
            &mut self.script.last_mut().expect("just pushed").1
        }
    }

    fn answer(&mut self, request: &AgentRequest) -> AgentResponse {
        let key = (request.faction, request.kind);
        let scripted = self
            .script
            .iter_mut()
            .find(|(k, _)| *k == key)
            .and_then(|(_, queue)| queue.pop_front());
        match scripted {
            Some(data) => AgentResponse::new(request.faction, data),
            None => {
                debug!(?request.faction, ?request.kind, "No scripted answer, passing");
                AgentResponse::pass(request.faction)
            }
        }
    }
}

impl AgentProvider for ScriptedProvider {
    fn get_responses(
        &mut self,
        requests: &[AgentRequest],
        _simultaneous: bool,
    ) -> Value<Vec<AgentResponse>> {
        Ok(requests.iter().map(|r| self.answer(r)).collect())
    }
}
