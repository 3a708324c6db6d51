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

use serde::{Deserialize, Serialize};

use crate::core::primitives::{FactionId, Phase, TurnNumber};

/// One entry in the append-only action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub turn: TurnNumber,
    pub phase: Phase,
    /// Acting faction, when the action belongs to one.
    pub faction: Option<FactionId>,
    pub description: String,
}

impl ActionRecord {
    pub fn new(
        turn: TurnNumber,
        phase: Phase,
        faction: Option<FactionId>,
        description: impl Into<String>,
    ) -> Self {
        Self { turn, phase, faction, description: description.into() }
    }
}
