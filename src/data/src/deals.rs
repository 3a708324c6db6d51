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

use crate::core::primitives::{FactionId, SpiceAmount, TurnNumber};

/// A side deal between two factions.
///
/// Deals are opaque to the rules engine: it records them, moves spice when a
/// deal resolves, and otherwise leaves interpretation of the terms to the
/// players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    pub from: FactionId,
    pub to: FactionId,
    /// Free-text terms, meaningful only to the parties.
    pub terms: String,
    /// Spice changing hands from `from` to `to` when accepted.
    pub spice: SpiceAmount,
    pub proposed_on_turn: TurnNumber,
    pub status: DealStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DealStatus {
    Pending,
    Accepted,
    Rejected,
}
