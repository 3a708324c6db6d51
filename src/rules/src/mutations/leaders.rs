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

use data::catalog::leaders::LeaderId;
use data::catalog::territories::TerritoryId;
use data::core::primitives::FactionId;
use data::game_states::faction_state::LeaderLocation;
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::{fail, verify};

/// Sends a leader to the Tleilaxu Tanks.
pub fn kill(game: &mut GameState, owner: FactionId, leader: LeaderId) -> Outcome {
    let state = game.faction_mut(owner);
    let Some(leader_state) = state.leader_state_mut(leader) else {
        fail!("{owner} does not own leader {}", leader.name());
    };
    verify!(leader_state.is_alive(), "Leader {} is already in the tanks", leader.name());
    leader_state.location = LeaderLocation::Tanks;
    leader_state.used_in_territory = None;
    OK
}

/// Harkonnen captures an enemy leader instead of killing it.
pub fn capture(game: &mut GameState, owner: FactionId, by: FactionId, leader: LeaderId) -> Outcome {
    let state = game.faction_mut(owner);
    let Some(leader_state) = state.leader_state_mut(leader) else {
        fail!("{owner} does not own leader {}", leader.name());
    };
    verify!(
        matches!(leader_state.location, LeaderLocation::Available),
        "Leader {} is not available for capture",
        leader.name()
    );
    leader_state.location = LeaderLocation::Captured { by };
    leader_state.used_in_territory = None;
    OK
}

/// Returns every leader captured from `owner` when the owner has no living
/// leaders of their own left to lead with (Prison Break).
///
/// Returns the leaders freed.
pub fn prison_break(game: &mut GameState, owner: FactionId) -> Vec<LeaderId> {
    let has_living = game
        .faction(owner)
        .leaders
        .iter()
        .any(|l| matches!(l.location, LeaderLocation::Available));
    if has_living {
        return vec![];
    }
    let mut freed = vec![];
    for leader_state in game.faction_mut(owner).leaders.iter_mut() {
        if matches!(leader_state.location, LeaderLocation::Captured { .. }) {
            leader_state.location = LeaderLocation::Available;
            freed.push(leader_state.id);
        }
    }
    freed
}

/// Returns a leader from the tanks to its owner.
pub fn revive(game: &mut GameState, owner: FactionId, leader: LeaderId) -> Outcome {
    let state = game.faction_mut(owner);
    let Some(leader_state) = state.leader_state_mut(leader) else {
        fail!("{owner} does not own leader {}", leader.name());
    };
    verify!(
        leader_state.location == LeaderLocation::Tanks,
        "Leader {} is not in the tanks",
        leader.name()
    );
    leader_state.location = LeaderLocation::Available;
    OK
}

/// Marks a surviving battle leader as used in a territory for the rest of
/// the turn, making it immune to storm and worm there.
pub fn mark_used(
    game: &mut GameState,
    owner: FactionId,
    leader: LeaderId,
    territory: TerritoryId,
) -> Outcome {
    let state = game.faction_mut(owner);
    let Some(leader_state) = state.leader_state_mut(leader) else {
        fail!("{owner} does not own leader {}", leader.name());
    };
    leader_state.used_in_territory = Some(territory);
    OK
}

/// Clears all `used_in_territory` markers at turn end.
pub fn clear_used_markers(game: &mut GameState) {
    for state in game.factions.iter_mut() {
        for leader_state in state.leaders.iter_mut() {
            leader_state.used_in_territory = None;
        }
    }
}
