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

use data::catalog::factions::{
    FORCE_REVIVAL_COST, MAX_FORCE_REVIVALS_PER_TURN,
};
use data::catalog::leaders::LeaderId;
use data::core::primitives::{FactionId, SpiceAmount};
use data::game_states::faction_state::LeaderLocation;
use data::game_states::game_state::GameState;

use crate::validation::ValidationResult;

/// A faction's force-revival allowance for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevivalLimits {
    /// Revivals which cost nothing.
    pub free: u32,
    /// Cap on total force revivals this turn, including free ones and any
    /// Emperor grant.
    pub max_total: u32,
    /// Revivals already taken this turn.
    pub used: u32,
}

impl RevivalLimits {
    pub fn remaining(&self) -> u32 {
        self.max_total.saturating_sub(self.used)
    }
}

/// Computes the revival allowance for a faction.
pub fn limits(game: &GameState, faction: FactionId) -> RevivalLimits {
    let state = game.faction(faction);
    let mut max_total = MAX_FORCE_REVIVALS_PER_TURN;
    if is_emperor_boosted_ally(game, faction) {
        max_total += state.flags.emperor_ally_revivals_granted;
    }
    RevivalLimits {
        free: faction.def().free_revivals,
        max_total,
        used: state.flags.force_revivals_used,
    }
}

fn is_emperor_boosted_ally(game: &GameState, faction: FactionId) -> bool {
    game.has_faction(FactionId::Emperor)
        && game.faction(FactionId::Emperor).ally == Some(faction)
}

/// Spice cost of reviving `count` forces, given the allowance. Free revivals
/// apply first; the rest cost [FORCE_REVIVAL_COST] each.
///
/// Revivals covered by an Emperor grant are billed to the Emperor, not the
/// reviving ally; the split is returned as `(own_cost, emperor_cost)`.
pub fn revival_cost(
    game: &GameState,
    faction: FactionId,
    count: u32,
) -> (SpiceAmount, SpiceAmount) {
    let lim = limits(game, faction);
    let state = game.faction(faction);
    let free_left = lim.free.saturating_sub(state.flags.force_revivals_used);
    let paid = count.saturating_sub(free_left);

    let boost_available = if is_emperor_boosted_ally(game, faction) {
        state
            .flags
            .emperor_ally_revivals_granted
            .saturating_sub(state.flags.emperor_ally_revivals_used)
    } else {
        0
    };
    let emperor_paid = paid.min(boost_available);
    let own_paid = paid - emperor_paid;
    (own_paid * FORCE_REVIVAL_COST, emperor_paid * FORCE_REVIVAL_COST)
}

/// Validates a force revival request.
pub fn validate_forces(
    game: &GameState,
    faction: FactionId,
    regular: u32,
    elite: u32,
) -> ValidationResult {
    let count = regular + elite;
    if count == 0 {
        return ValidationResult::error("empty_revival", "Must revive at least one force");
    }
    let state = game.faction(faction);
    if state.tanks.regular < regular || state.tanks.elite < elite {
        return ValidationResult::error(
            "insufficient_tanks",
            format!("Tanks hold {} regular, {} elite", state.tanks.regular, state.tanks.elite),
        );
    }
    if elite > 1 {
        return ValidationResult::error(
            "elite_revival_limit",
            "Only one elite force may be revived per turn",
        );
    }
    let lim = limits(game, faction);
    if count > lim.remaining() {
        return ValidationResult::error_with_suggestion(
            "revival_limit",
            format!("Only {} more revivals are allowed this turn", lim.remaining()),
            format!("Request at most {}", lim.remaining()),
        );
    }
    let (own_cost, emperor_cost) = revival_cost(game, faction, count);
    if state.spice < own_cost {
        return ValidationResult::error(
            "insufficient_spice",
            format!("Revival costs {own_cost}, treasury holds {}", state.spice),
        );
    }
    if emperor_cost > 0 && game.faction(FactionId::Emperor).spice < emperor_cost {
        return ValidationResult::error(
            "emperor_cannot_pay",
            "The Emperor cannot cover the granted revivals",
        );
    }
    ValidationResult::ok()
}

/// Whether a faction may revive a leader this turn, and which leaders
/// qualify.
pub fn revivable_leaders(game: &GameState, faction: FactionId) -> Vec<LeaderId> {
    let state = game.faction(faction);
    if state.flags.leader_revived {
        return vec![];
    }
    state
        .leaders
        .iter()
        .filter(|l| l.location == LeaderLocation::Tanks)
        .map(|l| l.id)
        .collect()
}

/// Validates a leader revival: the leader must be in the tanks, only one
/// leader returns per turn, and the cost is the leader's strength.
pub fn validate_leader(game: &GameState, faction: FactionId, leader: LeaderId) -> ValidationResult {
    if leader.faction() != faction {
        return ValidationResult::error("not_your_leader", "That leader belongs to another house");
    }
    if game.faction(faction).flags.leader_revived {
        return ValidationResult::error(
            "leader_revival_limit",
            "Only one leader may be revived per turn",
        );
    }
    if !revivable_leaders(game, faction).contains(&leader) {
        return ValidationResult::error("leader_not_in_tanks", "That leader is not in the tanks");
    }
    if game.faction(faction).spice < leader.strength() {
        return ValidationResult::error(
            "insufficient_spice",
            format!("Reviving {} costs {}", leader.name(), leader.strength()),
        );
    }
    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::alliances;
    use crate::test_states;

    #[test]
    fn emperor_grant_raises_ally_cap_and_bills_emperor() {
        let mut game = test_states::basic_game();
        alliances::form(&mut game, FactionId::Emperor, FactionId::Harkonnen).unwrap();
        game.faction_mut(FactionId::Harkonnen).tanks.regular = 10;
        game.faction_mut(FactionId::Harkonnen).flags.emperor_ally_revivals_granted = 3;
        // Harkonnen's own allowance is exhausted; two further revivals ride
        // on the Emperor's grant.
        game.faction_mut(FactionId::Harkonnen).flags.force_revivals_used = 3;

        let lim = limits(&game, FactionId::Harkonnen);
        assert_eq!(lim.max_total, 6);
        assert_eq!(lim.remaining(), 3);

        let (own, emperor) = revival_cost(&game, FactionId::Harkonnen, 2);
        assert_eq!(own, 0);
        assert_eq!(emperor, 4);
    }

    #[test]
    fn free_revivals_apply_before_paid() {
        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::Atreides).tanks.regular = 5;
        let (own, emperor) = revival_cost(&game, FactionId::Atreides, 3);
        assert_eq!(own, 2);
        assert_eq!(emperor, 0);
    }

    #[test]
    fn per_turn_cap_is_enforced() {
        let mut game = test_states::basic_game();
        game.faction_mut(FactionId::Atreides).tanks.regular = 10;
        let result = validate_forces(&game, FactionId::Atreides, 4, 0);
        assert!(!result.valid);
        assert_eq!(result.errors[0].code, "revival_limit");
    }
}
