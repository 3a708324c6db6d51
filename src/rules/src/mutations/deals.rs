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

use data::deals::{Deal, DealStatus};
use data::game_states::game_state::GameState;
use utils::outcome::{Outcome, OK};
use utils::{fail, verify};

use crate::mutations::spice;

/// Records a proposed deal. The engine holds it until the counterparty
/// answers a `RespondToDeal` request; the terms themselves stay opaque.
pub fn propose(game: &mut GameState, deal: Deal) -> Outcome {
    verify!(deal.from != deal.to, "A deal needs two distinct parties");
    verify!(game.has_faction(deal.from) && game.has_faction(deal.to), "Unknown deal party");
    verify!(deal.status == DealStatus::Pending, "Proposed deals start pending");
    game.pending_deals.push(deal);
    OK
}

/// Settles the oldest pending deal between the two parties: on acceptance
/// the offered spice changes hands, either way the deal moves to history.
pub fn resolve(game: &mut GameState, responder: data::core::primitives::FactionId, accept: bool) -> Outcome {
    let Some(index) = game.pending_deals.iter().position(|d| d.to == responder) else {
        fail!("{responder} has no pending deal to answer");
    };
    let mut deal = game.pending_deals.remove(index);
    if accept {
        spice::transfer(game, deal.from, deal.to, deal.spice)?;
        deal.status = DealStatus::Accepted;
    } else {
        deal.status = DealStatus::Rejected;
    }
    game.deal_history.push(deal);
    OK
}

#[cfg(test)]
mod tests {
    use data::core::primitives::FactionId;

    use super::*;
    use crate::test_states;

    fn offer(spice: u32) -> Deal {
        Deal {
            from: FactionId::Atreides,
            to: FactionId::Fremen,
            terms: "safe passage through the deep desert".into(),
            spice,
            proposed_on_turn: 1,
            status: DealStatus::Pending,
        }
    }

    #[test]
    fn accepted_deals_move_spice_and_archive() {
        let mut game = test_states::basic_game();
        propose(&mut game, offer(4)).unwrap();
        resolve(&mut game, FactionId::Fremen, true).unwrap();
        assert_eq!(game.faction(FactionId::Atreides).spice, 6);
        assert_eq!(game.faction(FactionId::Fremen).spice, 7);
        assert!(game.pending_deals.is_empty());
        assert_eq!(game.deal_history[0].status, DealStatus::Accepted);
    }

    #[test]
    fn rejected_deals_leave_treasuries_alone() {
        let mut game = test_states::basic_game();
        propose(&mut game, offer(4)).unwrap();
        resolve(&mut game, FactionId::Fremen, false).unwrap();
        assert_eq!(game.faction(FactionId::Atreides).spice, 10);
        assert_eq!(game.deal_history[0].status, DealStatus::Rejected);
    }
}
