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

use crate::handler::PhaseHandler;

pub mod battle;
pub mod bidding;
pub mod charity;
pub mod collection;
pub mod mentat;
pub mod revival;
pub mod setup;
pub mod shipment;
pub mod spice_blow;
pub mod storm;

/// One handler per phase, in phase order.
pub fn standard_handlers() -> Vec<Box<dyn PhaseHandler>> {
    vec![
        Box::new(setup::SetupPhase),
        Box::new(storm::StormPhase),
        Box::new(spice_blow::SpiceBlowPhase),
        Box::new(charity::CharityPhase),
        Box::new(bidding::BiddingPhase),
        Box::new(revival::RevivalPhase),
        Box::new(shipment::ShipmentPhase),
        Box::new(battle::BattlePhase),
        Box::new(collection::CollectionPhase),
        Box::new(mentat::MentatPausePhase),
    ]
}
