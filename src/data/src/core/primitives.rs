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

use std::fmt;

use enum_iterator::Sequence;
use enum_map::Enum;
use enumset::EnumSetType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The six great powers contesting Arrakis.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Enum, Ord, PartialOrd, Sequence)]
pub enum FactionId {
    Atreides,
    Harkonnen,
    Emperor,
    SpacingGuild,
    Fremen,
    BeneGesserit,
}

impl FactionId {
    pub fn name(&self) -> &'static str {
        match self {
            FactionId::Atreides => "Atreides",
            FactionId::Harkonnen => "Harkonnen",
            FactionId::Emperor => "Emperor",
            FactionId::SpacingGuild => "Spacing Guild",
            FactionId::Fremen => "Fremen",
            FactionId::BeneGesserit => "Bene Gesserit",
        }
    }
}

impl fmt::Display for FactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The phases of one game turn, in play order.
///
/// [Phase::Setup] runs exactly once at game start; the remaining phases repeat
/// every turn until a victory is declared or the turn limit is reached.
#[derive(Debug, Hash, Serialize, Deserialize, EnumSetType, Enum, Ord, PartialOrd, Sequence)]
pub enum Phase {
    Setup,
    Storm,
    SpiceBlow,
    ChoamCharity,
    Bidding,
    Revival,
    ShipmentAndMovement,
    Battle,
    SpiceCollection,
    MentatPause,
}

impl Phase {
    /// The phase which follows this one within a turn, wrapping from Mentat
    /// Pause back to Storm for the next turn.
    pub fn next_in_turn(self) -> Phase {
        match enum_iterator::next(&self) {
            Some(next) => next,
            None => Phase::Storm,
        }
    }

    /// All phases of a normal turn, excluding setup, in play order.
    pub fn turn_phases() -> impl Iterator<Item = Phase> {
        enum_iterator::all::<Phase>().filter(|p| *p != Phase::Setup)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "Setup",
            Phase::Storm => "Storm",
            Phase::SpiceBlow => "Spice Blow",
            Phase::ChoamCharity => "CHOAM Charity",
            Phase::Bidding => "Bidding",
            Phase::Revival => "Revival",
            Phase::ShipmentAndMovement => "Shipment & Movement",
            Phase::Battle => "Battle",
            Phase::SpiceCollection => "Spice Collection",
            Phase::MentatPause => "Mentat Pause",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Number of sectors around the board.
pub const NUM_SECTORS: u8 = 18;

/// One of the 18 pie-slice sectors around the board.
///
/// Sector 0 is the storm-start sector. Indices increase in the storm's
/// direction of travel (counterclockwise), so the next sector the storm will
/// enter after sector `s` is always `s + 1` modulo 18.
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Default,
)]
pub struct Sector(pub u8);

/// The sector used as the storm-position reference on turn 1, before any
/// storm movement has occurred.
pub const STORM_START: Sector = Sector(0);

impl Sector {
    /// The sector reached by moving `by` sectors counterclockwise.
    pub fn advance(self, by: u8) -> Sector {
        Sector((self.0 + by) % NUM_SECTORS)
    }

    /// Counterclockwise distance from `self` to `other`, in `0..18`.
    pub fn distance_ccw(self, other: Sector) -> u8 {
        (other.0 + NUM_SECTORS - self.0) % NUM_SECTORS
    }

    /// Clockwise distance from `self` to `other`, in `0..18`.
    pub fn distance_cw(self, other: Sector) -> u8 {
        (self.0 + NUM_SECTORS - other.0) % NUM_SECTORS
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sector {}", self.0)
    }
}

/// Turn number within a game, starting from 1.
pub type TurnNumber = u32;

/// Quantity of spice, the currency of everything on Arrakis.
pub type SpiceAmount = u32;

/// Unique ID for one game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct GameId(pub Uuid);

impl GameId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a struct that is 1:1 associated with a given [FactionId].
pub trait HasFactionId {
    fn faction_id(&self) -> FactionId;
}

impl HasFactionId for FactionId {
    fn faction_id(&self) -> FactionId {
        *self
    }
}
