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

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::leaders::LeaderId;
use crate::catalog::spice_cards::SpiceCardId;
use crate::catalog::treachery_cards::TreacheryCardId;

/// A draw pile and its discard pile.
///
/// The back of `draw` is the top of the deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck<C> {
    pub draw: Vec<C>,
    pub discard: Vec<C>,
}

impl<C> Default for Deck<C> {
    fn default() -> Self {
        Self { draw: vec![], discard: vec![] }
    }
}

impl<C: Copy> Deck<C> {
    pub fn new(cards: Vec<C>) -> Self {
        Self { draw: cards, discard: vec![] }
    }

    /// Removes and returns the top card of the draw pile.
    pub fn draw_top(&mut self) -> Option<C> {
        self.draw.pop()
    }

    /// The most recently discarded card.
    pub fn top_discard(&self) -> Option<C> {
        self.discard.last().copied()
    }

    pub fn discard(&mut self, card: C) {
        self.discard.push(card);
    }

    /// Puts a card back into the draw pile; callers shuffle afterwards.
    pub fn return_to_draw(&mut self, card: C) {
        self.draw.push(card);
    }

    pub fn shuffle(&mut self, rng: &mut impl Rng) {
        self.draw.shuffle(rng);
    }
}

/// Which of the two spice decks a card belongs to. Deck B only exists under
/// advanced rules ("Double Spice Blow").
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum SpiceDeckId {
    A,
    B,
}

/// Every deck in the game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decks {
    pub spice_a: Deck<SpiceCardId>,
    pub spice_b: Deck<SpiceCardId>,
    pub treachery: Deck<TreacheryCardId>,
    /// Leader discs not yet dealt as traitor candidates. Never exposed in
    /// public views of the state.
    pub traitor: Deck<LeaderId>,
    /// The Fremen storm deck of movement values 1..=6.
    pub storm: Deck<u8>,
}

impl Decks {
    pub fn spice(&self, id: SpiceDeckId) -> &Deck<SpiceCardId> {
        match id {
            SpiceDeckId::A => &self.spice_a,
            SpiceDeckId::B => &self.spice_b,
        }
    }

    pub fn spice_mut(&mut self, id: SpiceDeckId) -> &mut Deck<SpiceCardId> {
        match id {
            SpiceDeckId::A => &mut self.spice_a,
            SpiceDeckId::B => &mut self.spice_b,
        }
    }
}
