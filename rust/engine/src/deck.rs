use rand::Rng;

use crate::cards::{full_deck, Card};

/// A dealing deck: fixed 52 cards plus a cursor. Cards are never removed,
/// the cursor only moves forward, so a hand can be reconstructed from the
/// shuffle order alone.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
}

impl Deck {
    /// Fresh deck in enumeration order. Call [`Deck::shuffle`] before dealing.
    pub fn new() -> Self {
        Self {
            cards: full_deck(),
            position: 0,
        }
    }

    /// In-place Fisher-Yates over the full 52, one uniform draw per swap,
    /// walking from the last index down to 1. `random_range` keeps the swap
    /// index in bounds by construction.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards = full_deck();
        self.position = 0;
        for i in (1..self.cards.len()).rev() {
            let j = rng.random_range(0..=i);
            self.cards.swap(i, j);
        }
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        if self.position >= self.cards.len() {
            None
        } else {
            let c = self.cards[self.position];
            self.position += 1;
            Some(c)
        }
    }

    pub fn burn_card(&mut self) {
        let _ = self.deal_card();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}
