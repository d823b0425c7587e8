use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{Card, EngineError};

pub const DECK_SIZE: usize = 52;

/// Source of cards for a round. Cards come out one at a time without
/// replacement; the engine never looks at what is left.
pub trait Shoe {
    fn shuffle(&mut self);

    fn draw_next(&mut self) -> Result<Card, EngineError>;
}

/// A single 52-card deck shuffled with a seedable ChaCha RNG.
pub struct Deck {
    cards: Vec<Card>,
    next: usize,
    rng: ChaCha8Rng,
}

impl Deck {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            cards: (0..DECK_SIZE).map(Card::from_index).collect(),
            next: 0,
            rng,
        }
    }

    /// Reproducible deck, same seed gives the same shuffles.
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(ChaCha8Rng::from_entropy())
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.next
    }
}

impl Shoe for Deck {
    fn shuffle(&mut self) {
        self.next = 0;
        self.cards.shuffle(&mut self.rng);
        log::debug!("Deck shuffled");
    }

    fn draw_next(&mut self) -> Result<Card, EngineError> {
        let card = *self.cards.get(self.next).ok_or(EngineError::EmptyShoe)?;
        self.next += 1;
        Ok(card)
    }
}

/// Deals a fixed sequence of cards. Shuffling is a no-op, which makes it the
/// shoe for replaying a known deal.
#[derive(Debug, Clone, Default)]
pub struct StackedShoe {
    cards: VecDeque<Card>,
}

impl StackedShoe {
    pub fn new(cards: impl IntoIterator<Item = Card>) -> Self {
        Self {
            cards: cards.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }
}

impl Shoe for StackedShoe {
    fn shuffle(&mut self) {}

    fn draw_next(&mut self) -> Result<Card, EngineError> {
        self.cards.pop_front().ok_or(EngineError::EmptyShoe)
    }
}
