use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EngineError;

pub const ACE: u8 = 1;
pub const KING: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Clubs,
    Diamonds,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    pub fn symbol(&self) -> char {
        match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
        }
    }
}

/// A single playing card.
///
/// Equality and ordering look at the face only, so `8♠ == 8♥`. That is what
/// pair detection for splits wants; compare `suit()` as well when the exact
/// card matters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawCard")]
pub struct Card {
    suit: Suit,
    face: u8,
}

/// Wire form of a card, checked before it becomes a [`Card`].
#[derive(Deserialize)]
struct RawCard {
    suit: Suit,
    face: u8,
}

impl TryFrom<RawCard> for Card {
    type Error = EngineError;

    fn try_from(raw: RawCard) -> Result<Self, Self::Error> {
        if !(ACE..=KING).contains(&raw.face) {
            return Err(EngineError::MalformedInput(format!(
                "card face {} is outside {ACE}..={KING}",
                raw.face
            )));
        }
        Ok(Self {
            suit: raw.suit,
            face: raw.face,
        })
    }
}

impl Card {
    pub const fn new(suit: Suit, face: u8) -> Self {
        assert!(face >= ACE && face <= KING, "Invalid card face");
        Self { suit, face }
    }

    pub fn suit(&self) -> Suit {
        self.suit
    }

    /// 1 = Ace, 2-10 pips, 11-13 = J, Q, K.
    pub fn face(&self) -> u8 {
        self.face
    }

    /// Blackjack pip value with the Ace counted high.
    pub fn value(&self) -> u8 {
        match self.face {
            ACE => 11,
            2..=10 => self.face,
            _ => 10, // Jack, Queen, King
        }
    }

    pub fn is_ace(&self) -> bool {
        self.face == ACE
    }

    /// Cards 0-51 in suit-major order: 0 = A♠, 12 = K♠, 13 = A♥, ...
    pub fn from_index(index: usize) -> Self {
        match index {
            0..=51 => Self::new(Suit::ALL[index / 13], (index % 13) as u8 + 1),
            _ => panic!("Invalid card index: {}", index),
        }
    }

    pub fn same_card(&self, other: &Card) -> bool {
        self.face == other.face && self.suit == other.suit
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.face == other.face
    }
}

impl Eq for Card {}

impl PartialOrd for Card {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Card {
    fn cmp(&self, other: &Self) -> Ordering {
        self.face.cmp(&other.face)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.suit.symbol();
        match self.face {
            ACE => write!(f, "A{symbol}"),
            11 => write!(f, "J{symbol}"),
            12 => write!(f, "Q{symbol}"),
            KING => write!(f, "K{symbol}"),
            pips => write!(f, "{pips}{symbol}"),
        }
    }
}
