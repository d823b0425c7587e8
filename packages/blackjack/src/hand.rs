use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Action, Card, EngineError};

pub const BLACKJACK: u8 = 21;
/// House rule: a hand never holds more than five cards.
pub const MAX_HAND_CARDS: usize = 5;

/// Returned by the valuator when a hand goes over 21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bust;

impl fmt::Display for Bust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bust")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandOutcome {
    Win,
    Loss,
    Push,
    Surrender,
    Blackjack,
    /// Lost to a dealer blackjack with the insurance side bet paid out.
    Insured,
}

/// Where a hand sits in the per-hand action state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandState {
    AwaitingAction,
    Stood,
    Bust,
    Has21,
    Surrendered,
    CardLimitReached,
}

impl HandState {
    pub fn is_terminal(self) -> bool {
        self != HandState::AwaitingAction
    }
}

/// Calculate the value of a blackjack hand.
///
/// Aces start at 11. When that overshoots 21 a single ace is re-counted as 1;
/// the correction is applied once no matter how many aces the hand holds.
pub fn calculate_hand_value(cards: &[Card]) -> Result<u8, Bust> {
    let mut total: u16 = 0;
    let mut has_ace = false;

    for card in cards {
        if card.is_ace() {
            has_ace = true;
        }
        total += card.value() as u16;
    }

    if total > BLACKJACK as u16 && has_ace {
        total -= 10;
    }

    if total > BLACKJACK as u16 {
        Err(Bust)
    } else {
        Ok(total as u8)
    }
}

/// Check if a hand is soft (still has an ace counted as 11)
pub fn is_soft_hand(cards: &[Card]) -> bool {
    let aces = cards.iter().filter(|c| c.is_ace()).count();
    if aces == 0 {
        return false;
    }
    let provisional: u16 = cards.iter().map(|c| c.value() as u16).sum();
    let corrected = usize::from(provisional > BLACKJACK as u16);
    calculate_hand_value(cards).is_ok() && aces > corrected
}

/// Check if a hand is busted
pub fn is_busted(cards: &[Card]) -> bool {
    calculate_hand_value(cards).is_err()
}

/// Check if a hand is blackjack (21 with 2 cards)
pub fn is_blackjack(cards: &[Card]) -> bool {
    cards.len() == 2 && calculate_hand_value(cards) == Ok(BLACKJACK)
}

/// Check if two cards can be split (same face)
pub fn can_split_cards(card1: &Card, card2: &Card) -> bool {
    card1 == card2
}

/// One bet box: the cards, the stake riding on them and where the hand is in
/// its action state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    cards: Vec<Card>,
    bet: u128,
    state: HandState,
    doubled: bool,
    from_split: bool,
    acted: bool,
    settlement: Option<HandOutcome>,
}

impl Hand {
    pub fn new(bet: u128) -> Self {
        Self {
            cards: Vec::new(),
            bet,
            state: HandState::AwaitingAction,
            doubled: false,
            from_split: false,
            acted: false,
            settlement: None,
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn bet(&self) -> u128 {
        self.bet
    }

    pub fn state(&self) -> HandState {
        self.state
    }

    pub fn value(&self) -> Result<u8, Bust> {
        calculate_hand_value(&self.cards)
    }

    /// Total for display and comparison, `None` once busted.
    pub fn total(&self) -> Option<u8> {
        self.value().ok()
    }

    pub fn is_soft(&self) -> bool {
        is_soft_hand(&self.cards)
    }

    pub fn is_busted(&self) -> bool {
        is_busted(&self.cards)
    }

    pub fn is_blackjack(&self) -> bool {
        is_blackjack(&self.cards)
    }

    /// 21 on the two cards this hand was dealt, not counting split hands.
    pub fn is_natural(&self) -> bool {
        !self.from_split && self.is_blackjack()
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn is_doubled(&self) -> bool {
        self.doubled
    }

    pub fn is_from_split(&self) -> bool {
        self.from_split
    }

    /// Whether the owner has already made a decision on this hand.
    pub fn has_acted(&self) -> bool {
        self.acted
    }

    pub fn settlement(&self) -> Option<HandOutcome> {
        self.settlement
    }

    pub fn is_settled(&self) -> bool {
        self.settlement.is_some()
    }

    pub fn can_split(&self) -> bool {
        self.cards.len() == 2 && can_split_cards(&self.cards[0], &self.cards[1])
    }

    /// Append a card. Terminal hands and full hands refuse it.
    pub fn add_card(&mut self, card: Card) -> Result<(), EngineError> {
        if self.is_terminal() {
            return Err(EngineError::invalid_action(
                Action::Hit,
                format!("hand is already {:?}", self.state),
            ));
        }
        if self.cards.len() >= MAX_HAND_CARDS {
            return Err(EngineError::invalid_action(
                Action::Hit,
                "hand already holds five cards",
            ));
        }
        self.cards.push(card);
        Ok(())
    }

    pub(crate) fn take_second_card(&mut self) -> Option<Card> {
        if self.cards.len() == 2 {
            self.cards.pop()
        } else {
            None
        }
    }

    pub(crate) fn set_state(&mut self, state: HandState) {
        self.state = state;
    }

    pub(crate) fn set_bet(&mut self, bet: u128) {
        self.bet = bet;
    }

    pub(crate) fn mark_doubled(&mut self) {
        self.doubled = true;
    }

    pub(crate) fn mark_acted(&mut self) {
        self.acted = true;
    }

    pub(crate) fn mark_from_split(&mut self) {
        self.from_split = true;
        self.acted = true;
    }

    pub(crate) fn record_settlement(&mut self, outcome: HandOutcome) {
        self.settlement = Some(outcome);
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new(0)
    }
}
