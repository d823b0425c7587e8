//! The per-hand action state machine.
//!
//! A hand starts in [`HandState::AwaitingAction`] and every transition here
//! either leaves it there (a hit that neither busts nor reaches 21 or the card
//! limit) or moves it to a terminal state. The set of legal actions is always
//! recomputed from the hand, never stored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::hand::{BLACKJACK, MAX_HAND_CARDS};
use crate::{Bust, EngineError, Hand, HandOutcome, HandState, Player, Shoe, TableRules};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Hit,
    Stand,
    DoubleDown,
    Split,
    Surrender,
}

impl Action {
    pub fn label(&self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::DoubleDown => "double down",
            Action::Split => "split",
            Action::Surrender => "surrender",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Action {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hit" | "h" => Ok(Action::Hit),
            "stand" | "s" => Ok(Action::Stand),
            "double down" | "double" | "d" => Ok(Action::DoubleDown),
            "split" | "p" => Ok(Action::Split),
            "surrender" | "r" => Ok(Action::Surrender),
            other => Err(EngineError::MalformedInput(format!(
                "'{other}' is not a known action"
            ))),
        }
    }
}

/// Participant-level facts that decide which actions a hand may take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerFlags {
    pub has_split: bool,
}

pub fn can_double(hand: &Hand) -> bool {
    !hand.is_terminal() && hand.len() == 2 && !hand.is_doubled()
}

pub fn can_split(hand: &Hand, flags: PlayerFlags) -> bool {
    !hand.is_terminal() && !flags.has_split && !hand.has_acted() && hand.can_split()
}

pub fn can_surrender(hand: &Hand, flags: PlayerFlags, rules: &TableRules) -> bool {
    rules.allow_surrender
        && !hand.is_terminal()
        && !flags.has_split
        && !hand.has_acted()
        && hand.len() == 2
}

/// Actions offered for a hand right now, in prompt order.
pub fn legal_actions(hand: &Hand, flags: PlayerFlags, rules: &TableRules) -> Vec<Action> {
    if hand.is_terminal() || hand.len() >= MAX_HAND_CARDS {
        return Vec::new();
    }
    let mut offered = vec![Action::Hit, Action::Stand];
    if can_double(hand) {
        offered.push(Action::DoubleDown);
    }
    if can_split(hand, flags) {
        offered.push(Action::Split);
    }
    if can_surrender(hand, flags, rules) {
        offered.push(Action::Surrender);
    }
    offered
}

/// Classify a hand right after it received a card.
pub(crate) fn resolve_draw(hand: &mut Hand) -> HandState {
    let next = match hand.value() {
        Err(Bust) => HandState::Bust,
        Ok(BLACKJACK) => HandState::Has21,
        Ok(_) if hand.len() >= MAX_HAND_CARDS => HandState::CardLimitReached,
        Ok(_) => HandState::AwaitingAction,
    };
    hand.set_state(next);
    next
}

fn ensure_open(hand: &Hand, action: Action) -> Result<(), EngineError> {
    if hand.is_terminal() {
        return Err(EngineError::invalid_action(
            action,
            format!("hand is already {:?}", hand.state()),
        ));
    }
    Ok(())
}

pub fn hit(hand: &mut Hand, shoe: &mut dyn Shoe) -> Result<HandState, EngineError> {
    ensure_open(hand, Action::Hit)?;
    if hand.len() >= MAX_HAND_CARDS {
        return Err(EngineError::invalid_action(
            Action::Hit,
            "hand already holds five cards",
        ));
    }
    hand.add_card(shoe.draw_next()?)?;
    hand.mark_acted();
    Ok(resolve_draw(hand))
}

pub fn stand(hand: &mut Hand) -> Result<HandState, EngineError> {
    ensure_open(hand, Action::Stand)?;
    hand.mark_acted();
    hand.set_state(HandState::Stood);
    Ok(HandState::Stood)
}

/// Double the stake, take exactly one card and stop.
pub fn double_down(hand: &mut Hand, shoe: &mut dyn Shoe) -> Result<HandState, EngineError> {
    if !can_double(hand) {
        return Err(EngineError::invalid_action(
            Action::DoubleDown,
            "only a fresh two-card hand can double",
        ));
    }
    hand.set_bet(hand.bet().saturating_mul(2));
    hand.mark_doubled();
    hand.mark_acted();
    hand.add_card(shoe.draw_next()?)?;
    let state = match resolve_draw(hand) {
        HandState::AwaitingAction => HandState::Stood,
        terminal => terminal,
    };
    hand.set_state(state);
    Ok(state)
}

/// Give up half the stake (rounded down) and leave the round.
pub fn surrender(
    hand: &mut Hand,
    flags: PlayerFlags,
    rules: &TableRules,
) -> Result<HandState, EngineError> {
    if !can_surrender(hand, flags, rules) {
        return Err(EngineError::invalid_action(
            Action::Surrender,
            "surrender is only allowed as the first decision on an unsplit hand",
        ));
    }
    hand.set_bet(hand.bet() / 2);
    hand.mark_acted();
    hand.set_state(HandState::Surrendered);
    hand.record_settlement(HandOutcome::Surrender);
    Ok(HandState::Surrendered)
}

/// Validate `action` against the offer set for the player's hand and apply it.
pub fn apply_action(
    player: &mut Player,
    hand_index: usize,
    action: Action,
    shoe: &mut dyn Shoe,
    rules: &TableRules,
) -> Result<HandState, EngineError> {
    let flags = player.flags();
    let hand = player
        .hands
        .get(hand_index)
        .ok_or_else(|| EngineError::invalid_action(action, format!("no hand #{hand_index}")))?;
    if !legal_actions(hand, flags, rules).contains(&action) {
        return Err(EngineError::invalid_action(
            action,
            format!("not offered for {}'s hand #{}", player.name(), hand_index + 1),
        ));
    }

    let state = match action {
        Action::Split => {
            player.split(shoe)?;
            player.hands[hand_index].state()
        }
        Action::Hit => hit(&mut player.hands[hand_index], shoe)?,
        Action::Stand => stand(&mut player.hands[hand_index])?,
        Action::DoubleDown => double_down(&mut player.hands[hand_index], shoe)?,
        Action::Surrender => surrender(&mut player.hands[hand_index], flags, rules)?,
    };
    log::debug!(
        "{} {} on hand #{} -> {:?}",
        player.name(),
        action,
        hand_index + 1,
        state
    );
    Ok(state)
}
