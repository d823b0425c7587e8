//! Payout classification. Each hand is settled at most once per round; the
//! recorded outcome is returned on any later call without paying again.

use serde::{Deserialize, Serialize};

use crate::hand::BLACKJACK;
use crate::{Bust, Hand, HandOutcome, HandState, Player, Table, TableRules, TwentyOneBonus};

/// Final word on one hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandResult {
    pub outcome: HandOutcome,
    pub bet: u128,
}

/// Outcomes for one player; two entries after a split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub name: String,
    pub hands: Vec<HandResult>,
}

impl PlayerResult {
    pub fn from_player(player: &Player) -> Self {
        Self {
            name: player.name().to_string(),
            hands: player
                .hands()
                .iter()
                .filter_map(|h| {
                    h.settlement().map(|outcome| HandResult {
                        outcome,
                        bet: h.bet(),
                    })
                })
                .collect(),
        }
    }

    pub fn stake(&self) -> u128 {
        self.hands.iter().map(|h| h.bet).fold(0, u128::saturating_add)
    }
}

fn earns_bonus(hand: &Hand, rules: &TableRules) -> bool {
    match rules.twenty_one_bonus {
        TwentyOneBonus::NaturalOnly => hand.is_natural(),
        TwentyOneBonus::AnyTwentyOne => hand.value() == Ok(BLACKJACK),
    }
}

/// Compare a finished hand with the dealer. A bust is below every total.
pub fn classify(hand: &Hand, dealer: Result<u8, Bust>, rules: &TableRules) -> HandOutcome {
    if hand.state() == HandState::Surrendered {
        return HandOutcome::Surrender;
    }
    let total = match hand.value() {
        Ok(total) => total,
        Err(Bust) => return HandOutcome::Loss,
    };
    let winning = match dealer {
        Err(Bust) => true,
        Ok(dealer_total) if total == dealer_total => return HandOutcome::Push,
        Ok(dealer_total) => total > dealer_total,
    };
    match (winning, earns_bonus(hand, rules)) {
        (true, true) => HandOutcome::Blackjack,
        (true, false) => HandOutcome::Win,
        (false, _) => HandOutcome::Loss,
    }
}

/// Stake after applying `outcome` to `bet`.
pub fn payout(bet: u128, outcome: HandOutcome, rules: &TableRules) -> u128 {
    match outcome {
        HandOutcome::Blackjack => rules.payouts.blackjack.calculate_payout(bet),
        HandOutcome::Win => rules.payouts.win.calculate_payout(bet),
        HandOutcome::Loss => 0,
        // already adjusted when the hand surrendered or the insurance paid
        HandOutcome::Push | HandOutcome::Surrender | HandOutcome::Insured => bet,
    }
}

/// Record a predetermined outcome, e.g. a natural paid before the dealer plays.
pub fn settle_as(hand: &mut Hand, outcome: HandOutcome, rules: &TableRules) -> HandOutcome {
    if let Some(recorded) = hand.settlement() {
        return recorded;
    }
    hand.set_bet(payout(hand.bet(), outcome, rules));
    hand.record_settlement(outcome);
    outcome
}

pub fn settle_hand(hand: &mut Hand, dealer: Result<u8, Bust>, rules: &TableRules) -> HandOutcome {
    if let Some(recorded) = hand.settlement() {
        return recorded;
    }
    let outcome = classify(hand, dealer, rules);
    settle_as(hand, outcome, rules)
}

/// Settle every remaining hand at the table against the dealer's final total.
pub fn settle_table(table: &mut Table) -> Vec<PlayerResult> {
    let dealer = table.dealer.hand.value();
    let rules = table.rules;
    table
        .players
        .iter_mut()
        .map(|player| {
            let name = player.name().to_string();
            for (index, hand) in player.hands.iter_mut().enumerate() {
                let already = hand.is_settled();
                let outcome = settle_hand(hand, dealer, &rules);
                if !already {
                    log::debug!(
                        "{} hand #{} settled as {:?}, stake {}",
                        name,
                        index + 1,
                        outcome,
                        hand.bet()
                    );
                }
            }
            PlayerResult::from_player(player)
        })
        .collect()
}
