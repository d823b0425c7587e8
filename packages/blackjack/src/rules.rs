use serde::{Deserialize, Serialize};

use crate::shoe::DECK_SIZE;
use crate::{EngineError, MAX_HAND_CARDS};

/// Largest stake a player may top up to. Payouts above it saturate instead
/// of overflowing.
pub const MAX_STAKE: u128 = u64::MAX as u128;

/// Seats one deck can serve in the worst case: every player splits and fills
/// both hands to the card limit, and the dealer draws to the limit too.
pub const MAX_SEATS: usize = (DECK_SIZE - MAX_HAND_CARDS) / (2 * MAX_HAND_CARDS);

/// Multiplier applied to a stake, as an exact ratio.
///
/// `calculate_payout` floors, so odd stakes lose the fractional chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRatio {
    pub numerator: u16,
    pub denominator: u16,
}

impl PayoutRatio {
    pub const ONE_TO_ONE: Self = Self {
        numerator: 1,
        denominator: 1,
    };
    pub const THREE_TO_TWO: Self = Self {
        numerator: 3,
        denominator: 2,
    };
    pub const TWO_TO_ONE: Self = Self {
        numerator: 2,
        denominator: 1,
    };
    pub const FIVE_TO_TWO: Self = Self {
        numerator: 5,
        denominator: 2,
    };
    pub const FIVE_TO_THREE: Self = Self {
        numerator: 5,
        denominator: 3,
    };

    pub fn new(numerator: u16, denominator: u16) -> Result<Self, EngineError> {
        if denominator == 0 {
            return Err(EngineError::InvalidRules(
                "Denominator cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    pub fn calculate_payout(&self, bet: u128) -> u128 {
        bet.saturating_mul(self.numerator as u128) / self.denominator as u128
    }

    fn is_at_least_even(&self) -> bool {
        self.denominator != 0 && self.numerator >= self.denominator
    }
}

impl std::str::FromStr for PayoutRatio {
    type Err = EngineError;

    /// Parses "5:2" style ratios.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || EngineError::InvalidRules(format!("Invalid payout ratio '{s}'"));
        let (num, den) = s.split_once(':').ok_or_else(malformed)?;
        let numerator = num.trim().parse().map_err(|_| malformed())?;
        let denominator = den.trim().parse().map_err(|_| malformed())?;
        Self::new(numerator, denominator)
    }
}

/// Total-return multipliers used at settlement. Each ratio is applied to the
/// hand's stake and the result replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutTable {
    /// Winning 21 that qualifies for the bonus (stake + 3:2 profit).
    pub blackjack: PayoutRatio,
    /// Any other win (stake + even money).
    pub win: PayoutRatio,
    /// Stake after buying insurance; the extra half is the side bet.
    pub insurance_stake: PayoutRatio,
    /// Applied to the insured stake when the dealer shows a natural.
    pub insurance_win: PayoutRatio,
}

impl Default for PayoutTable {
    fn default() -> Self {
        Self {
            blackjack: PayoutRatio::FIVE_TO_TWO,
            win: PayoutRatio::TWO_TO_ONE,
            insurance_stake: PayoutRatio::THREE_TO_TWO,
            insurance_win: PayoutRatio::FIVE_TO_THREE,
        }
    }
}

/// Which winning 21s are paid at the blackjack rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TwentyOneBonus {
    /// Only a natural (first two cards, not from a split).
    NaturalOnly,
    /// Every winning hand totalling 21.
    AnyTwentyOne,
}

/// Configurable table rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    /// Smallest stake a player may bring into a round
    pub min_bet: u128,

    /// Dealer stops drawing at this total
    pub dealer_stands_on: u8,

    /// Allow surrender on the first decision of an unsplit hand
    pub allow_surrender: bool,

    /// Maximum number of players seated at the table, at most [`MAX_SEATS`]
    /// so a single deck never runs dry mid-round
    pub max_players: usize,

    pub twenty_one_bonus: TwentyOneBonus,

    pub payouts: PayoutTable,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            min_bet: 100,
            dealer_stands_on: 17,
            allow_surrender: true,
            max_players: 3,
            twenty_one_bonus: TwentyOneBonus::NaturalOnly,
            payouts: PayoutTable::default(),
        }
    }
}

impl TableRules {
    /// House table that pays the blackjack rate on every winning 21.
    pub fn classic_house() -> Self {
        Self {
            twenty_one_bonus: TwentyOneBonus::AnyTwentyOne,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.min_bet == 0 {
            return Err(EngineError::InvalidRules(
                "Minimum bet must be positive".to_string(),
            ));
        }
        if !(12..=21).contains(&self.dealer_stands_on) {
            return Err(EngineError::InvalidRules(format!(
                "Dealer must stand on a total between 12 and 21, got {}",
                self.dealer_stands_on
            )));
        }
        if self.max_players == 0 || self.max_players > MAX_SEATS {
            return Err(EngineError::InvalidRules(format!(
                "Number of players must be between 1 and {MAX_SEATS}"
            )));
        }
        let payouts = &self.payouts;
        for (name, ratio) in [
            ("blackjack", payouts.blackjack),
            ("win", payouts.win),
            ("insurance_stake", payouts.insurance_stake),
            ("insurance_win", payouts.insurance_win),
        ] {
            if !ratio.is_at_least_even() {
                return Err(EngineError::InvalidRules(format!(
                    "{name} payout must return at least the stake, got {}:{}",
                    ratio.numerator, ratio.denominator
                )));
            }
        }
        Ok(())
    }
}
