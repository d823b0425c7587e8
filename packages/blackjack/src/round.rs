//! One deal-through-settlement cycle.
//!
//! Order of play:
//!   1. reset hands and merge split stakes
//!   2. repair stakes below the table minimum
//!   3. shuffle and deal two cards each, dealer hole card face down
//!   4. resolve naturals (push, dealer blackjack, or paying player naturals)
//!   5. insurance when the dealer shows an ace
//!   6. players act in seat order, then the dealer draws out
//!   7. settlement

use serde::{Deserialize, Serialize};

use crate::actions::{apply_action, legal_actions, stand};
use crate::insurance::{offer_insurance, resolve_insurance};
use crate::interface::with_second_chance;
use crate::settlement::{settle_as, settle_table};
use crate::{
    Action, EngineError, GamePhase, HandOutcome, HandState, PlayerResult, PlayerView,
    Presenter, Prompter, RoundEvent, Shoe, Table, TableView, MAX_STAKE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundEnd {
    /// The dealer and at least one player had naturals. Every seat pushes.
    NaturalsPush,
    /// The dealer's natural ended the round before anyone acted.
    DealerBlackjack,
    /// Played out and settled against the dealer's total.
    Settled,
}

/// Whether the session should deal another round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    ContinueRound,
    EndSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub end: RoundEnd,
    pub results: Vec<PlayerResult>,
    /// `None` when the dealer busted.
    pub dealer_total: Option<u8>,
    pub dealer_drew: bool,
}

impl RoundReport {
    pub fn result_for(&self, name: &str) -> Option<&PlayerResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

pub struct Round<'a> {
    table: &'a mut Table,
    shoe: &'a mut dyn Shoe,
    prompter: &'a mut dyn Prompter,
    presenter: &'a mut dyn Presenter,
    dealer_drew: bool,
}

impl<'a> Round<'a> {
    pub fn new(
        table: &'a mut Table,
        shoe: &'a mut dyn Shoe,
        prompter: &'a mut dyn Prompter,
        presenter: &'a mut dyn Presenter,
    ) -> Self {
        Self {
            table,
            shoe,
            prompter,
            presenter,
            dealer_drew: false,
        }
    }

    /// Play the round to settlement. Only an empty shoe aborts it.
    pub fn play(mut self) -> Result<RoundReport, EngineError> {
        self.table.reset();
        self.enforce_minimum_bets();

        self.shoe.shuffle();
        self.table.deal_initial(&mut *self.shoe)?;
        self.presenter.announce(&RoundEvent::Dealt);
        self.show();

        let naturals = self.table.players_with_natural();
        for &index in &naturals {
            let player = &mut self.table.players[index];
            player.hands[0].set_state(HandState::Has21);
            log::info!("{} has a natural 21", player.name());
            self.presenter.announce(&RoundEvent::Natural {
                player: player.name().to_string(),
            });
        }

        if self.table.dealer.has_natural() {
            // the ace-up insurance offer still comes before the hole card is shown
            if naturals.is_empty() && self.table.dealer.shows_ace() {
                offer_insurance(&mut *self.table, &mut *self.prompter, &mut *self.presenter);
                resolve_insurance(&mut *self.table, &mut *self.presenter);
            }
            self.table.dealer.reveal();
            log::info!("Dealer has a natural 21");
            self.presenter.announce(&RoundEvent::DealerNatural);
            if naturals.is_empty() {
                self.settle_against_dealer_natural();
                return Ok(self.finish(RoundEnd::DealerBlackjack));
            }
            self.push_all();
            return Ok(self.finish(RoundEnd::NaturalsPush));
        }

        if !naturals.is_empty() {
            self.pay_naturals(&naturals);
        } else if self.table.dealer.shows_ace() {
            offer_insurance(&mut *self.table, &mut *self.prompter, &mut *self.presenter);
            if resolve_insurance(&mut *self.table, &mut *self.presenter) {
                self.table.dealer.reveal();
                self.presenter.announce(&RoundEvent::DealerNatural);
                self.settle_against_dealer_natural();
                return Ok(self.finish(RoundEnd::DealerBlackjack));
            }
        }

        self.table.phase = GamePhase::PlayerTurn;
        for index in 0..self.table.players.len() {
            self.play_player(index)?;
        }

        self.table.phase = GamePhase::DealerTurn;
        self.play_dealer()?;
        Ok(self.finish(RoundEnd::Settled))
    }

    fn show(&mut self) {
        let view = TableView::from(&*self.table);
        self.presenter.show_table(&view);
    }

    fn enforce_minimum_bets(&mut self) {
        let minimum = self.table.rules.min_bet;
        for player in self.table.players.iter_mut() {
            let stake = player.stake();
            if stake >= minimum {
                continue;
            }
            log::warn!("{} stake {} is below the minimum {}", player.name(), stake, minimum);
            let name = player.name().to_string();
            let prompter = &mut *self.prompter;
            let repaired = with_second_chance(&mut *self.presenter, minimum, || {
                let add = prompter
                    .bet_adjustment(&name, stake, minimum)
                    .ok_or_else(|| EngineError::MalformedInput("expected a number".to_string()))?;
                let topped_up = u128::try_from(add)
                    .ok()
                    .filter(|&add| add > 0)
                    .map(|add| stake.saturating_add(add))
                    .filter(|&total| total >= minimum);
                match topped_up {
                    Some(total) if total > MAX_STAKE => Err(EngineError::InvalidBet(format!(
                        "a stake of {total} is above the table limit of {MAX_STAKE}"
                    ))),
                    Some(total) => Ok(total),
                    None => Err(EngineError::InvalidBet(format!(
                        "adding {add} to {stake} does not reach the minimum of {minimum}"
                    ))),
                }
            });
            player.set_stake(repaired);
        }
    }

    /// Dealer natural met by at least one player natural: the round is a
    /// stand-off and every seat keeps its stake.
    fn push_all(&mut self) {
        let rules = self.table.rules;
        for player in self.table.players.iter_mut() {
            settle_as(&mut player.hands[0], HandOutcome::Push, &rules);
        }
    }

    /// Dealer natural with no player natural: insured players keep their
    /// insurance payout, everyone else loses.
    fn settle_against_dealer_natural(&mut self) {
        let rules = self.table.rules;
        for player in self.table.players.iter_mut() {
            let outcome = if player.has_insurance() {
                HandOutcome::Insured
            } else {
                HandOutcome::Loss
            };
            settle_as(&mut player.hands[0], outcome, &rules);
        }
    }

    fn pay_naturals(&mut self, naturals: &[usize]) {
        let rules = self.table.rules;
        for &index in naturals {
            let player = &mut self.table.players[index];
            settle_as(&mut player.hands[0], HandOutcome::Blackjack, &rules);
            log::info!("{} paid for blackjack, stake {}", player.name(), player.stake());
        }
    }

    fn play_player(&mut self, index: usize) -> Result<(), EngineError> {
        let rules = self.table.rules;
        while let Some(hand_index) = self.table.players[index].next_open_hand() {
            self.show();

            let player = &self.table.players[index];
            let offered = legal_actions(&player.hands[hand_index], player.flags(), &rules);
            let finished_before: Vec<bool> = player.hands().iter().map(|h| h.is_terminal()).collect();
            let view = PlayerView::from(player);
            let prompter = &mut *self.prompter;
            let choice = with_second_chance(&mut *self.presenter, Action::Stand, || {
                match prompter.choose_action(&view, hand_index, &offered) {
                    Some(action) if offered.contains(&action) => Ok(action),
                    Some(action) => Err(EngineError::invalid_action(
                        action,
                        "not offered for this hand",
                    )),
                    None => Err(EngineError::MalformedInput(
                        "unrecognized choice".to_string(),
                    )),
                }
            });

            let player = &mut self.table.players[index];
            let state = match apply_action(player, hand_index, choice, &mut *self.shoe, &rules) {
                Err(e @ EngineError::InvalidAction { .. }) => {
                    log::warn!("{e}; standing instead");
                    self.presenter.announce(&RoundEvent::Defaulted(e));
                    stand(&mut player.hands[hand_index])?
                }
                other => other?,
            };

            let player = &self.table.players[index];
            for (i, hand) in player.hands().iter().enumerate() {
                let was_finished = finished_before.get(i).copied().unwrap_or(false);
                if hand.is_terminal() && !was_finished {
                    self.presenter.announce(&RoundEvent::HandFinished {
                        player: player.name().to_string(),
                        hand_index: i,
                        state: hand.state(),
                    });
                }
            }
            log::debug!("{} hand #{} now {:?}", player.name(), hand_index + 1, state);
        }
        Ok(())
    }

    fn play_dealer(&mut self) -> Result<(), EngineError> {
        if !self.table.has_live_hands() {
            log::info!("No live hands left, dealer does not draw");
            self.table.dealer.reveal();
            return Ok(());
        }
        let rules = self.table.rules;
        let drawn = self.table.dealer.play_out(&mut *self.shoe, &rules)?;
        self.dealer_drew = true;
        for card in drawn {
            self.presenter.announce(&RoundEvent::DealerDrew(card));
        }
        log::info!("Dealer finished with {:?}", self.table.dealer.hand().value());
        Ok(())
    }

    fn finish(mut self, end: RoundEnd) -> RoundReport {
        let results = settle_table(&mut *self.table);
        self.table.phase = GamePhase::Settled;
        self.show();
        self.presenter.announce(&RoundEvent::Finished(results.clone()));
        log::info!("Round finished: {:?}", end);
        RoundReport {
            end,
            results,
            dealer_total: self.table.dealer.hand().total(),
            dealer_drew: self.dealer_drew,
        }
    }
}
