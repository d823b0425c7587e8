use crate::interface::with_second_chance;
use crate::{EngineError, GamePhase, Presenter, Prompter, Question, RoundEvent, Table};

/// Offer the insurance side bet to every player in seat order. Only called
/// while the dealer shows an ace and before anyone has acted.
pub(crate) fn offer_insurance(
    table: &mut Table,
    prompter: &mut dyn Prompter,
    presenter: &mut dyn Presenter,
) {
    table.phase = GamePhase::Insurance;
    let stake = table.rules.payouts.insurance_stake;
    for player in table.players.iter_mut() {
        let question = Question::BuyInsurance {
            player: player.name().to_string(),
        };
        let wants = with_second_chance(presenter, false, || {
            prompter.confirm(&question).ok_or_else(|| {
                EngineError::MalformedInput("answer yes or no to insurance".to_string())
            })
        });
        if wants {
            player.buy_insurance(stake);
            log::info!("{} bought insurance, stake {}", player.name(), player.stake());
            presenter.announce(&RoundEvent::InsuranceBought {
                player: player.name().to_string(),
                stake: player.stake(),
            });
        }
    }
}

/// Check the hole card against the insurance bets. Returns `true` when the
/// dealer had a natural and insured stakes were paid, `false` when play goes on
/// with every stake back at its pre-insurance value.
pub(crate) fn resolve_insurance(table: &mut Table, presenter: &mut dyn Presenter) -> bool {
    if table.dealer.has_natural() {
        let win = table.rules.payouts.insurance_win;
        for player in table.players.iter_mut().filter(|p| p.has_insurance()) {
            player.collect_insurance(win);
            log::info!("{} insurance paid, stake {}", player.name(), player.stake());
        }
        return true;
    }

    let mut any_insured = false;
    for player in table.players.iter_mut().filter(|p| p.has_insurance()) {
        player.forfeit_insurance();
        any_insured = true;
    }
    if any_insured {
        log::info!("Dealer has no blackjack, insurance lost");
        presenter.announce(&RoundEvent::InsuranceLost);
    }
    false
}
