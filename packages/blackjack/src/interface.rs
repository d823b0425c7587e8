//! Seams to the outside world: whoever asks the humans for decisions
//! ([`Prompter`]) and whoever shows them the table ([`Presenter`]).
//!
//! The engine only hands out read-only views and never formats anything.

use serde::Serialize;

use crate::{Action, Card, Dealer, EngineError, Hand, HandState, Player, PlayerResult, Table};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Question {
    BuyInsurance { player: String },
    NewRound,
}

/// Source of human decisions. Each method returns `None` when the reply
/// could not be understood; the engine then asks once more before falling
/// back to a default.
pub trait Prompter {
    fn choose_action(
        &mut self,
        player: &PlayerView<'_>,
        hand_index: usize,
        offered: &[Action],
    ) -> Option<Action>;

    fn confirm(&mut self, question: &Question) -> Option<bool>;

    /// Chips to add to a stake that is below the table minimum.
    fn bet_adjustment(&mut self, player: &str, stake: u128, minimum: u128) -> Option<i128>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    Dealt,
    Natural { player: String },
    DealerNatural,
    InsuranceBought { player: String, stake: u128 },
    InsuranceLost,
    HandFinished { player: String, hand_index: usize, state: HandState },
    DealerDrew(Card),
    Retry(EngineError),
    Defaulted(EngineError),
    Finished(Vec<PlayerResult>),
    /// The round could not be completed, e.g. the shoe ran dry.
    Aborted(EngineError),
}

/// Receives snapshots and events to render. Everything defaults to a no-op.
pub trait Presenter {
    fn show_table(&mut self, _table: &TableView<'_>) {}

    fn announce(&mut self, _event: &RoundEvent) {}
}

/// Presenter that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Presenter for Silent {}

#[derive(Debug, Clone, Serialize)]
pub struct HandView<'a> {
    pub cards: &'a [Card],
    pub bet: u128,
    pub total: Option<u8>,
    pub soft: bool,
    pub state: HandState,
    pub doubled: bool,
    pub natural: bool,
}

impl<'a> From<&'a Hand> for HandView<'a> {
    fn from(hand: &'a Hand) -> Self {
        Self {
            cards: hand.cards(),
            bet: hand.bet(),
            total: hand.total(),
            soft: hand.is_soft(),
            state: hand.state(),
            doubled: hand.is_doubled(),
            natural: hand.is_natural(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView<'a> {
    pub name: &'a str,
    pub hands: Vec<HandView<'a>>,
    pub has_split: bool,
    pub has_surrendered: bool,
    pub has_insurance: bool,
}

impl<'a> From<&'a Player> for PlayerView<'a> {
    fn from(player: &'a Player) -> Self {
        Self {
            name: player.name(),
            hands: player.hands().iter().map(HandView::from).collect(),
            has_split: player.has_split(),
            has_surrendered: player.has_surrendered(),
            has_insurance: player.has_insurance(),
        }
    }
}

/// What the players may see of the dealer: the up-card only until the hole
/// card is revealed.
#[derive(Debug, Clone, Serialize)]
pub struct DealerView<'a> {
    pub name: &'a str,
    pub visible: &'a [Card],
    pub hidden: usize,
    pub total: Option<u8>,
    pub revealed: bool,
}

impl<'a> From<&'a Dealer> for DealerView<'a> {
    fn from(dealer: &'a Dealer) -> Self {
        let cards = dealer.hand().cards();
        if dealer.is_revealed() {
            Self {
                name: dealer.name(),
                visible: cards,
                hidden: 0,
                total: dealer.hand().total(),
                revealed: true,
            }
        } else {
            let shown = cards.len().min(1);
            Self {
                name: dealer.name(),
                visible: &cards[..shown],
                hidden: cards.len() - shown,
                total: None,
                revealed: false,
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableView<'a> {
    pub players: Vec<PlayerView<'a>>,
    pub dealer: DealerView<'a>,
}

impl<'a> From<&'a Table> for TableView<'a> {
    fn from(table: &'a Table) -> Self {
        Self {
            players: table.players().iter().map(PlayerView::from).collect(),
            dealer: DealerView::from(table.dealer()),
        }
    }
}

/// Ask, and on a bad answer ask exactly once more before using `default`.
pub(crate) fn with_second_chance<T>(
    presenter: &mut dyn Presenter,
    default: T,
    mut ask: impl FnMut() -> Result<T, EngineError>,
) -> T {
    match ask() {
        Ok(answer) => return answer,
        Err(e) => {
            log::warn!("{e}; asking once more");
            presenter.announce(&RoundEvent::Retry(e));
        }
    }
    match ask() {
        Ok(answer) => answer,
        Err(e) => {
            log::warn!("{e}; falling back to the default");
            presenter.announce(&RoundEvent::Defaulted(e));
            default
        }
    }
}
