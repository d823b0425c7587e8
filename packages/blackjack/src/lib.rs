mod actions;
mod card;
mod error;
mod game_state;
mod hand;
mod insurance;
mod interface;
mod round;
mod rules;
mod session;
mod settlement;
mod shoe;

pub use actions::{
    apply_action, can_double, can_split, can_surrender, legal_actions, Action, PlayerFlags,
};
pub use card::{Card, Suit, ACE, KING};
pub use error::EngineError;
pub use game_state::{Dealer, GamePhase, Player, Table};
pub use hand::{
    calculate_hand_value, can_split_cards, is_blackjack, is_busted, is_soft_hand, Bust, Hand,
    HandOutcome, HandState, BLACKJACK, MAX_HAND_CARDS,
};
pub use interface::{
    DealerView, HandView, PlayerView, Presenter, Prompter, Question, RoundEvent, Silent,
    TableView,
};
pub use round::{LoopControl, Round, RoundEnd, RoundReport};
pub use rules::{PayoutRatio, PayoutTable, TableRules, TwentyOneBonus, MAX_SEATS, MAX_STAKE};
pub use session::Session;
pub use settlement::{classify, payout, settle_as, settle_hand, settle_table, HandResult, PlayerResult};
pub use shoe::{Deck, Shoe, StackedShoe, DECK_SIZE};
