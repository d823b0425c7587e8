use serde::{Deserialize, Serialize};

use crate::actions::resolve_draw;
use crate::{Action, Card, EngineError, Hand, HandState, PayoutRatio, PlayerFlags, Shoe, TableRules};

/// Current phase of the round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    NotStarted,
    InitialDeal,
    Insurance,
    PlayerTurn,
    DealerTurn,
    Settled,
}

/// A seated player: one hand, or two after a split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    name: String,
    pub(crate) hands: Vec<Hand>,
    insured: bool,
    pre_insurance_bet: Option<u128>,
}

impl Player {
    pub fn new(name: impl Into<String>, bet: u128) -> Self {
        Self {
            name: name.into(),
            hands: vec![Hand::new(bet)],
            insured: false,
            pre_insurance_bet: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand(&self, index: usize) -> Option<&Hand> {
        self.hands.get(index)
    }

    pub(crate) fn first_hand_mut(&mut self) -> &mut Hand {
        &mut self.hands[0]
    }

    /// Everything this player has riding, across both hands after a split.
    pub fn stake(&self) -> u128 {
        self.hands.iter().map(Hand::bet).fold(0, u128::saturating_add)
    }

    pub fn has_split(&self) -> bool {
        self.hands.len() > 1
    }

    pub fn has_surrendered(&self) -> bool {
        self.hands
            .iter()
            .any(|h| h.state() == HandState::Surrendered)
    }

    pub fn has_insurance(&self) -> bool {
        self.insured
    }

    pub fn flags(&self) -> PlayerFlags {
        PlayerFlags {
            has_split: self.has_split(),
        }
    }

    pub fn has_natural(&self) -> bool {
        !self.has_split() && self.hands[0].is_natural()
    }

    /// First hand still waiting for a decision, in seat order.
    pub fn next_open_hand(&self) -> Option<usize> {
        self.hands.iter().position(|h| !h.is_terminal())
    }

    pub fn all_hands_finished(&self) -> bool {
        self.next_open_hand().is_none()
    }

    /// Any hand that still needs the dealer's total to be settled.
    pub fn has_live_hand(&self) -> bool {
        self.hands
            .iter()
            .any(|h| !h.is_settled() && h.state() != HandState::Bust)
    }

    /// Start a new round: one empty hand carrying the merged stake.
    pub fn reset(&mut self) {
        let stake = self.stake();
        self.hands = vec![Hand::new(stake)];
        self.insured = false;
        self.pre_insurance_bet = None;
    }

    pub(crate) fn set_stake(&mut self, bet: u128) {
        self.first_hand_mut().set_bet(bet);
    }

    /// Split a two-card pair into two hands that each receive one fresh card.
    pub fn split(&mut self, shoe: &mut dyn Shoe) -> Result<(), EngineError> {
        if !crate::actions::can_split(&self.hands[0], self.flags()) {
            return Err(EngineError::invalid_action(
                Action::Split,
                "only an untouched pair of equal faces can split, once",
            ));
        }

        let hand = &mut self.hands[0];
        let second_card = hand
            .take_second_card()
            .ok_or_else(|| EngineError::invalid_action(Action::Split, "No second card"))?;
        hand.mark_from_split();

        let mut new_hand = Hand::new(hand.bet());
        new_hand.mark_from_split();
        new_hand.add_card(second_card)?;
        self.hands.push(new_hand);

        for hand in self.hands.iter_mut() {
            hand.add_card(shoe.draw_next()?)?;
            if resolve_draw(hand) == HandState::Has21 {
                log::info!("{} split hand reached 21", self.name);
            }
        }
        Ok(())
    }

    pub(crate) fn buy_insurance(&mut self, stake: PayoutRatio) {
        let bet = self.hands[0].bet();
        self.pre_insurance_bet = Some(bet);
        self.hands[0].set_bet(stake.calculate_payout(bet));
        self.insured = true;
    }

    /// Dealer showed a natural: pay the insured stake.
    pub(crate) fn collect_insurance(&mut self, win: PayoutRatio) {
        if self.insured {
            let bet = self.hands[0].bet();
            self.hands[0].set_bet(win.calculate_payout(bet));
        }
    }

    /// Dealer had no natural: the side bet is gone, the main bet stays.
    pub(crate) fn forfeit_insurance(&mut self) {
        if let Some(bet) = self.pre_insurance_bet.take() {
            self.hands[0].set_bet(bet);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dealer {
    name: String,
    pub(crate) hand: Hand,
    revealed: bool,
}

impl Dealer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hand: Hand::new(0),
            revealed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn up_card(&self) -> Option<&Card> {
        self.hand.cards().first()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn shows_ace(&self) -> bool {
        self.up_card().is_some_and(Card::is_ace)
    }

    pub fn has_natural(&self) -> bool {
        self.hand.is_natural()
    }

    pub fn reveal(&mut self) {
        self.revealed = true;
    }

    /// Fixed house rule: draw below `dealer_stands_on`, never past five cards.
    pub fn should_hit(&self, rules: &TableRules) -> bool {
        match self.hand.value() {
            Ok(total) => {
                total < rules.dealer_stands_on && self.hand.len() < crate::MAX_HAND_CARDS
            }
            Err(_) => false,
        }
    }

    /// Draw out the dealer's hand. Returns the cards drawn.
    pub fn play_out(
        &mut self,
        shoe: &mut dyn Shoe,
        rules: &TableRules,
    ) -> Result<Vec<Card>, EngineError> {
        self.reveal();
        let mut drawn = Vec::new();
        while self.should_hit(rules) {
            let card = shoe.draw_next()?;
            self.hand.add_card(card)?;
            drawn.push(card);
        }
        let state = match resolve_draw(&mut self.hand) {
            HandState::AwaitingAction => HandState::Stood,
            terminal => terminal,
        };
        self.hand.set_state(state);
        Ok(drawn)
    }

    pub fn reset(&mut self) {
        self.hand = Hand::new(0);
        self.revealed = false;
    }
}

/// Everything at the table that outlives a single round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub rules: TableRules,
    pub(crate) players: Vec<Player>,
    pub(crate) dealer: Dealer,
    pub phase: GamePhase,
}

impl Table {
    pub fn new(rules: TableRules, players: Vec<Player>) -> Result<Self, EngineError> {
        rules.validate()?;
        if players.is_empty() || players.len() > rules.max_players {
            return Err(EngineError::InvalidRules(format!(
                "Number of players must be between 1 and {}",
                rules.max_players
            )));
        }

        Ok(Self {
            rules,
            players,
            dealer: Dealer::new("dealer"),
            phase: GamePhase::NotStarted,
        })
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    /// Clear every hand and per-round flag, merging split stakes.
    pub fn reset(&mut self) {
        for player in self.players.iter_mut() {
            player.reset();
        }
        self.dealer.reset();
        self.phase = GamePhase::NotStarted;
    }

    /// One card to each player then one to the dealer, twice. The dealer's
    /// second card stays face down.
    pub fn deal_initial(&mut self, shoe: &mut dyn Shoe) -> Result<(), EngineError> {
        self.phase = GamePhase::InitialDeal;
        for _ in 0..2 {
            for player in self.players.iter_mut() {
                player.first_hand_mut().add_card(shoe.draw_next()?)?;
            }
            self.dealer.hand.add_card(shoe.draw_next()?)?;
        }
        Ok(())
    }

    /// Indices of the players holding a natural 21.
    pub fn players_with_natural(&self) -> Vec<usize> {
        self.players
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_natural())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn has_live_hands(&self) -> bool {
        self.players.iter().any(Player::has_live_hand)
    }
}
