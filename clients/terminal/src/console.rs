use std::fmt::Display;
use std::io::{BufRead, Write};

use blackjack::{
    Action, Card, DealerView, HandOutcome, HandState, HandView, PlayerView, Presenter, Prompter,
    Question, RoundEvent, Suit, TableView,
};
use crossterm::style::{Color, StyledContent, Stylize};

const ORANGE: Color = Color::Rgb {
    r: 0xFF,
    g: 0xA5,
    b: 0x00,
};

fn shortcut(action: Action) -> char {
    match action {
        Action::Hit => 'h',
        Action::Stand => 's',
        Action::DoubleDown => 'd',
        Action::Split => 'p',
        Action::Surrender => 'r',
    }
}

fn styled_card(card: &Card) -> StyledContent<String> {
    let color = match card.suit() {
        Suit::Hearts => Color::Red,
        Suit::Diamonds => ORANGE,
        Suit::Clubs => Color::Magenta,
        Suit::Spades => Color::Black,
    };
    card.to_string().with(color).on(Color::Grey)
}

fn outcome_label(outcome: HandOutcome) -> StyledContent<&'static str> {
    match outcome {
        HandOutcome::Win => "WIN".green().bold(),
        HandOutcome::Blackjack => "BLACKJACK".green().bold(),
        HandOutcome::Loss => "LOSS".red().bold(),
        HandOutcome::Push => "PUSH".dark_grey(),
        HandOutcome::Surrender => "SURRENDER".with(ORANGE),
        HandOutcome::Insured => "INSURED".yellow(),
    }
}

fn describe_total(total: Option<u8>, soft: bool) -> String {
    match total {
        Some(total) if soft => format!("soft {total}"),
        Some(total) => total.to_string(),
        None => "bust".to_string(),
    }
}

/// Reads decisions one line at a time. End of input reads as an unclear
/// answer, so the engine's defaults take over.
pub struct Keyboard<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Keyboard<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{prompt} ").and_then(|()| self.output.flush()) {
            log::warn!("Failed to write prompt: {e}");
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                log::debug!("Input closed");
                None
            }
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                log::error!("Failed to read input: {e}");
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for Keyboard<R, W> {
    fn choose_action(
        &mut self,
        player: &PlayerView<'_>,
        hand_index: usize,
        offered: &[Action],
    ) -> Option<Action> {
        let hand = player.hands.get(hand_index)?;
        let options = offered
            .iter()
            .map(|a| format!("[{}]{}", shortcut(*a), a))
            .collect::<Vec<_>>()
            .join(" ");
        let prompt = format!(
            "{} hand #{} ({}): {options}?",
            player.name,
            hand_index + 1,
            describe_total(hand.total, hand.soft)
        );
        self.ask(&prompt)?.parse().ok()
    }

    fn confirm(&mut self, question: &Question) -> Option<bool> {
        let prompt = match question {
            Question::BuyInsurance { player } => {
                format!("{player}, the dealer shows an ace. Buy insurance? [y/n]")
            }
            Question::NewRound => "Deal another round? [y/n]".to_string(),
        };
        match self.ask(&prompt)?.to_lowercase().as_str() {
            "y" | "yes" => Some(true),
            "n" | "no" => Some(false),
            _ => None,
        }
    }

    fn bet_adjustment(&mut self, player: &str, stake: u128, minimum: u128) -> Option<i128> {
        let prompt = format!(
            "{player}, your stake of {stake} is below the table minimum of {minimum}. Chips to add:"
        );
        self.ask(&prompt)?.parse().ok()
    }
}

/// Prints table snapshots and round events.
pub struct Screen<W> {
    out: W,
}

impl<W: Write> Screen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: impl Display) {
        if let Err(e) = writeln!(self.out, "{text}") {
            log::warn!("Failed to write to terminal: {e}");
        }
    }

    fn cards(cards: &[Card]) -> String {
        cards
            .iter()
            .map(|c| styled_card(c).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn dealer_line(dealer: &DealerView<'_>) -> String {
        let mut shown = Self::cards(dealer.visible);
        for _ in 0..dealer.hidden {
            shown.push_str(&format!(" {}", "??".black().on(Color::Grey)));
        }
        match (dealer.revealed, dealer.total) {
            (true, total) => format!("{}: {shown}  ({})", dealer.name, describe_total(total, false)),
            (false, _) => format!("{}: {shown}", dealer.name),
        }
    }

    fn hand_line(index: usize, hand: &HandView<'_>) -> String {
        let mut line = format!(
            "  #{} {}  ({}) bet {}",
            index + 1,
            Self::cards(hand.cards),
            describe_total(hand.total, hand.soft),
            hand.bet
        );
        if hand.doubled {
            line.push_str(" doubled");
        }
        if hand.natural {
            line.push_str(&format!(" {}", "natural".green()));
        }
        line
    }
}

impl<W: Write> Presenter for Screen<W> {
    fn show_table(&mut self, table: &TableView<'_>) {
        self.line("");
        self.line(Self::dealer_line(&table.dealer));
        for player in &table.players {
            let mut header = player.name.bold().to_string();
            if player.has_insurance {
                header.push_str(" (insured)");
            }
            self.line(header);
            for (index, hand) in player.hands.iter().enumerate() {
                self.line(Self::hand_line(index, hand));
            }
        }
    }

    fn announce(&mut self, event: &RoundEvent) {
        match event {
            RoundEvent::Dealt => self.line("Cards are dealt.".cyan()),
            RoundEvent::Natural { player } => self.line(format!("{player} has blackjack!")),
            RoundEvent::DealerNatural => self.line("Dealer has blackjack.".red().bold()),
            RoundEvent::InsuranceBought { player, stake } => {
                self.line(format!("{player} is insured, stake now {stake}."))
            }
            RoundEvent::InsuranceLost => self.line("Dealer has no blackjack, insurance is lost."),
            RoundEvent::HandFinished {
                player,
                hand_index,
                state,
            } => match state {
                HandState::Bust => self.line(format!("{player} hand #{} busts.", hand_index + 1)),
                HandState::Has21 => self.line(format!("{player} hand #{} has 21.", hand_index + 1)),
                HandState::CardLimitReached => {
                    self.line(format!("{player} hand #{} holds five cards.", hand_index + 1))
                }
                _ => {}
            },
            RoundEvent::DealerDrew(card) => self.line(format!("Dealer draws {}", styled_card(card))),
            RoundEvent::Retry(e) => self.line(format!("{e}. Try again.").yellow()),
            RoundEvent::Defaulted(e) => self.line(format!("{e}. Using the default.").yellow()),
            RoundEvent::Finished(results) => {
                for result in results {
                    for (index, hand) in result.hands.iter().enumerate() {
                        self.line(format!(
                            "{} hand #{}: {} ({})",
                            result.name,
                            index + 1,
                            outcome_label(hand.outcome),
                            hand.bet
                        ));
                    }
                }
            }
            RoundEvent::Aborted(e) => self.line(format!("Round abandoned: {e}").red().bold()),
        }
    }
}
