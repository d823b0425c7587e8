use crate::interface::with_second_chance;
use crate::{
    EngineError, LoopControl, Presenter, Prompter, Question, Round, RoundEvent, RoundReport, Shoe,
    Table,
};

/// A table, its shoe and the people at it, playing round after round until
/// someone declines another.
pub struct Session<S, P, V> {
    table: Table,
    shoe: S,
    prompter: P,
    presenter: V,
    rounds_played: u32,
    last_report: Option<RoundReport>,
}

impl<S: Shoe, P: Prompter, V: Presenter> Session<S, P, V> {
    pub fn new(table: Table, shoe: S, prompter: P, presenter: V) -> Self {
        Self {
            table,
            shoe,
            prompter,
            presenter,
            rounds_played: 0,
            last_report: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn last_report(&self) -> Option<&RoundReport> {
        self.last_report.as_ref()
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn presenter(&self) -> &V {
        &self.presenter
    }

    /// Play one round, then ask whether to deal another.
    pub fn play_round(&mut self) -> Result<LoopControl, EngineError> {
        let round = Round::new(
            &mut self.table,
            &mut self.shoe,
            &mut self.prompter,
            &mut self.presenter,
        );
        let report = round.play()?;
        self.rounds_played += 1;
        self.last_report = Some(report);

        let prompter = &mut self.prompter;
        let again = with_second_chance(&mut self.presenter, false, || {
            prompter
                .confirm(&Question::NewRound)
                .ok_or_else(|| EngineError::MalformedInput("answer yes or no".to_string()))
        });
        Ok(if again {
            LoopControl::ContinueRound
        } else {
            LoopControl::EndSession
        })
    }

    /// Keep playing until the players stop or a round has to be abandoned.
    pub fn run(&mut self) -> u32 {
        loop {
            match self.play_round() {
                Ok(LoopControl::ContinueRound) => log::info!("Starting next round..."),
                Ok(LoopControl::EndSession) => break,
                Err(e) => {
                    log::error!("Round abandoned: {e}");
                    self.presenter.announce(&RoundEvent::Aborted(e));
                    break;
                }
            }
        }
        self.rounds_played
    }
}
