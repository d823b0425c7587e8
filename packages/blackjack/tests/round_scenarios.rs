use std::collections::VecDeque;

use blackjack::{
    Action, Card, Deck, EngineError, HandOutcome, Player, PlayerView, Presenter, Prompter,
    Question, Round, RoundEnd, RoundEvent, RoundReport, Session, StackedShoe, Suit, Table,
    TableRules, TableView, ACE, KING,
};

/// Replays canned answers. Once a queue runs dry it stands, declines and
/// gives no top-up.
#[derive(Default)]
struct Script {
    actions: VecDeque<Option<Action>>,
    answers: VecDeque<Option<bool>>,
    top_ups: VecDeque<Option<i128>>,
    offers: Vec<Vec<Action>>,
    questions: Vec<Question>,
}

impl Script {
    fn actions(mut self, actions: &[Action]) -> Self {
        self.actions.extend(actions.iter().copied().map(Some));
        self
    }

    fn raw_actions(mut self, actions: &[Option<Action>]) -> Self {
        self.actions.extend(actions.iter().copied());
        self
    }

    fn answers(mut self, answers: &[Option<bool>]) -> Self {
        self.answers.extend(answers.iter().copied());
        self
    }

    fn top_ups(mut self, top_ups: &[Option<i128>]) -> Self {
        self.top_ups.extend(top_ups.iter().copied());
        self
    }
}

impl Prompter for Script {
    fn choose_action(
        &mut self,
        _player: &PlayerView<'_>,
        _hand_index: usize,
        offered: &[Action],
    ) -> Option<Action> {
        self.offers.push(offered.to_vec());
        self.actions.pop_front().unwrap_or(Some(Action::Stand))
    }

    fn confirm(&mut self, question: &Question) -> Option<bool> {
        self.questions.push(question.clone());
        self.answers.pop_front().unwrap_or(Some(false))
    }

    fn bet_adjustment(&mut self, _player: &str, _stake: u128, _minimum: u128) -> Option<i128> {
        self.top_ups.pop_front().flatten()
    }
}

#[derive(Default)]
struct Recorder {
    events: Vec<RoundEvent>,
    /// (revealed, hidden cards) of the dealer at every snapshot
    dealer_snapshots: Vec<(bool, usize)>,
}

impl Presenter for Recorder {
    fn show_table(&mut self, table: &TableView<'_>) {
        self.dealer_snapshots
            .push((table.dealer.revealed, table.dealer.hidden));
    }

    fn announce(&mut self, event: &RoundEvent) {
        self.events.push(event.clone());
    }
}

fn stacked(faces: &[u8]) -> StackedShoe {
    StackedShoe::new(
        faces
            .iter()
            .enumerate()
            .map(|(i, &face)| Card::new(Suit::ALL[i % 4], face)),
    )
}

fn play_round(
    rules: TableRules,
    players: Vec<Player>,
    faces: &[u8],
    script: &mut Script,
    recorder: &mut Recorder,
) -> (RoundReport, Table, StackedShoe) {
    let mut table = Table::new(rules, players).unwrap();
    let mut shoe = stacked(faces);
    let report = Round::new(&mut table, &mut shoe, script, recorder)
        .play()
        .unwrap();
    (report, table, shoe)
}

fn solo(faces: &[u8], script: &mut Script) -> (RoundReport, Table, StackedShoe) {
    play_round(
        TableRules::default(),
        vec![Player::new("ann", 100)],
        faces,
        script,
        &mut Recorder::default(),
    )
}

fn only_hand(report: &RoundReport) -> (HandOutcome, u128) {
    let result = report.result_for("ann").unwrap();
    assert_eq!(result.hands.len(), 1);
    (result.hands[0].outcome, result.hands[0].bet)
}

#[test]
fn test_player_natural_paid_without_dealer_draw() {
    // ann: A K, dealer: 9 7
    let mut script = Script::default();
    let (report, table, _) = solo(&[ACE, 9, KING, 7], &mut script);

    assert_eq!(only_hand(&report), (HandOutcome::Blackjack, 250));
    assert_eq!(report.end, RoundEnd::Settled);
    assert!(!report.dealer_drew);
    assert_eq!(report.dealer_total, Some(16));
    assert!(script.offers.is_empty());
    assert_eq!(table.players()[0].stake(), 250);
}

#[test]
fn test_stand_and_lose_to_higher_dealer() {
    // ann: 10 8, dealer: 10 9
    let mut script = Script::default().actions(&[Action::Stand]);
    let (report, _, _) = solo(&[10, 10, 8, 9], &mut script);

    assert_eq!(only_hand(&report), (HandOutcome::Loss, 0));
    assert_eq!(report.dealer_total, Some(19));
    assert_eq!(
        script.offers[0],
        vec![
            Action::Hit,
            Action::Stand,
            Action::DoubleDown,
            Action::Surrender
        ]
    );
}

#[test]
fn test_split_then_play_both_hands() {
    // ann: 8 8, dealer: 10 7; split deals 5 then 10, hit on the first hand draws 6
    let mut script =
        Script::default().actions(&[Action::Split, Action::Hit, Action::Stand, Action::Stand]);
    let (report, table, shoe) = solo(&[8, 10, 8, 7, 5, 10, 6], &mut script);

    let result = report.result_for("ann").unwrap();
    assert_eq!(result.hands.len(), 2);
    assert!(result
        .hands
        .iter()
        .all(|h| h.outcome == HandOutcome::Win && h.bet == 200));
    assert_eq!(result.stake(), 400);
    assert_eq!(table.players()[0].hands()[0].value(), Ok(19));
    assert_eq!(table.players()[0].hands()[1].value(), Ok(18));
    assert_eq!(shoe.remaining(), 0);
    // neither split hand may split again or surrender
    assert!(script.offers[1..]
        .iter()
        .all(|o| !o.contains(&Action::Split) && !o.contains(&Action::Surrender)));
}

#[test]
fn test_split_stakes_merge_next_round() {
    let table = Table::new(TableRules::default(), vec![Player::new("ann", 100)]).unwrap();
    // round one: the split above; round two: ann 10 9, dealer 10 7
    let shoe = stacked(&[8, 10, 8, 7, 5, 10, 6, 10, 10, 9, 7]);
    let script = Script::default()
        .actions(&[Action::Split, Action::Hit, Action::Stand, Action::Stand])
        .answers(&[Some(true), Some(false)]);
    let mut session = Session::new(table, shoe, script, Recorder::default());

    assert_eq!(session.run(), 2);
    let report = session.last_report().unwrap();
    assert_eq!(only_hand(report), (HandOutcome::Win, 800));
    assert_eq!(session.table().players()[0].hands().len(), 1);
}

#[test]
fn test_insurance_pays_against_dealer_natural() {
    // ann: 10 7, dealer: A K
    let mut script = Script::default().answers(&[Some(true)]);
    let mut recorder = Recorder::default();
    let (report, _, _) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 100)],
        &[10, ACE, 7, KING],
        &mut script,
        &mut recorder,
    );

    assert_eq!(report.end, RoundEnd::DealerBlackjack);
    assert_eq!(only_hand(&report), (HandOutcome::Insured, 250));
    assert_eq!(
        script.questions,
        vec![Question::BuyInsurance {
            player: "ann".to_string()
        }]
    );
    assert!(script.offers.is_empty());
    assert!(recorder.events.contains(&RoundEvent::DealerNatural));
    // the hole card stayed hidden until insurance was decided
    assert_eq!(recorder.dealer_snapshots[0], (false, 1));
}

#[test]
fn test_uninsured_player_loses_to_dealer_natural() {
    let mut script = Script::default().answers(&[Some(false)]);
    let (report, _, _) = solo(&[10, ACE, 7, KING], &mut script);
    assert_eq!(report.end, RoundEnd::DealerBlackjack);
    assert_eq!(only_hand(&report), (HandOutcome::Loss, 0));
}

#[test]
fn test_dealer_natural_with_ten_up_skips_insurance() {
    // ann: 9 8, dealer: K A
    let mut script = Script::default();
    let (report, _, _) = solo(&[9, KING, 8, ACE], &mut script);
    assert_eq!(report.end, RoundEnd::DealerBlackjack);
    assert_eq!(only_hand(&report), (HandOutcome::Loss, 0));
    assert!(script.questions.is_empty());
}

#[test]
fn test_insurance_lost_restores_stake_and_play_continues() {
    // ann: 10 8, dealer: A 6 (soft 17 stands)
    let mut script = Script::default().answers(&[Some(true)]);
    let mut recorder = Recorder::default();
    let (report, _, _) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 100)],
        &[10, ACE, 8, 6],
        &mut script,
        &mut recorder,
    );

    assert!(recorder.events.contains(&RoundEvent::InsuranceLost));
    assert_eq!(report.end, RoundEnd::Settled);
    assert_eq!(only_hand(&report), (HandOutcome::Win, 200));
}

#[test]
fn test_everyone_pushes_when_dealer_natural_meets_a_player_natural() {
    // ann: A K, bob: 9 9, dealer: A K
    let mut script = Script::default();
    let (report, _, _) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 100), Player::new("bob", 100)],
        &[ACE, 9, ACE, KING, 9, KING],
        &mut script,
        &mut Recorder::default(),
    );

    assert_eq!(report.end, RoundEnd::NaturalsPush);
    let ann = report.result_for("ann").unwrap();
    let bob = report.result_for("bob").unwrap();
    assert_eq!(ann.hands[0].outcome, HandOutcome::Push);
    assert_eq!(ann.stake(), 100);
    assert_eq!(bob.hands[0].outcome, HandOutcome::Push);
    assert_eq!(bob.stake(), 100);
    assert!(script.questions.is_empty());
    assert!(script.offers.is_empty());
}

#[test]
fn test_natural_pays_while_others_play_on() {
    // ann: A K, bob: 10 6 hits a 4, dealer: 9 8
    let mut script = Script::default().actions(&[Action::Hit, Action::Stand]);
    let (report, _, _) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 100), Player::new("bob", 100)],
        &[ACE, 10, 9, KING, 6, 8, 4],
        &mut script,
        &mut Recorder::default(),
    );

    assert_eq!(report.end, RoundEnd::Settled);
    assert!(report.dealer_drew);
    assert_eq!(report.result_for("ann").unwrap().stake(), 250);
    // bob 20 against 17
    assert_eq!(report.result_for("bob").unwrap().stake(), 200);
}

#[test]
fn test_surrender_returns_half_and_dealer_skips() {
    // ann: 10 6, dealer: 10 9
    let mut script = Script::default().actions(&[Action::Surrender]);
    let (report, _, _) = solo(&[10, 10, 6, 9], &mut script);
    assert_eq!(only_hand(&report), (HandOutcome::Surrender, 50));
    assert!(!report.dealer_drew);
}

#[test]
fn test_bust_loses_and_dealer_skips() {
    // ann: 10 6 hits a K, dealer: 10 7
    let mut script = Script::default().actions(&[Action::Hit]);
    let mut recorder = Recorder::default();
    let (report, _, shoe) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 100)],
        &[10, 10, 6, 7, KING, 5],
        &mut script,
        &mut recorder,
    );

    assert_eq!(only_hand(&report), (HandOutcome::Loss, 0));
    assert!(!report.dealer_drew);
    assert_eq!(shoe.remaining(), 1);
    assert!(recorder.events.iter().any(|e| matches!(
        e,
        RoundEvent::HandFinished { state: blackjack::HandState::Bust, .. }
    )));
}

#[test]
fn test_dealer_bust_pays_standing_hands() {
    // ann: 10 8, dealer: 10 6 draws a K
    let mut script = Script::default().actions(&[Action::Stand]);
    let (report, _, _) = solo(&[10, 10, 8, 6, KING], &mut script);
    assert_eq!(report.dealer_total, None);
    assert!(report.dealer_drew);
    assert_eq!(only_hand(&report), (HandOutcome::Win, 200));
}

#[test]
fn test_double_down_to_21_follows_bonus_rule() {
    // ann: 5 6 doubles into a 10, dealer: 10 7
    let faces = [5, 10, 6, 7, 10];

    let mut script = Script::default().actions(&[Action::DoubleDown]);
    let (report, _, _) = solo(&faces, &mut script);
    assert_eq!(only_hand(&report), (HandOutcome::Win, 400));

    let mut script = Script::default().actions(&[Action::DoubleDown]);
    let (report, _, _) = play_round(
        TableRules::classic_house(),
        vec![Player::new("ann", 100)],
        &faces,
        &mut script,
        &mut Recorder::default(),
    );
    assert_eq!(only_hand(&report), (HandOutcome::Blackjack, 500));
}

#[test]
fn test_bad_choice_twice_defaults_to_stand() {
    // ann: 10 7, dealer: 10 9; split is never offered here
    let mut script = Script::default().actions(&[Action::Split, Action::Split]);
    let mut recorder = Recorder::default();
    let (report, _, _) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 100)],
        &[10, 10, 7, 9],
        &mut script,
        &mut recorder,
    );

    assert_eq!(script.offers.len(), 2);
    assert_eq!(only_hand(&report), (HandOutcome::Loss, 0));
    assert!(recorder
        .events
        .iter()
        .any(|e| matches!(e, RoundEvent::Retry(_))));
    assert!(recorder.events.iter().any(|e| matches!(
        e,
        RoundEvent::Defaulted(EngineError::InvalidAction {
            action: Action::Split,
            ..
        })
    )));
}

#[test]
fn test_unreadable_choice_gets_second_chance() {
    // ann: 10 2 hits a 5, dealer: 10 7
    let mut script =
        Script::default().raw_actions(&[None, Some(Action::Hit), Some(Action::Stand)]);
    let (report, _, _) = solo(&[10, 10, 2, 7, 5], &mut script);
    assert_eq!(only_hand(&report), (HandOutcome::Push, 100));
}

#[test]
fn test_stake_below_minimum_is_topped_up() {
    // ann: 10 9, dealer: 10 7
    let mut script = Script::default().top_ups(&[Some(30), Some(60)]);
    let (report, _, _) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 40)],
        &[10, 10, 9, 7],
        &mut script,
        &mut Recorder::default(),
    );
    assert_eq!(only_hand(&report), (HandOutcome::Win, 200));
}

#[test]
fn test_stake_below_minimum_defaults_to_minimum() {
    let rules = TableRules {
        min_bet: 150,
        ..TableRules::default()
    };
    let mut script = Script::default().top_ups(&[Some(-5), None]);
    let (report, _, _) = play_round(
        rules,
        vec![Player::new("ann", 40)],
        &[10, 10, 9, 7],
        &mut script,
        &mut Recorder::default(),
    );
    assert_eq!(only_hand(&report), (HandOutcome::Win, 300));
}

#[test]
fn test_oversized_top_up_falls_back_to_minimum() {
    // ann: A K, dealer: 9 7
    let mut script = Script::default().top_ups(&[Some(i128::MAX), Some(i128::MAX)]);
    let mut recorder = Recorder::default();
    let (report, _, _) = play_round(
        TableRules::default(),
        vec![Player::new("ann", 0)],
        &[ACE, 9, KING, 7],
        &mut script,
        &mut recorder,
    );
    assert_eq!(only_hand(&report), (HandOutcome::Blackjack, 250));
    assert!(recorder
        .events
        .iter()
        .any(|e| matches!(e, RoundEvent::Retry(EngineError::InvalidBet(_)))));
    assert!(recorder
        .events
        .iter()
        .any(|e| matches!(e, RoundEvent::Defaulted(EngineError::InvalidBet(_)))));
}

#[test]
fn test_empty_shoe_aborts_session() {
    let table = Table::new(TableRules::default(), vec![Player::new("ann", 100)]).unwrap();
    let shoe = stacked(&[10, 10, 9]);
    let mut session = Session::new(table, shoe, Script::default(), Recorder::default());

    assert_eq!(session.run(), 0);
    assert!(session.last_report().is_none());
    assert_eq!(
        session.presenter().events.last(),
        Some(&RoundEvent::Aborted(EngineError::EmptyShoe))
    );
}

#[test]
fn test_round_reports_empty_shoe() {
    let mut table = Table::new(TableRules::default(), vec![Player::new("ann", 100)]).unwrap();
    let mut shoe = stacked(&[10, 10, 6, 7]);
    let mut script = Script::default().actions(&[Action::Hit]);
    let result = Round::new(&mut table, &mut shoe, &mut script, &mut Recorder::default()).play();
    assert_eq!(result, Err(EngineError::EmptyShoe));
}

#[test]
fn test_session_asks_for_another_round() {
    let table = Table::new(TableRules::default(), vec![Player::new("ann", 100)]).unwrap();
    let shoe = Deck::seeded(2024);
    let mut session = Session::new(table, shoe, Script::default(), Recorder::default());

    assert_eq!(session.run(), 1);
    assert_eq!(session.prompter().questions.last(), Some(&Question::NewRound));
    let report = session.last_report().unwrap();
    assert_eq!(report.results.len(), 1);
    assert!(session
        .presenter()
        .events
        .iter()
        .any(|e| matches!(e, RoundEvent::Finished(_))));
}

#[test]
fn test_seeded_sessions_are_reproducible() {
    let run = |seed: u64| {
        let players = vec![Player::new("ann", 100), Player::new("bob", 300)];
        let table = Table::new(TableRules::default(), players).unwrap();
        let script = Script::default().answers(&[Some(true), Some(true), Some(false)]);
        let mut session = Session::new(table, Deck::seeded(seed), script, Recorder::default());
        session.run();
        (session.rounds_played(), session.last_report().cloned())
    };
    assert_eq!(run(99), run(99));
}
