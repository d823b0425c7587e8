use std::io;
use std::path::PathBuf;

use blackjack::{Deck, Player, RoundReport, Session, Table, TableRules, TwentyOneBonus};
use clap::Parser;
use crossterm::style::Stylize;
use serde::Serialize;

mod console;
use console::{Keyboard, Screen};

type BoxErr = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "blackjack-table", about = "Single-table blackjack in the terminal")]
struct Cli {
    /// Player names, in seat order
    #[arg(required = true)]
    players: Vec<String>,

    /// Opening stake for every player
    #[arg(long, env = "BLACKJACK_STAKE", default_value = "100")]
    stake: u128,

    /// JSON file with the table rules
    #[arg(long, env = "BLACKJACK_RULES")]
    rules: Option<PathBuf>,

    /// Minimum bet
    #[arg(long, env = "BLACKJACK_MIN_BET")]
    min_bet: Option<u128>,

    /// Blackjack payout as total return on the stake (e.g. "5:2")
    #[arg(long, env = "BLACKJACK_PAYOUT")]
    blackjack_payout: Option<String>,

    /// Dealer stands once reaching this total
    #[arg(long, env = "BLACKJACK_DEALER_STANDS_ON")]
    dealer_stands_on: Option<u8>,

    /// Turn surrender off
    #[arg(long)]
    no_surrender: bool,

    /// Pay the blackjack rate on every winning 21, not just naturals
    #[arg(long)]
    classic_house: bool,

    /// Shuffle seed for a reproducible game
    #[arg(long, env = "BLACKJACK_SEED")]
    seed: Option<u64>,

    /// Print the session summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Standing<'a> {
    name: &'a str,
    stake: u128,
}

#[derive(Serialize)]
struct Summary<'a> {
    rounds: u32,
    standings: Vec<Standing<'a>>,
    last_round: Option<&'a RoundReport>,
}

fn load_rules(cli: &Cli) -> Result<TableRules, BoxErr> {
    let mut rules: TableRules = match &cli.rules {
        Some(path) => {
            log::info!("Loading table rules from {}", path.display());
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        }
        None => TableRules::default(),
    };

    if cli.classic_house {
        rules.twenty_one_bonus = TwentyOneBonus::AnyTwentyOne;
    }
    if let Some(min_bet) = cli.min_bet {
        rules.min_bet = min_bet;
    }
    if let Some(payout) = &cli.blackjack_payout {
        rules.payouts.blackjack = payout.parse()?;
    }
    if let Some(total) = cli.dealer_stands_on {
        rules.dealer_stands_on = total;
    }
    if cli.no_surrender {
        rules.allow_surrender = false;
    }

    rules.validate()?;
    Ok(rules)
}

fn run(cli: Cli) -> Result<(), BoxErr> {
    let rules = load_rules(&cli)?;
    log::debug!("Table rules: {rules:?}");

    let players = cli
        .players
        .iter()
        .map(|name| Player::new(name.as_str(), cli.stake))
        .collect();
    let table = Table::new(rules, players)?;

    let shoe = match cli.seed {
        Some(seed) => {
            log::info!("Shuffling with seed {seed}");
            Deck::seeded(seed)
        }
        None => Deck::from_entropy(),
    };

    let keyboard = Keyboard::new(io::stdin().lock(), io::stdout());
    let mut session = Session::new(table, shoe, keyboard, Screen::new(io::stdout()));
    let rounds = session.run();
    log::info!("Session over after {rounds} rounds");

    let summary = Summary {
        rounds,
        standings: session
            .table()
            .players()
            .iter()
            .map(|p| Standing {
                name: p.name(),
                stake: p.stake(),
            })
            .collect(),
        last_round: session.last_report(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!();
        println!("{} after {} rounds", "Final stakes".bold(), summary.rounds);
        for standing in &summary.standings {
            println!("  {}: {}", standing.name, standing.stake);
        }
    }
    Ok(())
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
