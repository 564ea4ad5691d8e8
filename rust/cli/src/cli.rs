//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};

/// Pontoon blackjack table CLI.
#[derive(Parser, Debug)]
#[command(name = "pontoon", version, about = "Pontoon blackjack table CLI")]
pub struct PontoonCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Table settings accepted by every command that sits down at a table.
/// Each flag overrides the file and environment configuration.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct TableArgs {
    /// Seed for the shoe shuffle
    #[arg(long)]
    pub seed: Option<u64>,
    /// Rules preset: default, european or single-deck
    #[arg(long)]
    pub rules: Option<String>,
    /// Number of decks in the shoe
    #[arg(long)]
    pub decks: Option<u8>,
    /// Playing strategy: basic, counting, dealer or random
    #[arg(long)]
    pub strategy: Option<String>,
    /// Starting balance of each seat
    #[arg(long)]
    pub bankroll: Option<f64>,
    /// Flat bet placed every round
    #[arg(long)]
    pub bet: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play one round and print every event
    Deal {
        #[command(flatten)]
        table: TableArgs,
        /// Print the events as JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Simulate many rounds across worker threads
    Sim {
        #[command(flatten)]
        table: TableArgs,
        #[arg(long, default_value_t = 10_000)]
        rounds: u64,
        /// Worker threads; worker i shuffles with seed + i
        #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u64).range(1..=256))]
        workers: u64,
        /// Seats at each worker's table
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..=7))]
        seats: u64,
        /// Write one JSON line per round to this file
        #[arg(long)]
        output: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Evaluate a hand given in card notation, e.g. "AS 6H"
    Hand {
        cards: String,
        /// Dealer cards to settle against; the payout uses the configured bet
        #[arg(long)]
        dealer: Option<String>,
        #[command(flatten)]
        table: TableArgs,
    },
    /// Print seeded random samples and optionally check shuffle fairness
    Rng {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 5)]
        samples: usize,
        /// Shuffle a four-card deck this many times and report a chi-square test
        #[arg(long)]
        check: Option<u64>,
    },
    /// Display the resolved configuration and where each value came from
    Cfg {
        #[command(flatten)]
        table: TableArgs,
    },
}
