//! # Pontoon CLI Library
//!
//! Command-line front end for the pontoon blackjack engine: deal and inspect
//! single rounds, score hands, run seeded batch simulations and check the
//! random source.
//!
//! ## Main Entry Point
//!
//! [`run`] parses arguments, dispatches to a subcommand and returns the
//! process exit code. Output streams are injected so tests can capture them.
//!
//! ```
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let code = pontoon_cli::run(["pontoon", "hand", "AS KH"], &mut out, &mut err);
//! assert_eq!(code, 0);
//! assert!(String::from_utf8(out).unwrap().contains("21 blackjack"));
//! ```
//!
//! ## Available Subcommands
//!
//! - `deal`: Play one seeded round with the configured strategy
//! - `sim`: Simulate many rounds across worker threads
//! - `hand`: Score cards and settle them against a dealer hand
//! - `rng`: Sample the seeded random source and check shuffle fairness
//! - `cfg`: Display the resolved configuration

use clap::Parser;
use std::io::Write;

pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod logging;
pub mod ui;

use cli::{Commands, PontoonCli};
use commands::{
    handle_cfg_command, handle_deal_command, handle_hand_command, handle_rng_command,
    handle_sim_command,
};

pub use error::CliError;

const COMMANDS: &[&str] = &["deal", "sim", "hand", "rng", "cfg"];

/// Main entry point for the CLI application.
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors, `130` for interrupted runs
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PontoonCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Deal { table, json } => handle_deal_command(&table, json, out),
        Commands::Sim {
            table,
            rounds,
            workers,
            seats,
            output,
            json,
        } => handle_sim_command(
            &table,
            rounds,
            workers,
            seats,
            output.as_deref(),
            json,
            out,
            err,
        ),
        Commands::Hand {
            cards,
            dealer,
            table,
        } => handle_hand_command(&cards, dealer.as_deref(), &table, out),
        Commands::Rng {
            seed,
            samples,
            check,
        } => handle_rng_command(seed, samples, check, out),
        Commands::Cfg { table } => handle_cfg_command(&table, out),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            let _ = writeln!(err, "Interrupted: {}", msg);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version print to stdout and succeed
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }
    let _ = writeln!(err, "{}", e);
    let _ = writeln!(err, "Usage: pontoon <command> [options]\n");
    let _ = writeln!(err, "Commands:");
    for c in COMMANDS {
        let _ = writeln!(err, "  {}", c);
    }
    let _ = writeln!(err, "\nFor full help, run: pontoon --help");
    exit_code::ERROR
}
