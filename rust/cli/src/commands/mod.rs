//! Command handler modules for the pontoon CLI.
//!
//! Each command lives in its own file and exposes one
//! `handle_COMMAND_command(...) -> Result<(), CliError>` function that
//! writes to injected output streams.

pub mod cfg;
pub mod deal;
pub mod hand;
pub mod rng;
pub mod sim;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use hand::handle_hand_command;
pub use rng::handle_rng_command;
pub use sim::handle_sim_command;

use crate::cli::TableArgs;
use crate::config::{self, ConfigResolved};
use crate::error::CliError;

/// File and environment configuration with `args` applied on top.
pub(crate) fn resolve(args: &TableArgs) -> Result<ConfigResolved, CliError> {
    Ok(config::load_with_sources()?.apply_cli(args)?)
}
