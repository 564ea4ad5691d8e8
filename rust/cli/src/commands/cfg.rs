//! Configuration command handler.
//!
//! Prints the resolved configuration as JSON, each value paired with where it
//! came from (`default`, `file`, `env` or `cli`), followed by the full rule
//! set the table would run under.
//!
//! # Example Output
//!
//! ```json
//! {
//!   "seed": {
//!     "value": 42,
//!     "source": "env"
//!   },
//!   ...
//! }
//! ```

use crate::cli::TableArgs;
use crate::commands::resolve;
use crate::config::ConfigResolved;
use crate::error::CliError;
use std::io::Write;

pub fn handle_cfg_command(args: &TableArgs, out: &mut dyn Write) -> Result<(), CliError> {
    let ConfigResolved { config, sources } = resolve(args)?;
    let rules = config.table_rules()?;
    let display = serde_json::json!({
        "seed": { "value": config.seed, "source": sources.seed },
        "rules": { "value": config.rules, "source": sources.rules },
        "decks": { "value": rules.num_decks, "source": sources.decks },
        "h17": { "value": rules.dealer_hit_soft_17, "source": sources.h17 },
        "penetration": { "value": rules.penetration, "source": sources.penetration },
        "strategy": { "value": config.strategy, "source": sources.strategy },
        "bankroll": { "value": config.bankroll, "source": sources.bankroll },
        "bet": { "value": config.bet, "source": sources.bet },
        "table": rules,
    });
    writeln!(out, "{}", serde_json::to_string_pretty(&display)?)?;
    Ok(())
}
