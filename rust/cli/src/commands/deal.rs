//! Deal command: one seeded round played by the configured strategy.
//!
//! Prints the seed first so any round can be replayed with `--seed`.

use crate::cli::TableArgs;
use crate::commands::resolve;
use crate::error::CliError;
use crate::formatters::{format_cards, format_event, format_money, format_outcome};
use pontoon_ai::{create_strategy, play_round};
use pontoon_engine::game::PlayerState;
use pontoon_engine::rng::SeededRng;
use pontoon_engine::table::Table;
use std::io::Write;

pub fn handle_deal_command(args: &TableArgs, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = resolve(args)?;
    let cfg = resolved.config;
    let rules = cfg.table_rules()?;
    let seed = cfg.seed.unwrap_or_else(rand::random);
    let strategy = create_strategy(&cfg.strategy).map_err(CliError::InvalidInput)?;

    let mut table = Table::new(
        rules,
        vec![PlayerState::new("p0", cfg.bankroll)],
        SeededRng::new(seed),
    )?;
    let events = play_round(&mut table, strategy.as_ref(), cfg.bet)?;

    if json {
        for e in &events {
            writeln!(out, "{}", serde_json::to_string(e)?)?;
        }
        return Ok(());
    }

    writeln!(out, "Seed: {}", seed)?;
    writeln!(out, "Strategy: {}", strategy.name())?;
    for line in events.iter().filter_map(format_event) {
        writeln!(out, "{}", line)?;
    }
    let state = table.state();
    if let Some(result) = &state.result {
        writeln!(
            out,
            "Dealer: {} = {}",
            format_cards(&result.dealer),
            result.dealer_value
        )?;
        for h in &result.hands {
            writeln!(
                out,
                "Hand {}: {} = {} -> {} {}",
                h.hand,
                format_cards(&h.cards),
                h.value,
                format_outcome(h.outcome),
                format_money(h.payout)
            )?;
        }
    }
    writeln!(out, "Balance: {}", format_money(state.players[0].balance))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn seeded(seed: u64) -> TableArgs {
        TableArgs {
            seed: Some(seed),
            ..TableArgs::default()
        }
    }

    #[test]
    #[serial]
    fn same_seed_same_round() {
        let mut a = Vec::new();
        let mut b = Vec::new();
        handle_deal_command(&seeded(12345), false, &mut a).unwrap();
        handle_deal_command(&seeded(12345), false, &mut b).unwrap();
        assert_eq!(a, b);
        let s = String::from_utf8(a).unwrap();
        assert!(s.starts_with("Seed: 12345\n"));
        assert!(s.contains("Dealer: ["));
        assert!(s.contains("Balance: "));
    }

    #[test]
    #[serial]
    fn json_mode_prints_one_event_per_line() {
        let mut out = Vec::new();
        handle_deal_command(&seeded(8), true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let events: Vec<pontoon_engine::events::Event> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert!(events.windows(2).all(|w| w[1].timestamp > w[0].timestamp));
    }
}
