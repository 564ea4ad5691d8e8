//! Hand command: score cards given in short notation and, with `--dealer`,
//! settle them against a dealer hand under the configured rules.

use crate::cli::TableArgs;
use crate::commands::resolve;
use crate::error::CliError;
use crate::formatters::{format_cards, format_money, format_outcome, format_result};
use pontoon_engine::cards::parse_cards;
use pontoon_engine::dealer::should_dealer_hit;
use pontoon_engine::hand::{can_split, evaluate_hand};
use pontoon_engine::outcome::{determine_outcome, Showdown};
use pontoon_engine::payout::calculate_payout;
use std::io::Write;

pub fn handle_hand_command(
    cards: &str,
    dealer: Option<&str>,
    args: &TableArgs,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let cfg = resolve(args)?.config;
    let rules = cfg.table_rules()?;
    let player = parse_cards(cards)?;
    let result = evaluate_hand(&player);

    writeln!(out, "Cards: {}", format_cards(&player))?;
    writeln!(out, "Value: {}", format_result(&result))?;
    if player.len() == 2 {
        let yes_no = if can_split(&player, &rules) { "yes" } else { "no" };
        writeln!(out, "Splittable: {}", yes_no)?;
    }

    let Some(dealer) = dealer else {
        return Ok(());
    };
    let dealer = parse_cards(dealer)?;
    let dealer_result = evaluate_hand(&dealer);
    writeln!(
        out,
        "Dealer: {} = {}",
        format_cards(&dealer),
        format_result(&dealer_result)
    )?;
    if should_dealer_hit(&dealer, &rules) {
        writeln!(out, "Dealer must draw")?;
    }
    let showdown = Showdown {
        charlie: rules.five_card_charlie && player.len() >= 5 && !result.is_bust,
        ..Showdown::from(result)
    };
    let outcome = determine_outcome(&showdown, &dealer_result);
    writeln!(out, "Outcome: {}", format_outcome(outcome))?;
    writeln!(
        out,
        "Payout: {} on {}",
        format_money(calculate_payout(outcome, cfg.bet, &rules)),
        format_money(cfg.bet)
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn run(cards: &str, dealer: Option<&str>) -> Result<String, CliError> {
        let mut out = Vec::new();
        let args = TableArgs {
            bet: Some(100.0),
            ..TableArgs::default()
        };
        handle_hand_command(cards, dealer, &args, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    #[serial]
    fn natural_pays_three_to_two() {
        let s = run("AS KH", Some("7C 7D 7H")).unwrap();
        assert!(s.contains("Value: 21 blackjack"));
        assert!(s.contains("Outcome: blackjack"));
        assert!(s.contains("Payout: 150.00 on 100.00"));
    }

    #[test]
    #[serial]
    fn soft_seventeen_without_dealer() {
        let s = run("AS 6H", None).unwrap();
        assert!(s.contains("Value: 17 soft"));
        assert!(s.contains("Splittable: no"));
        assert!(!s.contains("Outcome"));
    }

    #[test]
    #[serial]
    fn bad_notation_is_invalid_input() {
        assert!(matches!(run("ZZ", None), Err(CliError::InvalidInput(_))));
    }
}
