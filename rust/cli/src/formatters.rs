//! Text rendering of cards, hands and table events.
//!
//! Cards print in the same short notation the `hand` command parses
//! (`AS`, `10H`), so any printed hand can be pasted back in.
//!
//! ```rust
//! use pontoon_cli::formatters::format_cards;
//! use pontoon_engine::cards::parse_cards;
//!
//! assert_eq!(format_cards(&parse_cards("AS 10H").unwrap()), "[AS 10H]");
//! ```

use pontoon_engine::cards::Card;
use pontoon_engine::events::{Event, EventKind};
use pontoon_engine::hand::HandResult;
use pontoon_engine::outcome::Outcome;

pub fn format_cards(cards: &[Card]) -> String {
    let inner: Vec<String> = cards.iter().map(|c| c.to_string()).collect();
    format!("[{}]", inner.join(" "))
}

/// `17 soft`, `25 bust`, `21 blackjack`.
pub fn format_result(r: &HandResult) -> String {
    let tag = if r.is_blackjack {
        " blackjack"
    } else if r.is_bust {
        " bust"
    } else if r.is_soft {
        " soft"
    } else {
        ""
    };
    format!("{}{}", r.value, tag)
}

pub fn format_outcome(outcome: Outcome) -> &'static str {
    match outcome {
        Outcome::Blackjack => "blackjack",
        Outcome::Win => "win",
        Outcome::Lose => "lose",
        Outcome::Push => "push",
        Outcome::BustLose => "bust",
        Outcome::Surrender => "surrender",
    }
}

pub fn format_money(x: f64) -> String {
    if x < 0.0 {
        format!("-{:.2}", -x)
    } else {
        format!("{:.2}", x)
    }
}

/// One line per event; bookkeeping events (stage changes, decision prompts)
/// render as `None`.
pub fn format_event(event: &Event) -> Option<String> {
    let text = match &event.kind {
        EventKind::RoundStarted { round } => format!("Round {}", round),
        EventKind::ShoeShuffled { generation, cards } => {
            format!("Shoe shuffled (#{}, {} cards)", generation, cards)
        }
        EventKind::BetPlaced { player, amount } => {
            format!("Seat {} bets {}", player, format_money(*amount))
        }
        EventKind::CardDealt {
            player,
            hand,
            card,
            value,
        } => format!("Seat {} hand {} <- {} ({})", player, hand, card, value),
        EventKind::DealerCardDealt { card } => format!("Dealer shows {}", card),
        EventKind::HoleCardDealt => "Dealer takes a hole card".to_string(),
        EventKind::HoleCardRevealed { card, value } => {
            format!("Dealer reveals {} ({})", card, value)
        }
        EventKind::InsuranceOffered { player } => format!("Seat {} offered insurance", player),
        EventKind::InsuranceDecided { player, stake } => match stake {
            Some(s) => format!("Seat {} insures for {}", player, format_money(*s)),
            None => format!("Seat {} declines insurance", player),
        },
        EventKind::DealerPeeked { blackjack } => {
            if *blackjack {
                "Dealer peeks: blackjack".to_string()
            } else {
                "Dealer peeks: no blackjack".to_string()
            }
        }
        EventKind::PlayerActed { player, hand, play } => {
            format!("Seat {} hand {}: {}", player, hand, play)
        }
        EventKind::HandSplit {
            player,
            from,
            new_hand,
        } => format!("Seat {} splits hand {} into {}", player, from, new_hand),
        EventKind::HandDoubled { player, hand, bet } => format!(
            "Seat {} hand {} doubled to {}",
            player,
            hand,
            format_money(*bet)
        ),
        EventKind::HandCompleted {
            player,
            hand,
            status,
            value,
        } => format!("Seat {} hand {} {:?} on {}", player, hand, status, value),
        EventKind::DealerStood { value } => format!("Dealer stands on {}", value),
        EventKind::DealerBusted { value } => format!("Dealer busts with {}", value),
        EventKind::HandSettled {
            player,
            hand,
            outcome,
            bet,
            payout,
        } => format!(
            "Seat {} hand {}: {} (bet {}, {})",
            player,
            hand,
            format_outcome(*outcome),
            format_money(*bet),
            format_money(*payout)
        ),
        EventKind::InsuranceSettled {
            player,
            stake,
            payout,
        } => format!(
            "Seat {} insurance (stake {}): {}",
            player,
            format_money(*stake),
            format_money(*payout)
        ),
        EventKind::RoundEnded { round, net } => {
            format!("Round {} over, table net {}", round, format_money(*net))
        }
        EventKind::StageChanged { .. } | EventKind::DecisionNeeded { .. } => return None,
    };
    Some(text)
}
