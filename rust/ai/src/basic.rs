//! Table-driven basic strategy for multi-deck, dealer-stands-on-soft-17 games.
//!
//! The tables are the usual chart: aces and eights always split, then
//! surrender, the remaining pairs, doubles and hit/stand. When the preferred play is not legal on the
//! current hand the chart's printed fallback is used (double-else-stand on
//! soft 18 and 19, hit otherwise).

use crate::Strategy;
use pontoon_engine::cards::Card;
use pontoon_engine::engine::Play;
use pontoon_engine::game::GameState;
use pontoon_engine::hand::evaluate_hand;

/// Basic strategy player. Never takes insurance.
///
/// # Example
///
/// ```rust
/// use pontoon_ai::basic::BasicStrategy;
/// use pontoon_engine::cards::parse_cards;
/// use pontoon_engine::engine::Play;
///
/// let s = BasicStrategy::new();
/// let hand = parse_cards("8S 8D").unwrap();
/// let up = parse_cards("10H").unwrap()[0];
/// assert_eq!(s.chart(&hand, &up, &Play::ALL), Play::Split);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BasicStrategy;

impl BasicStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Chart lookup for `cards` against the dealer's `upcard`, restricted to
    /// `legal`.
    pub fn chart(&self, cards: &[Card], upcard: &Card, legal: &[Play]) -> Play {
        let can = |p: Play| legal.contains(&p);
        let hand = evaluate_hand(cards);
        let up = upcard_value(upcard);
        let total = hand.value;

        let pair = match cards {
            [a, b] if can(Play::Split) && a.value() == b.value() => Some(a.value()),
            _ => None,
        };

        if matches!(pair, Some(1 | 8)) {
            return Play::Split;
        }

        if can(Play::Surrender) && !hand.is_soft && should_surrender(total, up) {
            return Play::Surrender;
        }

        if pair.is_some_and(|v| should_split(v, up)) {
            return Play::Split;
        }

        if should_double(total, hand.is_soft, up) {
            if can(Play::Double) {
                return Play::Double;
            }
            if hand.is_soft && total >= 18 && can(Play::Stand) {
                return Play::Stand;
            }
        }

        let hit = if hand.is_soft {
            soft_hits(total, up)
        } else {
            hard_hits(total, up)
        };
        match (hit && can(Play::Hit), can(Play::Stand)) {
            (true, _) => Play::Hit,
            (false, true) => Play::Stand,
            (false, false) => legal.first().copied().unwrap_or(Play::Stand),
        }
    }
}

/// Dealer upcard on the 2..=11 scale the chart uses; aces count 11.
fn upcard_value(card: &Card) -> u32 {
    if card.rank.is_ace() {
        11
    } else {
        u32::from(card.value())
    }
}

fn should_surrender(total: u32, up: u32) -> bool {
    (total == 16 && up >= 9) || (total == 15 && up == 10)
}

/// `pair` is the value of one card of the pair, aces counted 1.
fn should_split(pair: u8, up: u32) -> bool {
    match pair {
        1 | 8 => true,
        9 => !matches!(up, 7 | 10 | 11),
        2 | 3 | 6 | 7 => (2..=7).contains(&up),
        _ => false,
    }
}

fn should_double(total: u32, soft: bool, up: u32) -> bool {
    if soft {
        match total {
            19 => up == 6,
            18 => (2..=6).contains(&up),
            17 => (3..=6).contains(&up),
            15 | 16 => (4..=6).contains(&up),
            13 | 14 => (5..=6).contains(&up),
            _ => false,
        }
    } else {
        match total {
            11 => true,
            10 => up <= 9,
            9 => (3..=6).contains(&up),
            _ => false,
        }
    }
}

fn soft_hits(total: u32, up: u32) -> bool {
    match total {
        19.. => false,
        18 => up >= 9,
        _ => true,
    }
}

fn hard_hits(total: u32, up: u32) -> bool {
    match total {
        17.. => false,
        13..=16 => up >= 7,
        12 => !(4..=6).contains(&up),
        _ => true,
    }
}

impl Strategy for BasicStrategy {
    fn decide(&self, state: &GameState, legal: &[Play]) -> Play {
        match (state.current_hand(), state.dealer.upcard()) {
            (Some((_, hand)), Some(up)) => self.chart(&hand.cards, &up, legal),
            _ => legal.first().copied().unwrap_or(Play::Stand),
        }
    }

    fn name(&self) -> &str {
        "BasicStrategy"
    }
}
