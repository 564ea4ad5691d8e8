//! Hi-Lo card counting on top of basic strategy.
//!
//! The count is rebuilt from the state on every decision: every card that
//! left the shoe and is visible counts, the dealer's face-down hole card
//! does not. Nothing is carried between calls, so one instance can serve
//! any number of tables.

use crate::basic::BasicStrategy;
use crate::Strategy;
use pontoon_engine::cards::Card;
use pontoon_engine::engine::Play;
use pontoon_engine::game::GameState;
use pontoon_engine::hand::evaluate_hand;

/// True count at or above which insurance is taken.
const INSURANCE_INDEX: f64 = 3.0;

/// A hard total against an upcard (aces 11) where the count overrides the chart.
struct Deviation {
    total: u32,
    up: u32,
    index: f64,
    play: Play,
}

/// Applied when the true count is at or above `index`.
const AT_OR_ABOVE: [Deviation; 8] = [
    Deviation { total: 16, up: 10, index: 0.0, play: Play::Stand },
    Deviation { total: 15, up: 10, index: 4.0, play: Play::Stand },
    Deviation { total: 12, up: 3, index: 2.0, play: Play::Stand },
    Deviation { total: 12, up: 2, index: 3.0, play: Play::Stand },
    Deviation { total: 10, up: 10, index: 4.0, play: Play::Double },
    Deviation { total: 10, up: 11, index: 4.0, play: Play::Double },
    Deviation { total: 9, up: 2, index: 1.0, play: Play::Double },
    Deviation { total: 9, up: 7, index: 3.0, play: Play::Double },
];

/// Applied when the true count is below `index`.
const BELOW: [Deviation; 2] = [
    Deviation { total: 13, up: 2, index: -1.0, play: Play::Hit },
    Deviation { total: 12, up: 4, index: 0.0, play: Play::Hit },
];

/// Hi-Lo tag: +1 for 2 through 6, -1 for tens and aces.
pub fn hi_lo(card: &Card) -> i32 {
    match card.value() {
        2..=6 => 1,
        1 | 10 => -1,
        _ => 0,
    }
}

/// Running count of every card a player at the table has seen.
pub fn running_count(state: &GameState) -> i32 {
    // A full shoe sums to zero, so the seen cards are the negation of the rest
    let unseen: i32 = state.shoe.undealt().iter().map(hi_lo).sum();
    let hole = match state.dealer.cards.get(1) {
        Some(card) if !state.dealer.hole_visible => hi_lo(card),
        _ => 0,
    };
    -(unseen + hole)
}

/// Running count per deck still unseen, with at least half a deck assumed.
pub fn true_count(state: &GameState) -> f64 {
    let hidden = usize::from(!state.dealer.hole_visible && state.dealer.cards.len() > 1);
    let decks = ((state.shoe.remaining() + hidden) as f64 / 52.0).max(0.5);
    f64::from(running_count(state)) / decks
}

/// Basic strategy with count-based insurance and index plays.
#[derive(Debug, Clone, Default)]
pub struct CountingStrategy {
    basic: BasicStrategy,
}

impl CountingStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    /// The chart play for `cards`, adjusted for `true_count`.
    pub fn adjusted(&self, cards: &[Card], upcard: &Card, legal: &[Play], true_count: f64) -> Play {
        let chart = self.basic.chart(cards, upcard, legal);
        if !matches!(chart, Play::Hit | Play::Stand) {
            return chart;
        }
        let hand = evaluate_hand(cards);
        if hand.is_soft {
            return chart;
        }
        let up = if upcard.rank.is_ace() {
            11
        } else {
            u32::from(upcard.value())
        };
        let applies = |d: &&Deviation| d.total == hand.value && d.up == up && legal.contains(&d.play);
        AT_OR_ABOVE
            .iter()
            .filter(|d| true_count >= d.index)
            .chain(BELOW.iter().filter(|d| true_count < d.index))
            .find(applies)
            .map_or(chart, |d| d.play)
    }
}

impl Strategy for CountingStrategy {
    fn decide(&self, state: &GameState, legal: &[Play]) -> Play {
        match (state.current_hand(), state.dealer.upcard()) {
            (Some((_, hand)), Some(up)) => self.adjusted(&hand.cards, &up, legal, true_count(state)),
            _ => self.basic.decide(state, legal),
        }
    }

    fn take_insurance(&self, state: &GameState, _player: usize) -> bool {
        true_count(state) >= INSURANCE_INDEX
    }

    fn name(&self) -> &str {
        "CountingStrategy"
    }
}
