use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::rules::Rules;

/// Score of a set of cards. Pure data, recomputed on demand and never cached.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct HandResult {
    pub value: u32,
    /// At least one ace is counted as 11 in `value`
    pub is_soft: bool,
    /// Exactly two cards totalling 21
    pub is_blackjack: bool,
    pub is_bust: bool,
    pub card_count: usize,
}

/// Scores `cards`, counting as many aces high as possible without busting.
///
/// The result depends only on the multiset of cards, never on their order.
///
/// # Examples
///
/// ```
/// use pontoon_engine::cards::parse_cards;
/// use pontoon_engine::hand::evaluate_hand;
///
/// let r = evaluate_hand(&parse_cards("AS 6H").unwrap());
/// assert_eq!(r.value, 17);
/// assert!(r.is_soft);
/// assert!(!r.is_blackjack);
/// ```
pub fn evaluate_hand(cards: &[Card]) -> HandResult {
    let mut hard: u32 = 0;
    let mut aces: u32 = 0;
    for c in cards {
        if c.rank.is_ace() {
            aces += 1;
        } else {
            hard += c.value() as u32;
        }
    }

    // largest number of aces counted as 11 that keeps the total at or under 21
    let high = (0..=aces)
        .rev()
        .find(|&k| hard + 11 * k + (aces - k) <= 21);

    let (value, is_soft, is_bust) = match high {
        Some(k) => (hard + 11 * k + (aces - k), k > 0, false),
        None => (hard + aces, false, true),
    };

    HandResult {
        value,
        is_soft,
        is_blackjack: cards.len() == 2 && value == 21,
        is_bust,
        card_count: cards.len(),
    }
}

/// Two cards of equal rank, or of equal value when `split_by_value` is set.
pub fn can_split(cards: &[Card], rules: &Rules) -> bool {
    match cards {
        [a, b] => a.rank == b.rank || (rules.split_by_value && a.value() == b.value()),
        _ => false,
    }
}

/// Exactly two cards, doubling enabled, and DAS enabled for split hands.
pub fn can_double(cards: &[Card], from_split: bool, rules: &Rules) -> bool {
    cards.len() == 2 && rules.allow_double_down && (!from_split || rules.allow_double_after_split)
}

/// Identifier of a hand, unique within a round.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HandId(pub u32);

impl std::fmt::Display for HandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// Lifecycle of a player hand. Everything but `Active` is terminal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum HandStatus {
    Active,
    Stood,
    Bust,
    Surrendered,
    Blackjack,
    Doubled,
}

/// A player hand: cards, stake, status and split lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub id: HandId,
    pub cards: Vec<Card>,
    /// Current stake, already doubled when `doubled` is set
    pub bet: f64,
    pub status: HandStatus,
    /// Hand this one was split from; `None` for the hand that kept its id
    pub parent: Option<HandId>,
    /// Number of splits in this hand's lineage; zero for an unsplit hand
    pub split_depth: u8,
    pub doubled: bool,
}

impl Hand {
    pub fn new(id: HandId, bet: f64) -> Self {
        Self {
            id,
            cards: Vec::with_capacity(4),
            bet,
            status: HandStatus::Active,
            parent: None,
            split_depth: 0,
            doubled: false,
        }
    }

    pub fn evaluate(&self) -> HandResult {
        evaluate_hand(&self.cards)
    }

    pub fn is_terminal(&self) -> bool {
        self.status != HandStatus::Active
    }

    /// True for both halves of a split, including the hand that kept its id.
    pub fn from_split(&self) -> bool {
        self.split_depth > 0
    }

    pub fn is_split_aces(&self) -> bool {
        self.from_split() && self.cards.first().is_some_and(|c| c.rank.is_ace())
    }

    /// A two-card 21 dealt as such; split hands never count as naturals.
    pub fn is_natural(&self) -> bool {
        !self.from_split() && self.evaluate().is_blackjack
    }
}
