use serde::{Deserialize, Serialize};

use crate::hand::{Hand, HandResult, HandStatus};
use crate::rules::Rules;

/// Classification of a settled player hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Blackjack,
    Win,
    Lose,
    Push,
    BustLose,
    Surrender,
}

impl Outcome {
    pub fn is_win(self) -> bool {
        matches!(self, Outcome::Blackjack | Outcome::Win)
    }

    pub fn is_loss(self) -> bool {
        matches!(self, Outcome::Lose | Outcome::BustLose)
    }
}

/// Player side of a showdown: the score plus the facts the score cannot carry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Showdown {
    pub result: HandResult,
    pub surrendered: bool,
    /// Five-card charlie reached under a rule set that honours it
    pub charlie: bool,
}

impl From<HandResult> for Showdown {
    fn from(result: HandResult) -> Self {
        Self {
            result,
            surrendered: false,
            charlie: false,
        }
    }
}

impl Showdown {
    /// Split hands lose their natural status here, so a split A+K pays 1:1.
    pub fn from_hand(hand: &Hand, rules: &Rules) -> Self {
        let mut result = hand.evaluate();
        result.is_blackjack = hand.is_natural();
        Self {
            result,
            surrendered: hand.status == HandStatus::Surrendered,
            charlie: rules.five_card_charlie && result.card_count >= 5 && !result.is_bust,
        }
    }
}

/// Resolves a player hand against the dealer's final hand.
///
/// Precedence: surrender, player bust, naturals, charlie, dealer bust, then
/// totals.
///
/// # Examples
///
/// ```
/// use pontoon_engine::cards::parse_cards;
/// use pontoon_engine::hand::evaluate_hand;
/// use pontoon_engine::outcome::{determine_outcome, Outcome};
///
/// let player = evaluate_hand(&parse_cards("10S 9H").unwrap());
/// let dealer = evaluate_hand(&parse_cards("KD 9C").unwrap());
/// assert_eq!(determine_outcome(&player.into(), &dealer), Outcome::Push);
/// ```
pub fn determine_outcome(player: &Showdown, dealer: &HandResult) -> Outcome {
    let p = &player.result;
    if player.surrendered {
        return Outcome::Surrender;
    }
    if p.is_bust {
        return Outcome::BustLose;
    }
    match (p.is_blackjack, dealer.is_blackjack) {
        (true, false) => return Outcome::Blackjack,
        (true, true) => return Outcome::Push,
        (false, true) => return Outcome::Lose,
        (false, false) => {}
    }
    if player.charlie || dealer.is_bust {
        return Outcome::Win;
    }
    match p.value.cmp(&dealer.value) {
        std::cmp::Ordering::Greater => Outcome::Win,
        std::cmp::Ordering::Less => Outcome::Lose,
        std::cmp::Ordering::Equal => Outcome::Push,
    }
}
