use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::hand::{evaluate_hand, Hand, HandId, HandResult};
use crate::outcome::Outcome;
use crate::rules::Rules;
use crate::shoe::Shoe;

/// Position of a round in its lifecycle.
///
/// `Dealing`, `DealerPlay` and `Settlement` are transient: the engine passes
/// through them inside a single transition and they only appear in
/// `StageChanged` events, never in a state handed back to the caller.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    AwaitingBet,
    Dealing,
    AwaitingInsurance { player: usize },
    AwaitingAction { player: usize, hand: usize },
    DealerPlay,
    Settlement,
    RoundComplete,
}

impl Stage {
    pub fn is_transient(self) -> bool {
        matches!(self, Stage::Dealing | Stage::DealerPlay | Stage::Settlement)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::AwaitingBet => write!(f, "awaiting bets"),
            Stage::Dealing => write!(f, "dealing"),
            Stage::AwaitingInsurance { player } => {
                write!(f, "awaiting insurance from player {player}")
            }
            Stage::AwaitingAction { player, hand } => {
                write!(f, "awaiting action on player {player} hand {hand}")
            }
            Stage::DealerPlay => write!(f, "dealer playing"),
            Stage::Settlement => write!(f, "settling"),
            Stage::RoundComplete => write!(f, "round complete"),
        }
    }
}

/// Answer to the insurance offer for one player in one round.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Insurance {
    NotOffered,
    Pending,
    Declined,
    Taken { stake: f64 },
}

/// A seat at the table.
///
/// `balance` excludes money currently on the table: stakes are taken when a
/// bet, double, split or insurance is placed and returned with winnings at
/// settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: String,
    pub balance: f64,
    pub bet: Option<f64>,
    pub hands: Vec<Hand>,
    pub insurance: Insurance,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, balance: f64) -> Self {
        Self {
            id: id.into(),
            balance,
            bet: None,
            hands: Vec::new(),
            insurance: Insurance::NotOffered,
        }
    }

    /// Money currently at risk: hand stakes plus any insurance stake. Before
    /// the deal a placed bet has no hand yet and counts on its own.
    pub fn on_table(&self) -> f64 {
        let insurance = match self.insurance {
            Insurance::Taken { stake } => stake,
            _ => 0.0,
        };
        let stakes = if self.hands.is_empty() {
            self.bet.unwrap_or_default()
        } else {
            self.hands.iter().map(|h| h.bet).sum::<f64>()
        };
        stakes + insurance
    }

    /// Splits performed this round.
    pub fn splits(&self) -> usize {
        self.hands.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealerState {
    /// Upcard first, hole card second, then draws
    pub cards: Vec<Card>,
    pub hole_visible: bool,
    pub peeked: bool,
}

impl DealerState {
    pub fn upcard(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    /// Cards a player is allowed to see.
    pub fn visible(&self) -> &[Card] {
        if self.hole_visible {
            &self.cards
        } else {
            &self.cards[..self.cards.len().min(1)]
        }
    }

    pub fn evaluate(&self) -> HandResult {
        evaluate_hand(&self.cards)
    }
}

/// Final disposition of one hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSettlement {
    pub player: usize,
    pub hand: HandId,
    pub cards: Vec<Card>,
    pub value: u32,
    pub outcome: Outcome,
    pub bet: f64,
    /// Signed amount won or lost, stake excluded
    pub payout: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceSettlement {
    pub player: usize,
    pub stake: f64,
    pub payout: f64,
}

/// Everything a round produced once the dealer's hand is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u64,
    pub dealer: Vec<Card>,
    pub dealer_value: u32,
    pub dealer_blackjack: bool,
    pub hands: Vec<HandSettlement>,
    pub insurance: Vec<InsuranceSettlement>,
    /// Net per seat, same order as `GameState::players`
    pub player_net: Vec<f64>,
    pub net: f64,
}

impl RoundResult {
    pub fn outcomes(&self) -> impl Iterator<Item = Outcome> + '_ {
        self.hands.iter().map(|h| h.outcome)
    }
}

/// Immutable snapshot of a table between transitions.
///
/// Every transition produces a new `GameState`; the previous one stays valid
/// and can be kept for replay or rollback. The shoe order is shared between
/// snapshots, so cloning is cheap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub round: u64,
    /// Incremented once per accepted transition
    pub version: u64,
    /// Logical clock stamped on events
    pub clock: u64,
    pub stage: Stage,
    pub shoe: Shoe,
    pub players: Vec<PlayerState>,
    pub dealer: DealerState,
    pub rules: Arc<Rules>,
    pub next_hand_id: u32,
    pub result: Option<RoundResult>,
}

impl GameState {
    pub fn new(rules: Arc<Rules>, shoe: Shoe, players: Vec<PlayerState>) -> Self {
        Self {
            round: 1,
            version: 0,
            clock: 0,
            stage: Stage::AwaitingBet,
            shoe,
            players,
            dealer: DealerState::default(),
            rules,
            next_hand_id: 1,
            result: None,
        }
    }

    pub fn player(&self, seat: usize) -> Option<&PlayerState> {
        self.players.get(seat)
    }

    /// Hand whose decision is pending, if any.
    pub fn current_hand(&self) -> Option<(usize, &Hand)> {
        match self.stage {
            Stage::AwaitingAction { player, hand } => self
                .players
                .get(player)
                .and_then(|p| p.hands.get(hand))
                .map(|h| (player, h)),
            _ => None,
        }
    }

    pub fn is_round_complete(&self) -> bool {
        self.stage == Stage::RoundComplete
    }

    /// Sum of balances and unsettled stakes across all seats.
    pub fn total_funds(&self) -> f64 {
        let settled = self.result.is_some();
        self.players
            .iter()
            .map(|p| p.balance + if settled { 0.0 } else { p.on_table() })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;

    fn state() -> GameState {
        let shoe = Shoe::from_cards(parse_cards("2C 3C 4C 5C").unwrap(), 1.0);
        GameState::new(
            Arc::new(Rules::default()),
            shoe,
            vec![PlayerState::new("alice", 100.0)],
        )
    }

    #[test]
    fn new_state_awaits_bets() {
        let s = state();
        assert_eq!(s.stage, Stage::AwaitingBet);
        assert_eq!(s.round, 1);
        assert!(s.current_hand().is_none());
        assert_eq!(s.total_funds(), 100.0);
    }

    #[test]
    fn hole_card_hidden_until_revealed() {
        let mut d = DealerState {
            cards: parse_cards("KH 7S").unwrap(),
            ..Default::default()
        };
        assert_eq!(d.visible().len(), 1);
        d.hole_visible = true;
        assert_eq!(d.visible().len(), 2);
        assert!(DealerState::default().visible().is_empty());
    }

    #[test]
    fn on_table_counts_insurance() {
        let mut p = PlayerState::new("bob", 50.0);
        p.hands.push(Hand::new(HandId(1), 10.0));
        p.insurance = Insurance::Taken { stake: 5.0 };
        assert_eq!(p.on_table(), 15.0);
    }

    #[test]
    fn placed_bet_counts_before_the_deal() {
        let mut p = PlayerState::new("carol", 90.0);
        p.bet = Some(10.0);
        assert_eq!(p.on_table(), 10.0);
        p.hands.push(Hand::new(HandId(1), 10.0));
        assert_eq!(p.on_table(), 10.0);
    }

    #[test]
    fn stage_serialises_with_tag() {
        let v = serde_json::to_value(Stage::AwaitingAction { player: 0, hand: 1 }).unwrap();
        assert_eq!(v["stage"], "awaiting_action");
        assert_eq!(v["hand"], 1);
    }
}
