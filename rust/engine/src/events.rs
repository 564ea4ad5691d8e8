//! Typed event records appended by every transition.
//!
//! The engine never delivers events anywhere; it returns them alongside the
//! new state and leaves rendering, auditing and persistence to the caller.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::Stage;
use crate::hand::{HandId, HandStatus};
use crate::outcome::Outcome;

/// One record of something that happened at the table.
///
/// `timestamp` is a logical clock owned by the game state: it increases by
/// one per event and is replayed exactly for identical inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum EventKind {
    RoundStarted {
        round: u64,
    },
    ShoeShuffled {
        generation: u32,
        cards: usize,
    },
    StageChanged {
        from: Stage,
        to: Stage,
    },
    BetPlaced {
        player: usize,
        amount: f64,
    },
    CardDealt {
        player: usize,
        hand: HandId,
        card: Card,
        value: u32,
    },
    DealerCardDealt {
        card: Card,
    },
    /// The hole card goes face down; its identity is withheld until revealed.
    HoleCardDealt,
    HoleCardRevealed {
        card: Card,
        value: u32,
    },
    InsuranceOffered {
        player: usize,
    },
    InsuranceDecided {
        player: usize,
        stake: Option<f64>,
    },
    DealerPeeked {
        blackjack: bool,
    },
    DecisionNeeded {
        player: usize,
        hand: usize,
        legal: Vec<crate::engine::Play>,
    },
    PlayerActed {
        player: usize,
        hand: HandId,
        play: crate::engine::Play,
    },
    HandSplit {
        player: usize,
        from: HandId,
        new_hand: HandId,
    },
    HandDoubled {
        player: usize,
        hand: HandId,
        bet: f64,
    },
    HandCompleted {
        player: usize,
        hand: HandId,
        status: HandStatus,
        value: u32,
    },
    DealerStood {
        value: u32,
    },
    DealerBusted {
        value: u32,
    },
    HandSettled {
        player: usize,
        hand: HandId,
        outcome: Outcome,
        bet: f64,
        payout: f64,
    },
    InsuranceSettled {
        player: usize,
        stake: f64,
        payout: f64,
    },
    RoundEnded {
        round: u64,
        net: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn serialises_with_type_and_payload() {
        let e = Event {
            timestamp: 3,
            kind: EventKind::DealerCardDealt {
                card: Card::new(Rank::Ace, Suit::Spades),
            },
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["timestamp"], 3);
        assert_eq!(v["kind"]["type"], "dealer_card_dealt");
        assert_eq!(v["kind"]["payload"]["card"]["rank"], "Ace");
    }

    #[test]
    fn unit_variant_has_no_payload() {
        let v = serde_json::to_value(EventKind::HoleCardDealt).unwrap();
        assert_eq!(v["type"], "hole_card_dealt");
    }
}
