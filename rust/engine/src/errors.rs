use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] InvalidAction),
    #[error("Rule violation: {0}")]
    RuleViolation(#[from] RuleViolation),
    #[error("Shoe is empty")]
    EmptyShoe,
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}

/// The action is not legal in the current stage or for the addressed hand.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidAction {
    #[error("{action} is not accepted while {stage}")]
    WrongStage { action: &'static str, stage: String },
    #[error("It's not hand {actual} of player {player}'s turn (expected player {expected_player} hand {expected})")]
    NotHandsTurn {
        player: usize,
        actual: usize,
        expected_player: usize,
        expected: usize,
    },
    #[error("No player at seat {0}")]
    UnknownPlayer(usize),
    #[error("Player {player} has no hand {hand}")]
    UnknownHand { player: usize, hand: usize },
    #[error("Player {0} already placed a bet this round")]
    BetAlreadyPlaced(usize),
    #[error("No bets placed")]
    NoBets,
    #[error("Bet amount {0} is not a positive finite number")]
    MalformedBet(f64),
    #[error("Cannot double a hand holding {0} cards")]
    DoubleNeedsTwoCards(usize),
    #[error("Cannot split {0}: not a pair")]
    NotAPair(String),
    #[error("Surrender is only allowed as the first decision on an unsplit hand")]
    SurrenderNotFirstDecision,
    #[error("Player {0} was not offered insurance or already answered")]
    InsuranceNotPending(usize),
}

/// The action is well formed but the table rules forbid it.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleViolation {
    #[error("Bet {amount} outside table limits [{min}, {max}]")]
    BetOutOfRange { amount: f64, min: f64, max: f64 },
    #[error("Insufficient balance: need {needed}, have {available}")]
    InsufficientFunds { needed: f64, available: f64 },
    #[error("Split limit of {max_splits} reached")]
    MaxSplitsReached { max_splits: u8 },
    #[error("{0} is disabled by the table rules")]
    Disabled(&'static str),
    #[error("Late surrender requires the dealer blackjack check first")]
    LateSurrenderBeforePeek,
    #[error("Shoe passed its cut card; reshuffle before the next round")]
    ReshuffleRequired,
}

/// Configuration rejected by [`crate::rules::Rules::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RulesError {
    #[error("Invalid rules: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl RulesError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        RulesError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
