use serde::{Deserialize, Serialize};

use crate::errors::RulesError;

/// Immutable table configuration consumed by every policy function.
///
/// Created once per session and shared behind an `Arc` by every
/// [`crate::game::GameState`] of that session. Partial documents deserialize
/// on top of [`Rules::default`].
///
/// # Examples
///
/// ```
/// use pontoon_engine::rules::Rules;
///
/// let rules = Rules {
///     dealer_hit_soft_17: true,
///     num_decks: 2,
///     ..Rules::default()
/// }
/// .validate()
/// .expect("valid rules");
/// assert_eq!(rules.blackjack_payout, 1.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Multiplier applied to the bet for a natural (3:2 = 1.5, 6:5 = 1.2)
    pub blackjack_payout: f64,
    /// Dealer draws on soft 17
    pub dealer_hit_soft_17: bool,
    pub allow_split: bool,
    /// Allow splitting a hand that was itself created by a split
    pub allow_resplit: bool,
    /// Additional hands a player may create by splitting in one round
    pub max_splits: u8,
    pub resplit_aces: bool,
    /// Split aces may take further cards
    pub hit_split_aces: bool,
    /// Any two ten-value cards form a pair (K+Q); otherwise ranks must match
    pub split_by_value: bool,
    pub allow_double_down: bool,
    pub allow_double_after_split: bool,
    pub allow_insurance: bool,
    pub allow_surrender: bool,
    /// Surrender only once the dealer has checked for blackjack
    pub allow_late_surrender_only: bool,
    /// Fraction of the bet forfeited on surrender
    pub surrender_fraction: f64,
    /// Dealer checks the hole card for a natural under an Ace or ten upcard
    pub dealer_peek: bool,
    pub num_decks: u8,
    pub min_bet: f64,
    pub max_bet: f64,
    /// Fraction of the shoe dealt before a reshuffle at the next round boundary
    pub penetration: f64,
    /// Five cards without busting win automatically
    pub five_card_charlie: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            blackjack_payout: 1.5,
            dealer_hit_soft_17: false,
            allow_split: true,
            allow_resplit: true,
            max_splits: 3,
            resplit_aces: false,
            hit_split_aces: false,
            split_by_value: false,
            allow_double_down: true,
            allow_double_after_split: true,
            allow_insurance: true,
            allow_surrender: true,
            allow_late_surrender_only: true,
            surrender_fraction: 0.5,
            dealer_peek: true,
            num_decks: 6,
            min_bet: 1.0,
            max_bet: 1000.0,
            penetration: 0.75,
            five_card_charlie: false,
        }
    }
}

impl Rules {
    /// No hole-card peek, no surrender, no doubling after a split.
    pub fn european() -> Self {
        Self {
            allow_surrender: false,
            allow_double_after_split: false,
            dealer_peek: false,
            ..Self::default()
        }
    }

    /// Single deck with H17 and a 6:5 natural.
    pub fn single_deck() -> Self {
        Self {
            blackjack_payout: 1.2,
            dealer_hit_soft_17: true,
            allow_resplit: false,
            max_splits: 1,
            allow_double_after_split: false,
            allow_surrender: false,
            num_decks: 1,
            penetration: 0.6,
            ..Self::default()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "default" | "vegas" => Some(Self::default()),
            "european" => Some(Self::european()),
            "single-deck" | "single_deck" => Some(Self::single_deck()),
            _ => None,
        }
    }

    /// Checks every option and returns the rules unchanged when consistent.
    pub fn validate(self) -> Result<Self, RulesError> {
        if !(self.blackjack_payout.is_finite() && self.blackjack_payout > 0.0) {
            return Err(RulesError::invalid(
                "blackjack_payout",
                format!("must be > 0, got {}", self.blackjack_payout),
            ));
        }
        if self.num_decks == 0 {
            return Err(RulesError::invalid("num_decks", "must be >= 1"));
        }
        if !(self.penetration > 0.0 && self.penetration <= 1.0) {
            return Err(RulesError::invalid(
                "penetration",
                format!("must be in (0, 1], got {}", self.penetration),
            ));
        }
        if !(self.min_bet.is_finite() && self.min_bet > 0.0) {
            return Err(RulesError::invalid("min_bet", "must be > 0"));
        }
        if !self.max_bet.is_finite() || self.max_bet < self.min_bet {
            return Err(RulesError::invalid(
                "max_bet",
                format!("must be >= min_bet ({})", self.min_bet),
            ));
        }
        if !(0.0..=1.0).contains(&self.surrender_fraction) {
            return Err(RulesError::invalid(
                "surrender_fraction",
                format!("must be in [0, 1], got {}", self.surrender_fraction),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for r in [Rules::default(), Rules::european(), Rules::single_deck()] {
            assert!(r.validate().is_ok());
        }
    }

    #[test]
    fn zero_decks_rejected() {
        let r = Rules {
            num_decks: 0,
            ..Rules::default()
        };
        assert!(matches!(
            r.validate(),
            Err(RulesError::Invalid {
                field: "num_decks",
                ..
            })
        ));
    }

    #[test]
    fn penetration_must_be_a_fraction() {
        for p in [0.0, -0.1, 1.01, f64::NAN] {
            let r = Rules {
                penetration: p,
                ..Rules::default()
            };
            assert!(r.validate().is_err(), "penetration {p} accepted");
        }
    }

    #[test]
    fn bet_limits_must_be_ordered() {
        let r = Rules {
            min_bet: 50.0,
            max_bet: 10.0,
            ..Rules::default()
        };
        assert!(r.validate().is_err());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let r: Rules = serde_json::from_str(r#"{"num_decks": 2, "dealer_hit_soft_17": true}"#)
            .expect("parse rules");
        assert_eq!(r.num_decks, 2);
        assert!(r.dealer_hit_soft_17);
        assert_eq!(r.blackjack_payout, 1.5);
        assert_eq!(r.max_splits, 3);
    }

    #[test]
    fn presets_by_name() {
        assert_eq!(Rules::by_name("European"), Some(Rules::european()));
        assert!(Rules::by_name("spanish21").is_none());
    }
}
