use crate::outcome::Outcome;
use crate::rules::Rules;

/// Insurance pays 2:1 on its stake.
pub const INSURANCE_PAYOUT: f64 = 2.0;

/// Signed amount won (positive) or lost (negative) on a stake of `bet`.
///
/// Amounts are rounded to cents, half away from zero, so a 6:5 natural on
/// an odd bet and a 3:2 natural on a single cent are both well defined.
///
/// # Examples
///
/// ```
/// use pontoon_engine::outcome::Outcome;
/// use pontoon_engine::payout::calculate_payout;
/// use pontoon_engine::rules::Rules;
///
/// assert_eq!(calculate_payout(Outcome::Blackjack, 100.0, &Rules::default()), 150.0);
/// assert_eq!(calculate_payout(Outcome::Push, 100.0, &Rules::default()), 0.0);
/// ```
pub fn calculate_payout(outcome: Outcome, bet: f64, rules: &Rules) -> f64 {
    let raw = match outcome {
        Outcome::Blackjack => bet * rules.blackjack_payout,
        Outcome::Win => bet,
        Outcome::Lose | Outcome::BustLose => -bet,
        Outcome::Push => 0.0,
        Outcome::Surrender => -bet * rules.surrender_fraction,
    };
    round_cents(raw)
}

/// Settles an insurance stake once the hole card is known.
pub fn settle_insurance(stake: f64, dealer_blackjack: bool) -> f64 {
    if dealer_blackjack {
        round_cents(stake * INSURANCE_PAYOUT)
    } else {
        round_cents(-stake)
    }
}

pub fn round_cents(x: f64) -> f64 {
    let r = (x * 100.0).round() / 100.0;
    // normalise -0.0 so pushes compare and serialise as 0
    if r == 0.0 {
        0.0
    } else {
        r
    }
}
