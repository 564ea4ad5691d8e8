//! Dealer drawing policy.

use crate::cards::Card;
use crate::hand::evaluate_hand;
use crate::rules::Rules;

/// Hit below 17, stand on hard 17 and above, hit soft 17 only under H17.
///
/// # Examples
///
/// ```
/// use pontoon_engine::cards::parse_cards;
/// use pontoon_engine::dealer::should_dealer_hit;
/// use pontoon_engine::rules::Rules;
///
/// let soft17 = parse_cards("AS 6H").unwrap();
/// let h17 = Rules { dealer_hit_soft_17: true, ..Rules::default() };
/// assert!(should_dealer_hit(&soft17, &h17));
/// assert!(!should_dealer_hit(&soft17, &Rules::default()));
/// ```
pub fn should_dealer_hit(cards: &[Card], rules: &Rules) -> bool {
    let r = evaluate_hand(cards);
    if r.is_bust {
        return false;
    }
    match r.value {
        v if v < 17 => true,
        17 => r.is_soft && rules.dealer_hit_soft_17,
        _ => false,
    }
}

/// An Ace or ten-value upcard leaves a natural possible.
pub fn could_have_blackjack(upcard: &Card) -> bool {
    upcard.rank.is_ace() || upcard.rank.is_ten_value()
}
