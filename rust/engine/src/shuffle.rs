use crate::rng::RandomSource;

/// Reorders a sequence in place using randomness drawn from `rng`.
///
/// Shoes and tables take a shuffle as a parameter so a session can swap the
/// algorithm without touching the random source it draws from.
pub trait Shuffle {
    fn shuffle<T, R: RandomSource + ?Sized>(&self, items: &mut [T], rng: &mut R);
}

/// Fisher–Yates shuffle driven entirely by the supplied [`RandomSource`].
///
/// Every permutation of the input is equally likely provided the source is
/// uniform. Callers rely on this for fairness, not merely on the cards
/// looking mixed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FisherYates;

impl Shuffle for FisherYates {
    fn shuffle<T, R: RandomSource + ?Sized>(&self, items: &mut [T], rng: &mut R) {
        fisher_yates(items, rng);
    }
}

/// Picks `j` uniformly from `0..=i` for each `i` from the back.
pub fn fisher_yates<T, R: RandomSource + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = pick_index(rng.random(), i + 1);
        items.swap(i, j);
    }
}

fn pick_index(u: f64, bound: usize) -> usize {
    // u < 1.0 keeps this below bound; the min guards float rounding at the edge
    ((u * bound as f64) as usize).min(bound - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    #[test]
    fn shuffle_keeps_every_element() {
        let mut items: Vec<u32> = (0..52).collect();
        fisher_yates(&mut items, &mut SeededRng::new(5));
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..52).collect::<Vec<_>>());
    }

    #[test]
    fn trait_and_free_function_agree() {
        let mut a: Vec<u32> = (0..20).collect();
        let mut b = a.clone();
        FisherYates.shuffle(&mut a, &mut SeededRng::new(11));
        fisher_yates(&mut b, &mut SeededRng::new(11));
        assert_eq!(a, b);
    }

    #[test]
    fn pick_index_is_bounded() {
        assert_eq!(pick_index(0.0, 5), 0);
        assert_eq!(pick_index(0.999_999_999_999, 5), 4);
        assert_eq!(pick_index(0.5, 1), 0);
    }

    #[test]
    fn empty_and_single_slices_are_untouched() {
        let mut empty: Vec<u8> = vec![];
        fisher_yates(&mut empty, &mut SeededRng::new(1));
        let mut one = vec![9u8];
        fisher_yates(&mut one, &mut SeededRng::new(1));
        assert_eq!(one, vec![9]);
    }
}
