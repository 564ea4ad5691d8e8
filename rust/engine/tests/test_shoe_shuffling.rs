use std::collections::HashMap;

use pontoon_engine::cards::Card;
use pontoon_engine::rng::{RandomSource, SeededRng};
use pontoon_engine::shoe::Shoe;
use pontoon_engine::shuffle::fisher_yates;

/// Chi-square critical value for 23 degrees of freedom at p = 0.001.
const CHI2_CRIT_DF23_P001: f64 = 49.728;

#[test]
fn same_seed_yields_identical_shoe() {
    let a = Shoe::new(6, 0.75, &mut SeededRng::new(12345));
    let b = Shoe::new(6, 0.75, &mut SeededRng::new(12345));
    assert_eq!(a.undealt(), b.undealt(), "same seed must yield identical order");
}

#[test]
fn different_seeds_differ() {
    let a = Shoe::new(6, 0.75, &mut SeededRng::new(1));
    let b = Shoe::new(6, 0.75, &mut SeededRng::new(2));
    assert_ne!(
        &a.undealt()[..10],
        &b.undealt()[..10],
        "different seeds should produce different orders (high probability)"
    );
}

#[test]
fn six_deck_shoe_holds_each_card_six_times() {
    let mut shoe = Shoe::new(6, 1.0, &mut SeededRng::new(42));
    let mut counts: HashMap<Card, usize> = HashMap::new();
    while let Ok(c) = shoe.deal() {
        *counts.entry(c).or_default() += 1;
    }
    assert_eq!(counts.len(), 52);
    assert!(counts.values().all(|&n| n == 6));
    assert!(shoe.needs_reshuffle());
}

#[test]
fn successive_reshuffles_are_reproducible() {
    let mut r1 = SeededRng::new(77);
    let mut r2 = SeededRng::new(77);
    let mut a = Shoe::new(2, 0.75, &mut r1);
    let mut b = Shoe::new(2, 0.75, &mut r2);
    for _ in 0..5 {
        a.reshuffle(&mut r1);
        b.reshuffle(&mut r2);
        assert_eq!(a.undealt(), b.undealt());
    }
    assert_eq!(a.generation(), 6);
}

#[test]
fn fisher_yates_is_uniform_over_permutations() {
    const TRIALS: usize = 200_000;
    let mut rng = SeededRng::new(42);
    let mut counts: HashMap<[u8; 4], usize> = HashMap::new();
    for _ in 0..TRIALS {
        let mut items = [0u8, 1, 2, 3];
        fisher_yates(&mut items, &mut rng);
        *counts.entry(items).or_default() += 1;
    }

    assert_eq!(counts.len(), 24, "every permutation must occur");
    let expected = TRIALS as f64 / 24.0;
    let mut chi2 = 0.0;
    for (perm, &n) in &counts {
        let dev = (n as f64 - expected) / expected;
        assert!(
            dev.abs() < 0.05,
            "permutation {:?} seen {} times, expected ~{:.0}",
            perm,
            n,
            expected
        );
        chi2 += (n as f64 - expected).powi(2) / expected;
    }
    assert!(
        chi2 < CHI2_CRIT_DF23_P001,
        "chi-square {chi2:.2} exceeds critical value"
    );
}

/// Walks a fixed list of values so the mapping from draws to swaps is visible.
struct Script(Vec<f64>, usize);

impl RandomSource for Script {
    fn random(&mut self) -> f64 {
        let v = self.0[self.1 % self.0.len()];
        self.1 += 1;
        v
    }
}

#[test]
fn zero_draws_rotate_left() {
    // j = 0 at every step moves the original front element to the back
    let mut items = [1, 2, 3, 4];
    fisher_yates(&mut items, &mut Script(vec![0.0], 0));
    assert_eq!(items, [2, 3, 4, 1]);
}

#[test]
fn top_draws_leave_order_unchanged() {
    let mut items = [1, 2, 3, 4];
    fisher_yates(&mut items, &mut Script(vec![0.999_999], 0));
    assert_eq!(items, [1, 2, 3, 4]);
}
