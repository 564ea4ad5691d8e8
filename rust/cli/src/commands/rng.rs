//! Random source inspection.
//!
//! Prints a few values from the seeded ChaCha20 stream the tables shuffle
//! with. `--check N` shuffles a four-card deck `N` times and runs a
//! chi-square test over the 24 possible orders.

use crate::error::CliError;
use pontoon_engine::rng::{RandomSource, SeededRng};
use pontoon_engine::shuffle::fisher_yates;
use std::io::Write;

/// Chi-square critical value for 23 degrees of freedom at p = 0.001.
const CHI2_CRITICAL_23DF: f64 = 49.728;

const PERMUTATIONS: usize = 24;

pub fn handle_rng_command(
    seed: Option<u64>,
    samples: usize,
    check: Option<u64>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let s = seed.unwrap_or_else(rand::random);
    let mut rng = SeededRng::new(s);
    let vals: Vec<f64> = (0..samples).map(|_| rng.random()).collect();
    writeln!(out, "Seed: {}", s)?;
    writeln!(out, "RNG sample: {:?}", vals)?;

    if let Some(n) = check {
        if n < (PERMUTATIONS * 10) as u64 {
            return Err(CliError::InvalidInput(format!(
                "--check needs at least {} shuffles",
                PERMUTATIONS * 10
            )));
        }
        let chi2 = permutation_chi_square(&mut rng, n);
        let verdict = if chi2 < CHI2_CRITICAL_23DF { "PASS" } else { "FAIL" };
        writeln!(
            out,
            "Fairness: {} shuffles, chi-square {:.3} (critical {}) {}",
            n, chi2, CHI2_CRITICAL_23DF, verdict
        )?;
        if verdict == "FAIL" {
            return Err(CliError::Engine("shuffle fairness check failed".into()));
        }
    }
    Ok(())
}

fn permutation_chi_square(rng: &mut SeededRng, shuffles: u64) -> f64 {
    let mut counts = [0u64; PERMUTATIONS];
    for _ in 0..shuffles {
        let mut deck = [0usize, 1, 2, 3];
        fisher_yates(&mut deck, rng);
        counts[lehmer_index(&deck)] += 1;
    }
    let expected = shuffles as f64 / PERMUTATIONS as f64;
    counts
        .iter()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum()
}

/// Position of a permutation of `0..4` in lexicographic order.
fn lehmer_index(p: &[usize; 4]) -> usize {
    let mut index = 0;
    for i in 0..4 {
        let smaller_after = p[i + 1..].iter().filter(|&&x| x < p[i]).count();
        index = index * (4 - i) + smaller_after;
    }
    index
}
