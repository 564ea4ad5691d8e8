//! Reference players for comparison with [`crate::basic::BasicStrategy`].

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Strategy;
use pontoon_engine::engine::Play;
use pontoon_engine::game::GameState;

/// Plays like the house: hit below 17, stand otherwise. Never doubles,
/// splits, surrenders or insures.
#[derive(Debug, Clone, Copy, Default)]
pub struct DealerMimic;

impl Strategy for DealerMimic {
    fn decide(&self, state: &GameState, legal: &[Play]) -> Play {
        let value = state
            .current_hand()
            .map(|(_, h)| h.evaluate().value)
            .unwrap_or(21);
        if value < 17 && legal.contains(&Play::Hit) {
            Play::Hit
        } else {
            Play::Stand
        }
    }

    fn name(&self) -> &str {
        "DealerMimic"
    }
}

/// Picks uniformly among the legal plays and takes insurance half the time.
///
/// Seeded, so a session replays exactly when the table's seed is also fixed.
#[derive(Debug)]
pub struct RandomPlay {
    rng: Mutex<StdRng>,
}

impl RandomPlay {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Strategy for RandomPlay {
    fn decide(&self, _state: &GameState, legal: &[Play]) -> Play {
        let fallback = legal.first().copied().unwrap_or(Play::Stand);
        match self.rng.lock() {
            Ok(mut rng) if !legal.is_empty() => legal[rng.random_range(0..legal.len())],
            _ => fallback,
        }
    }

    fn take_insurance(&self, _state: &GameState, _player: usize) -> bool {
        self.rng.lock().map(|mut rng| rng.random_bool(0.5)).unwrap_or(false)
    }

    fn name(&self) -> &str {
        "RandomPlay"
    }
}
