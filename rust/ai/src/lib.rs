//! # pontoon-ai: playing strategies for the pontoon engine
//!
//! Provides automated players that answer the engine's decision points.
//! Every strategy sees the same immutable [`GameState`] a human would and
//! only ever returns plays the engine lists as legal.
//!
//! ## Core Components
//!
//! - [`Strategy`] - Trait defining the interface for decision-making
//! - [`basic`] - Table-driven basic strategy
//! - [`counting`] - Hi-Lo counting with index plays over the basic chart
//! - [`simple`] - Dealer mimic and uniform random players for comparison
//! - [`create_strategy`] - Factory function for creating strategies by name
//! - [`play_round`] - Drives one full round on a [`Table`] with one strategy
//!
//! ## Quick Start
//!
//! ```rust
//! use pontoon_ai::{create_strategy, play_round};
//! use pontoon_engine::game::PlayerState;
//! use pontoon_engine::rng::SeededRng;
//! use pontoon_engine::rules::Rules;
//! use pontoon_engine::table::Table;
//!
//! let strategy = create_strategy("basic").unwrap();
//! let mut table = Table::new(
//!     Rules::default(),
//!     vec![PlayerState::new("p0", 100.0)],
//!     SeededRng::new(42),
//! )
//! .unwrap();
//! let events = play_round(&mut table, strategy.as_ref(), 10.0).unwrap();
//! assert!(table.state().is_round_complete());
//! assert!(!events.is_empty());
//! ```

use pontoon_engine::engine::{legal_actions, legal_plays, Action, Play};
use pontoon_engine::errors::GameError;
use pontoon_engine::events::Event;
use pontoon_engine::game::{GameState, Stage};
use pontoon_engine::rng::RandomSource;
use pontoon_engine::shuffle::Shuffle;
use pontoon_engine::table::Table;

pub mod basic;
pub mod counting;
pub mod simple;

/// Names accepted by [`create_strategy`].
pub const STRATEGY_NAMES: [&str; 4] = ["basic", "counting", "dealer", "random"];

/// Interface for automated players.
///
/// # Required Methods
///
/// - [`decide`](Strategy::decide) - Choose a play for the hand whose turn it is
/// - [`name`](Strategy::name) - Return the strategy's identifier
///
/// # Example Implementation
///
/// ```rust
/// use pontoon_ai::Strategy;
/// use pontoon_engine::engine::Play;
/// use pontoon_engine::game::GameState;
///
/// struct AlwaysStand;
///
/// impl Strategy for AlwaysStand {
///     fn decide(&self, _state: &GameState, _legal: &[Play]) -> Play {
///         Play::Stand
///     }
///
///     fn name(&self) -> &str {
///         "AlwaysStand"
///     }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Choose a play for the hand at `state.stage`.
    ///
    /// `legal` is never empty when the engine asks; the returned play
    /// should be one of its entries. [`next_action`] falls back to the
    /// first legal play otherwise.
    fn decide(&self, state: &GameState, legal: &[Play]) -> Play;

    /// Answer the insurance offer for `player`. Declines by default.
    fn take_insurance(&self, _state: &GameState, _player: usize) -> bool {
        false
    }

    fn name(&self) -> &str;
}

/// Factory function to create strategies by name.
///
/// # Supported Names
///
/// - `"basic"` - [`basic::BasicStrategy`]
/// - `"counting"` - [`counting::CountingStrategy`]
/// - `"dealer"` - [`simple::DealerMimic`]
/// - `"random"` - [`simple::RandomPlay`] with a fixed seed
///
/// # Example
///
/// ```rust
/// use pontoon_ai::create_strategy;
///
/// assert_eq!(create_strategy("basic").unwrap().name(), "BasicStrategy");
/// assert!(create_strategy("martingale").is_err());
/// ```
pub fn create_strategy(name: &str) -> Result<Box<dyn Strategy>, String> {
    match name {
        "basic" => Ok(Box::new(basic::BasicStrategy::new())),
        "counting" => Ok(Box::new(counting::CountingStrategy::new())),
        "dealer" => Ok(Box::new(simple::DealerMimic)),
        "random" => Ok(Box::new(simple::RandomPlay::new(0))),
        other => Err(format!(
            "unknown strategy '{}' (expected one of: {})",
            other,
            STRATEGY_NAMES.join(", ")
        )),
    }
}

/// The action `strategy` takes at the current decision point, or `None`
/// when the state is not waiting on a player.
pub fn next_action(strategy: &dyn Strategy, state: &GameState) -> Option<Action> {
    match state.stage {
        Stage::AwaitingInsurance { player } => {
            let take = Action::Insurance { player, take: true };
            let affordable = legal_actions(state).contains(&take);
            Some(Action::Insurance {
                player,
                take: affordable && strategy.take_insurance(state, player),
            })
        }
        Stage::AwaitingAction { player, hand } => {
            let legal = legal_plays(state);
            let first = *legal.first()?;
            let chosen = strategy.decide(state, &legal);
            let play = if legal.contains(&chosen) { chosen } else { first };
            Some(Action::Play { player, hand, play })
        }
        _ => None,
    }
}

/// Plays one round to completion: every seat that can cover `bet` places it,
/// then `strategy` answers every decision.
///
/// Returns the events of the round in order, including any reshuffle done
/// before the bets.
pub fn play_round<R: RandomSource, S: Shuffle>(
    table: &mut Table<R, S>,
    strategy: &dyn Strategy,
    bet: f64,
) -> Result<Vec<Event>, GameError> {
    let mut events = table.begin_round()?;
    let seats: Vec<usize> = table
        .state()
        .players
        .iter()
        .enumerate()
        .filter(|(_, p)| p.balance >= bet)
        .map(|(i, _)| i)
        .collect();
    for player in seats {
        events.extend(table.act(Action::PlaceBet { player, amount: bet })?);
    }
    events.extend(table.act(Action::Deal)?);
    while let Some(action) = next_action(strategy, table.state()) {
        events.extend(table.act(action)?);
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pontoon_engine::game::PlayerState;
    use pontoon_engine::rng::SeededRng;
    use pontoon_engine::rules::Rules;

    struct Surrenders;

    impl Strategy for Surrenders {
        fn decide(&self, _state: &GameState, _legal: &[Play]) -> Play {
            Play::Surrender
        }

        fn name(&self) -> &str {
            "Surrenders"
        }
    }

    #[test]
    fn factory_knows_every_listed_name() {
        for name in STRATEGY_NAMES {
            assert!(create_strategy(name).is_ok(), "{name}");
        }
        let err = create_strategy("nope").err().unwrap();
        assert!(err.contains("basic"));
    }

    #[test]
    fn illegal_choices_fall_back_to_a_legal_play() {
        let mut table = Table::new(
            Rules {
                allow_surrender: false,
                ..Rules::default()
            },
            vec![PlayerState::new("p0", 1_000.0)],
            SeededRng::new(3),
        )
        .unwrap();
        for _ in 0..50 {
            play_round(&mut table, &Surrenders, 10.0).unwrap();
            assert!(table.state().is_round_complete());
        }
    }

    #[test]
    fn broke_seats_sit_out() {
        let mut table = Table::new(
            Rules::default(),
            vec![PlayerState::new("rich", 1_000.0), PlayerState::new("broke", 5.0)],
            SeededRng::new(4),
        )
        .unwrap();
        play_round(&mut table, &simple::DealerMimic, 10.0).unwrap();
        let result = table.state().result.as_ref().unwrap();
        assert!(result.hands.iter().all(|h| h.player == 0));
        assert_eq!(table.state().players[1].balance, 5.0);
    }
}
