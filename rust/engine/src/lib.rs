//! # pontoon-engine: Blackjack Rules and State Engine
//!
//! A deterministic blackjack engine for one dealer and one or more seats.
//! Rounds advance through pure state transitions, every transition emits
//! typed events, and all randomness comes from an injected source so a seed
//! replays a session exactly.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`rng`] - Random sources: seeded ChaCha20 and OS-seeded
//! - [`shuffle`] - Pluggable shuffle with an unbiased Fisher-Yates default
//! - [`shoe`] - Multi-deck shoe with cut card and reshuffle
//! - [`rules`] - Table rules, presets and validation
//! - [`hand`] - Hand evaluation (hard/soft totals, naturals) and split/double checks
//! - [`dealer`] - Dealer drawing policy
//! - [`outcome`] - Resolving a player hand against the dealer
//! - [`payout`] - Money owed per outcome, insurance settlement
//! - [`game`] - Immutable game state snapshots and round results
//! - [`engine`] - The transition function, legal actions and reshuffles
//! - [`events`] - Event records produced by transitions
//! - [`table`] - A session owning a random source and the current state
//! - [`logger`] - JSONL round history
//! - [`errors`] - Error types for rejected actions and invalid rules
//!
//! ## Quick Start
//!
//! ```rust
//! use pontoon_engine::cards::parse_cards;
//! use pontoon_engine::hand::evaluate_hand;
//!
//! let r = evaluate_hand(&parse_cards("AS KH").unwrap());
//! assert_eq!(r.value, 21);
//! assert!(r.is_blackjack);
//! ```
//!
//! ## Playing a Round
//!
//! ```rust
//! use pontoon_engine::engine::{Action, Play};
//! use pontoon_engine::game::{PlayerState, Stage};
//! use pontoon_engine::rng::SeededRng;
//! use pontoon_engine::rules::Rules;
//! use pontoon_engine::table::Table;
//!
//! let mut table = Table::new(Rules::default(), vec![PlayerState::new("p1", 500.0)], SeededRng::new(42)).unwrap();
//! table.act(Action::PlaceBet { player: 0, amount: 25.0 }).unwrap();
//! table.act(Action::Deal).unwrap();
//! while !table.state().is_round_complete() {
//!     let next = match table.state().stage {
//!         Stage::AwaitingInsurance { player } => Action::Insurance { player, take: false },
//!         Stage::AwaitingAction { player, hand } => Action::Play { player, hand, play: Play::Stand },
//!         _ => unreachable!(),
//!     };
//!     table.act(next).unwrap();
//! }
//! assert!(table.state().result.is_some());
//! ```
//!
//! ## Deterministic Shuffling
//!
//! ```rust
//! use pontoon_engine::rng::SeededRng;
//! use pontoon_engine::shoe::Shoe;
//!
//! let a = Shoe::new(6, 0.75, &mut SeededRng::new(9));
//! let b = Shoe::new(6, 0.75, &mut SeededRng::new(9));
//! assert_eq!(a.undealt(), b.undealt());
//! ```

pub mod cards;
pub mod dealer;
pub mod engine;
pub mod errors;
pub mod events;
pub mod game;
pub mod hand;
pub mod logger;
pub mod outcome;
pub mod payout;
pub mod rng;
pub mod rules;
pub mod shoe;
pub mod shuffle;
pub mod table;
