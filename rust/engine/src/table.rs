//! A single-threaded session: one shoe, one random source, one current state.

use std::sync::Arc;

use tracing::info;

use crate::engine::{apply, legal_actions, reshuffle_with, Action};
use crate::errors::{GameError, RulesError};
use crate::events::Event;
use crate::game::{GameState, PlayerState, Stage};
use crate::rng::RandomSource;
use crate::rules::Rules;
use crate::shoe::Shoe;
use crate::shuffle::{FisherYates, Shuffle};

const CARDS_PER_HAND: usize = 6;

/// Owns the random source and shuffle a session uses, and the latest state.
///
/// Every state change still goes through [`apply`]; the table only decides
/// when the shoe must be reshuffled, which is the one step that needs
/// randomness.
///
/// # Examples
///
/// ```
/// use pontoon_engine::engine::{Action, Play};
/// use pontoon_engine::game::PlayerState;
/// use pontoon_engine::rng::SeededRng;
/// use pontoon_engine::rules::Rules;
/// use pontoon_engine::table::Table;
///
/// let mut table = Table::new(Rules::default(), vec![PlayerState::new("p", 100.0)], SeededRng::new(7)).unwrap();
/// table.act(Action::PlaceBet { player: 0, amount: 10.0 }).unwrap();
/// table.act(Action::Deal).unwrap();
/// assert!(!table.legal_actions().is_empty());
/// ```
#[derive(Debug)]
pub struct Table<R: RandomSource, S: Shuffle = FisherYates> {
    rng: R,
    shuffler: S,
    state: GameState,
}

impl<R: RandomSource> Table<R> {
    /// Opens a table that shuffles with [`FisherYates`].
    pub fn new(rules: Rules, players: Vec<PlayerState>, rng: R) -> Result<Self, RulesError> {
        Self::with_shuffle(rules, players, rng, FisherYates)
    }
}

impl<R: RandomSource, S: Shuffle> Table<R, S> {
    pub fn with_shuffle(
        rules: Rules,
        players: Vec<PlayerState>,
        mut rng: R,
        shuffler: S,
    ) -> Result<Self, RulesError> {
        let rules = rules.validate()?;
        if players.is_empty() {
            return Err(RulesError::invalid("players", "at least one seat is required"));
        }
        let shoe = Shoe::shuffled_with(rules.num_decks, rules.penetration, &shuffler, &mut rng);
        info!(
            decks = rules.num_decks,
            seats = players.len(),
            "table opened"
        );
        Ok(Self {
            rng,
            shuffler,
            state: GameState::new(Arc::new(rules), shoe, players),
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn legal_actions(&self) -> Vec<Action> {
        legal_actions(&self.state)
    }

    /// Applies `action` and keeps the successor state.
    pub fn act(&mut self, action: Action) -> Result<Vec<Event>, GameError> {
        let t = apply(&self.state, &action).map_err(|r| r.error)?;
        self.state = t.state;
        Ok(t.events)
    }

    /// Cards kept back for one round: six per seat plus the dealer's hand.
    pub fn round_reserve(&self) -> usize {
        CARDS_PER_HAND * (self.state.players.len() + 1)
    }

    /// Brings the table to `AwaitingBet` for a fresh round, reshuffling
    /// first when the cut card has been reached or fewer cards than
    /// [`Table::round_reserve`] are left.
    pub fn begin_round(&mut self) -> Result<Vec<Event>, GameError> {
        let mut events = Vec::new();
        let shoe = &self.state.shoe;
        if shoe.needs_reshuffle() || shoe.remaining() < self.round_reserve() {
            let t = reshuffle_with(&self.state, &self.shuffler, &mut self.rng).map_err(|r| r.error)?;
            self.state = t.state;
            events.extend(t.events);
        }
        if self.state.stage == Stage::RoundComplete {
            events.extend(self.act(Action::NextRound)?);
        }
        Ok(events)
    }
}
