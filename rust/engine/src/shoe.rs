use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::{build, Card};
use crate::errors::GameError;
use crate::rng::RandomSource;
use crate::shuffle::{FisherYates, Shuffle};

/// Ordered cards plus a cursor and a cut point.
///
/// The card order is shared behind an `Arc` and never changes after a
/// shuffle, so cloning a shoe into a new [`crate::game::GameState`] only
/// copies the cursor. A shoe is owned by exactly one session; concurrent
/// simulations each build their own.
///
/// # Examples
///
/// ```
/// use pontoon_engine::rng::SeededRng;
/// use pontoon_engine::shoe::Shoe;
///
/// let mut rng = SeededRng::new(42);
/// let mut shoe = Shoe::new(6, 0.75, &mut rng);
/// assert_eq!(shoe.remaining(), 312);
/// let first = shoe.deal().expect("fresh shoe has cards");
/// assert_eq!(shoe.remaining(), 311);
/// # let _ = first;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shoe {
    /// Dealing order, front to back
    cards: Arc<[Card]>,
    /// Index of the next card to deal
    position: usize,
    /// Once `position` reaches this index the shoe is due for a reshuffle
    cut_card: usize,
    /// Fraction of the shoe dealt before a reshuffle
    penetration: f64,
    /// Number of shuffles performed on this shoe
    generation: u32,
}

impl Shoe {
    /// Builds `num_decks` decks and shuffles them with [`FisherYates`].
    pub fn new<R: RandomSource + ?Sized>(num_decks: u8, penetration: f64, rng: &mut R) -> Self {
        Self::shuffled_with(num_decks, penetration, &FisherYates, rng)
    }

    /// Builds `num_decks` decks and orders them with `shuffler`.
    pub fn shuffled_with<S, R>(num_decks: u8, penetration: f64, shuffler: &S, rng: &mut R) -> Self
    where
        S: Shuffle + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut cards = build(num_decks);
        shuffler.shuffle(&mut cards, rng);
        Self::with_order(cards, penetration, 1)
    }

    /// Uses `cards` exactly as given. Dealing starts from the front.
    pub fn from_cards(cards: Vec<Card>, penetration: f64) -> Self {
        Self::with_order(cards, penetration, 0)
    }

    fn with_order(cards: Vec<Card>, penetration: f64, generation: u32) -> Self {
        let cut_card = cut_point(cards.len(), penetration);
        Self {
            cards: cards.into(),
            position: 0,
            cut_card,
            penetration,
            generation,
        }
    }

    pub fn deal(&mut self) -> Result<Card, GameError> {
        let c = *self.cards.get(self.position).ok_or(GameError::EmptyShoe)?;
        self.position += 1;
        tracing::trace!(card = %c, position = self.position, "dealt");
        Ok(c)
    }

    pub fn peek(&self) -> Option<Card> {
        self.cards.get(self.position).copied()
    }

    /// Gathers every card back and shuffles the whole shoe.
    pub fn reshuffle<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        self.reshuffle_with(&FisherYates, rng);
    }

    pub fn reshuffle_with<S, R>(&mut self, shuffler: &S, rng: &mut R)
    where
        S: Shuffle + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut cards = self.cards.to_vec();
        shuffler.shuffle(&mut cards, rng);
        self.cards = cards.into();
        self.position = 0;
        self.generation += 1;
    }

    pub fn needs_reshuffle(&self) -> bool {
        self.position >= self.cut_card
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }

    pub fn dealt(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn penetration(&self) -> f64 {
        self.penetration
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Cards not yet dealt, in dealing order.
    pub fn undealt(&self) -> &[Card] {
        &self.cards[self.position.min(self.cards.len())..]
    }
}

fn cut_point(len: usize, penetration: f64) -> usize {
    let p = if penetration.is_finite() {
        penetration.clamp(0.0, 1.0)
    } else {
        1.0
    };
    ((len as f64 * p).round() as usize).clamp(1.min(len), len)
}
