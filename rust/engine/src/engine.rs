//! Round orchestration as a pure transition function.
//!
//! [`apply`] takes a state and an action and returns either the next state
//! with the events the action produced, or the untouched state with the
//! reason it was refused. Nothing here owns randomness: the shoe order is
//! part of the state, and reshuffling happens through [`reshuffle`] at round
//! boundaries with an explicit source.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::dealer::{could_have_blackjack, should_dealer_hit};
use crate::errors::{GameError, InvalidAction, RuleViolation};
use crate::events::{Event, EventKind};
use crate::game::{
    GameState, HandSettlement, Insurance, InsuranceSettlement, PlayerState, RoundResult, Stage,
};
use crate::hand::{can_double, can_split, Hand, HandId, HandStatus};
use crate::outcome::{determine_outcome, Showdown};
use crate::payout::{calculate_payout, round_cents, settle_insurance};
use crate::rng::RandomSource;
use crate::shuffle::{FisherYates, Shuffle};

/// Tolerance for money comparisons between transitions.
const FUNDS_EPSILON: f64 = 1e-6;

/// A decision on a single player hand.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Play {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}

impl Play {
    pub const ALL: [Play; 5] = [
        Play::Hit,
        Play::Stand,
        Play::Double,
        Play::Split,
        Play::Surrender,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Play::Hit => "hit",
            Play::Stand => "stand",
            Play::Double => "double",
            Play::Split => "split",
            Play::Surrender => "surrender",
        }
    }
}

impl fmt::Display for Play {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Play {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "hit" => Ok(Play::Hit),
            "s" | "stand" => Ok(Play::Stand),
            "d" | "double" => Ok(Play::Double),
            "p" | "split" => Ok(Play::Split),
            "r" | "surrender" => Ok(Play::Surrender),
            other => Err(format!("unknown play '{other}'")),
        }
    }
}

/// Input to [`apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    PlaceBet { player: usize, amount: f64 },
    Deal,
    Insurance { player: usize, take: bool },
    Play { player: usize, hand: usize, play: Play },
    NextRound,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::PlaceBet { .. } => "place_bet",
            Action::Deal => "deal",
            Action::Insurance { .. } => "insurance",
            Action::Play { .. } => "play",
            Action::NextRound => "next_round",
        }
    }
}

/// Accepted action: the successor state and what happened on the way there.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: GameState,
    pub events: Vec<Event>,
}

/// Refused action: the prior state, unchanged, and the reason.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{error}")]
pub struct Rejection {
    pub state: GameState,
    #[source]
    pub error: GameError,
}

impl Rejection {
    pub fn into_error(self) -> GameError {
        self.error
    }
}

/// Applies `action` to `state`.
///
/// Either the whole action takes effect or none of it does: every failure,
/// including running out of cards mid-deal, yields a [`Rejection`] carrying
/// `state` as it was.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use pontoon_engine::cards::parse_cards;
/// use pontoon_engine::engine::{apply, Action, Play};
/// use pontoon_engine::game::{GameState, PlayerState, Stage};
/// use pontoon_engine::rules::Rules;
/// use pontoon_engine::shoe::Shoe;
///
/// // player 10 9, dealer 7 up, 10 in the hole
/// let shoe = Shoe::from_cards(parse_cards("10S 7D 9H 10C 2S").unwrap(), 1.0);
/// let s0 = GameState::new(Arc::new(Rules::default()), shoe, vec![PlayerState::new("p", 100.0)]);
/// let s1 = apply(&s0, &Action::PlaceBet { player: 0, amount: 10.0 }).unwrap().state;
/// let s2 = apply(&s1, &Action::Deal).unwrap().state;
/// assert_eq!(s2.stage, Stage::AwaitingAction { player: 0, hand: 0 });
/// let done = apply(&s2, &Action::Play { player: 0, hand: 0, play: Play::Stand }).unwrap();
/// assert_eq!(done.state.stage, Stage::RoundComplete);
/// assert_eq!(done.state.players[0].balance, 110.0);
/// ```
pub fn apply(state: &GameState, action: &Action) -> Result<Transition, Rejection> {
    let reject = |error: GameError| {
        warn!(round = state.round, action = action.name(), %error, "action rejected");
        Rejection {
            state: state.clone(),
            error,
        }
    };

    validate(state, action).map_err(reject)?;

    let mut step = Step::new(state.clone());
    step.run(action).map_err(reject)?;
    step.state.version += 1;

    if let Err(e) = check_invariants(state, &step.state) {
        error!(round = state.round, action = action.name(), error = %e, "invariant violated");
        return Err(reject(e));
    }

    debug!(
        round = step.state.round,
        version = step.state.version,
        action = action.name(),
        stage = %step.state.stage,
        events = step.events.len(),
        "transition applied"
    );
    Ok(step.finish())
}

/// Reshuffles the whole shoe, including cards already dealt.
///
/// Only allowed between rounds, so no card in play is ever recycled.
pub fn reshuffle<R: RandomSource + ?Sized>(
    state: &GameState,
    rng: &mut R,
) -> Result<Transition, Rejection> {
    reshuffle_with(state, &FisherYates, rng)
}

/// [`reshuffle`] with a caller-chosen shuffle algorithm.
pub fn reshuffle_with<S, R>(state: &GameState, shuffler: &S, rng: &mut R) -> Result<Transition, Rejection>
where
    S: Shuffle + ?Sized,
    R: RandomSource + ?Sized,
{
    if !matches!(state.stage, Stage::AwaitingBet | Stage::RoundComplete) {
        let error = GameError::from(InvalidAction::WrongStage {
            action: "reshuffle",
            stage: state.stage.to_string(),
        });
        warn!(round = state.round, %error, "reshuffle rejected");
        return Err(Rejection {
            state: state.clone(),
            error,
        });
    }
    let mut step = Step::new(state.clone());
    step.state.shoe.reshuffle_with(shuffler, rng);
    let generation = step.state.shoe.generation();
    let cards = step.state.shoe.len();
    step.emit(EventKind::ShoeShuffled { generation, cards });
    step.state.version += 1;
    debug!(round = state.round, generation, "shoe reshuffled");
    Ok(step.finish())
}

/// Every action [`apply`] would accept in `state`.
///
/// Bets can take any amount within the table limits; they are represented
/// here once per seat at the table minimum.
pub fn legal_actions(state: &GameState) -> Vec<Action> {
    match state.stage {
        Stage::AwaitingBet => {
            let min = state.rules.min_bet;
            let mut actions: Vec<Action> = state
                .players
                .iter()
                .enumerate()
                .map(|(player, _)| Action::PlaceBet {
                    player,
                    amount: min,
                })
                .filter(|a| validate(state, a).is_ok())
                .collect();
            if validate(state, &Action::Deal).is_ok() {
                actions.push(Action::Deal);
            }
            actions
        }
        Stage::AwaitingInsurance { player } => [true, false]
            .into_iter()
            .map(|take| Action::Insurance { player, take })
            .filter(|a| validate(state, a).is_ok())
            .collect(),
        Stage::AwaitingAction { player, hand } => legal_plays(state)
            .into_iter()
            .map(|play| Action::Play { player, hand, play })
            .collect(),
        Stage::RoundComplete => vec![Action::NextRound],
        Stage::Dealing | Stage::DealerPlay | Stage::Settlement => Vec::new(),
    }
}

/// Plays available on the hand whose turn it is.
///
/// Plays that draw more cards than the shoe holds are left out. Standing is
/// always offered, though the dealer may still run the shoe dry drawing to
/// 17; such a round cannot finish and the table must be rebuilt.
pub fn legal_plays(state: &GameState) -> Vec<Play> {
    match state.stage {
        Stage::AwaitingAction { player, hand } => Play::ALL
            .into_iter()
            .filter(|&play| validate_play(state, player, hand, play).is_ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Insurance costs half the original bet.
pub fn insurance_stake(bet: f64) -> f64 {
    round_cents(bet / 2.0)
}

fn wrong_stage(action: &Action, stage: Stage) -> GameError {
    InvalidAction::WrongStage {
        action: action.name(),
        stage: stage.to_string(),
    }
    .into()
}

fn seat(state: &GameState, player: usize) -> Result<&PlayerState, GameError> {
    state
        .players
        .get(player)
        .ok_or_else(|| InvalidAction::UnknownPlayer(player).into())
}

fn require_funds(p: &PlayerState, needed: f64) -> Result<(), GameError> {
    if needed > p.balance + FUNDS_EPSILON {
        return Err(RuleViolation::InsufficientFunds {
            needed,
            available: p.balance,
        }
        .into());
    }
    Ok(())
}

fn validate(state: &GameState, action: &Action) -> Result<(), GameError> {
    let rules = &state.rules;
    match *action {
        Action::PlaceBet { player, amount } => {
            if state.stage != Stage::AwaitingBet {
                return Err(wrong_stage(action, state.stage));
            }
            let p = seat(state, player)?;
            if p.bet.is_some() {
                return Err(InvalidAction::BetAlreadyPlaced(player).into());
            }
            if !amount.is_finite() || amount <= 0.0 {
                return Err(InvalidAction::MalformedBet(amount).into());
            }
            if amount < rules.min_bet || amount > rules.max_bet {
                return Err(RuleViolation::BetOutOfRange {
                    amount,
                    min: rules.min_bet,
                    max: rules.max_bet,
                }
                .into());
            }
            require_funds(p, amount)
        }
        Action::Deal => {
            if state.stage != Stage::AwaitingBet {
                return Err(wrong_stage(action, state.stage));
            }
            if state.players.iter().all(|p| p.bet.is_none()) {
                return Err(InvalidAction::NoBets.into());
            }
            if state.shoe.needs_reshuffle() {
                return Err(RuleViolation::ReshuffleRequired.into());
            }
            Ok(())
        }
        Action::Insurance { player, take } => {
            let Stage::AwaitingInsurance { player: pending } = state.stage else {
                return Err(wrong_stage(action, state.stage));
            };
            let p = seat(state, player)?;
            if player != pending || p.insurance != Insurance::Pending {
                return Err(InvalidAction::InsuranceNotPending(player).into());
            }
            if take {
                require_funds(p, insurance_stake(p.bet.unwrap_or_default()))?;
            }
            Ok(())
        }
        Action::Play { player, hand, play } => validate_play(state, player, hand, play),
        Action::NextRound => {
            if state.stage != Stage::RoundComplete {
                return Err(wrong_stage(action, state.stage));
            }
            Ok(())
        }
    }
}

fn validate_play(state: &GameState, player: usize, hand: usize, play: Play) -> Result<(), GameError> {
    let Stage::AwaitingAction {
        player: turn_player,
        hand: turn_hand,
    } = state.stage
    else {
        return Err(InvalidAction::WrongStage {
            action: play.as_str(),
            stage: state.stage.to_string(),
        }
        .into());
    };
    let p = seat(state, player)?;
    let h = p
        .hands
        .get(hand)
        .ok_or(InvalidAction::UnknownHand { player, hand })?;
    if (player, hand) != (turn_player, turn_hand) {
        return Err(InvalidAction::NotHandsTurn {
            player,
            actual: hand,
            expected_player: turn_player,
            expected: turn_hand,
        }
        .into());
    }

    let rules = &state.rules;
    if h.is_split_aces() && !rules.hit_split_aces && matches!(play, Play::Hit | Play::Double) {
        return Err(RuleViolation::Disabled("drawing to split aces").into());
    }

    validate_play_rules(state, p, h, play)?;

    let draws = match play {
        Play::Hit | Play::Double => 1,
        Play::Split => 2,
        Play::Stand | Play::Surrender => 0,
    };
    if draws > state.shoe.remaining() {
        return Err(GameError::EmptyShoe);
    }
    Ok(())
}

fn validate_play_rules(state: &GameState, p: &PlayerState, h: &Hand, play: Play) -> Result<(), GameError> {
    let rules = &state.rules;
    match play {
        Play::Hit | Play::Stand => Ok(()),
        Play::Double => {
            if !can_double(&h.cards, h.from_split(), rules) {
                return Err(if h.cards.len() != 2 {
                    InvalidAction::DoubleNeedsTwoCards(h.cards.len()).into()
                } else if !rules.allow_double_down {
                    RuleViolation::Disabled("double down").into()
                } else {
                    RuleViolation::Disabled("double after split").into()
                });
            }
            require_funds(p, h.bet)
        }
        Play::Split => {
            if !can_split(&h.cards, rules) {
                let cards: Vec<String> = h.cards.iter().map(ToString::to_string).collect();
                return Err(InvalidAction::NotAPair(cards.join(" ")).into());
            }
            if !rules.allow_split {
                return Err(RuleViolation::Disabled("split").into());
            }
            if h.from_split() && !rules.allow_resplit {
                return Err(RuleViolation::Disabled("resplit").into());
            }
            if h.is_split_aces() && !rules.resplit_aces {
                return Err(RuleViolation::Disabled("resplitting aces").into());
            }
            if p.splits() >= usize::from(rules.max_splits) {
                return Err(RuleViolation::MaxSplitsReached {
                    max_splits: rules.max_splits,
                }
                .into());
            }
            require_funds(p, h.bet)
        }
        Play::Surrender => {
            if !rules.allow_surrender {
                return Err(RuleViolation::Disabled("surrender").into());
            }
            if h.cards.len() != 2 || p.hands.len() > 1 {
                return Err(InvalidAction::SurrenderNotFirstDecision.into());
            }
            if rules.allow_late_surrender_only && !surrender_window_open(state) {
                return Err(RuleViolation::LateSurrenderBeforePeek.into());
            }
            Ok(())
        }
    }
}

/// Late surrender opens once the dealer has checked for a natural, or
/// immediately when the upcard cannot make one.
fn surrender_window_open(state: &GameState) -> bool {
    state.dealer.peeked
        || state
            .dealer
            .upcard()
            .is_some_and(|up| !could_have_blackjack(&up))
}

fn check_invariants(prev: &GameState, next: &GameState) -> Result<(), GameError> {
    let violation = |msg: String| Err(GameError::InvariantViolation(msg));

    if next.stage.is_transient() {
        return violation(format!("left in transient stage {}", next.stage));
    }
    for (seat, p) in next.players.iter().enumerate() {
        if p.splits() > usize::from(next.rules.max_splits) {
            return violation(format!("player {seat} holds {} hands", p.hands.len()));
        }
        if p.balance < -FUNDS_EPSILON {
            return violation(format!("player {seat} balance {} is negative", p.balance));
        }
    }
    if let Stage::AwaitingAction { player, hand } = next.stage {
        let open = next
            .players
            .get(player)
            .and_then(|p| p.hands.get(hand))
            .is_some_and(|h| !h.is_terminal());
        if !open {
            return violation(format!("turn points at closed hand {hand} of player {player}"));
        }
    }

    let settled = match (&prev.result, &next.result) {
        (None, Some(r)) => r.net,
        _ => 0.0,
    };
    let expected = prev.total_funds() + settled;
    if (next.total_funds() - expected).abs() > FUNDS_EPSILON {
        return violation(format!(
            "funds moved from {expected} to {} without settlement",
            next.total_funds()
        ));
    }
    Ok(())
}

/// Working copy of a state while one action is applied to it.
struct Step {
    state: GameState,
    events: Vec<Event>,
}

impl Step {
    fn new(state: GameState) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }

    fn finish(self) -> Transition {
        Transition {
            state: self.state,
            events: self.events,
        }
    }

    fn emit(&mut self, kind: EventKind) {
        self.state.clock += 1;
        self.events.push(Event {
            timestamp: self.state.clock,
            kind,
        });
    }

    fn enter(&mut self, to: Stage) {
        let from = self.state.stage;
        if from != to {
            self.state.stage = to;
            self.emit(EventKind::StageChanged { from, to });
        }
    }

    fn next_hand_id(&mut self) -> HandId {
        let id = HandId(self.state.next_hand_id);
        self.state.next_hand_id += 1;
        id
    }

    fn hand_mut(&mut self, player: usize, hand: usize) -> Result<&mut Hand, GameError> {
        self.state
            .players
            .get_mut(player)
            .and_then(|p| p.hands.get_mut(hand))
            .ok_or_else(|| GameError::InvariantViolation(format!("missing hand {hand} of player {player}")))
    }

    fn run(&mut self, action: &Action) -> Result<(), GameError> {
        match *action {
            Action::PlaceBet { player, amount } => {
                let p = &mut self.state.players[player];
                p.balance = round_cents(p.balance - amount);
                p.bet = Some(amount);
                self.emit(EventKind::BetPlaced { player, amount });
                Ok(())
            }
            Action::Deal => self.deal(),
            Action::Insurance { player, take } => self.insurance(player, take),
            Action::Play { player, hand, play } => self.play(player, hand, play),
            Action::NextRound => {
                self.next_round();
                Ok(())
            }
        }
    }

    fn deal_to(&mut self, player: usize, hand: usize) -> Result<(), GameError> {
        let card = self.state.shoe.deal()?;
        let h = self.hand_mut(player, hand)?;
        h.cards.push(card);
        let (id, value) = (h.id, h.evaluate().value);
        self.emit(EventKind::CardDealt {
            player,
            hand: id,
            card,
            value,
        });
        Ok(())
    }

    fn close(&mut self, player: usize, hand: usize, status: HandStatus) -> Result<(), GameError> {
        let h = self.hand_mut(player, hand)?;
        h.status = status;
        let (id, value) = (h.id, h.evaluate().value);
        self.emit(EventKind::HandCompleted {
            player,
            hand: id,
            status,
            value,
        });
        Ok(())
    }

    /// Closes a hand that has no decision left: bust, 21, a five-card
    /// charlie, or split aces that may not draw. Returns whether it closed.
    fn auto_close(&mut self, player: usize, hand: usize) -> Result<bool, GameError> {
        let rules = Arc::clone(&self.state.rules);
        let p = &self.state.players[player];
        let h = &p.hands[hand];
        let r = h.evaluate();
        let resplittable = rules.allow_split
            && rules.allow_resplit
            && rules.resplit_aces
            && p.splits() < usize::from(rules.max_splits)
            && can_split(&h.cards, &rules);
        let status = if r.is_bust {
            Some(HandStatus::Bust)
        } else if r.value == 21 || (rules.five_card_charlie && r.card_count >= 5) {
            Some(HandStatus::Stood)
        } else if h.is_split_aces() && !rules.hit_split_aces && !resplittable {
            Some(HandStatus::Stood)
        } else {
            None
        };
        match status {
            Some(s) => {
                self.close(player, hand, s)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn deal(&mut self) -> Result<(), GameError> {
        self.enter(Stage::Dealing);
        let seats: Vec<usize> = self
            .state
            .players
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.bet.map(|_| i))
            .collect();

        for &seat in &seats {
            let id = self.next_hand_id();
            let p = &mut self.state.players[seat];
            let bet = p.bet.unwrap_or_default();
            p.hands.push(Hand::new(id, bet));
        }

        for pass in 0..2 {
            for &seat in &seats {
                self.deal_to(seat, 0)?;
            }
            let card = self.state.shoe.deal()?;
            self.state.dealer.cards.push(card);
            if pass == 0 {
                self.emit(EventKind::DealerCardDealt { card });
            } else {
                self.emit(EventKind::HoleCardDealt);
            }
        }

        for &seat in &seats {
            if self.state.players[seat].hands[0].is_natural() {
                self.close(seat, 0, HandStatus::Blackjack)?;
            }
        }

        let ace_up = self.state.dealer.upcard().is_some_and(|c| c.rank.is_ace());
        if self.state.rules.allow_insurance && ace_up {
            for &seat in &seats {
                self.state.players[seat].insurance = Insurance::Pending;
            }
            let first = seats[0];
            self.enter(Stage::AwaitingInsurance { player: first });
            self.emit(EventKind::InsuranceOffered { player: first });
            return Ok(());
        }
        self.peek()
    }

    fn insurance(&mut self, player: usize, take: bool) -> Result<(), GameError> {
        let p = &mut self.state.players[player];
        let stake = if take {
            let stake = insurance_stake(p.bet.unwrap_or_default());
            p.balance = round_cents(p.balance - stake);
            p.insurance = Insurance::Taken { stake };
            Some(stake)
        } else {
            p.insurance = Insurance::Declined;
            None
        };
        self.emit(EventKind::InsuranceDecided { player, stake });

        let next = self
            .state
            .players
            .iter()
            .position(|p| p.insurance == Insurance::Pending);
        match next {
            Some(seat) => {
                self.enter(Stage::AwaitingInsurance { player: seat });
                self.emit(EventKind::InsuranceOffered { player: seat });
                Ok(())
            }
            None => self.peek(),
        }
    }

    /// Checks the hole card for a natural when the rules and upcard call for
    /// it. A dealer natural ends the round before any player decision.
    fn peek(&mut self) -> Result<(), GameError> {
        let upcard = self.state.dealer.upcard();
        if self.state.rules.dealer_peek && upcard.is_some_and(|c| could_have_blackjack(&c)) {
            self.state.dealer.peeked = true;
            let blackjack = self.state.dealer.evaluate().is_blackjack;
            self.emit(EventKind::DealerPeeked { blackjack });
            if blackjack {
                self.reveal_hole();
                for seat in 0..self.state.players.len() {
                    for hand in 0..self.state.players[seat].hands.len() {
                        if !self.state.players[seat].hands[hand].is_terminal() {
                            self.close(seat, hand, HandStatus::Stood)?;
                        }
                    }
                }
                return self.settle();
            }
        }
        self.advance(0, 0)
    }

    fn play(&mut self, player: usize, hand: usize, play: Play) -> Result<(), GameError> {
        let id = self.hand_mut(player, hand)?.id;
        self.emit(EventKind::PlayerActed {
            player,
            hand: id,
            play,
        });
        match play {
            Play::Hit => {
                self.deal_to(player, hand)?;
                self.auto_close(player, hand)?;
            }
            Play::Stand => self.close(player, hand, HandStatus::Stood)?,
            Play::Double => {
                let p = &mut self.state.players[player];
                let extra = p.hands[hand].bet;
                p.balance = round_cents(p.balance - extra);
                let h = &mut p.hands[hand];
                h.bet = round_cents(h.bet + extra);
                h.doubled = true;
                let bet = h.bet;
                self.emit(EventKind::HandDoubled {
                    player,
                    hand: id,
                    bet,
                });
                self.deal_to(player, hand)?;
                let bust = self.hand_mut(player, hand)?.evaluate().is_bust;
                let status = if bust { HandStatus::Bust } else { HandStatus::Doubled };
                self.close(player, hand, status)?;
            }
            Play::Split => self.split(player, hand)?,
            Play::Surrender => self.close(player, hand, HandStatus::Surrendered)?,
        }
        self.advance(player, hand)
    }

    /// Moves the second card to a new hand appended after the player's
    /// existing hands, then deals one card to each half.
    fn split(&mut self, player: usize, hand: usize) -> Result<(), GameError> {
        let new_id = self.next_hand_id();
        let p = &mut self.state.players[player];
        let bet = p.hands[hand].bet;
        p.balance = round_cents(p.balance - bet);

        let orig = &mut p.hands[hand];
        let moved = orig
            .cards
            .pop()
            .ok_or_else(|| GameError::InvariantViolation(format!("split of empty hand {}", orig.id)))?;
        orig.split_depth += 1;
        let mut new_hand = Hand::new(new_id, bet);
        new_hand.cards.push(moved);
        new_hand.parent = Some(orig.id);
        new_hand.split_depth = orig.split_depth;
        let from = orig.id;
        p.hands.push(new_hand);

        self.emit(EventKind::HandSplit {
            player,
            from,
            new_hand: new_id,
        });
        let new_idx = self.state.players[player].hands.len() - 1;
        self.deal_to(player, hand)?;
        self.deal_to(player, new_idx)?;
        self.auto_close(player, hand)?;
        self.auto_close(player, new_idx)?;
        Ok(())
    }

    fn next_open_hand(&self, from_player: usize, from_hand: usize) -> Option<(usize, usize)> {
        self.state
            .players
            .iter()
            .enumerate()
            .skip(from_player)
            .find_map(|(seat, p)| {
                let start = if seat == from_player { from_hand } else { 0 };
                p.hands
                    .iter()
                    .enumerate()
                    .skip(start)
                    .find(|(_, h)| !h.is_terminal())
                    .map(|(i, _)| (seat, i))
            })
    }

    /// Hands the turn to the next open hand at or after the given one, or to
    /// the dealer when none is left.
    fn advance(&mut self, player: usize, hand: usize) -> Result<(), GameError> {
        let Some((p, h)) = self.next_open_hand(player, hand) else {
            return self.dealer_play();
        };
        self.enter(Stage::AwaitingAction { player: p, hand: h });
        let legal = legal_plays(&self.state);
        self.emit(EventKind::DecisionNeeded {
            player: p,
            hand: h,
            legal,
        });
        Ok(())
    }

    fn reveal_hole(&mut self) {
        if self.state.dealer.hole_visible {
            return;
        }
        self.state.dealer.hole_visible = true;
        if let Some(&card) = self.state.dealer.cards.get(1) {
            let value = self.state.dealer.evaluate().value;
            self.emit(EventKind::HoleCardRevealed { card, value });
        }
    }

    fn dealer_play(&mut self) -> Result<(), GameError> {
        self.enter(Stage::DealerPlay);
        self.reveal_hole();

        // nothing left to beat when every hand is bust, surrendered or a natural
        let contested = self
            .state
            .players
            .iter()
            .flat_map(|p| &p.hands)
            .any(|h| matches!(h.status, HandStatus::Stood | HandStatus::Doubled));
        if contested {
            let rules = Arc::clone(&self.state.rules);
            while should_dealer_hit(&self.state.dealer.cards, &rules) {
                let card = self.state.shoe.deal()?;
                self.state.dealer.cards.push(card);
                self.emit(EventKind::DealerCardDealt { card });
            }
        }

        let r = self.state.dealer.evaluate();
        if r.is_bust {
            self.emit(EventKind::DealerBusted { value: r.value });
        } else {
            self.emit(EventKind::DealerStood { value: r.value });
        }
        self.settle()
    }

    fn settle(&mut self) -> Result<(), GameError> {
        self.enter(Stage::Settlement);
        let rules = Arc::clone(&self.state.rules);
        let dealer = self.state.dealer.evaluate();

        let mut hands = Vec::new();
        let mut insurance = Vec::new();
        let mut player_net = Vec::with_capacity(self.state.players.len());

        for (seat, p) in self.state.players.iter_mut().enumerate() {
            let mut net = 0.0;
            for h in &p.hands {
                let outcome = determine_outcome(&Showdown::from_hand(h, &rules), &dealer);
                let payout = calculate_payout(outcome, h.bet, &rules);
                p.balance += h.bet + payout;
                net += payout;
                hands.push(HandSettlement {
                    player: seat,
                    hand: h.id,
                    cards: h.cards.clone(),
                    value: h.evaluate().value,
                    outcome,
                    bet: h.bet,
                    payout,
                });
            }
            if let Insurance::Taken { stake } = p.insurance {
                let payout = settle_insurance(stake, dealer.is_blackjack);
                p.balance += stake + payout;
                net += payout;
                insurance.push(InsuranceSettlement {
                    player: seat,
                    stake,
                    payout,
                });
            }
            p.balance = round_cents(p.balance);
            player_net.push(round_cents(net));
        }

        for s in &hands {
            self.emit(EventKind::HandSettled {
                player: s.player,
                hand: s.hand,
                outcome: s.outcome,
                bet: s.bet,
                payout: s.payout,
            });
        }
        for s in &insurance {
            self.emit(EventKind::InsuranceSettled {
                player: s.player,
                stake: s.stake,
                payout: s.payout,
            });
        }

        let net = round_cents(player_net.iter().sum());
        let round = self.state.round;
        self.state.result = Some(RoundResult {
            round,
            dealer: self.state.dealer.cards.clone(),
            dealer_value: dealer.value,
            dealer_blackjack: dealer.is_blackjack,
            hands,
            insurance,
            player_net,
            net,
        });
        self.enter(Stage::RoundComplete);
        self.emit(EventKind::RoundEnded { round, net });
        Ok(())
    }

    fn next_round(&mut self) {
        for p in &mut self.state.players {
            p.bet = None;
            p.hands.clear();
            p.insurance = Insurance::NotOffered;
        }
        self.state.dealer = Default::default();
        self.state.result = None;
        self.state.next_hand_id = 1;
        self.state.round += 1;
        self.enter(Stage::AwaitingBet);
        let round = self.state.round;
        self.emit(EventKind::RoundStarted { round });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::rules::Rules;
    use crate::shoe::Shoe;

    fn table(cards: &str, rules: Rules) -> GameState {
        let shoe = Shoe::from_cards(parse_cards(cards).unwrap(), 1.0);
        GameState::new(Arc::new(rules), shoe, vec![PlayerState::new("p0", 100.0)])
    }

    fn dealt(cards: &str, rules: Rules) -> GameState {
        let s = table(cards, rules);
        let s = apply(&s, &Action::PlaceBet { player: 0, amount: 10.0 }).unwrap().state;
        apply(&s, &Action::Deal).unwrap().state
    }

    fn play(s: &GameState, hand: usize, play: Play) -> Result<Transition, Rejection> {
        apply(s, &Action::Play { player: 0, hand, play })
    }

    #[test]
    fn play_parses_short_and_long_names() {
        assert_eq!("h".parse::<Play>().unwrap(), Play::Hit);
        assert_eq!("Surrender".parse::<Play>().unwrap(), Play::Surrender);
        assert!("fold".parse::<Play>().is_err());
    }

    #[test]
    fn deal_before_bet_is_rejected() {
        let s = table("10S 7D 9H 10C", Rules::default());
        let r = apply(&s, &Action::Deal).unwrap_err();
        assert_eq!(r.error, GameError::InvalidAction(InvalidAction::NoBets));
        assert_eq!(r.state, s);
    }

    #[test]
    fn bet_limits_and_funds() {
        let s = table("10S 7D 9H 10C", Rules::default());
        let e = apply(&s, &Action::PlaceBet { player: 0, amount: 0.5 }).unwrap_err().error;
        assert!(matches!(e, GameError::RuleViolation(RuleViolation::BetOutOfRange { .. })));
        let e = apply(&s, &Action::PlaceBet { player: 0, amount: 500.0 }).unwrap_err().error;
        assert!(matches!(e, GameError::RuleViolation(RuleViolation::InsufficientFunds { .. })));
        let e = apply(&s, &Action::PlaceBet { player: 0, amount: f64::NAN }).unwrap_err().error;
        assert!(matches!(e, GameError::InvalidAction(InvalidAction::MalformedBet(_))));
        let e = apply(&s, &Action::PlaceBet { player: 3, amount: 5.0 }).unwrap_err().error;
        assert_eq!(e, GameError::InvalidAction(InvalidAction::UnknownPlayer(3)));
    }

    #[test]
    fn stand_on_nineteen_beats_seventeen() {
        let s = dealt("10S 7D 9H 10C", Rules::default());
        let t = play(&s, 0, Play::Stand).unwrap();
        let result = t.state.result.as_ref().unwrap();
        assert_eq!(result.hands[0].outcome, crate::outcome::Outcome::Win);
        assert_eq!(t.state.players[0].balance, 110.0);
        assert!(t.state.dealer.hole_visible);
    }

    #[test]
    fn hitting_to_bust_skips_dealer_draw() {
        let s = dealt("10S 6D 6H 10C KH 9C", Rules::default());
        let t = play(&s, 0, Play::Hit).unwrap();
        assert_eq!(t.state.stage, Stage::RoundComplete);
        assert_eq!(t.state.dealer.cards.len(), 2);
        assert_eq!(t.state.players[0].balance, 90.0);
        assert_eq!(t.state.shoe.remaining(), 1);
    }

    #[test]
    fn hit_to_21_stands_automatically() {
        let s = dealt("5S 10D 6H 8C KH 2C", Rules::default());
        let t = play(&s, 0, Play::Hit).unwrap();
        assert_eq!(t.state.players[0].hands[0].status, HandStatus::Stood);
        assert_eq!(t.state.stage, Stage::RoundComplete);
    }

    #[test]
    fn double_after_two_cards_only() {
        let s = dealt("5S 10D 6H 8C 2H 3C", Rules::default());
        let s = play(&s, 0, Play::Hit).unwrap().state;
        let e = play(&s, 0, Play::Double).unwrap_err().error;
        assert_eq!(
            e,
            GameError::InvalidAction(InvalidAction::DoubleNeedsTwoCards(3))
        );
    }

    #[test]
    fn wrong_hand_index_is_not_its_turn() {
        let s = dealt("8S 10D 8H 9C 2H 3C", Rules::default());
        let s = play(&s, 0, Play::Split).unwrap().state;
        let e = play(&s, 1, Play::Stand).unwrap_err().error;
        assert!(matches!(
            e,
            GameError::InvalidAction(InvalidAction::NotHandsTurn { actual: 1, expected: 0, .. })
        ));
    }

    #[test]
    fn legal_plays_reflect_rules() {
        let s = dealt("8S 10D 8H 9C 2C 3C", Rules::default());
        let plays = legal_plays(&s);
        assert_eq!(plays, Play::ALL.to_vec());
        let s = dealt("8S 10D 8H 9C 2C 3C", Rules::european());
        let plays = legal_plays(&s);
        assert!(!plays.contains(&Play::Surrender));
        assert!(plays.contains(&Play::Split));
    }

    #[test]
    fn next_round_resets_table() {
        let s = dealt("10S 7D 9H 10C", Rules::default());
        let s = play(&s, 0, Play::Stand).unwrap().state;
        assert_eq!(legal_actions(&s), vec![Action::NextRound]);
        let t = apply(&s, &Action::NextRound).unwrap();
        assert_eq!(t.state.round, 2);
        assert_eq!(t.state.stage, Stage::AwaitingBet);
        assert!(t.state.players[0].hands.is_empty());
        assert!(t.state.result.is_none());
        assert!(matches!(
            t.events.last().map(|e| &e.kind),
            Some(EventKind::RoundStarted { round: 2 })
        ));
    }

    #[test]
    fn clock_is_strictly_increasing() {
        let s = dealt("10S 7D 9H 10C", Rules::default());
        let t = play(&s, 0, Play::Stand).unwrap();
        let stamps: Vec<u64> = t.events.iter().map(|e| e.timestamp).collect();
        assert!(stamps.windows(2).all(|w| w[1] == w[0] + 1));
        assert_eq!(t.state.clock, *stamps.last().unwrap());
    }
}
