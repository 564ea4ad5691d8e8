use std::sync::Arc;

use pontoon_engine::cards::parse_cards;
use pontoon_engine::engine::{apply, legal_actions, legal_plays, reshuffle, Action, Play};
use pontoon_engine::errors::{GameError, InvalidAction, RuleViolation};
use pontoon_engine::game::{GameState, PlayerState, Stage};
use pontoon_engine::hand::can_double;
use pontoon_engine::rng::{RandomSource, SeededRng};
use pontoon_engine::rules::Rules;
use pontoon_engine::shoe::Shoe;

fn stacked(cards: &str, rules: Rules) -> GameState {
    let shoe = Shoe::from_cards(parse_cards(cards).unwrap(), 1.0);
    GameState::new(Arc::new(rules), shoe, vec![PlayerState::new("p0", 100.0)])
}

fn dealt(cards: &str, rules: Rules) -> GameState {
    let s = stacked(cards, rules);
    let s = apply(&s, &Action::PlaceBet { player: 0, amount: 10.0 }).unwrap().state;
    apply(&s, &Action::Deal).unwrap().state
}

fn rejected(s: &GameState, a: Action) -> GameError {
    let r = apply(s, &a).expect_err("action should be rejected");
    assert_eq!(&r.state, s, "rejection must return the prior state untouched");
    r.error
}

#[test]
fn split_on_non_pair_is_invalid() {
    let s = dealt("KS 9D 7H 8C", Rules::default());
    let e = rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Split });
    assert!(matches!(e, GameError::InvalidAction(InvalidAction::NotAPair(_))));
}

#[test]
fn split_past_max_splits_violates_rules() {
    let rules = Rules {
        max_splits: 1,
        ..Rules::default()
    };
    let s = dealt("8S 10D 8H 7C 8C 2C", rules);
    let s = apply(&s, &Action::Play { player: 0, hand: 0, play: Play::Split }).unwrap().state;
    assert_eq!(s.players[0].hands[0].cards.len(), 2);
    let e = rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Split });
    assert_eq!(
        e,
        GameError::RuleViolation(RuleViolation::MaxSplitsReached { max_splits: 1 })
    );
}

#[test]
fn resplit_allowed_up_to_three_by_default() {
    let s = dealt("8S 10D 8H 7C 8C 2C 8D 3C 4C 5C", Rules::default());
    let s = apply(&s, &Action::Play { player: 0, hand: 0, play: Play::Split }).unwrap().state;
    let s = apply(&s, &Action::Play { player: 0, hand: 0, play: Play::Split }).unwrap().state;
    assert_eq!(s.players[0].hands.len(), 3);
    assert_eq!(s.players[0].hands[0].split_depth, 2);
}

#[test]
fn double_after_split_respects_das() {
    let rules = Rules {
        allow_double_after_split: false,
        ..Rules::default()
    };
    let s = dealt("8S 10D 8H 7C 3C 2C", rules);
    let s = apply(&s, &Action::Play { player: 0, hand: 0, play: Play::Split }).unwrap().state;
    let e = rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Double });
    assert_eq!(e, GameError::RuleViolation(RuleViolation::Disabled("double after split")));
}

#[test]
fn double_legality_matches_can_double() {
    let rules = Rules {
        allow_double_down: false,
        ..Rules::default()
    };
    let s = dealt("6S 10D 5H 7C 9C", rules.clone());
    let h = &s.players[0].hands[0];
    assert!(!can_double(&h.cards, h.from_split(), &rules));
    let e = rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Double });
    assert_eq!(e, GameError::RuleViolation(RuleViolation::Disabled("double down")));

    let s = dealt("6S 10D 5H 7C 9C", Rules::default());
    let h = &s.players[0].hands[0];
    assert!(can_double(&h.cards, h.from_split(), &s.rules));
    assert!(legal_plays(&s).contains(&Play::Double));
}

#[test]
fn surrender_only_as_first_decision() {
    let s = dealt("10S 9D 3H 7C 2C", Rules::default());
    let s = apply(&s, &Action::Play { player: 0, hand: 0, play: Play::Hit }).unwrap().state;
    let e = rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Surrender });
    assert_eq!(e, GameError::InvalidAction(InvalidAction::SurrenderNotFirstDecision));
}

#[test]
fn late_surrender_waits_for_peek() {
    let rules = Rules {
        dealer_peek: false,
        ..Rules::default()
    };
    let s = dealt("10S KD 6H 7C", rules);
    let e = rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Surrender });
    assert_eq!(e, GameError::RuleViolation(RuleViolation::LateSurrenderBeforePeek));
}

#[test]
fn actions_outside_their_stage_are_rejected() {
    let s = stacked("10S 7D 9H 10C", Rules::default());
    let e = rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Hit });
    assert!(matches!(e, GameError::InvalidAction(InvalidAction::WrongStage { .. })));
    let e = rejected(&s, Action::NextRound);
    assert!(matches!(e, GameError::InvalidAction(InvalidAction::WrongStage { .. })));
    let e = rejected(&s, Action::Insurance { player: 0, take: true });
    assert!(matches!(e, GameError::InvalidAction(InvalidAction::WrongStage { .. })));

    let s = apply(&s, &Action::PlaceBet { player: 0, amount: 10.0 }).unwrap().state;
    let e = rejected(&s, Action::PlaceBet { player: 0, amount: 10.0 });
    assert_eq!(e, GameError::InvalidAction(InvalidAction::BetAlreadyPlaced(0)));
}

#[test]
fn running_out_of_cards_mid_deal_changes_nothing() {
    let s = stacked("10S 7D 9H", Rules::default());
    let s = apply(&s, &Action::PlaceBet { player: 0, amount: 10.0 }).unwrap().state;
    assert_eq!(rejected(&s, Action::Deal), GameError::EmptyShoe);
    assert_eq!(s.shoe.remaining(), 3);
}

#[test]
fn deal_past_cut_card_requires_reshuffle() {
    let s = stacked("10S 7D 9H 10C 2S 3S 4S 5S", Rules::default());
    let mut s = GameState {
        shoe: Shoe::from_cards(parse_cards("10S 7D 9H 10C 2S 3S 4S 5S").unwrap(), 0.25),
        ..s
    };
    s.shoe.deal().unwrap();
    s.shoe.deal().unwrap();
    let s = apply(&s, &Action::PlaceBet { player: 0, amount: 10.0 }).unwrap().state;
    assert_eq!(
        rejected(&s, Action::Deal),
        GameError::RuleViolation(RuleViolation::ReshuffleRequired)
    );
    let t = reshuffle(&s, &mut SeededRng::new(1)).unwrap();
    assert_eq!(t.state.shoe.remaining(), 8);
    assert!(apply(&t.state, &Action::Deal).is_ok());
}

#[test]
fn reshuffle_refused_mid_round() {
    let s = dealt("10S 7D 9H 10C", Rules::default());
    let r = reshuffle(&s, &mut SeededRng::new(1)).unwrap_err();
    assert!(matches!(r.error, GameError::InvalidAction(InvalidAction::WrongStage { .. })));
    assert_eq!(r.state, s);
}

/// Random walk mixing legal and illegal actions over many rounds. Every
/// rejection must leave the state as it was, and money only moves through
/// settlement.
#[test]
fn random_walk_keeps_rejections_atomic_and_funds_balanced() {
    let mut rng = SeededRng::new(2024);
    let rules = Arc::new(Rules::default());
    let shoe = Shoe::new(rules.num_decks, rules.penetration, &mut rng);
    let mut state = GameState::new(
        rules,
        shoe,
        vec![
            PlayerState::new("a", 5_000.0),
            PlayerState::new("b", 5_000.0),
        ],
    );
    let start_funds = state.total_funds();
    let mut settled = 0.0;
    let mut rounds = 0;

    for _ in 0..20_000 {
        if state.shoe.needs_reshuffle()
            && matches!(state.stage, Stage::AwaitingBet | Stage::RoundComplete)
        {
            state = reshuffle(&state, &mut rng).unwrap().state;
        }
        let legal = legal_actions(&state);
        let noise = [
            Action::Deal,
            Action::NextRound,
            Action::PlaceBet { player: 5, amount: 10.0 },
            Action::PlaceBet { player: 0, amount: 1e9 },
            Action::Insurance { player: 1, take: true },
            Action::Play { player: 1, hand: 2, play: Play::Split },
            Action::Play { player: 0, hand: 0, play: Play::Double },
        ];
        let pick = (rng.random() * (legal.len() + noise.len()) as f64) as usize;
        let action = legal
            .get(pick)
            .cloned()
            .unwrap_or_else(|| noise[(pick - legal.len()).min(noise.len() - 1)].clone());

        match apply(&state, &action) {
            Ok(t) => {
                if let (None, Some(r)) = (&state.result, &t.state.result) {
                    settled += r.net;
                    rounds += 1;
                }
                assert!(!t.state.stage.is_transient());
                state = t.state;
            }
            Err(r) => {
                assert!(legal.iter().all(|a| a != &action), "{action:?} was listed as legal");
                assert_eq!(r.state, state);
            }
        }
    }

    assert!(rounds > 100, "only {rounds} rounds completed");
    assert!((state.total_funds() - (start_funds + settled)).abs() < 1e-6);
}

#[test]
fn plays_needing_cards_are_withheld_from_an_empty_shoe() {
    let s = dealt("KS 9D 7H 8C", Rules::default());
    assert_eq!(s.shoe.remaining(), 0);
    let legal = legal_plays(&s);
    assert!(legal.contains(&Play::Stand));
    for draw in [Play::Hit, Play::Double, Play::Split] {
        assert!(!legal.contains(&draw), "{draw:?}");
    }
    assert_eq!(
        rejected(&s, Action::Play { player: 0, hand: 0, play: Play::Hit }),
        GameError::EmptyShoe
    );
    let done = apply(&s, &Action::Play { player: 0, hand: 0, play: Play::Stand }).unwrap().state;
    assert_eq!(done.stage, Stage::RoundComplete);
}
