use std::fs;
use std::path::PathBuf;

use pontoon_engine::engine::{Action, Play};
use pontoon_engine::game::{PlayerState, Stage};
use pontoon_engine::logger::{read_records, RoundLogger, RoundRecord};
use pontoon_engine::rng::SeededRng;
use pontoon_engine::rules::Rules;
use pontoon_engine::table::Table;

fn tmp_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("target");
    p.push(format!("{}_{}.jsonl", name, std::process::id()));
    p
}

fn played_round(seed: u64) -> RoundRecord {
    let mut table = Table::new(
        Rules::default(),
        vec![PlayerState::new("p0", 100.0)],
        SeededRng::new(seed),
    )
    .expect("valid table");
    let mut events = table.act(Action::PlaceBet { player: 0, amount: 10.0 }).unwrap();
    events.extend(table.act(Action::Deal).unwrap());
    while !table.state().is_round_complete() {
        let next = match table.state().stage {
            Stage::AwaitingInsurance { player } => Action::Insurance { player, take: false },
            Stage::AwaitingAction { player, hand } => Action::Play { player, hand, play: Play::Stand },
            other => panic!("unexpected stage {other}"),
        };
        events.extend(table.act(next).unwrap());
    }
    RoundRecord {
        round_id: "20250102-000001".to_string(),
        seed: Some(seed),
        rules: Some("default".to_string()),
        events,
        result: table.state().result.clone(),
        ts: None,
        meta: None,
    }
}

#[test]
fn writes_jsonl_with_lf_only() {
    let path = tmp_path("roundlog");
    let mut logger = RoundLogger::create(&path).expect("create logger");
    logger.write(&played_round(1)).expect("write");
    let bytes = fs::read(&path).expect("read file");
    assert!(bytes.ends_with(b"\n"));
    assert!(!bytes.contains(&b'\r'));
    assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 1);
}

#[test]
fn sequential_ids_increment() {
    let mut logger = RoundLogger::with_seq_for_test("20251231");
    assert_eq!(logger.next_id(), "20251231-000001");
    assert_eq!(logger.next_id(), "20251231-000002");
}

#[test]
fn ts_is_generated_when_missing_and_preserved_when_present() {
    let path = tmp_path("roundlog_ts");
    let mut logger = RoundLogger::create(&path).expect("create logger");
    let rec = played_round(2);
    logger.write(&rec).expect("write");
    let line = fs::read_to_string(&path).unwrap();
    assert!(line.contains("\"ts\":"), "ts should be injected");

    let preset = "2030-01-01T00:00:00Z".to_string();
    let rec2 = RoundRecord {
        ts: Some(preset.clone()),
        ..rec
    };
    logger.write(&rec2).expect("write2");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(&preset), "preset ts must be kept");
}

#[test]
fn records_read_back_with_full_event_trail() {
    let path = tmp_path("roundlog_read");
    let mut logger = RoundLogger::create(&path).expect("create logger");
    let original = played_round(3);
    logger.write(&original).expect("write");
    let back = read_records(&fs::read_to_string(&path).unwrap()).expect("parse");
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].events, original.events);
    assert_eq!(back[0].result, original.result);
    assert!(back[0].ts.is_some());
}
